//! Turn orchestration
//!
//! Drives one conversation turn: record, transcribe, check for the exit
//! phrase, append to history, query the model, synthesize, play. Every
//! stage failure is converted into a [`TurnStatus`] and the session
//! returns to waiting for the next trigger; only the spoken exit phrase
//! ends the session.
//!
//! The orchestrator is generic over its five stages so the state machine
//! can be exercised without audio hardware or external binaries.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chat::ChatClient;
use crate::error::{CaptureError, ChatError, PlaybackError, SynthesisError, TranscriptionError};
use crate::history::ConversationHistory;
use crate::voice::{AudioCapture, PiperSynthesizer, SystemPlayer, WhisperTranscriber};

/// Records a fixed-duration clip to a scratch path
pub trait Recorder {
    /// Record `duration` of audio to `path`, overwriting
    ///
    /// # Errors
    ///
    /// Returns error if recording or writing the clip fails
    fn record(&self, path: &Path, duration: Duration) -> Result<PathBuf, CaptureError>;
}

/// Turns a recorded clip into text
pub trait Transcriber {
    /// Transcribe a clip; the result may be empty
    ///
    /// # Errors
    ///
    /// Returns error if the recognition engine cannot run or produces no output
    fn transcribe(&self, clip: &Path) -> Result<String, TranscriptionError>;
}

/// Produces the assistant reply for a conversation history
pub trait ChatBackend {
    /// Request one reply for the full history
    ///
    /// # Errors
    ///
    /// Returns error on transport, status, or response-shape failures
    fn complete(&self, history: &ConversationHistory) -> Result<String, ChatError>;
}

/// Renders reply text to an audio clip
pub trait Synthesizer {
    /// Synthesize `text`, returning the clip path
    ///
    /// # Errors
    ///
    /// Returns error if the synthesis engine cannot run
    fn synthesize(&self, text: &str) -> Result<PathBuf, SynthesisError>;
}

/// Plays a clip to completion
pub trait Player {
    /// Play a clip, blocking until done
    ///
    /// # Errors
    ///
    /// Returns error if no player is available or playback fails
    fn play(&self, clip: &Path) -> Result<(), PlaybackError>;
}

impl Recorder for AudioCapture {
    fn record(&self, path: &Path, duration: Duration) -> Result<PathBuf, CaptureError> {
        Self::record(self, path, duration)
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, clip: &Path) -> Result<String, TranscriptionError> {
        Self::transcribe(self, clip)
    }
}

impl ChatBackend for ChatClient {
    fn complete(&self, history: &ConversationHistory) -> Result<String, ChatError> {
        Self::complete(self, history)
    }
}

impl Synthesizer for PiperSynthesizer {
    fn synthesize(&self, text: &str) -> Result<PathBuf, SynthesisError> {
        Self::synthesize(self, text)
    }
}

impl Player for SystemPlayer {
    fn play(&self, clip: &Path) -> Result<(), PlaybackError> {
        Self::play(self, clip)
    }
}

/// Outcome of one turn, used only for control decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// Full cycle ran; playback may still have failed (never fatal)
    Completed,
    /// Recording failed, turn abandoned before any history mutation
    RecordingFailed,
    /// Transcription failed or heard nothing, history untouched
    TranscriptionEmpty,
    /// Chat endpoint failed; the user message stays, no assistant message
    ModelFailed,
    /// Reply recorded but could not be spoken
    SynthesisFailed,
    /// The exit phrase was heard; the session is over
    ExitRequested,
}

/// Settings the orchestrator needs per turn
#[derive(Debug, Clone)]
pub struct TurnSettings {
    /// Scratch path for the recorded clip
    pub recording_path: PathBuf,
    /// How long each recording runs
    pub recording_duration: Duration,
    /// Phrase that ends the session, matched case-insensitively after trimming
    pub exit_phrase: String,
    /// Farewell spoken on exit
    pub farewell: String,
}

/// The conversation-turn orchestrator
///
/// Owns the history exclusively; stages never see it except the chat
/// backend, which gets it by reference.
pub struct Session<R, T, C, S, P> {
    recorder: R,
    transcriber: T,
    chat: C,
    synthesizer: S,
    player: P,
    settings: TurnSettings,
    history: ConversationHistory,
}

impl<R, T, C, S, P> Session<R, T, C, S, P>
where
    R: Recorder,
    T: Transcriber,
    C: ChatBackend,
    S: Synthesizer,
    P: Player,
{
    /// Assemble a session from its stages
    pub fn new(
        recorder: R,
        transcriber: T,
        chat: C,
        synthesizer: S,
        player: P,
        settings: TurnSettings,
        history: ConversationHistory,
    ) -> Self {
        Self {
            recorder,
            transcriber,
            chat,
            synthesizer,
            player,
            settings,
            history,
        }
    }

    /// Run one turn of the conversation
    ///
    /// Each stage blocks until its external process or request completes.
    /// Failures are logged and folded into the returned status; nothing
    /// here terminates the process.
    pub fn run_turn(&mut self) -> TurnStatus {
        let clip = match self
            .recorder
            .record(&self.settings.recording_path, self.settings.recording_duration)
        {
            Ok(clip) => clip,
            Err(e) => {
                tracing::error!(error = %e, "recording failed, skipping turn");
                return TurnStatus::RecordingFailed;
            }
        };

        let text = match self.transcriber.transcribe(&clip) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "transcription failed, skipping turn");
                return TurnStatus::TranscriptionEmpty;
            }
        };

        if text.is_empty() {
            tracing::info!("heard nothing intelligible, skipping turn");
            return TurnStatus::TranscriptionEmpty;
        }

        if is_exit_phrase(&text, &self.settings.exit_phrase) {
            tracing::info!("exit phrase heard, ending session");
            let farewell = self.settings.farewell.clone();
            self.speak(&farewell);
            return TurnStatus::ExitRequested;
        }

        self.history.push_user(&text);

        let reply = match self.chat.complete(&self.history) {
            Ok(reply) => reply,
            Err(e) => {
                // The user message stays; only the reply is missing
                tracing::error!(error = %e, "chat request failed");
                return TurnStatus::ModelFailed;
            }
        };

        self.history.push_assistant(&reply);

        match self.synthesizer.synthesize(&reply) {
            Ok(clip) => {
                if let Err(e) = self.player.play(&clip) {
                    tracing::warn!(error = %e, "playback failed");
                }
                TurnStatus::Completed
            }
            Err(e) => {
                tracing::error!(error = %e, "synthesis failed, skipping playback");
                TurnStatus::SynthesisFailed
            }
        }
    }

    /// Synthesize and play a fixed phrase, best effort
    fn speak(&self, text: &str) {
        match self.synthesizer.synthesize(text) {
            Ok(clip) => {
                if let Err(e) = self.player.play(&clip) {
                    tracing::warn!(error = %e, "playback failed");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "synthesis failed, skipping playback");
            }
        }
    }

    /// The conversation so far
    #[must_use]
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }
}

/// Exit-phrase check: case-insensitive, whitespace-trimmed, exact match
fn is_exit_phrase(text: &str, exit_phrase: &str) -> bool {
    text.trim().to_lowercase() == exit_phrase.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_phrase_case_and_whitespace() {
        assert!(is_exit_phrase("Goodbye", "goodbye"));
        assert!(is_exit_phrase(" goodbye ", "goodbye"));
        assert!(is_exit_phrase("GOODBYE", "goodbye"));
        assert!(!is_exit_phrase("goodbye now", "goodbye"));
        assert!(!is_exit_phrase("good", "goodbye"));
    }
}
