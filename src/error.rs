//! Error types for the assistant

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur anywhere in the assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Microphone capture error
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Speech-to-text error
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    /// Chat endpoint error
    #[error(transparent)]
    Chat(#[from] ChatError),

    /// Text-to-speech error
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// Audio playback error
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from recording microphone input
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No input device is available
    #[error("no input device available")]
    NoInputDevice,

    /// No stream configuration matches the requested format
    #[error("no suitable input config for {sample_rate} Hz mono")]
    NoSuitableConfig {
        /// Requested sample rate
        sample_rate: u32,
    },

    /// The capture stream failed to build or start
    #[error("capture stream error: {0}")]
    Stream(String),

    /// Writing the WAV file failed
    #[error("failed to write clip {path}: {reason}")]
    Encode {
        /// Destination path
        path: PathBuf,
        /// Encoder diagnostic
        reason: String,
    },
}

/// Errors from the speech-to-text subprocess
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The recognition executable, model, or input clip is missing
    #[error("missing asset: {path}")]
    MissingAsset {
        /// Path that was not found
        path: PathBuf,
    },

    /// The subprocess exited with a failure status
    #[error("recognition process failed ({status}): {stderr}")]
    ProcessFailed {
        /// Exit status of the subprocess
        status: ExitStatus,
        /// Captured stderr
        stderr: String,
    },

    /// The subprocess succeeded but produced no transcript artifact
    #[error("no transcript artifact at {path}")]
    MissingOutput {
        /// Expected artifact path
        path: PathBuf,
    },

    /// Spawning or reading the subprocess failed
    #[error("recognition io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the chat-completion endpoint
#[derive(Debug, Error)]
pub enum ChatError {
    /// Transport failure (connection refused, timeout)
    #[error("chat endpoint unreachable: {0}")]
    Network(#[from] reqwest::Error),

    /// Endpoint returned a non-success status
    #[error("chat endpoint returned {status}: {body}")]
    BadStatus {
        /// HTTP status code
        status: reqwest::StatusCode,
        /// Response body, for diagnostics
        body: String,
    },

    /// Response did not contain the expected reply field
    #[error("malformed chat response: {0}")]
    MalformedResponse(String),
}

/// Errors from the text-to-speech subprocess
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The synthesis executable, voice model, or model config is missing
    #[error("missing asset: {path}")]
    MissingAsset {
        /// Path that was not found
        path: PathBuf,
    },

    /// The subprocess exited with a failure status
    #[error("synthesis process failed ({status}): {stderr}")]
    ProcessFailed {
        /// Exit status of the subprocess
        status: ExitStatus,
        /// Captured stderr
        stderr: String,
    },

    /// Spawning or feeding the subprocess failed
    #[error("synthesis io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from playing a clip through the platform player
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No playback command is known for this platform
    #[error("no playback command known for platform {0}")]
    UnsupportedPlatform(&'static str),

    /// None of the candidate players is installed
    #[error("no playback command available (tried: {tried})")]
    NoPlayerAvailable {
        /// Comma-separated candidate program names
        tried: String,
    },

    /// The clip to play does not exist
    #[error("clip not found: {path}")]
    MissingClip {
        /// Path that was not found
        path: PathBuf,
    },

    /// The player exited with a failure status
    #[error("player {program} failed ({status}): {stderr}")]
    CommandFailed {
        /// Player program name
        program: String,
        /// Exit status
        status: ExitStatus,
        /// Captured stderr
        stderr: String,
    },

    /// Spawning the player failed
    #[error("playback io error: {0}")]
    Io(#[from] std::io::Error),
}
