//! Speech-to-text via the whisper.cpp command-line tool
//!
//! Runs the recognition binary as a blocking subprocess against a recorded
//! clip and reads back the `<clip>.txt` artifact it writes, deleting the
//! artifact afterwards.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::TranscriptionError;

/// Annotation markers whisper emits for non-speech audio
const NON_SPEECH_MARKERS: &[&str] = &["[SOUND]", "[MUSIC]", "[BLANK_AUDIO]", "(music)"];

/// Transcribes clips with a whisper.cpp subprocess
pub struct WhisperTranscriber {
    executable: PathBuf,
    model: PathBuf,
    working_dir: PathBuf,
}

impl WhisperTranscriber {
    /// Create a transcriber for the given executable and model
    ///
    /// `working_dir` is the directory the subprocess runs in (whisper
    /// resolves some of its auxiliary files relative to it).
    pub fn new(
        executable: impl Into<PathBuf>,
        model: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            model: model.into(),
            working_dir: working_dir.into(),
        }
    }

    /// Transcribe a clip to cleaned text
    ///
    /// Requests plain-text output with no timestamps, English only. The
    /// result is stripped of non-speech markers and trimmed; it may be
    /// empty if nothing intelligible was said.
    ///
    /// # Errors
    ///
    /// Returns error if the executable, model, or clip is missing, the
    /// subprocess fails, or no transcript artifact appears
    pub fn transcribe(&self, clip: &Path) -> Result<String, TranscriptionError> {
        // The subprocess runs in its own working directory, so a relative
        // clip path would make whisper resolve -f (and write its artifact)
        // somewhere other than where the clip lives
        let clip = std::path::absolute(clip)?;

        for required in [&self.executable, &self.model, &clip] {
            if !required.exists() {
                return Err(TranscriptionError::MissingAsset {
                    path: required.clone(),
                });
            }
        }

        tracing::debug!(clip = %clip.display(), "transcribing");

        let output = Command::new(&self.executable)
            .current_dir(&self.working_dir)
            .arg("-m")
            .arg(&self.model)
            .arg("-f")
            .arg(&clip)
            .arg("-otxt")
            .arg("-nt")
            .arg("--language")
            .arg("en")
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!(status = %output.status, stderr = %stderr, "whisper failed");
            return Err(TranscriptionError::ProcessFailed {
                status: output.status,
                stderr,
            });
        }

        // Whisper writes the transcript next to the input as <clip>.txt
        let artifact = transcript_artifact(&clip);
        if !artifact.exists() {
            tracing::error!(
                artifact = %artifact.display(),
                stdout = %String::from_utf8_lossy(&output.stdout),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "whisper produced no transcript"
            );
            return Err(TranscriptionError::MissingOutput { path: artifact });
        }

        let raw = std::fs::read_to_string(&artifact)?;
        std::fs::remove_file(&artifact)?;

        let text = clean_transcript(&raw);
        tracing::info!(transcript = %text, "transcription complete");
        Ok(text)
    }
}

/// Path of the transcript artifact whisper writes for `clip`
fn transcript_artifact(clip: &Path) -> PathBuf {
    let mut s = OsString::from(clip);
    s.push(".txt");
    PathBuf::from(s)
}

/// Strip non-speech annotation markers and surrounding whitespace
fn clean_transcript(raw: &str) -> String {
    let mut text = raw.to_string();
    for marker in NON_SPEECH_MARKERS {
        text = text.replace(marker, "");
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_artifact_appends_txt() {
        assert_eq!(
            transcript_artifact(Path::new("/tmp/temp_input.wav")),
            PathBuf::from("/tmp/temp_input.wav.txt")
        );
    }

    #[test]
    fn test_clean_transcript_strips_markers() {
        assert_eq!(
            clean_transcript(" [SOUND] what time is it [MUSIC]\n"),
            "what time is it"
        );
        assert_eq!(clean_transcript("[BLANK_AUDIO]"), "");
        assert_eq!(clean_transcript("  hello  "), "hello");
    }

    /// Write a fake recognition binary that emits `<clip>.txt` next to the
    /// clip path it was handed, resolved from its own working directory
    #[cfg(unix)]
    fn write_fake_engine(path: &Path, transcript: &str) {
        use std::os::unix::fs::PermissionsExt;

        let script = format!(
            "#!/bin/sh\n\
             while [ $# -gt 0 ]; do\n\
               if [ \"$1\" = \"-f\" ]; then clip=\"$2\"; fi\n\
               shift\n\
             done\n\
             printf '{transcript}\\n' > \"$clip.txt\"\n"
        );
        std::fs::write(path, script).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_clip_resolves_against_caller_directory() {
        let root = tempfile::tempdir().unwrap();
        let engine_dir = root.path().join("engine");
        std::fs::create_dir(&engine_dir).unwrap();

        let exe = engine_dir.join("main");
        write_fake_engine(&exe, "hello there");
        let model = engine_dir.join("model.bin");
        std::fs::write(&model, b"").unwrap();
        std::fs::write(root.path().join("temp_input.wav"), b"RIFF").unwrap();

        // The subprocess runs inside engine/; a relative clip must still
        // resolve against our directory, not the engine's
        let transcriber = WhisperTranscriber::new(&exe, &model, &engine_dir);

        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(root.path()).unwrap();
        let result = transcriber.transcribe(Path::new("temp_input.wav"));
        std::env::set_current_dir(prev).unwrap();

        assert_eq!(result.unwrap(), "hello there");
        assert!(!engine_dir.join("temp_input.wav.txt").exists());
    }

    #[test]
    fn test_missing_executable_is_missing_asset() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.wav");
        std::fs::write(&clip, b"RIFF").unwrap();

        let transcriber = WhisperTranscriber::new(
            dir.path().join("no-such-binary"),
            dir.path().join("no-such-model.bin"),
            dir.path(),
        );

        match transcriber.transcribe(&clip) {
            Err(TranscriptionError::MissingAsset { path }) => {
                assert_eq!(path, dir.path().join("no-such-binary"));
            }
            other => panic!("expected MissingAsset, got {other:?}"),
        }
    }
}
