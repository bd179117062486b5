//! Text-to-speech via the piper command-line tool
//!
//! The reply text is handed to piper on its standard input and never
//! interpolated into a shell string, so quotes and shell metacharacters in
//! model output are inert. The argument vector is fixed: model path and
//! output path only.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::SynthesisError;

/// Synthesizes speech with a piper subprocess
pub struct PiperSynthesizer {
    executable: PathBuf,
    model: PathBuf,
    output_path: PathBuf,
}

impl PiperSynthesizer {
    /// Create a synthesizer writing clips to `output_path`
    pub fn new(
        executable: impl Into<PathBuf>,
        model: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            model: model.into(),
            output_path: output_path.into(),
        }
    }

    /// Render `text` to a WAV clip, overwriting the output path
    ///
    /// # Errors
    ///
    /// Returns error if the executable, the `.onnx` model, or its sibling
    /// `.onnx.json` config is missing, or if the subprocess fails
    pub fn synthesize(&self, text: &str) -> Result<PathBuf, SynthesisError> {
        let model_config = model_config_path(&self.model);
        for required in [&self.executable, &self.model, &model_config] {
            if !required.exists() {
                return Err(SynthesisError::MissingAsset {
                    path: required.clone(),
                });
            }
        }

        let text = normalize_for_speech(text);
        tracing::debug!(chars = text.len(), output = %self.output_path.display(), "synthesizing");

        let mut child = Command::new(&self.executable)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_file")
            .arg(&self.output_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Feed stdin from a separate thread while wait_with_output drains
        // stdout and stderr; writing the whole reply first can deadlock
        // once piper's logging fills the pipe buffer. Dropping stdin
        // closes the pipe so piper sees EOF.
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || stdin.write_all(text.as_bytes()))
        });

        let output = child.wait_with_output()?;
        let stdin_result = writer.map_or(Ok(()), |t| t.join().unwrap_or(Ok(())));

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!(status = %output.status, stderr = %stderr, "piper failed");
            return Err(SynthesisError::ProcessFailed {
                status: output.status,
                stderr,
            });
        }

        stdin_result?;

        tracing::debug!(path = %self.output_path.display(), "speech saved");
        Ok(self.output_path.clone())
    }
}

/// Sibling `.onnx.json` config piper requires next to the voice model
fn model_config_path(model: &Path) -> PathBuf {
    let mut s = model.as_os_str().to_os_string();
    s.push(".json");
    PathBuf::from(s)
}

/// Collapse whitespace control characters to spaces, strip the rest
///
/// Piper treats each input line as a separate utterance; model replies
/// often contain paragraph breaks (and tab-aligned lists) that should
/// read as one, with word boundaries preserved.
fn normalize_for_speech(text: &str) -> String {
    text.chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_is_sibling_json() {
        assert_eq!(
            model_config_path(Path::new("/voices/en.onnx")),
            PathBuf::from("/voices/en.onnx.json")
        );
    }

    #[test]
    fn test_normalize_collapses_newlines() {
        assert_eq!(
            normalize_for_speech("one\ntwo\r\nthree"),
            "one two  three"
        );
    }

    #[test]
    fn test_normalize_keeps_word_boundary_at_tabs() {
        assert_eq!(normalize_for_speech("col\tumn"), "col umn");
        assert_eq!(normalize_for_speech("a\u{7}b"), "ab");
    }

    #[test]
    fn test_normalize_keeps_shell_metacharacters_literal() {
        // Quotes and metacharacters are plain text; they only ever reach
        // piper's stdin, never a shell
        let hostile = r#""; rm -rf /; echo ""#;
        assert_eq!(normalize_for_speech(hostile), hostile.trim());
    }

    #[cfg(unix)]
    #[test]
    fn test_large_reply_with_chatty_engine_does_not_deadlock() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("piper");
        // Fills stderr well past the pipe buffer before reading any input,
        // then drains stdin and touches the output file ($4)
        std::fs::write(
            &exe,
            "#!/bin/sh\n\
             dd if=/dev/zero bs=1024 count=128 2>/dev/null | tr '\\0' 'e' >&2\n\
             cat > /dev/null\n\
             : > \"$4\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let model = dir.path().join("voice.onnx");
        std::fs::write(&model, b"").unwrap();
        std::fs::write(dir.path().join("voice.onnx.json"), b"{}").unwrap();

        let out = dir.path().join("out.wav");
        let synthesizer = PiperSynthesizer::new(&exe, &model, &out);

        // Larger than the pipe buffer in both directions
        let text = "a".repeat(256 * 1024);
        let clip = synthesizer.synthesize(&text).unwrap();

        assert_eq!(clip, out);
        assert!(out.exists());
    }

    #[test]
    fn test_missing_model_config_is_missing_asset() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("piper");
        let model = dir.path().join("voice.onnx");
        std::fs::write(&exe, b"").unwrap();
        std::fs::write(&model, b"").unwrap();
        // No voice.onnx.json

        let synthesizer =
            PiperSynthesizer::new(&exe, &model, dir.path().join("out.wav"));

        match synthesizer.synthesize("hello") {
            Err(SynthesisError::MissingAsset { path }) => {
                assert_eq!(path, dir.path().join("voice.onnx.json"));
            }
            other => panic!("expected MissingAsset, got {other:?}"),
        }
    }
}
