//! Configuration for the assistant
//!
//! All tunables are startup constants bundled into a [`Config`]; there is
//! no config file. Paths default to well-known locations under a root
//! directory (the working directory unless overridden).

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

/// Sample rate for capture (16kHz, what whisper expects)
pub const SAMPLE_RATE: u32 = 16_000;

/// Default recording duration per turn
pub const RECORDING_DURATION: Duration = Duration::from_secs(5);

/// Default cap on retained user/assistant messages
pub const MAX_HISTORY_MESSAGES: usize = 10;

/// Timeout for the chat endpoint (local models can be slow)
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(90);

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for models, executables, and scratch files
    pub root: PathBuf,

    /// Path to the whisper.cpp executable
    pub whisper_executable: PathBuf,

    /// Path to the whisper ggml model file
    pub whisper_model: PathBuf,

    /// Path to the piper executable
    pub piper_executable: PathBuf,

    /// Path to the piper .onnx voice model (a sibling .onnx.json is required)
    pub piper_model: PathBuf,

    /// Chat-completion endpoint URL
    pub chat_url: String,

    /// Model identifier sent to the chat endpoint
    pub chat_model: String,

    /// Timeout applied to each chat request
    pub chat_timeout: Duration,

    /// Scratch path for the recorded clip, overwritten each turn
    pub recording_path: PathBuf,

    /// Scratch path for the synthesized clip, overwritten each turn
    pub synthesis_path: PathBuf,

    /// How long each recording runs
    pub recording_duration: Duration,

    /// Capture sample rate in Hz
    pub sample_rate: u32,

    /// Maximum retained user/assistant messages (excludes a leading system message)
    pub max_history: usize,

    /// Spoken phrase that ends the session (matched case-insensitively, trimmed)
    pub exit_phrase: String,

    /// Farewell spoken when the exit phrase is heard
    pub farewell: String,

    /// Optional system prompt seeded into the history at session start
    pub system_prompt: Option<String>,
}

impl Config {
    /// Build a configuration rooted at `root` with default tunables
    ///
    /// A relative `root` is resolved against the working directory up
    /// front: subprocesses run with their own working directories, so
    /// every derived path must be absolute.
    ///
    /// # Errors
    ///
    /// Returns error if `root` cannot be resolved or the tunables are
    /// inconsistent (zero history cap)
    pub fn from_root(root: impl Into<PathBuf>) -> Result<Self> {
        let root = std::path::absolute(root.into())?;
        let whisper_dir = root.join("whisper.cpp");
        let piper_dir = root.join("piper-tts");

        let config = Self {
            whisper_executable: whisper_dir.join("main"),
            whisper_model: whisper_dir.join("models/ggml-base.en.bin"),
            piper_executable: piper_dir.join("piper"),
            piper_model: piper_dir.join("en_US-lessac-medium.onnx"),
            chat_url: "http://localhost:11434/api/chat".to_string(),
            chat_model: "llama3:8b".to_string(),
            chat_timeout: CHAT_TIMEOUT,
            recording_path: root.join("temp_input.wav"),
            synthesis_path: root.join("temp_output.wav"),
            recording_duration: RECORDING_DURATION,
            sample_rate: SAMPLE_RATE,
            max_history: MAX_HISTORY_MESSAGES,
            exit_phrase: "goodbye".to_string(),
            farewell: "Goodbye!".to_string(),
            system_prompt: None,
            root,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check tunables for consistency
    ///
    /// # Errors
    ///
    /// Returns error if `max_history` is zero; a cap that cannot hold a
    /// single exchange is a configuration mistake, not a trim policy.
    pub fn validate(&self) -> Result<()> {
        if self.max_history == 0 {
            return Err(Error::Config(
                "max_history must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Verify external executables and model assets exist
    ///
    /// Called once at startup so a misconfigured install fails fast instead
    /// of failing every turn.
    ///
    /// # Errors
    ///
    /// Returns error naming the first missing asset
    pub fn verify_assets(&self) -> Result<()> {
        let piper_model_config = self.piper_model_config();
        let required: [(&str, &Path); 5] = [
            ("whisper executable", &self.whisper_executable),
            ("whisper model", &self.whisper_model),
            ("piper executable", &self.piper_executable),
            ("piper model", &self.piper_model),
            ("piper model config", &piper_model_config),
        ];

        for (what, path) in required {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "{what} not found at {}",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "{what} found");
        }

        Ok(())
    }

    /// Path to the piper voice config (`.onnx.json` sibling of the model)
    #[must_use]
    pub fn piper_model_config(&self) -> PathBuf {
        let mut s = self.piper_model.clone().into_os_string();
        s.push(".json");
        PathBuf::from(s)
    }

    /// Directory containing the whisper executable, used as its working dir
    #[must_use]
    pub fn whisper_dir(&self) -> &Path {
        self.whisper_executable
            .parent()
            .unwrap_or_else(|| Path::new("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = Config::from_root("/opt/assistant").unwrap();

        assert_eq!(
            config.whisper_executable,
            PathBuf::from("/opt/assistant/whisper.cpp/main")
        );
        assert_eq!(
            config.recording_path,
            PathBuf::from("/opt/assistant/temp_input.wav")
        );
        assert_eq!(config.max_history, 10);
        assert_eq!(config.exit_phrase, "goodbye");
    }

    #[test]
    fn test_piper_model_config_is_sibling_json() {
        let config = Config::from_root("/opt/assistant").unwrap();

        assert_eq!(
            config.piper_model_config(),
            PathBuf::from("/opt/assistant/piper-tts/en_US-lessac-medium.onnx.json")
        );
    }

    #[test]
    fn test_relative_root_resolves_to_absolute_paths() {
        let config = Config::from_root("assistant-root").unwrap();

        assert!(config.root.is_absolute());
        assert!(config.root.ends_with("assistant-root"));
        assert!(config.recording_path.is_absolute());
        assert!(config.whisper_executable.is_absolute());
    }

    #[test]
    fn test_zero_history_cap_rejected() {
        let mut config = Config::from_root("/opt/assistant").unwrap();
        config.max_history = 0;

        assert!(config.validate().is_err());
    }
}
