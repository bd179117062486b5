//! Voice processing: capture, speech-to-text, text-to-speech, playback

pub mod capture;
pub mod playback;
pub mod stt;
pub mod tts;

pub use capture::AudioCapture;
pub use playback::SystemPlayer;
pub use stt::WhisperTranscriber;
pub use tts::PiperSynthesizer;
