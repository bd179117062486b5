//! Parley - a local turn-based voice assistant loop
//!
//! Orchestrates four external tools into a conversational session:
//! - Microphone capture (cpal)
//! - Speech-to-text (whisper.cpp subprocess)
//! - Chat completion (Ollama-style local HTTP endpoint)
//! - Text-to-speech (piper subprocess) and platform playback
//!
//! # Architecture
//!
//! ```text
//! trigger ─▶ Recording ─▶ Transcribing ─▶ Querying ─▶ Synthesizing ─▶ Playing
//!    ▲           │             │              │             │            │
//!    └───────────┴─────────────┴──────────────┴─────────────┴────────────┘
//!                       (any failure abandons the turn)
//!
//! "goodbye" ─▶ farewell ─▶ Ended
//! ```
//!
//! The turn loop is strictly sequential: each stage blocks until its
//! subprocess or request completes. The only state carried across turns is
//! the capped [`history::ConversationHistory`].

pub mod chat;
pub mod config;
pub mod error;
pub mod history;
pub mod session;
pub mod voice;

pub use chat::ChatClient;
pub use config::Config;
pub use error::{Error, Result};
pub use history::{ConversationHistory, ConversationMessage, Role};
pub use session::{Session, TurnSettings, TurnStatus};
