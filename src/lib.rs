//! Multilingual agricultural question answering and document summarization.
//!
//! Two entry points sit behind [`AgroBot`]: [`AgroBot::answer`] resolves a
//! free-text question against a curated knowledge base and falls back to chat
//! completion models, and [`AgroBot::summarize_file`] extracts text from an
//! uploaded file and summarizes it.

pub mod answer;
mod app;
pub mod completion;
pub mod config;
pub mod document;
pub mod kb;
pub mod lang;
mod profile;
mod text;

pub const USER_AGENT: &str = concat!("agrobot/", env!("CARGO_PKG_VERSION"));

pub use app::{AgroBot, StartupError};
pub use profile::UserProfile;
