//! Core domain + application logic for the manager analyst bot.
//!
//! This crate is framework-agnostic. Telegram and the completion service live
//! behind ports (traits) implemented in adapter crates.

pub mod chunking;
pub mod completion;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod prompt;
pub mod relay;
pub mod security;

pub use errors::{Error, Result};
