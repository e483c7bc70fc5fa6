//! Command-line front end for `ragbot-rag`.
//!
//! The `ragbot` binary indexes a corpus directory, searches it, and answers
//! questions with a local Ollama model grounded on the retrieved chunks.

pub mod cli;
pub mod commands;
pub mod generation;
pub mod telemetry;

pub use cli::{Cli, Command};
pub use generation::{GenerationError, OllamaGenerator};
