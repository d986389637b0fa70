//! CLI support for formgen
//!
//! Provides programmatic access to the formgen commands so they can be
//! embedded in other tools and tested without spawning the binary.

mod check;
mod generate;

pub use check::{CheckOptions, CheckReport, execute_check};
pub use generate::{GenerateCommand, execute_generate};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// The input is not a valid persisted document
    #[error("Invalid document: {0}")]
    Deserialize(#[from] crate::DeserializeError),

    /// Generation produced diagnostics under the deny policy
    #[error("Generation failed: {0}")]
    Generation(#[from] crate::GenerationError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No input provided
    #[error("No input provided. Use --input or pipe a document to stdin.")]
    NoInput,
}
