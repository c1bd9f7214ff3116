//! # Error Handling
//!
//! This module defines the centralized error type for `creaper-offline`. It
//! uses the `thiserror` library to build a single `Error` enum covering every
//! failure mode of the offline mutation pipeline, from reading the
//! configuration file to writing it back.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all failures. Variants carry enough context
//!   (the rendered path, the missing segment, the parser message) to explain
//!   the failure without a debugger.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Callers that only want to distinguish "the element already exists" from
//! everything else can use [`Error::is_command_failed`]. Every error is
//! raised before the configuration file is written, so a failed operation
//! always leaves the file untouched.

use thiserror::Error;

/// Main error type for offline configuration operations
#[derive(Error, Debug)]
pub enum Error {
    /// A path was empty or could not be parsed from its textual form.
    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    /// A non-terminal segment of the target path does not exist in the
    /// document. Missing structure is never created implicitly.
    #[error("Required structure missing for {path}: no element matches '{segment}'")]
    StructureMissing { path: String, segment: String },

    /// The operation cannot be applied, typically because the target element
    /// already exists and the conflict policy is `Fail`.
    #[error("Command failed for {path}: {message}")]
    CommandFailed { path: String, message: String },

    /// More than one sibling matched a segment that must be unique.
    #[error("Ambiguous match for '{segment}' in {path}: {count} elements match")]
    AmbiguousMatch {
        path: String,
        segment: String,
        count: usize,
    },

    /// The configuration document is not well-formed XML.
    #[error("XML parsing error: {message}")]
    XmlParse { message: String },

    /// The document tree could not be rendered back to text.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A command builder was given inconsistent or missing options.
    #[error("Invalid command: {message}")]
    InvalidCommand { message: String },

    /// The document element does not match the configured server mode.
    #[error("Unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot { expected: String, found: String },

    /// An error occurred while parsing an operations file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the operations file
        hint: Option<String>,
    },

    /// Reading or writing the configuration file failed.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether this is the "already exists" failure raised under the `Fail`
    /// conflict policy.
    pub fn is_command_failed(&self) -> bool {
        matches!(self, Error::CommandFailed { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
