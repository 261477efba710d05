// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for parsing operations.
//!
//! Only conditions that abandon a whole sheet or a whole operation are
//! errors. Problems with individual rows or references are reported as
//! [`crate::diagnostics::Diagnostic`]s and never surface here.

use crate::keys::SheetKind;

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, configuring or exporting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stream backing a sheet could not be read.
    #[error("failed to read sheet {sheet}: {message}")]
    SheetRead { sheet: SheetKind, message: String },

    /// Malformed CSV input.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A regular-expression filter entry failed to compile.
    #[error("invalid filter pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration could not be parsed or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// The input file type is not supported.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A recoverable failure to read one cell.
///
/// Carried inside the row stream so that the loader can log it and treat
/// the row as blank without abandoning the sheet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unreadable cell in column {column}: {message}")]
pub struct CellReadError {
    /// Zero-based index of the failing column.
    pub column: usize,
    pub message: String,
}

impl CellReadError {
    pub fn new(column: usize, message: impl Into<String>) -> Self {
        Self {
            column,
            message: message.into(),
        }
    }
}
