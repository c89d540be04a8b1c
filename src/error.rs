//! Error types for datefmt.

use thiserror::Error;

/// The main error type for datefmt operations.
#[derive(Debug, Error)]
pub enum DateFmtError {
    /// The token stream did not match the expected invocation syntax.
    #[error("Syntax error at position {position}: expected {expected}, found {found}")]
    Syntax {
        position: usize,
        expected: String,
        found: String,
    },

    /// The input could not be split into tokens.
    #[error("Lex error at position {position}: {message}")]
    Lex { position: usize, message: String },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DateFmtError {
    /// Create a syntax error at the given position.
    pub fn syntax(position: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a lex error at the given position.
    pub fn lex(position: usize, message: impl Into<String>) -> Self {
        Self::Lex {
            position,
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for DateFmtError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for datefmt operations.
pub type DateFmtResult<T> = Result<T, DateFmtError>;
