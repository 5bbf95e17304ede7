//! Structured error types for the consent document engine.
//!
//! Layout and composition never fail: missing images, unusable fonts and
//! malformed style declarations are recovered where they happen. What remains
//! here are the failures at the edges: parsing the input and reading or
//! writing files.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum Error {
    /// JSON input failed to parse as a valid consent document.
    #[error("Failed to parse document: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// An image could not be fetched or decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// A font could not be loaded or parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// A layout configuration file could not be used.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error when reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the consent document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        Error::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_carries_hint() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{,}").unwrap_err().into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse document"));
        assert!(msg.contains("Hint: Check for trailing commas"));
    }

    #[test]
    fn eof_error_hint() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{\"a\": ").unwrap_err().into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn source_is_exposed() {
        use std::error::Error as _;
        let err: Error = serde_json::from_str::<serde_json::Value>("[").unwrap_err().into();
        assert!(err.source().is_some());
    }
}
