//! Error types for refactoring runs
//!
//! Every variant is fatal: a run either completes or stops at the first
//! error, leaving the stage directories written so far for inspection.

use crate::parser::ParseError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefactorError {
    /// A configured name (start, rename, seed, exemption) is not in the catalog
    #[error("Symbol {name:?} not found ({context})")]
    UnknownSymbol { name: String, context: &'static str },

    #[error("Cannot rename {from:?} to {to:?}: {to:?} already names a symbol")]
    RenameCollision { from: String, to: String },

    #[error("Struct {name} not found in {}", .header.display())]
    MissingStruct { name: String, header: PathBuf },

    #[error("Source root {} does not exist", .0.display())]
    MissingRoot(PathBuf),

    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Diff failed: {0}")]
    Diff(String),
}

impl RefactorError {
    pub fn unknown(name: &str, context: &'static str) -> Self {
        RefactorError::UnknownSymbol {
            name: name.to_string(),
            context,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        RefactorError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for refactoring operations
pub type Result<T> = std::result::Result<T, RefactorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = RefactorError::unknown("spam", "start symbol");
        assert_eq!(err.to_string(), "Symbol \"spam\" not found (start symbol)");

        let err = RefactorError::io("l.0/asm7.c", io::Error::other("disk full"));
        assert_eq!(err.to_string(), "l.0/asm7.c: disk full");
    }
}
