//! Errors for the surfaces around the metadata model: reading inputs and config,
//! and background digest tasks. Parsing itself never errors.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SriError {
    /// I/O related errors
    Io {
        operation: String,
        path: Option<String>,
        source: String,
    },
    /// Configuration errors
    Config {
        operation: String,
        field: Option<String>,
        source: String,
    },
    /// A digest task failed to complete
    Digest {
        operation: String,
        algorithm: Option<String>,
        source: String,
    },
}

impl fmt::Display for SriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SriError::Io { operation, path, source } => {
                write!(f, "I/O error in {}: {}", operation, source)?;
                if let Some(path) = path {
                    write!(f, " (path: {})", path)?;
                }
                Ok(())
            }
            SriError::Config { operation, field, source } => {
                write!(f, "Configuration error in {}: {}", operation, source)?;
                if let Some(field) = field {
                    write!(f, " (field: {})", field)?;
                }
                Ok(())
            }
            SriError::Digest { operation, algorithm, source } => {
                write!(f, "Digest error in {}: {}", operation, source)?;
                if let Some(algorithm) = algorithm {
                    write!(f, " (algorithm: {})", algorithm)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SriError {}

impl SriError {
    pub fn io_error(operation: &str, path: Option<&str>, source: std::io::Error) -> SriError {
        SriError::Io {
            operation: operation.to_string(),
            path: path.map(String::from),
            source: source.to_string(),
        }
    }

    pub fn config_error(operation: &str, field: Option<&str>, source: &str) -> SriError {
        SriError::Config {
            operation: operation.to_string(),
            field: field.map(String::from),
            source: source.to_string(),
        }
    }

    pub fn digest_error(operation: &str, algorithm: Option<&str>, source: &str) -> SriError {
        SriError::Digest {
            operation: operation.to_string(),
            algorithm: algorithm.map(String::from),
            source: source.to_string(),
        }
    }
}
