use std::num::ParseIntError;

use thiserror::Error;

pub type LogViewResult<T> = Result<T, LogViewError>;

#[derive(Debug, Error)]
pub enum LogViewError {
    #[error("invalid value {value:?} for parameter `{name}`: {source}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("malformed query string: {0}")]
    MalformedQuery(String),

    #[error("missing parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("store unavailable during {operation}: {message}")]
    StoreUnavailable {
        operation: &'static str,
        message: String,
    },

    #[error("failed to decode stored document: {0}")]
    DecodeFailure(String),

    #[error("failed to parse timestamp {value:?}: {source}")]
    TimestampParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl LogViewError {
    pub fn store(operation: &'static str, err: impl std::fmt::Display) -> Self {
        LogViewError::StoreUnavailable {
            operation,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT {value:?}: {reason}")]
    Port { value: String, reason: String },

    #[error("unknown timezone {name:?}: {reason}")]
    Timezone { name: String, reason: String },
}
