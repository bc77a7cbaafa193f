use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Form field a parse failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Url,
    Headers,
    Body,
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputField::Url => write!(f, "url"),
            InputField::Headers => write!(f, "headers"),
            InputField::Body => write!(f, "body"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiTesterError {
    /// User input could not be parsed; nothing was sent.
    #[error("invalid {field}: {message}")]
    Parse { field: InputField, message: String },

    /// The request failed in transit or the response was not JSON.
    #[error("{0}")]
    Transport(String),

    #[error("failed to save {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no completed request to save")]
    MissingResult,

    #[error("unknown header preset: {0}")]
    UnknownPreset(String),
}

impl ApiTesterError {
    pub(crate) fn parse(field: InputField, message: impl fmt::Display) -> Self {
        ApiTesterError::Parse {
            field,
            message: message.to_string(),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ApiTesterError::Persistence {
            path: path.into(),
            source,
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, ApiTesterError::Parse { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiTesterError::Transport(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, ApiTesterError::Persistence { .. })
    }
}

impl From<reqwest::Error> for ApiTesterError {
    fn from(err: reqwest::Error) -> Self {
        ApiTesterError::Transport(err.to_string())
    }
}

pub type ApiTesterResult<T> = Result<T, ApiTesterError>;
