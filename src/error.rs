use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ArchiverError {
    #[error("missing required setting: {0}")]
    MissingSetting(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid count limit: {0}")]
    InvalidCountLimit(String),

    #[error("invalid reporting period: {0}")]
    InvalidPeriod(String),

    #[error("NodePing request failed: {0}")]
    NodepingHttp(String),

    #[error("NodePing returned status {status}: {message}")]
    NodepingStatus { status: u16, message: String },

    #[error("Google Sheets request failed: {0}")]
    SheetsHttp(String),

    #[error("Google Sheets returned status {status}: {message}")]
    SheetsStatus { status: u16, message: String },

    #[error("contact group not found with name: \"{0}\"")]
    ContactGroupNotFound(String),

    #[error("unable to create sheet tab {title}: {message}")]
    TabCreationFailed { title: String, message: String },

    #[error("unable to find newly created sheet tab {0}")]
    TabNotFoundAfterCreation(String),

    #[error("month label not valid: {0}")]
    InvalidMonthLabel(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    NotFound,
    RemoteConsistency,
    MalformedData,
}

impl ArchiverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArchiverError::MissingSetting(_)
            | ArchiverError::ConfigRead(_)
            | ArchiverError::ConfigParse(_)
            | ArchiverError::InvalidCountLimit(_)
            | ArchiverError::InvalidPeriod(_) => ErrorKind::Configuration,
            ArchiverError::NodepingHttp(_)
            | ArchiverError::NodepingStatus { .. }
            | ArchiverError::SheetsHttp(_)
            | ArchiverError::SheetsStatus { .. }
            | ArchiverError::TabCreationFailed { .. } => ErrorKind::Transport,
            ArchiverError::ContactGroupNotFound(_) => ErrorKind::NotFound,
            ArchiverError::TabNotFoundAfterCreation(_) => ErrorKind::RemoteConsistency,
            ArchiverError::InvalidMonthLabel(_) | ArchiverError::MalformedResponse(_) => {
                ErrorKind::MalformedData
            }
        }
    }
}
