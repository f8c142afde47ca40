use thiserror::Error;

use crate::fetch::FetchError;

/// Failure recorded in a widget's error slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// Network or transport failure while retrieving content.
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// Content arrived but could not be understood.
    #[error("parse failed: {0}")]
    Parse(String),
    /// Rendering the content failed.
    #[error("draw failed: {0}")]
    Draw(String),
}

/// Error category without the message, used to pick the placeholder label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Fetch,
    Parse,
    Draw,
}

impl ErrorKind {
    /// Short label shown inside the error placeholder.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fetch => "fetch error",
            Self::Parse => "bad data",
            Self::Draw => "draw error",
        }
    }
}

impl WidgetError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Draw(_) => ErrorKind::Draw,
        }
    }
}

impl From<FetchError> for WidgetError {
    fn from(error: FetchError) -> Self { Self::Fetch(error.to_string()) }
}
