use crate::language::{Language, LocalizedMessage, MessageKey};
use crate::models::ItemId;
use crate::validation::ValidationErrors;
use strum_macros::Display;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad class of an [`Error`], deciding how the dashboard reacts to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    /// Caught before submission, shown next to the form fields.
    Validation,
    /// Non-2xx answer or transport failure, shown as a notification.
    Request,
    /// The caller asked for something the current state cannot do.
    Usage,
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {status}")]
    Api {
        status: u16,
        message: Option<LocalizedMessage>,
    },
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(#[from] utils::endpoint::ParseError),
    #[error("no item with id {0} is loaded")]
    UnknownItem(ItemId),
    #[error("index {index} is out of bounds for {len} items")]
    OutOfBounds { index: usize, len: usize },
    #[error("positions are not a permutation of {len} items")]
    InvalidPermutation { len: usize },
    #[error("reordering is unavailable while a search query is active")]
    ReorderWhileFiltered,
    #[error("a previous reorder is still being saved")]
    ReorderPending,
    #[error("no filter set has been selected")]
    NoFilters,
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<surf::Error> for Error {
    fn from(err: surf::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Transport(_) | Error::Api { .. } | Error::Decode(_) | Error::Url(_) => {
                ErrorKind::Request
            }
            Error::UnknownItem(_)
            | Error::OutOfBounds { .. }
            | Error::InvalidPermutation { .. }
            | Error::ReorderWhileFiltered
            | Error::ReorderPending
            | Error::NoFilters => ErrorKind::Usage,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Text for the transient notification: the server's own message in
    /// the active language when it sent one, a generic one otherwise.
    pub fn localized(&self, language: Language) -> String {
        match self {
            Error::Api {
                message: Some(message),
                ..
            } => message
                .get(language)
                .map(str::to_string)
                .unwrap_or_else(|| MessageKey::RequestFailed.text(language).to_string()),
            Error::Validation(_) => MessageKey::ValidationFailed.text(language).to_string(),
            _ => MessageKey::RequestFailed.text(language).to_string(),
        }
    }
}
