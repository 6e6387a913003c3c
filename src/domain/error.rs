use thiserror::Error;

/// Values that fail to parse into domain types.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("unsupported locale `{0}`")]
    UnknownLocale(String),
    #[error("malformed text list: {0}")]
    MalformedTextList(String),
}
