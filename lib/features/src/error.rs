use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors raised by the feature pipeline
///
/// Missing or odd album fields are never errors; every encoder has a defined
/// zero output for them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// Invalid or unreadable fit-time parameters
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A transform-family call on an extractor that was never fitted
    #[error("Feature extractor must be fitted before transform")]
    NotFitted,
}
