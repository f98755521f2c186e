//! Error types for the WMS video source.

use thiserror::Error;

use crate::version::VersionParseError;

/// Result type alias using WmsError.
pub type WmsResult<T> = Result<T, WmsError>;

/// Primary error type for map source operations.
#[derive(Debug, Error)]
pub enum WmsError {
    // === Configuration Errors (fatal at initialization) ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid value for option '{option}': {message}")]
    InvalidOption { option: String, message: String },

    #[error("Missing capability field at '{path}': {message}")]
    MissingCapability { path: String, message: String },

    #[error("Unsupported WMS version: {0}")]
    UnsupportedVersion(String),

    // === Per-frame Errors ===
    #[error("Request to '{url}' failed: {message}")]
    Transport { url: String, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Failed to decode image from '{url}': {message}")]
    Decode { url: String, message: String },

    #[error("Error when evaluating the expression '{expr}': {message}")]
    Expression { expr: String, message: String },

    // === Resource Errors ===
    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Source is not producing: {0}")]
    InvalidState(String),
}

impl WmsError {
    /// Category name of this error in the source's error taxonomy.
    pub fn category(&self) -> &'static str {
        match self {
            WmsError::Configuration(_)
            | WmsError::InvalidOption { .. }
            | WmsError::MissingCapability { .. }
            | WmsError::UnsupportedVersion(_)
            | WmsError::InvalidState(_) => "ConfigurationError",
            WmsError::Transport { .. } => "TransportError",
            WmsError::Parse(_) | WmsError::Decode { .. } => "ParseError",
            WmsError::Expression { .. } => "ExpressionError",
            WmsError::Resource(_) => "ResourceError",
        }
    }

    /// Whether this error, raised during initialization, prevents the source
    /// from ever producing frames.
    ///
    /// Every error raised while resolving capabilities is fatal, but only
    /// configuration errors are fatal by nature; transport and parse errors
    /// abort a single frame when they happen later.
    pub fn is_fatal_at_init(&self) -> bool {
        matches!(self.category(), "ConfigurationError")
    }
}

impl From<VersionParseError> for WmsError {
    fn from(err: VersionParseError) -> Self {
        WmsError::Configuration(err.to_string())
    }
}
