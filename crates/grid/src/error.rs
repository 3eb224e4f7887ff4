use browsecloud_formats::{Artifact, FormatError, LookupError};
use thiserror::Error;

/// Result type for model construction and queries
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors raised while loading or querying a counting grid
#[derive(Error, Debug)]
pub enum GridError {
    /// An artifact failed to decode
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A cell or word lookup missed
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// A required artifact file is absent from the bundle
    #[error("Missing required artifact: {0}")]
    MissingArtifact(Artifact),

    /// Reading artifacts or writing output failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Viewport dimensions, translation or zoom are unusable
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file is not valid TOML for `GridConfig`
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Writing CSV output failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
