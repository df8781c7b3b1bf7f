use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Unrecognized orientation strategy: {0}")]
    UnknownStrategy(String),
    #[error("Missing required parameter {section}/{key}")]
    MissingParameter { section: String, key: String },
    #[error("Parameter {section}/{key} has the wrong type, expected {expected}")]
    InvalidParameter {
        section: String,
        key: String,
        expected: &'static str,
    },
    #[error("Invalid calendar field {section}/{key}: {value}")]
    InvalidDate {
        section: String,
        key: String,
        value: String,
    },
    #[error("Unparseable input format version: {0}")]
    InvalidVersion(String),
    #[error("Cannot read parameter file: {0}")]
    Source(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Negative ground clearance {clearance:.3} m at surface slope {slope:.4} rad")]
    NegativeGroundClearance { clearance: f64, slope: f64 },
    #[error("Orientation engine has no tracking mode configured")]
    ModeUnset,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
