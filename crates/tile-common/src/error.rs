//! Error types for tile address resolution.

use thiserror::Error;

/// Result type alias using TileError.
pub type TileResult<T> = Result<T, TileError>;

/// Primary error type for catalog and request handling.
///
/// A tile that cannot be served at a given level is not an error; the
/// resolver reports that as an absent address.
#[derive(Debug, Error)]
pub enum TileError {
    // === Catalog Errors ===
    #[error("Unrecognized layer type code: {0}")]
    UnrecognizedLayerType(i32),

    #[error("Unknown layer name: {0}")]
    UnknownLayerName(String),

    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    // === Host Errors ===
    #[error("Invalid host URL: {0}")]
    InvalidHostUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TileError {
    /// Short machine-readable code for this error, used in CLI JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            TileError::UnrecognizedLayerType(_) | TileError::UnknownLayerName(_) => {
                "LayerNotDefined"
            }
            TileError::MissingParameter(_) => "MissingParameterValue",
            TileError::InvalidParameter { .. } => "InvalidParameterValue",
            TileError::InvalidBbox(_) => "InvalidBBox",
            TileError::InvalidHostUrl(_) | TileError::Config(_) => "NoApplicableCode",
        }
    }
}

impl From<crate::bbox::BboxParseError> for TileError {
    fn from(err: crate::bbox::BboxParseError) -> Self {
        TileError::InvalidBbox(err.to_string())
    }
}
