// ---------------------------------------------------------------------------
// ParamsError: errors raised while loading resolver parameters
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur when building a [`crate::params::ParcelRoadParams`]
/// from external input.
#[derive(Debug)]
pub enum ParamsError {
    /// The JSON document could not be parsed.
    Parse(serde_json::Error),
    /// A search radius was zero, negative or not finite.
    InvalidRadius { name: &'static str, value: f32 },
    /// The search batch size must be at least 1.
    InvalidBatchSize,
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsError::Parse(e) => write!(f, "Parse error: {e}"),
            ParamsError::InvalidRadius { name, value } => {
                write!(f, "Invalid radius: {name} = {value}, expected a positive finite value")
            }
            ParamsError::InvalidBatchSize => write!(f, "Invalid batch size: must be at least 1"),
        }
    }
}

impl std::error::Error for ParamsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParamsError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ParamsError {
    fn from(e: serde_json::Error) -> Self {
        ParamsError::Parse(e)
    }
}
