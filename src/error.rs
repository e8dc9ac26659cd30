use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown quantity '{0}'")]
    UnknownQuantity(String),

    #[error("Quantity '{0}' is not available in the loaded table")]
    DataUnavailable(String),

    #[error("Interpolation error: {0}")]
    Interpolation(String),

    #[error("Not enough valid points for interpolation ({found} found, 2 required)")]
    InsufficientPoints { found: usize },

    #[error("No valid operating points found within device limits")]
    NoValidOperatingPoints,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LookupError {
    /// True for failures that degrade a result to empty/NaN instead of
    /// rejecting the request.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            LookupError::Interpolation(_)
                | LookupError::InsufficientPoints { .. }
                | LookupError::NoValidOperatingPoints
        )
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
