//! Domain error types.

/// A percentage change cannot be taken from a zero first observation.
///
/// Scoped to one instrument: the calculator records it and keeps going with
/// the remaining columns.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("degenerate baseline for {instrument}: first observation is zero")]
pub struct DegenerateBaseline {
    pub instrument: String,
}

/// Top-level error type for pricelens.
#[derive(Debug, thiserror::Error)]
pub enum PricelensError {
    #[error("data unavailable for [{instruments}]: {reason}")]
    DataUnavailable { instruments: String, reason: String },

    #[error("invalid price table: {reason}")]
    InvalidTable { reason: String },

    #[error("instrument catalog error: {reason}")]
    Catalog { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PricelensError> for std::process::ExitCode {
    fn from(err: &PricelensError) -> Self {
        let code: u8 = match err {
            PricelensError::Io(_) => 1,
            PricelensError::ConfigParse { .. }
            | PricelensError::ConfigMissing { .. }
            | PricelensError::ConfigInvalid { .. } => 2,
            PricelensError::Catalog { .. } => 3,
            PricelensError::DataUnavailable { .. } | PricelensError::InvalidTable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
