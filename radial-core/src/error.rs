//! Errors raised by the hierarchy builder and the layout engine.

use thiserror::Error;

/// Everything that can stop a layout pass.
///
/// Running out of fit iterations is not in here: the solver reports that
/// through `FitStatus::Exhausted` and still returns a usable layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("node '{id}' has invalid weight {weight}")]
    InvalidWeight { id: String, weight: f64 },

    #[error("leaf node '{id}' has no weight")]
    MissingWeight { id: String },

    #[error(
        "degenerate sector: angles [{start_angle}, {end_angle}], radii [{inner_radius}, {outer_radius}]"
    )]
    DegenerateSector {
        start_angle: f64,
        end_angle: f64,
        inner_radius: f64,
        outer_radius: f64,
    },

    #[error("node '{id}' not found in data")]
    UnknownNode { id: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl LayoutError {
    /// Short machine-readable name, used by the host to pick a message.
    pub fn kind(&self) -> &'static str {
        match self {
            LayoutError::InvalidWeight { .. } => "invalid_weight",
            LayoutError::MissingWeight { .. } => "missing_weight",
            LayoutError::DegenerateSector { .. } => "degenerate_sector",
            LayoutError::UnknownNode { .. } => "unknown_node",
            LayoutError::InvalidInput { .. } => "invalid_input",
        }
    }

    /// The offending node, when the error is about one.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            LayoutError::InvalidWeight { id, .. }
            | LayoutError::MissingWeight { id }
            | LayoutError::UnknownNode { id } => Some(id),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        LayoutError::InvalidInput { message: e.to_string() }
    }
}
