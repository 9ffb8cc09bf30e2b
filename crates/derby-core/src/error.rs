//! Error types for the derby core.

use crate::render::VisualHandle;

/// Errors reported by a [`RenderBackend`](crate::render::RenderBackend).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The backend refused to create a new visual.
    #[error("failed to create visual with class `{class}`: {reason}")]
    CreateFailed {
        /// Style class requested for the visual.
        class: String,
        /// Backend-provided reason.
        reason: String,
    },

    /// The handle does not refer to a live visual.
    #[error("unknown visual handle {0:?}")]
    UnknownHandle(VisualHandle),

    /// The backend refused to start an animation.
    #[error("failed to animate visual {handle:?}: {reason}")]
    AnimateFailed {
        /// Visual that was being animated.
        handle: VisualHandle,
        /// Backend-provided reason.
        reason: String,
    },
}

/// Errors surfaced by the derby controller and its configuration layer.
#[derive(Debug, thiserror::Error)]
pub enum DerbyError {
    /// A spawn command named a vehicle kind that does not exist.
    #[error("unknown vehicle kind `{0}`")]
    UnknownKind(String),

    /// The render backend failed while spawning a vehicle.
    #[error("render backend error: {0}")]
    Render(#[from] RenderError),

    /// A configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DerbyError>;
