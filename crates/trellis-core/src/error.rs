//! Errors surfaced across the layout engine boundary.

use thiserror::Error;

/// Failure reported by a layout tree while computing a layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The layout engine failed while measuring the current root.
    #[error("measurement failed for `{component}`: {reason}")]
    MeasureFailed { component: String, reason: String },

    /// Measurement was requested on a tree that has already been released.
    #[error("layout tree for `{0}` has been released")]
    TreeReleased(String),
}
