//! Domain-specific errors.

use thiserror::Error;

/// Errors from constructing the selection service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Every selection engine is disabled; there is no way to select
    /// content on this platform.
    #[error("no selection engine is enabled on this platform")]
    EnginesUnavailable,
}

/// Errors surfaced at the clipboard seam.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Backends were present but every one of them refused the copy.
    #[error("clipboard backends rejected the copy")]
    Rejected(#[source] anyhow::Error),
    /// No clipboard backend is usable in this environment.
    #[error("no clipboard backend is available")]
    Unavailable,
}
