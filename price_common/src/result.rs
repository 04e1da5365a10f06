//! Result type alias shared across the workspace.
//!
//! Defaults the error type to `SyncError` so plumbing code can return `Result<T>`.
use crate::error::SyncError;

/// Workspace-wide `Result` alias with `SyncError` as the default error.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;
