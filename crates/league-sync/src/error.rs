//! Error types for the view synchronizer.

use league_store::StoreError;

/// Errors that can occur while refreshing views.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Fetching a family from the store failed. The views keep their
    /// previous contents.
    #[error("refresh failed: {0}")]
    Store(#[from] StoreError),
}
