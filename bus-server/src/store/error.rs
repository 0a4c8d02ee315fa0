//! Store error types.

/// Errors from loading or saving a store snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the snapshot file failed
    #[error("snapshot IO error at {path}: {message}")]
    Io { path: String, message: String },

    /// The snapshot could not be (de)serialized
    #[error("snapshot JSON error: {message}")]
    Json { message: String },
}
