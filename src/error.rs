use thiserror::Error;

/// Errors an acquisition function can reject with.
///
/// The loader never surfaces these to its callers; every rejection is logged
/// and converted into an absent result. The taxonomy exists so acquisition
/// implementations can report precisely and so log lines stay useful.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AcquireError {
    /// A model file could not be fetched.
    #[error("download of '{file}' failed: {reason}")]
    Download { file: String, reason: String },

    /// The model identifier is unknown to the hub.
    #[error("model '{0}' not found")]
    NotFound(String),

    /// The runtime failed while constructing the pipeline.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// The runtime ran out of memory while materializing weights.
    #[error("out of memory while initializing model")]
    OutOfMemory,
}
