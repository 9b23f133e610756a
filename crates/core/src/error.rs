use thiserror::Error;

/// Errors from the fallible edges of the debugger: attaching host storage
/// and reading frame documents. Interactive controls never surface these.
#[derive(Debug, Error)]
pub enum GpioError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed frame document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame document contains no frames")]
    NoFrames,
    #[error("host storage holds {len} bytes, bank needs {size}")]
    StorageTooSmall { len: usize, size: usize },
}
