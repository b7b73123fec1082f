// Error taxonomy shared by the parameter store, the engine session and the
// streaming driver.

use thiserror::Error;

/// Errors returned while configuring or driving a stream.
///
/// Nothing is retried internally. Output already handed to the sink before a
/// failure stays written; truncating it is the caller's job.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Malformed property value, or a parameter the engine refused at apply time.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The engine context or one of the staging buffers could not be allocated.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// The engine reported an error while streaming.
    #[error("engine failure: {0}")]
    Fail(String),

    /// Failure raised by the input source, output sink or progress sink.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
