/// Errors raised by a [`LineDevice`](super::LineDevice) implementation.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// A draw was issued before a render target was bound.
    #[error("no render target bound; call begin_frame first")]
    NoTarget,

    /// The pass index is not part of the effect's technique.
    #[error("pass {pass} out of range (technique has {count} passes)")]
    InvalidPass { pass: usize, count: usize },

    /// Backend-specific failure.
    #[error("device error: {0}")]
    Backend(String),
}

/// Errors raised by [`LineBatch`](super::LineBatch).
#[derive(Debug, thiserror::Error)]
pub enum LineBatchError {
    /// A required argument is unusable (bad capacity, polygon without points).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Buffered lines could not be submitted because the batch was released.
    #[error("line batch has been released")]
    Released,

    /// Propagated untouched from the device.
    #[error(transparent)]
    Device(#[from] DeviceError),
}

pub type LineBatchResult<T> = Result<T, LineBatchError>;
