/// Errors that can occur while delivering alert events.
///
/// # Examples
///
/// ```rust
/// use decanter_notify::error::NotifyError;
///
/// let err = NotifyError::ChannelClosed;
/// assert!(err.to_string().contains("closed"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The consumer side of the alert channel has shut down.
    #[error("Notify: alert channel closed")]
    ChannelClosed,

    /// Rendering an alert as JSON failed.
    #[error("Notify: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing an alert to its sink failed.
    #[error("Notify: I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
