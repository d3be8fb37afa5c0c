/// Errors raised while parsing alert patterns or handling the alert-state
/// snapshot.
///
/// Pattern errors never leave the evaluator: they are logged and the
/// attribute is treated as compliant.
///
/// # Examples
///
/// ```rust
/// use decanter_alert::error::AlertError;
///
/// let err = AlertError::RangeArity("1,2,3".to_string());
/// assert!(err.to_string().contains("1,2,3"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// The pattern does not start with a prefix known to the grammar that
    /// applies to the value.
    #[error("Alert: pattern '{0}' has no recognised prefix")]
    UnknownPattern(String),

    /// A `range:` body is not wrapped in `(`/`[` and `)`/`]`.
    #[error("Alert: range '{0}' must start with ( or [ and end with ) or ]")]
    RangeBrackets(String),

    /// A `range:` body does not contain exactly two bounds.
    #[error("Alert: range '{0}' must contain exactly two comma-separated bounds")]
    RangeArity(String),

    /// A literal in a numeric pattern, or a decimal value, is not a number.
    #[error("Alert: '{0}' is not a number")]
    InvalidNumber(String),

    /// A `match:`/`notmatch:` body is not a valid regular expression.
    #[error("Alert: invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Reading or writing the alert-state snapshot failed.
    #[error("Alert: snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` alias for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;
