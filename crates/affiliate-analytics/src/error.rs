#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
    #[error("Unknown interval: {0}")]
    UnknownInterval(String),
    #[error("Unknown granularity: {0}")]
    UnknownGranularity(String),
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),
}

impl AnalyticsError {
    /// Whether the error was caused by caller supplied parameters.
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::AmountOutOfRange(_))
    }
}
