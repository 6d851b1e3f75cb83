//! Errors raised while turning filter state into SQL.

/// Result type for statement construction.
pub type QueryBuildResult<T> = Result<T, QueryBuildError>;

/// Statement construction failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryBuildError {
    /// A filter value cannot be embedded as a quoted SQL literal.
    #[error("Invalid filter value {value:?}: {reason}")]
    InvalidFilterValue { value: String, reason: String },

    /// A configured schema or table name is not a plain SQL identifier.
    #[error("Invalid SQL identifier {value:?}: {reason}")]
    InvalidIdentifier { value: String, reason: String },
}

impl QueryBuildError {
    pub fn invalid_filter_value(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilterValue {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_identifier(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
