use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("malformed value for `{field}`: {reason}")]
    MalformedInput { field: String, reason: String },
    #[error("unrecognized field: {0}")]
    UnrecognizedField(String),
    #[error("{collaborator} unavailable: {reason}")]
    CollaboratorUnavailable {
        collaborator: &'static str,
        reason: String,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

impl SearchError {
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The request parameter this error is about, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MalformedInput { field, .. } => Some(field),
            Self::UnrecognizedField(name) => Some(name),
            _ => None,
        }
    }

    /// Caller sent something we can't turn into a filter.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. } | Self::UnrecognizedField(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CollaboratorUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
