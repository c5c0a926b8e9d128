use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid path '{input}': {reason}")]
    InvalidPath { input: String, reason: String },

    #[error("invalid stack name '{0}': must start with an alphanumeric character and contain only [a-zA-Z0-9_.-]")]
    InvalidName(String),
}

impl CoreError {
    pub(crate) fn invalid_path(input: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidPath {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
