use crate::outcome::{EXIT_INVALID_PATH, EXIT_USAGE, EXIT_WRITE_ERROR};
use glance_core::CoreError;
use glance_descriptor::DescriptorError;
use thiserror::Error;

/// Failures that end an invocation before any container is touched.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error(transparent)]
    Path(#[from] CoreError),

    #[error(transparent)]
    Write(#[from] DescriptorError),
}

impl LifecycleError {
    pub fn exit_code(&self) -> u8 {
        match self {
            LifecycleError::Path(CoreError::InvalidPath { .. }) => EXIT_INVALID_PATH,
            LifecycleError::Path(CoreError::InvalidName(_)) => EXIT_USAGE,
            LifecycleError::Write(_) => EXIT_WRITE_ERROR,
        }
    }
}
