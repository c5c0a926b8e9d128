pub const EXIT_OK: u8 = 0;
pub const EXIT_RUNTIME_FAILURE: u8 = 1;
pub const EXIT_INVALID_PATH: u8 = 2;
pub const EXIT_WRITE_ERROR: u8 = 3;
pub const EXIT_USAGE: u8 = 4;

/// How a stack that reached `Starting` ended. Cleanup has already run by the
/// time an `Outcome` is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The stack exited on its own with status 0.
    Completed,
    /// An interrupt arrived while the stack was running.
    Interrupted,
    /// Build/start failed or the stack exited non-zero.
    RuntimeFailure { reason: String },
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Completed | Outcome::Interrupted => EXIT_OK,
            Outcome::RuntimeFailure { .. } => EXIT_RUNTIME_FAILURE,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Completed => write!(f, "stack exited cleanly"),
            Outcome::Interrupted => write!(f, "stack interrupted"),
            Outcome::RuntimeFailure { reason } => write!(f, "stack failed: {}", reason),
        }
    }
}
