use crate::error::RuntimeError;
use async_trait::async_trait;
use glance_core::StackName;
use glance_descriptor::Descriptor;

/// How the foreground `up` command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackExit {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl StackExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl std::fmt::Display for StackExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "termination by signal"),
        }
    }
}

/// Commands the lifecycle needs from a container runtime.
#[async_trait]
pub trait StackRuntime: Send + Sync {
    /// Names of existing containers (running or not) called exactly `name`.
    async fn list_by_name(&self, name: &StackName) -> Result<Vec<String>, RuntimeError>;

    /// Force-remove the container called `name`. Removing an absent
    /// container must succeed.
    async fn force_remove(&self, name: &StackName) -> Result<(), RuntimeError>;

    /// Build and start the stack in the foreground, relaying its output, and
    /// resolve once it exits. Dropping the future must stop the command.
    async fn up(&self, descriptor: &Descriptor) -> Result<StackExit, RuntimeError>;

    /// Stop and remove everything the descriptor created.
    async fn down(&self, descriptor: &Descriptor) -> Result<(), RuntimeError>;

    /// Remove dangling images left behind by builds.
    async fn prune_images(&self) -> Result<(), RuntimeError>;
}
