use async_trait::async_trait;
use glance_core::StackName;
use glance_descriptor::Descriptor;
use glance_runtime::{RuntimeError, StackExit, StackRuntime};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
pub enum UpBehavior {
    Exit(i32),
    SpawnFails,
    Hang,
}

/// In-memory runtime that records every command it receives.
pub struct RecordingRuntime {
    pub calls: Mutex<Vec<String>>,
    pub existing: Mutex<Vec<String>>,
    pub up: UpBehavior,
    pub remove_fails: bool,
    pub down_fails: bool,
    pub prune_fails: bool,
}

impl RecordingRuntime {
    pub fn new(up: UpBehavior) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            existing: Mutex::new(Vec::new()),
            up,
            remove_fails: false,
            down_fails: false,
            prune_fails: false,
        }
    }

    pub fn with_existing(self, name: &str) -> Self {
        self.existing.lock().unwrap().push(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn failure(command: &str) -> RuntimeError {
        RuntimeError::CommandFailed {
            command: command.to_string(),
            status: "exit status: 1".to_string(),
            stderr: "simulated failure".to_string(),
        }
    }
}

#[async_trait]
impl StackRuntime for RecordingRuntime {
    async fn list_by_name(&self, name: &StackName) -> Result<Vec<String>, RuntimeError> {
        self.record("list");
        let existing = self.existing.lock().unwrap();
        Ok(existing
            .iter()
            .filter(|n| n.as_str() == name.as_str())
            .cloned()
            .collect())
    }

    async fn force_remove(&self, name: &StackName) -> Result<(), RuntimeError> {
        self.record("rm");
        if self.remove_fails {
            return Err(Self::failure("rm"));
        }
        self.existing
            .lock()
            .unwrap()
            .retain(|n| n.as_str() != name.as_str());
        Ok(())
    }

    async fn up(&self, descriptor: &Descriptor) -> Result<StackExit, RuntimeError> {
        self.record("up");
        assert!(descriptor.path().exists(), "descriptor must exist during up");
        match self.up {
            UpBehavior::Exit(code) => Ok(StackExit { code: Some(code) }),
            UpBehavior::SpawnFails => Err(RuntimeError::Spawn {
                command: "docker compose up".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "docker"),
            }),
            UpBehavior::Hang => std::future::pending().await,
        }
    }

    async fn down(&self, _descriptor: &Descriptor) -> Result<(), RuntimeError> {
        self.record("down");
        if self.down_fails {
            return Err(Self::failure("down"));
        }
        Ok(())
    }

    async fn prune_images(&self) -> Result<(), RuntimeError> {
        self.record("prune");
        if self.prune_fails {
            return Err(Self::failure("prune"));
        }
        Ok(())
    }
}
