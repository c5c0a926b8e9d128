use crate::error::RuntimeError;
use crate::runtime::{StackExit, StackRuntime};
use async_trait::async_trait;
use glance_core::StackName;
use glance_descriptor::Descriptor;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Drives the stack through the Docker CLI and its Compose plugin.
pub struct DockerCompose {
    docker: PathBuf,
}

impl DockerCompose {
    pub fn new(docker: impl Into<PathBuf>) -> Self {
        Self {
            docker: docker.into(),
        }
    }

    fn describe(&self, args: &[OsString]) -> String {
        let mut parts = vec![self.docker.to_string_lossy().to_string()];
        parts.extend(args.iter().map(|a| a.to_string_lossy().to_string()));
        parts.join(" ")
    }

    /// Run a short command to completion with captured output.
    async fn run_captured(&self, args: Vec<OsString>) -> Result<String, RuntimeError> {
        let command = self.describe(&args);
        tracing::debug!(command = %command, "Running runtime command");

        let output = Command::new(&self.docker)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RuntimeError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RuntimeError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Default for DockerCompose {
    fn default() -> Self {
        Self::new("docker")
    }
}

fn os_args<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter().map(|a| a.as_ref().to_os_string()).collect()
}

fn list_args(name: &StackName) -> Vec<OsString> {
    let filter = format!("name=^{}$", name);
    os_args(["ps", "-a", "--filter", filter.as_str(), "--format", "{{.Names}}"])
}

fn remove_args(name: &StackName) -> Vec<OsString> {
    os_args(["rm", "-f", name.as_str()])
}

fn compose_args(descriptor: &Descriptor, tail: &[&str]) -> Vec<OsString> {
    let mut args = os_args(["compose", "-f"]);
    args.push(descriptor.path().as_os_str().to_os_string());
    args.push("-p".into());
    args.push(descriptor.project_name().into());
    args.extend(os_args(tail));
    args
}

fn up_args(descriptor: &Descriptor) -> Vec<OsString> {
    compose_args(descriptor, &["up", "--build", "--abort-on-container-exit"])
}

fn down_args(descriptor: &Descriptor) -> Vec<OsString> {
    compose_args(descriptor, &["down", "--remove-orphans"])
}

fn prune_args() -> Vec<OsString> {
    os_args(["image", "prune", "-f"])
}

/// The name filter is a regex that Docker also applies to the `/name` form,
/// so keep only exact matches.
fn parse_names(stdout: &str, name: &StackName) -> Vec<String> {
    stdout
        .lines()
        .map(|l| l.trim().trim_start_matches('/'))
        .filter(|l| *l == name.as_str())
        .map(|l| l.to_string())
        .collect()
}

fn is_missing_container(stderr: &str) -> bool {
    stderr.contains("No such container")
}

#[async_trait]
impl StackRuntime for DockerCompose {
    async fn list_by_name(&self, name: &StackName) -> Result<Vec<String>, RuntimeError> {
        let stdout = self.run_captured(list_args(name)).await?;
        Ok(parse_names(&stdout, name))
    }

    async fn force_remove(&self, name: &StackName) -> Result<(), RuntimeError> {
        match self.run_captured(remove_args(name)).await {
            Ok(_) => {
                tracing::info!(container = %name, "Container removed");
                Ok(())
            }
            Err(RuntimeError::CommandFailed { ref stderr, .. }) if is_missing_container(stderr) => {
                tracing::debug!(container = %name, "Container already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn up(&self, descriptor: &Descriptor) -> Result<StackExit, RuntimeError> {
        let args = up_args(descriptor);
        let command = self.describe(&args);
        tracing::info!(command = %command, "Building and starting stack");

        // stdout/stderr are inherited so the stack's own output reaches the user.
        let mut child = Command::new(&self.docker)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RuntimeError::Spawn {
                command: command.clone(),
                source,
            })?;

        let status = child.wait().await?;
        tracing::info!(status = %status, "Stack command exited");

        Ok(StackExit {
            code: status.code(),
        })
    }

    async fn down(&self, descriptor: &Descriptor) -> Result<(), RuntimeError> {
        self.run_captured(down_args(descriptor)).await?;
        tracing::info!(project = %descriptor.project_name(), "Stack torn down");
        Ok(())
    }

    async fn prune_images(&self) -> Result<(), RuntimeError> {
        let stdout = self.run_captured(prune_args()).await?;
        if let Some(summary) = stdout.lines().rev().find(|l| !l.trim().is_empty()) {
            tracing::info!(summary = %summary.trim(), "Pruned unused images");
        }
        Ok(())
    }
}
