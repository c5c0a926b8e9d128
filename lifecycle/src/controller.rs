use crate::cleanup::{Cleanup, StartedStack};
use crate::error::LifecycleError;
use crate::outcome::Outcome;
use crate::state::State;
use glance_core::{HostPath, PortBinding, StackName, StackSpec};
use glance_descriptor::{Descriptor, remove_if_exists, write_descriptor, write_devcontainer};
use glance_runtime::StackRuntime;
use std::future::Future;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub name: StackName,
    /// Raw host data directory as typed or passed by the user.
    pub data_dir: String,
    /// Raw code directory, resolved relative to `base_dir`. `None` skips the
    /// code mount.
    pub code_dir: Option<String>,
    pub code_read_only: bool,
    pub base_dir: PathBuf,
    pub build_context: PathBuf,
    pub build_file: String,
    pub command: String,
    pub descriptor_path: PathBuf,
    pub devcontainer_path: Option<PathBuf>,
    pub prune: bool,
}

/// Drives one invocation from validation through teardown.
pub struct Controller<R> {
    runtime: R,
    options: LaunchOptions,
    state: State,
}

impl<R: StackRuntime> Controller<R> {
    pub fn new(runtime: R, options: LaunchOptions) -> Self {
        Self {
            runtime,
            options,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    fn transition(&mut self, next: State) {
        tracing::debug!(from = %self.state, to = %next, "Lifecycle transition");
        self.state = next;
    }

    /// Run the stack until it exits or `interrupt` resolves.
    ///
    /// Errors are only returned for failures before any runtime command is
    /// issued. Once the stack is starting, every path goes through cleanup
    /// and is reported as an [`Outcome`].
    pub async fn run<F>(&mut self, interrupt: F) -> Result<Outcome, LifecycleError>
    where
        F: Future<Output = ()>,
    {
        self.transition(State::Validating);
        let stack = match self.prepare() {
            Ok(stack) => stack,
            Err(e) => {
                tracing::error!(error = %e, "Validation failed, nothing was started");
                self.transition(State::Idle);
                return Err(e);
            }
        };

        self.transition(State::CleaningStale);
        self.clear_stale().await;
        check_ports(&stack.ports);

        self.transition(State::Starting);
        let started = stack.started;

        // The runtime gives no separate readiness signal; the stack counts as
        // running for as long as the foreground command is in flight.
        self.transition(State::Running);
        let outcome = tokio::select! {
            result = self.runtime.up(started.descriptor()) => match result {
                Ok(exit) if exit.success() => Outcome::Completed,
                Ok(exit) => Outcome::RuntimeFailure {
                    reason: format!("stack ended with {}", exit),
                },
                Err(e) => Outcome::RuntimeFailure {
                    reason: e.to_string(),
                },
            },
            () = interrupt => {
                tracing::info!("Interrupt received, stopping stack");
                Outcome::Interrupted
            }
        };

        self.transition(State::Terminating);
        let report = Cleanup::new(&self.runtime, self.options.prune)
            .run(started)
            .await;
        if !report.is_clean() {
            tracing::warn!(failures = ?report.failures, "Cleanup finished with failures");
        }

        self.transition(State::Idle);
        tracing::info!(outcome = %outcome, "Invocation finished");
        Ok(outcome)
    }

    /// Render the descriptor that `run` would write, without writing it.
    pub fn preview(&self) -> Result<String, LifecycleError> {
        let spec = self.resolve_spec()?;
        Ok(glance_descriptor::render(&glance_descriptor::synthesize(&spec))?)
    }

    fn resolve_spec(&self) -> Result<StackSpec, LifecycleError> {
        let opts = &self.options;

        let data_dir = glance_core::resolve_relative_to(&opts.base_dir, &opts.data_dir)?;
        let code_dir = opts
            .code_dir
            .as_deref()
            .map(|dir| glance_core::resolve_relative_to(&opts.base_dir, dir))
            .transpose()?;
        // Compose resolves a relative context against the descriptor's own
        // directory, so it is pinned to an absolute path here.
        let build_context = glance_core::resolve_relative_to(
            &opts.base_dir,
            &opts.build_context.to_string_lossy(),
        )?;

        Ok(build_spec(opts, &data_dir, code_dir.as_ref(), &build_context))
    }

    /// Resolve inputs and write the generated files. Touches no container.
    fn prepare(&self) -> Result<PreparedStack, LifecycleError> {
        let opts = &self.options;
        let spec = self.resolve_spec()?;
        let descriptor = write_descriptor(&opts.descriptor_path, &spec)?;

        let (devcontainer, devcontainer_dir) = match &opts.devcontainer_path {
            Some(path) => {
                let created_dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty() && !p.exists())
                    .map(Path::to_path_buf);
                match write_devcontainer(path, &descriptor, &spec.ports) {
                    Ok(written) => (Some(written), created_dir),
                    Err(e) => {
                        discard(&descriptor);
                        if let Some(dir) = &created_dir {
                            let _ = std::fs::remove_dir(dir);
                        }
                        return Err(e.into());
                    }
                }
            }
            None => (None, None),
        };

        Ok(PreparedStack {
            ports: spec.ports,
            started: StartedStack::new(descriptor, devcontainer, devcontainer_dir),
        })
    }

    /// Remove a leftover container with the reserved name. Failures are
    /// logged only; a surviving container makes `up` report the conflict.
    async fn clear_stale(&self) {
        let name = &self.options.name;

        let existing = match self.runtime.list_by_name(name).await {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!(container = %name, error = %e, "Could not query for stale container");
                return;
            }
        };

        if existing.is_empty() {
            tracing::debug!(container = %name, "No stale container");
            return;
        }

        tracing::info!(container = %name, "Removing stale container");
        if let Err(e) = self.runtime.force_remove(name).await {
            tracing::warn!(container = %name, error = %e, "Failed to remove stale container");
            return;
        }

        match self.runtime.list_by_name(name).await {
            Ok(remaining) if remaining.is_empty() => {
                tracing::info!(container = %name, "Stale container removed");
            }
            Ok(_) => {
                tracing::warn!(container = %name, "Stale container still present after removal");
            }
            Err(e) => {
                tracing::warn!(container = %name, error = %e, "Could not verify stale container removal");
            }
        }
    }
}

struct PreparedStack {
    ports: Vec<PortBinding>,
    started: StartedStack,
}

fn build_spec(
    opts: &LaunchOptions,
    data_dir: &HostPath,
    code_dir: Option<&HostPath>,
    build_context: &HostPath,
) -> StackSpec {
    let mut spec = StackSpec::new(opts.name.clone(), data_dir)
        .with_build(build_context.as_path(), &opts.build_file)
        .with_command(&opts.command);
    if let Some(code_dir) = code_dir {
        spec = spec.with_code_dir(code_dir, opts.code_read_only);
    }
    spec
}

fn discard(descriptor: &Descriptor) {
    if let Err(e) = remove_if_exists(descriptor.path()) {
        tracing::warn!(path = %descriptor.path().display(), error = %e, "Failed to remove descriptor");
    }
}

/// Busy ports make `up` fail; warn early so the reason is obvious.
fn check_ports(ports: &[PortBinding]) {
    for port in ports {
        if !portpicker::is_free_tcp(port.host_port) {
            tracing::warn!(port = port.host_port, "Host port appears to be in use; stack start may fail");
        }
    }
}
