//! Teardown of a started stack.
//!
//! A [`StartedStack`] is created when the controller enters `Starting` and can
//! only be released by [`Cleanup::run`], which consumes it. Each step runs
//! whether or not the previous one succeeded, and no failure is propagated.

use glance_descriptor::{Descriptor, remove_if_exists};
use glance_runtime::StackRuntime;
use std::path::{Path, PathBuf};

/// Everything generated for a stack that has been handed to the runtime.
#[derive(Debug)]
pub struct StartedStack {
    descriptor: Descriptor,
    devcontainer: Option<PathBuf>,
    /// Directory created for the devcontainer file, removed with it.
    devcontainer_dir: Option<PathBuf>,
    released: bool,
}

impl StartedStack {
    pub fn new(
        descriptor: Descriptor,
        devcontainer: Option<PathBuf>,
        devcontainer_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            descriptor,
            devcontainer,
            devcontainer_dir,
            released: false,
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn remove_artifacts(&self, report: &mut CleanupReport) {
        match remove_if_exists(self.descriptor.path()) {
            Ok(removed) => report.descriptor_removed = removed,
            Err(e) => report.fail(format!(
                "failed to delete {}: {}",
                self.descriptor.path().display(),
                e
            )),
        }

        if let Some(path) = &self.devcontainer {
            match remove_if_exists(path) {
                Ok(removed) => report.devcontainer_removed = removed,
                Err(e) => report.fail(format!("failed to delete {}: {}", path.display(), e)),
            }
        }

        if let Some(dir) = &self.devcontainer_dir {
            remove_empty_dir(dir);
        }
    }
}

impl Drop for StartedStack {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // Only reachable when the controller unwinds; the runtime cannot be
        // driven from here, so at least remove the generated files.
        tracing::error!(
            stack = %self.descriptor.name(),
            "Stack dropped without cleanup; removing generated files only"
        );
        let mut report = CleanupReport::default();
        self.remove_artifacts(&mut report);
    }
}

fn remove_empty_dir(dir: &Path) {
    if let Err(e) = std::fs::remove_dir(dir) {
        tracing::debug!(dir = %dir.display(), error = %e, "Left generated directory in place");
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub torn_down: bool,
    pub descriptor_removed: bool,
    pub devcontainer_removed: bool,
    pub pruned: bool,
    pub failures: Vec<String>,
}

impl CleanupReport {
    fn fail(&mut self, failure: String) {
        tracing::warn!(failure = %failure, "Cleanup step failed");
        self.failures.push(failure);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Cleanup<'a, R: ?Sized> {
    runtime: &'a R,
    prune: bool,
}

impl<'a, R: StackRuntime + ?Sized> Cleanup<'a, R> {
    pub fn new(runtime: &'a R, prune: bool) -> Self {
        Self { runtime, prune }
    }

    pub async fn run(&self, mut stack: StartedStack) -> CleanupReport {
        let mut report = CleanupReport::default();
        let name = stack.descriptor.name().clone();
        tracing::info!(stack = %name, "Cleaning up stack");

        match self.runtime.down(&stack.descriptor).await {
            Ok(()) => report.torn_down = true,
            Err(e) => {
                report.fail(format!("teardown failed: {}", e));
                match self.runtime.force_remove(&name).await {
                    Ok(()) => report.torn_down = true,
                    Err(e) => report.fail(format!("force removal failed: {}", e)),
                }
            }
        }

        stack.remove_artifacts(&mut report);
        stack.released = true;

        if self.prune {
            match self.runtime.prune_images().await {
                Ok(()) => report.pruned = true,
                Err(e) => report.fail(format!("image prune failed: {}", e)),
            }
        }

        tracing::info!(
            stack = %name,
            torn_down = report.torn_down,
            descriptor_removed = report.descriptor_removed,
            pruned = report.pruned,
            failures = report.failures.len(),
            "Cleanup finished"
        );
        report
    }
}
