use clap::Args;
use glance_core::{DEFAULT_DESCRIPTOR_PATH, DEFAULT_STACK_NAME, DEVCONTAINER_PATH, StackName};
use glance_descriptor::remove_if_exists;
use glance_lifecycle::{EXIT_OK, EXIT_RUNTIME_FAILURE, EXIT_USAGE};
use glance_runtime::{DockerCompose, StackRuntime};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    /// Reserved stack and container name
    #[arg(long, default_value = DEFAULT_STACK_NAME)]
    pub name: String,

    /// Generated Compose file to delete
    #[arg(long, default_value = DEFAULT_DESCRIPTOR_PATH)]
    pub descriptor: PathBuf,

    /// Also prune unused images
    #[arg(long)]
    pub prune: bool,

    /// Container runtime binary
    #[arg(long, default_value = "docker")]
    pub docker: PathBuf,
}

/// Recovery for a run that could not clean up after itself, e.g. because the
/// orchestrator was killed outright.
pub async fn clean_stack(args: CleanArgs) -> u8 {
    let name = match StackName::new(args.name) {
        Ok(name) => name,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_USAGE;
        }
    };

    let runtime = DockerCompose::new(&args.docker);
    let mut code = EXIT_OK;

    match runtime.force_remove(&name).await {
        Ok(()) => eprintln!("Removed container {} (if it existed)", name),
        Err(e) => {
            eprintln!("Failed to remove container {}: {}", name, e);
            code = EXIT_RUNTIME_FAILURE;
        }
    }

    for path in [args.descriptor.as_path(), Path::new(DEVCONTAINER_PATH)] {
        match remove_if_exists(path) {
            Ok(true) => eprintln!("Deleted {}", path.display()),
            Ok(false) => {}
            Err(e) => eprintln!("Failed to delete {}: {}", path.display(), e),
        }
    }
    if let Some(dir) = Path::new(DEVCONTAINER_PATH).parent() {
        let _ = std::fs::remove_dir(dir);
    }

    if args.prune {
        if let Err(e) = runtime.prune_images().await {
            tracing::warn!(error = %e, "Image prune failed");
        }
    }

    code
}
