use crate::utils::{Shutdown, prompt_for_path};
use clap::Args;
use glance_core::{
    DEFAULT_BUILD_FILE, DEFAULT_CODE_DIR, DEFAULT_COMMAND, DEFAULT_DESCRIPTOR_PATH,
    DEFAULT_STACK_NAME, DEVCONTAINER_PATH, HTTP_PORT, StackName, VIEWER_PORT,
};
use glance_lifecycle::{Controller, EXIT_OK, EXIT_USAGE, LaunchOptions, Outcome};
use glance_runtime::DockerCompose;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct LaunchArgs {
    /// Host directory with the data to serve (prompted for when omitted)
    #[arg(long, env = "GLANCE_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Reserved stack and container name
    #[arg(long, default_value = DEFAULT_STACK_NAME)]
    pub name: String,

    /// Where to write the generated Compose file
    #[arg(long, default_value = DEFAULT_DESCRIPTOR_PATH)]
    pub descriptor: PathBuf,

    /// Build context for the stack image, relative to the current directory
    #[arg(long, default_value = ".")]
    pub build_context: PathBuf,

    /// Build file, relative to the build context
    #[arg(long, default_value = DEFAULT_BUILD_FILE)]
    pub dockerfile: String,

    /// Application code directory to mount (defaults to ./codes when present)
    #[arg(long, conflicts_with = "no_code_mount")]
    pub code_dir: Option<String>,

    /// Do not mount an application code directory
    #[arg(long)]
    pub no_code_mount: bool,

    /// Mount the code directory read-only
    #[arg(long)]
    pub code_read_only: bool,

    /// Shell command line started inside the stack
    #[arg(long = "command", default_value = DEFAULT_COMMAND)]
    pub stack_command: String,

    /// Also generate an editor devcontainer file for the stack
    #[arg(long)]
    pub devcontainer: bool,

    /// Skip pruning unused images on exit
    #[arg(long)]
    pub no_prune: bool,

    /// Container runtime binary
    #[arg(long, default_value = "docker")]
    pub docker: PathBuf,

    /// Print the descriptor that would be generated and exit
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn launch_stack(args: LaunchArgs) -> u8 {
    let options = match launch_options(&args).await {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            return EXIT_USAGE;
        }
    };

    let mut controller = Controller::new(DockerCompose::new(&args.docker), options);

    if args.dry_run {
        return match controller.preview() {
            Ok(rendered) => {
                print!("{}", rendered);
                EXIT_OK
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                e.exit_code()
            }
        };
    }

    // Installed before any runtime command so an interrupt from here on is
    // routed through cleanup rather than killing the process.
    let shutdown = match Shutdown::install() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            eprintln!("Failed to install signal handlers: {}", e);
            return EXIT_USAGE;
        }
    };

    eprintln!(
        "Starting stack; viewer on http://localhost:{}, data server on http://localhost:{}",
        VIEWER_PORT, HTTP_PORT
    );
    eprintln!("Press Ctrl+C to stop and clean up.");

    match controller.run(shutdown.wait()).await {
        Ok(outcome) => {
            match &outcome {
                Outcome::Completed => eprintln!("Stack exited."),
                Outcome::Interrupted => eprintln!("Stack stopped and cleaned up."),
                Outcome::RuntimeFailure { reason } => {
                    eprintln!("Stack failed: {}", reason);
                }
            }
            outcome.exit_code()
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

async fn launch_options(args: &LaunchArgs) -> Result<LaunchOptions, String> {
    let name = StackName::new(args.name.clone()).map_err(|e| format!("Error: {}", e))?;
    let base_dir = std::env::current_dir()
        .map_err(|e| format!("Error: cannot determine current directory: {}", e))?;

    let data_dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => prompt_for_path("Enter the host data directory: ")
            .await
            .map_err(|e| format!("Error: failed to read data directory: {}", e))?,
    };

    Ok(LaunchOptions {
        name,
        data_dir,
        code_dir: code_dir(args, &base_dir),
        code_read_only: args.code_read_only,
        base_dir,
        build_context: args.build_context.clone(),
        build_file: args.dockerfile.clone(),
        command: args.stack_command.clone(),
        descriptor_path: args.descriptor.clone(),
        devcontainer_path: args.devcontainer.then(|| PathBuf::from(DEVCONTAINER_PATH)),
        prune: !args.no_prune,
    })
}

/// An explicit `--code-dir` must exist; the default is only mounted when the
/// directory is there.
fn code_dir(args: &LaunchArgs, base_dir: &Path) -> Option<String> {
    if args.no_code_mount {
        return None;
    }
    match &args.code_dir {
        Some(dir) => Some(dir.clone()),
        None if base_dir.join(DEFAULT_CODE_DIR).is_dir() => Some(DEFAULT_CODE_DIR.to_string()),
        None => {
            tracing::debug!("No ./{} directory, skipping code mount", DEFAULT_CODE_DIR);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        launch: LaunchArgs,
    }

    fn parse(args: &[&str]) -> LaunchArgs {
        let mut argv = vec!["glance"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().launch
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--data-dir", "/data/sample"]);
        assert_eq!(args.data_dir.as_deref(), Some("/data/sample"));
        assert_eq!(args.name, "glance-viewer");
        assert_eq!(args.descriptor, PathBuf::from("docker-compose.yml"));
        assert_eq!(args.dockerfile, "Dockerfile");
        assert_eq!(args.docker, PathBuf::from("docker"));
        assert!(!args.no_prune);
        assert!(!args.devcontainer);
    }

    #[test]
    fn test_code_dir_conflicts_with_no_code_mount() {
        let result = TestCli::try_parse_from([
            "glance",
            "--code-dir",
            "src",
            "--no-code-mount",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_code_dir_only_when_present() {
        let dir = TempDir::new().unwrap();
        let args = parse(&[]);
        assert_eq!(code_dir(&args, dir.path()), None);

        std::fs::create_dir(dir.path().join("codes")).unwrap();
        assert_eq!(code_dir(&args, dir.path()), Some("codes".to_string()));

        let disabled = parse(&["--no-code-mount"]);
        assert_eq!(code_dir(&disabled, dir.path()), None);

        let explicit = parse(&["--code-dir", "app"]);
        assert_eq!(code_dir(&explicit, dir.path()), Some("app".to_string()));
    }

    #[tokio::test]
    async fn test_launch_options_from_args() {
        let args = parse(&["--data-dir", "/data/sample", "--devcontainer", "--no-prune"]);
        let options = launch_options(&args).await.unwrap();

        assert_eq!(options.data_dir, "/data/sample");
        assert_eq!(
            options.devcontainer_path,
            Some(PathBuf::from(".devcontainer/devcontainer.json"))
        );
        assert!(!options.prune);
    }

    #[tokio::test]
    async fn test_invalid_name_is_rejected() {
        let args = parse(&["--data-dir", "/data/sample", "--name", "bad name"]);
        assert!(launch_options(&args).await.is_err());
    }
}
