use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_STACK_NAME: &str = "glance-viewer";
pub const DEFAULT_DESCRIPTOR_PATH: &str = "docker-compose.yml";
pub const DEFAULT_BUILD_FILE: &str = "Dockerfile";
pub const DEFAULT_CODE_DIR: &str = "codes";
pub const DEVCONTAINER_PATH: &str = ".devcontainer/devcontainer.json";

pub const WORKSPACE_DIR: &str = "/workspace";
pub const DATA_MOUNT: &str = "/workspace/datas";
pub const CODE_MOUNT: &str = "/workspace/codes";

pub const HTTP_PORT: u16 = 8000;
pub const VIEWER_PORT: u16 = 7000;

/// Serves `./datas` over HTTP in the background and keeps the viewer in the
/// foreground so the container lives as long as the viewer does. Relative
/// paths are taken from [`WORKSPACE_DIR`].
pub const DEFAULT_COMMAND: &str =
    "uvicorn codes.server:app --host 0.0.0.0 --port 8000 & exec python viewer.py";

/// Reserved name of the stack. Used as service name, container name and
/// (lowercased) Compose project name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackName(String);

impl StackName {
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                first.is_ascii_alphanumeric()
                    && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
            }
            None => false,
        };
        if !valid {
            return Err(CoreError::InvalidName(name));
        }
        Ok(StackName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compose project names only allow lowercase letters, digits, `-` and `_`.
    pub fn project_name(&self) -> String {
        self.0
            .chars()
            .map(|c| match c {
                '.' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect()
    }
}

impl Default for StackName {
    fn default() -> Self {
        StackName(DEFAULT_STACK_NAME.to_string())
    }
}

impl std::fmt::Display for StackName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An absolute directory on the invoking host, verified at resolve time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPath(PathBuf);

impl HostPath {
    pub(crate) fn new(path: PathBuf) -> Self {
        HostPath(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for HostPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for HostPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    pub host_port: u16,
    pub container_port: u16,
}

impl PortBinding {
    pub fn new(host_port: u16, container_port: u16) -> Self {
        Self {
            host_port,
            container_port,
        }
    }

    /// The two pairs every stack publishes: data server and viewer.
    pub fn defaults() -> Vec<PortBinding> {
        vec![
            PortBinding::new(HTTP_PORT, HTTP_PORT),
            PortBinding::new(VIEWER_PORT, VIEWER_PORT),
        ]
    }
}

impl std::fmt::Display for PortBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host_port, self.container_port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBinding {
    pub host_path: PathBuf,
    pub container_path: String,
    pub read_only: bool,
}

impl VolumeBinding {
    pub fn new(host_path: impl Into<PathBuf>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            read_only: false,
        }
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

impl std::fmt::Display for VolumeBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host_path.display(), self.container_path)?;
        if self.read_only {
            write!(f, ":ro")?;
        }
        Ok(())
    }
}

/// Everything the descriptor is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSpec {
    pub name: StackName,
    pub build_context: PathBuf,
    pub build_file: String,
    pub ports: Vec<PortBinding>,
    pub volumes: Vec<VolumeBinding>,
    pub working_dir: String,
    pub command: String,
}

impl StackSpec {
    pub fn new(name: StackName, data_dir: &HostPath) -> Self {
        Self {
            name,
            build_context: PathBuf::from("."),
            build_file: DEFAULT_BUILD_FILE.to_string(),
            ports: PortBinding::defaults(),
            volumes: vec![VolumeBinding::new(data_dir.as_path(), DATA_MOUNT)],
            working_dir: WORKSPACE_DIR.to_string(),
            command: DEFAULT_COMMAND.to_string(),
        }
    }

    pub fn with_code_dir(mut self, code_dir: &HostPath, read_only: bool) -> Self {
        self.volumes
            .push(VolumeBinding::new(code_dir.as_path(), CODE_MOUNT).read_only(read_only));
        self
    }

    pub fn with_build(mut self, context: impl Into<PathBuf>, build_file: impl Into<String>) -> Self {
        self.build_context = context.into();
        self.build_file = build_file.into();
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }
}
