//! Editor integration file pointing an IDE at the generated stack.
//!
//! Advisory only: nothing in the launch path reads it back.

use crate::compose::Descriptor;
use crate::error::DescriptorError;
use crate::writer::replace_write;
use glance_core::{PortBinding, WORKSPACE_DIR};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

const EXTENSIONS: &[&str] = &[
    "ms-python.python",
    "ms-python.vscode-pylance",
    "ms-azuretools.vscode-docker",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevContainer {
    pub name: String,
    pub docker_compose_file: String,
    pub service: String,
    pub workspace_folder: String,
    pub forward_ports: Vec<u16>,
    pub shutdown_action: String,
    pub customizations: Customizations,
}

#[derive(Debug, Clone, Serialize)]
pub struct Customizations {
    pub vscode: VsCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct VsCode {
    pub extensions: Vec<String>,
    pub settings: BTreeMap<String, Value>,
}

impl DevContainer {
    pub fn new(path: &Path, descriptor: &Descriptor, ports: &[PortBinding]) -> Self {
        let mut settings = BTreeMap::new();
        settings.insert(
            "python.defaultInterpreterPath".to_string(),
            json!("/usr/local/bin/python"),
        );

        DevContainer {
            name: descriptor.name().to_string(),
            docker_compose_file: compose_reference(path, descriptor.path()),
            service: descriptor.name().to_string(),
            workspace_folder: WORKSPACE_DIR.to_string(),
            forward_ports: ports.iter().map(|p| p.host_port).collect(),
            shutdown_action: "stopCompose".to_string(),
            customizations: Customizations {
                vscode: VsCode {
                    extensions: EXTENSIONS.iter().map(|e| e.to_string()).collect(),
                    settings,
                },
            },
        }
    }
}

/// Write the editor descriptor next to the Compose file. Returns the path
/// written so cleanup can remove it.
pub fn write_devcontainer(
    path: &Path,
    descriptor: &Descriptor,
    ports: &[PortBinding],
) -> Result<PathBuf, DescriptorError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| DescriptorError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let contents = serde_json::to_string_pretty(&DevContainer::new(path, descriptor, ports))?;
    replace_write(path, &format!("{}\n", contents))?;

    tracing::info!(path = %path.display(), "Editor descriptor written");
    Ok(path.to_path_buf())
}

/// Devcontainer tooling resolves `dockerComposeFile` relative to the
/// devcontainer file's own directory.
fn compose_reference(devcontainer: &Path, compose: &Path) -> String {
    if compose.is_absolute() {
        return compose.to_string_lossy().to_string();
    }

    let depth = devcontainer
        .parent()
        .map(|p| {
            p.components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count()
        })
        .unwrap_or(0);

    let mut reference = PathBuf::new();
    for _ in 0..depth {
        reference.push("..");
    }
    reference.push(compose);
    reference.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::write_descriptor;
    use glance_core::{StackName, StackSpec};
    use tempfile::TempDir;

    #[test]
    fn test_compose_reference_is_relative_to_devcontainer_dir() {
        assert_eq!(
            compose_reference(
                Path::new(".devcontainer/devcontainer.json"),
                Path::new("docker-compose.yml")
            ),
            "../docker-compose.yml"
        );
        assert_eq!(
            compose_reference(
                Path::new("devcontainer.json"),
                Path::new("docker-compose.yml")
            ),
            "docker-compose.yml"
        );
        assert_eq!(
            compose_reference(
                Path::new(".devcontainer/devcontainer.json"),
                Path::new("/tmp/stack/docker-compose.yml")
            ),
            "/tmp/stack/docker-compose.yml"
        );
    }

    #[test]
    fn test_write_devcontainer() {
        let dir = TempDir::new().unwrap();
        let data = glance_core::resolve(dir.path().to_str().unwrap()).unwrap();
        let spec = StackSpec::new(StackName::default(), &data);
        let descriptor = write_descriptor(&dir.path().join("docker-compose.yml"), &spec).unwrap();

        let path = dir.path().join(".devcontainer/devcontainer.json");
        let written = write_devcontainer(&path, &descriptor, &spec.ports).unwrap();
        assert_eq!(written, path);

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["service"], "glance-viewer");
        assert_eq!(value["workspaceFolder"], "/workspace");
        assert_eq!(value["forwardPorts"], json!([8000, 7000]));
        assert_eq!(
            value["dockerComposeFile"],
            descriptor.path().to_string_lossy().to_string()
        );
        assert!(
            value["customizations"]["vscode"]["extensions"]
                .as_array()
                .unwrap()
                .contains(&json!("ms-python.python"))
        );
    }
}
