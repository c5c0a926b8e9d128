//! Compose descriptor for the viewer stack.
//!
//! Only the subset of the Compose format the stack needs is modelled. Maps are
//! ordered so that identical inputs always render identical bytes.

use crate::error::DescriptorError;
use crate::writer::replace_write;
use glance_core::{StackName, StackSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const HEADER: &str = "# Generated by glance. Recreated on every run and removed on exit.\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeFile {
    pub services: BTreeMap<String, Service>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub container_name: String,
    pub build: BuildConfig,
    pub ports: Vec<String>,
    pub volumes: Vec<String>,
    pub working_dir: String,
    pub command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub context: String,
    pub dockerfile: String,
}

/// A descriptor that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    path: PathBuf,
    name: StackName,
}

impl Descriptor {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &StackName {
        &self.name
    }

    pub fn project_name(&self) -> String {
        self.name.project_name()
    }
}

pub fn synthesize(spec: &StackSpec) -> ComposeFile {
    let service = Service {
        container_name: spec.name.to_string(),
        build: BuildConfig {
            context: spec.build_context.to_string_lossy().to_string(),
            dockerfile: spec.build_file.clone(),
        },
        ports: spec.ports.iter().map(|p| p.to_string()).collect(),
        volumes: spec.volumes.iter().map(|v| v.to_string()).collect(),
        working_dir: spec.working_dir.clone(),
        command: vec!["sh".to_string(), "-c".to_string(), spec.command.clone()],
    };

    let mut services = BTreeMap::new();
    services.insert(spec.name.to_string(), service);
    ComposeFile { services }
}

pub fn render(compose: &ComposeFile) -> Result<String, DescriptorError> {
    let body = serde_yaml::to_string(compose)?;
    Ok(format!("{}{}", HEADER, body))
}

/// Render `spec` and replace whatever is at `path` with it.
pub fn write_descriptor(path: &Path, spec: &StackSpec) -> Result<Descriptor, DescriptorError> {
    let contents = render(&synthesize(spec))?;
    replace_write(path, &contents)?;

    tracing::info!(
        stack = %spec.name,
        path = %path.display(),
        volumes = ?spec.volumes.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
        "Descriptor written"
    );

    Ok(Descriptor {
        path: path.to_path_buf(),
        name: spec.name.clone(),
    })
}
