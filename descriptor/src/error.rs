use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render descriptor: {0}")]
    Render(String),
}

impl From<serde_yaml::Error> for DescriptorError {
    fn from(e: serde_yaml::Error) -> Self {
        DescriptorError::Render(e.to_string())
    }
}

impl From<serde_json::Error> for DescriptorError {
    fn from(e: serde_json::Error) -> Self {
        DescriptorError::Render(e.to_string())
    }
}
