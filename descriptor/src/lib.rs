mod compose;
mod devcontainer;
mod error;
mod writer;

pub use compose::{BuildConfig, ComposeFile, Descriptor, Service, render, synthesize, write_descriptor};
pub use devcontainer::{DevContainer, write_devcontainer};
pub use error::DescriptorError;
pub use writer::{remove_if_exists, replace_write};
