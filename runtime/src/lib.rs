mod docker;
mod error;
mod runtime;

pub use docker::DockerCompose;
pub use error::RuntimeError;
pub use runtime::{StackExit, StackRuntime};
