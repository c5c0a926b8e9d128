use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("failed to spawn `{command}`: {source}. Is the container runtime installed?")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
