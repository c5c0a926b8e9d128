mod error;
pub mod path;
mod types;

pub use error::CoreError;
pub use path::{resolve, resolve_relative_to};
pub use types::*;
