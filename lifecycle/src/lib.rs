mod cleanup;
mod controller;
mod error;
mod outcome;
mod state;

pub use cleanup::{Cleanup, CleanupReport, StartedStack};
pub use controller::{Controller, LaunchOptions};
pub use error::LifecycleError;
pub use outcome::*;
pub use state::State;

#[cfg(test)]
mod testing;
