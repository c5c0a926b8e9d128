pub mod clean;
pub mod launch;

pub use clean::{CleanArgs, clean_stack};
pub use launch::{LaunchArgs, launch_stack};
