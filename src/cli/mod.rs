//! Command-line interface module.

mod args;
pub mod common;
pub mod fetch;
pub mod lookup;
pub mod run;
pub mod serve;

pub use args::{Cli, Commands, RunArgs};
