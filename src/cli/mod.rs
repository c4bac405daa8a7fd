pub mod args;
pub mod commands;

pub use args::{Cli, Commands, FetchArgs, PathArgs};
pub use commands::run;
