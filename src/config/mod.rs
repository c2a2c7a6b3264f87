pub mod cli;
pub mod consts;

pub use cli::{AmmCommand, CliArgs, CliConfig, Command, NetworkCommand};
