//! Settings file loading and the command line of the `friendship` binary.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
