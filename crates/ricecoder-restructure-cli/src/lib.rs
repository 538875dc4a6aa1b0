// rice-restructure CLI library

pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod router;

pub use commands::{Command, Pipeline, PipelineReport};
pub use error::{CliError, CliResult};
pub use logging::{init_logging, VerbosityLevel};
pub use router::{Cli, CommandRouter, Commands};
