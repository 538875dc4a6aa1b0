// Logging and verbosity control

use tracing::Level;

/// Verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Quiet mode - errors only
    Quiet,
    /// Normal mode - lifecycle events
    Normal,
    /// Verbose mode - per-step detail
    Verbose,
}

impl VerbosityLevel {
    /// Resolve the level from CLI flags; `quiet` wins over `verbose`
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Maximum tracing level shown at this verbosity
    pub fn max_level(self) -> Level {
        match self {
            VerbosityLevel::Quiet => Level::ERROR,
            VerbosityLevel::Normal => Level::INFO,
            VerbosityLevel::Verbose => Level::DEBUG,
        }
    }
}

/// Initialize logging based on CLI flags
///
/// Log lines go to stderr so command output on stdout stays clean. Calling
/// this twice is harmless; the first subscriber stays installed.
pub fn init_logging(verbose: bool, quiet: bool) -> VerbosityLevel {
    let level = VerbosityLevel::from_flags(verbose, quiet);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level.max_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    level
}
