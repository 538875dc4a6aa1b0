// Command routing and dispatch

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::*;
use crate::error::CliResult;

/// rice-restructure - conflict-checked codebase restructuring
#[derive(Parser, Debug)]
#[command(name = "rice-restructure")]
#[command(bin_name = "rice-restructure")]
#[command(about = "Move namespaces, extract classes and scaffold architecture layers safely")]
#[command(
    long_about = "rice-restructure applies namespace moves, renames, class extractions and layer generation to a codebase.\n\nEvery transformation is checked against the dependency graph before anything is staged, deletions are deferred to the final commit, and a backup of the tree is taken first.\n\nQuick Start:\n  • rice-restructure restructure --solution . --config restructure.json --dry-run\n  • rice-restructure generate --solution . --template clean\n  • rice-restructure backups --solution .\n  • rice-restructure restore --solution ."
)]
#[command(version)]
#[command(author = "RiceCoder Contributors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimize output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Apply the transformations listed in a configuration file
    #[command(about = "Apply the transformations listed in a JSON or YAML configuration file")]
    Restructure {
        /// Root folder of the codebase
        #[arg(long, value_name = "PATH")]
        solution: PathBuf,

        /// Configuration file (.json, .yaml or .yml)
        #[arg(long, value_name = "FILE")]
        config: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Print unified diffs of every changed file
        #[arg(long)]
        diff: bool,
    },

    /// Scaffold the layers of an architecture template
    #[command(about = "Generate the projects of an architecture template")]
    Generate {
        /// Root folder of the codebase
        #[arg(long, value_name = "PATH")]
        solution: PathBuf,

        /// Template name (clean, clean-architecture)
        #[arg(long, value_name = "NAME")]
        template: String,

        /// Configuration file providing language and engine settings
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Print unified diffs of every changed file
        #[arg(long)]
        diff: bool,
    },

    /// Restore the codebase from a backup snapshot
    #[command(about = "Restore the codebase from a backup snapshot (latest by default)")]
    Restore {
        /// Root folder of the codebase
        #[arg(long, value_name = "PATH")]
        solution: PathBuf,

        /// Snapshot id as listed by `backups`
        #[arg(long, value_name = "ID")]
        backup: Option<String>,
    },

    /// List backup snapshots
    #[command(about = "List the backup snapshots of a codebase, oldest first")]
    Backups {
        /// Root folder of the codebase
        #[arg(long, value_name = "PATH")]
        solution: PathBuf,

        /// Print snapshots as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Command router
pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments and route to appropriate handler
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();

        // Initialize logging based on CLI flags
        crate::logging::init_logging(cli.verbose, cli.quiet);

        Self::execute(&cli).await
    }

    /// Execute a command
    pub async fn execute(cli: &Cli) -> CliResult<()> {
        match &cli.command {
            Commands::Restructure {
                solution,
                config,
                dry_run,
                diff,
            } => {
                let cmd = RestructureCommand::new(solution.clone(), config.clone())
                    .with_dry_run(*dry_run)
                    .with_diff(*diff);
                cmd.execute().await
            }
            Commands::Generate {
                solution,
                template,
                config,
                dry_run,
                diff,
            } => {
                let cmd = GenerateCommand::new(solution.clone(), template.clone())
                    .with_config(config.clone())
                    .with_dry_run(*dry_run)
                    .with_diff(*diff);
                cmd.execute().await
            }
            Commands::Restore { solution, backup } => {
                let cmd = RestoreCommand::new(solution.clone()).with_backup(backup.clone());
                cmd.execute().await
            }
            Commands::Backups { solution, json } => {
                let cmd = BackupsCommand::new(solution.clone()).with_json(*json);
                cmd.execute().await
            }
        }
    }
}
