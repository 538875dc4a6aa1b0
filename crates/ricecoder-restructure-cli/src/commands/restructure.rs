// Apply a configured list of transformations

use std::path::PathBuf;

use async_trait::async_trait;
use ricecoder_restructuring::ConfigLoader;
use tracing::info;

use super::{print_report, Command, Pipeline, PipelineReport};
use crate::error::CliResult;

/// Apply the transformations of a configuration file to a codebase
pub struct RestructureCommand {
    pub solution: PathBuf,
    pub config: PathBuf,
    pub dry_run: bool,
    pub diff: bool,
}

impl RestructureCommand {
    pub fn new(solution: PathBuf, config: PathBuf) -> Self {
        Self {
            solution,
            config,
            dry_run: false,
            diff: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_diff(mut self, diff: bool) -> Self {
        self.diff = diff;
        self
    }

    /// Load the configuration and run it without printing
    pub async fn run(&self) -> CliResult<PipelineReport> {
        let config = ConfigLoader::load(&self.config)?;
        let transformations = config.transformations()?;
        info!(
            config = %self.config.display(),
            transformations = transformations.len(),
            "Loaded restructuring configuration"
        );

        let mut settings = config.settings.clone();
        settings.dry_run |= self.dry_run;

        Pipeline::new(self.solution.clone(), config.language.clone(), settings)
            .run(&transformations)
            .await
    }
}

#[async_trait]
impl Command for RestructureCommand {
    async fn execute(&self) -> CliResult<()> {
        let report = self.run().await?;
        print_report(&report, self.diff);
        Ok(())
    }
}
