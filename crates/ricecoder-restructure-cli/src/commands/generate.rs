// Scaffold an architecture template

use std::path::PathBuf;

use async_trait::async_trait;
use ricecoder_restructuring::{ArchitectureTemplate, ConfigLoader, RestructuringConfig};
use tracing::info;

use super::{print_report, Command, Pipeline, PipelineReport};
use crate::error::CliResult;

/// Generate every layer of a named architecture template
pub struct GenerateCommand {
    pub solution: PathBuf,
    pub template: String,
    pub config: Option<PathBuf>,
    pub dry_run: bool,
    pub diff: bool,
}

impl GenerateCommand {
    pub fn new(solution: PathBuf, template: String) -> Self {
        Self {
            solution,
            template,
            config: None,
            dry_run: false,
            diff: false,
        }
    }

    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_diff(mut self, diff: bool) -> Self {
        self.diff = diff;
        self
    }

    /// Expand the template and run it without printing
    ///
    /// Only the language profile and engine settings of `--config` are used;
    /// its transformation list is ignored.
    pub async fn run(&self) -> CliResult<PipelineReport> {
        let template = ArchitectureTemplate::by_name(&self.template)?;
        let transformations = template.transformations()?;

        let config = match &self.config {
            Some(path) => ConfigLoader::load(path)?,
            None => RestructuringConfig::default(),
        };
        let mut settings = config.settings.clone();
        settings.dry_run |= self.dry_run;

        info!(template = template.name, layers = transformations.len(), "Generating template");
        Pipeline::new(self.solution.clone(), config.language.clone(), settings)
            .run(&transformations)
            .await
    }
}

#[async_trait]
impl Command for GenerateCommand {
    async fn execute(&self) -> CliResult<()> {
        let report = self.run().await?;
        print_report(&report, self.diff);
        Ok(())
    }
}
