use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::VerifierConfig;
use crate::services::ReportFormat;
use crate::workflow::VerificationCoordinator;

pub struct ExportCommand {
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
}

impl ExportCommand {
    pub fn new(format: ReportFormat, output: Option<PathBuf>) -> Self {
        Self { format, output }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.format.file_name()))
    }

    pub async fn execute(&self, config: &VerifierConfig) -> Result<()> {
        let coordinator = super::build_coordinator(config).await?;
        self.run(&coordinator).await
    }

    pub async fn run(&self, coordinator: &VerificationCoordinator) -> Result<()> {
        let Some(report) = coordinator.export_report(self.format).await? else {
            println!("📭 Nothing to export: no certificate uploaded yet");
            return Ok(());
        };

        let path = self.output_path();
        tokio::fs::write(&path, &report)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("📑 Report saved to {} ({} bytes)", path.display(), report.len());
        Ok(())
    }
}
