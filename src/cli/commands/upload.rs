use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::render::{print_lines, snapshot_lines};
use crate::config::VerifierConfig;
use crate::workflow::{RunOutcome, VerificationCoordinator};

pub struct UploadCommand {
    pub file: PathBuf,
}

impl UploadCommand {
    pub fn new(file: PathBuf) -> Self {
        Self { file }
    }

    pub async fn execute(&self, config: &VerifierConfig) -> Result<()> {
        let coordinator = super::build_coordinator(config).await?;
        self.run(&coordinator).await
    }

    pub async fn run(&self, coordinator: &VerificationCoordinator) -> Result<()> {
        let contents = tokio::fs::read(&self.file)
            .await
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let file_name = self
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "certificate".to_string());

        println!("📤 Uploading {file_name} ({} bytes)...", contents.len());
        match coordinator.upload_certificate(&file_name, contents).await {
            Ok(RunOutcome::Applied(_)) => {
                println!("✅ Extraction complete");
                println!();
                print_lines(&snapshot_lines(&coordinator.snapshot().await, false));
                Ok(())
            }
            Ok(_) => {
                println!("⏭️  Upload superseded by a newer one");
                Ok(())
            }
            Err(e) => {
                println!("❌ {e}");
                Err(e.into())
            }
        }
    }
}
