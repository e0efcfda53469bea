use anyhow::Result;

use crate::cli::render::{print_lines, snapshot_lines};
use crate::config::VerifierConfig;

pub struct ShowCommand {
    pub raw_text: bool,
}

impl ShowCommand {
    pub fn new(raw_text: bool) -> Self {
        Self { raw_text }
    }

    pub async fn execute(&self, config: &VerifierConfig) -> Result<()> {
        let coordinator = super::build_coordinator(config).await?;
        print_lines(&snapshot_lines(&coordinator.snapshot().await, self.raw_text));
        Ok(())
    }
}
