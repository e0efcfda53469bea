use anyhow::Result;

use crate::cli::render::{history_lines, print_lines};
use crate::config::VerifierConfig;
use crate::history::{HistoryManager, UpdateOutcome, VerificationStatus};

pub struct HistoryListCommand;

impl HistoryListCommand {
    pub async fn execute(&self, config: &VerifierConfig) -> Result<()> {
        let mut manager = HistoryManager::new(super::build_services(config)?);
        println!("📚 VERIFICATION HISTORY");
        println!("=======================");
        // the error is rendered through the view
        let _ = manager.refresh().await;
        print_lines(&history_lines(manager.view()));
        Ok(())
    }
}

pub struct HistoryUpdateCommand {
    pub id: u64,
    pub status: Option<VerificationStatus>,
    pub hr_reply: String,
}

impl HistoryUpdateCommand {
    pub fn new(id: u64, status: Option<VerificationStatus>, hr_reply: String) -> Self {
        Self { id, status, hr_reply }
    }

    pub async fn execute(&self, config: &VerifierConfig) -> Result<()> {
        let mut manager = HistoryManager::new(super::build_services(config)?);
        run_update(&mut manager, self.id, self.status, &self.hr_reply).await
    }
}

pub async fn run_update(
    manager: &mut HistoryManager,
    id: u64,
    status: Option<VerificationStatus>,
    hr_reply: &str,
) -> Result<()> {
    match manager.update_status(id, status, hr_reply).await {
        Ok(UpdateOutcome::Skipped) => {
            println!("⏭️  No status given; nothing updated");
            Ok(())
        }
        Ok(UpdateOutcome::Updated) => {
            println!("✅ Verification #{id} updated");
            println!();
            print_lines(&history_lines(manager.view()));
            Ok(())
        }
        Err(e) => {
            println!("❌ {e}");
            Err(e.into())
        }
    }
}
