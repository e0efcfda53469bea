use anyhow::Result;
use std::sync::Arc;

use crate::cache::ResultCache;
use crate::config::VerifierConfig;
use crate::fs::StandardFileSystem;
use crate::services::{HttpVerificationServices, VerificationServices};
use crate::workflow::VerificationCoordinator;

pub mod config;
pub mod export;
pub mod history;
pub mod session;
pub mod show;
pub mod upload;

pub fn build_services(config: &VerifierConfig) -> Result<Arc<dyn VerificationServices>> {
    Ok(Arc::new(HttpVerificationServices::from_config(&config.service)?))
}

/// Coordinator seeded from the last cached upload
pub async fn build_coordinator(config: &VerifierConfig) -> Result<VerificationCoordinator> {
    let services = build_services(config)?;
    let cache = config
        .cache
        .enabled
        .then(|| ResultCache::new(Arc::new(StandardFileSystem), config.cache.path.clone()));

    let coordinator = VerificationCoordinator::new(services, cache);
    coordinator.start().await;
    Ok(coordinator)
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("🎯 Employment Verifier - Certificate Verification Workflow");
    println!();
    println!("To get started:");
    println!("  📤 employment-verifier upload <file>   # Extract fields from a certificate");
    println!("  📄 employment-verifier show            # Review extracted fields");
    println!("  💬 employment-verifier session         # Cross-check and send verification");
    println!("  📚 employment-verifier history list    # Track sent verifications");
    println!();
    println!("Admin commands:");
    println!("  ⚙️  employment-verifier config init     # Write a configuration file");
    println!();
    println!("💡 Start with 'employment-verifier upload <file>'!");
    Ok(())
}
