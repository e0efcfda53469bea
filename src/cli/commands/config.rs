use anyhow::{anyhow, Result};
use std::path::Path;

use crate::config::{VerifierConfig, CONFIG_FILE_NAME};

pub struct ConfigInitCommand {
    pub force: bool,
}

impl ConfigInitCommand {
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    pub fn execute(&self, config: &VerifierConfig) -> Result<()> {
        self.write_to(config, Path::new(CONFIG_FILE_NAME))
    }

    pub fn write_to(&self, config: &VerifierConfig, path: &Path) -> Result<()> {
        if path.exists() && !self.force {
            return Err(anyhow!(
                "{} already exists. Use --force to overwrite it.",
                path.display()
            ));
        }

        config.save_to_file(path)?;
        println!("⚙️  Configuration written to {}", path.display());
        println!("   🔗 Service: {}", config.service.base_url);
        println!(
            "   💾 Cache: {}",
            if config.cache.enabled {
                config.cache.path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        Ok(())
    }
}
