use anyhow::Result;
use std::path::PathBuf;

use crate::cli::commands::Command;
use crate::config::DeliveryConsoleConfig;

pub struct ConfigCommand {
    pub write: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn new() -> Self {
        Self { write: None }
    }

    pub fn with_write(mut self, write: Option<PathBuf>) -> Self {
        self.write = write;
        self
    }

    pub fn run(&self, config: &DeliveryConsoleConfig) -> Result<()> {
        println!("⚙️  EFFECTIVE CONFIGURATION");
        println!("──────────────────────────");
        print!("{}", toml::to_string_pretty(config)?);

        if let Some(path) = &self.write {
            config.save_to_file(path)?;
            println!();
            println!("✅ Written to {}", path.display());
        }
        Ok(())
    }
}

impl Default for ConfigCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for ConfigCommand {
    async fn execute(&self) -> Result<()> {
        self.run(crate::config::config()?)
    }
}
