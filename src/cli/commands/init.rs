//! Implementation of the `rtstep init` command.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;

use crate::cli::output::{output, CommandOutput};
use crate::cli::types::InitArgs;
use crate::domain::models::Config;
use crate::infrastructure::config::CONFIG_DIR;

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        format!("{}\n  {}", self.message, self.config_path.display())
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let output_data = write_default_config(&args).await?;
    output(&output_data, json_mode);
    Ok(())
}

/// Write the default configuration unless one exists and `--force` is not set.
pub async fn write_default_config(args: &InitArgs) -> Result<InitOutput> {
    let config_dir = args.path.join(CONFIG_DIR);
    let config_path = config_dir.join("config.yaml");

    if config_path.exists() && !args.force {
        return Ok(InitOutput {
            success: false,
            message: "Configuration already exists. Use --force to overwrite.".to_string(),
            config_path,
        });
    }

    fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let yaml = serde_yaml::to_string(&Config::default())
        .context("Failed to serialize default configuration")?;
    fs::write(&config_path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    Ok(InitOutput {
        success: true,
        message: if args.force {
            "Configuration reset to defaults.".to_string()
        } else {
            "Configuration written.".to_string()
        },
        config_path,
    })
}
