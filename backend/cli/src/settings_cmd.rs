//! `shimmer settings`: inspect and rotate stored webhook credentials.
//!
//! Writes go straight to the settings file the running server re-reads on
//! every request, so a rotated secret applies without a restart.

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Subcommand;
use shimmer_config::{
    redact_secret, redact_snapshot, register_webhook_settings, SettingsRegistry, SettingsService,
    YamlSettingsStore,
};

use crate::config::ServerConfig;
use crate::terminal_output::{note_info, note_success, render_table};

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// List every registered setting, secrets redacted
    List,
    /// Print the value of one setting
    Get {
        key: String,
        /// Print secret values unredacted
        #[arg(long)]
        reveal: bool,
    },
    /// Store a new value for a setting
    Set { key: String, value: String },
}

/// Settings service over the configured YAML file, with the webhook fields registered.
pub fn settings_service(config: &ServerConfig) -> SettingsService {
    let mut registry = SettingsRegistry::new();
    register_webhook_settings(&mut registry);
    SettingsService::new(
        registry,
        Arc::new(YamlSettingsStore::new(config.settings_file.clone())),
    )
}

pub async fn run(command: SettingsCommand, config: &ServerConfig) -> Result<()> {
    let settings = settings_service(config);
    match command {
        SettingsCommand::List => list(&settings, config).await,
        SettingsCommand::Get { key, reveal } => get(&settings, &key, reveal).await,
        SettingsCommand::Set { key, value } => set(&settings, &key, &value).await,
    }
}

async fn list(settings: &SettingsService, config: &ServerConfig) -> Result<()> {
    note_info(&format!("Settings file: {}", config.settings_file.display()));
    let snapshot = settings.snapshot().await?;
    let rows: Vec<Vec<String>> = redact_snapshot(&snapshot)
        .into_iter()
        .zip(&snapshot)
        .map(|((key, shown), (field, _))| vec![key, field.title.clone(), shown])
        .collect();
    print!("{}", render_table(&["Key", "Title", "Value"], &rows));
    Ok(())
}

async fn get(settings: &SettingsService, key: &str, reveal: bool) -> Result<()> {
    let Some(field) = settings.registry().field(key) else {
        bail!("Unknown setting '{key}'. Run `shimmer settings list` to see registered keys.");
    };
    let secret = field.field_type.is_secret();
    let value = settings.get(key).await?.unwrap_or_default();
    if secret && !reveal {
        println!("{}", redact_secret(&value));
    } else {
        println!("{value}");
    }
    Ok(())
}

async fn set(settings: &SettingsService, key: &str, raw: &str) -> Result<()> {
    let stored = settings.update(key, raw).await?;
    let secret = settings
        .registry()
        .field(key)
        .is_some_and(|f| f.field_type.is_secret());
    let shown = if secret { redact_secret(&stored) } else { stored };
    note_success(&format!("{key} = {shown}"));
    Ok(())
}
