//! Settings file read/write with atomic backup rotation.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Default settings file name within the config directory.
const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// Number of rolling backups to keep.
const MAX_BACKUPS: usize = 5;

/// Resolve the Shimmer config directory.
/// Priority: `SHIMMER_CONFIG_DIR` env > `~/.shimmer/` > `./.shimmer`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SHIMMER_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".shimmer");
    }
    PathBuf::from(".shimmer")
}

/// Resolve the full path to the settings file.
pub fn settings_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILE_NAME)
}

/// Load the flat option map from disk.
///
/// Returns an empty map if the file doesn't exist or is blank. Scalar values
/// (numbers, booleans) are kept as their textual form; nested values are skipped.
pub async fn load_settings(path: &Path) -> Result<BTreeMap<String, String>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Settings file does not exist; using empty store");
        return Ok(BTreeMap::new());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let parsed: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse settings YAML at: {}", path.display()))?;

    let mut options = BTreeMap::new();
    for (key, value) in parsed {
        match value {
            serde_yaml::Value::String(s) => {
                options.insert(key, s);
            }
            serde_yaml::Value::Number(n) => {
                options.insert(key, n.to_string());
            }
            serde_yaml::Value::Bool(b) => {
                options.insert(key, if b { "1".to_string() } else { String::new() });
            }
            serde_yaml::Value::Null => {}
            _ => warn!(key = %key, "Ignoring non-scalar settings value"),
        }
    }
    Ok(options)
}

/// Write the option map to disk atomically (write to temp file, rename).
///
/// Creates a rolling backup of the previous file before overwriting.
pub async fn write_settings(options: &BTreeMap<String, String>, path: &Path) -> Result<()> {
    // Ensure parent directory exists.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }
    }

    if fs::try_exists(path).await.unwrap_or(false) {
        rotate_backups(path).await?;
    }

    let yaml = serde_yaml::to_string(options).context("Failed to serialize settings to YAML")?;

    let tmp_path = with_suffix(path, ".tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp settings: {}", tmp_path.display()))?;
    restrict_permissions(&tmp_path).await?;

    fs::rename(&tmp_path, path).await.with_context(|| {
        format!("Failed to rename temp settings to: {}", path.display())
    })?;

    info!(path = %path.display(), "Wrote settings");
    Ok(())
}

/// Rotate backup files: settings.yaml.bak.1 → .bak.2 → ... → .bak.N
async fn rotate_backups(path: &Path) -> Result<()> {
    for i in (1..MAX_BACKUPS).rev() {
        let old = with_suffix(path, &format!(".bak.{i}"));
        let new = with_suffix(path, &format!(".bak.{}", i + 1));
        if fs::try_exists(&old).await.unwrap_or(false) {
            if let Err(e) = fs::rename(&old, &new).await {
                warn!("Failed to rotate backup {}: {}", old.display(), e);
            }
        }
    }

    let bak = with_suffix(path, ".bak.1");
    match fs::copy(path, &bak).await {
        Ok(_) => restrict_permissions(&bak).await?,
        Err(e) => warn!("Failed to create backup {}: {}", bak.display(), e),
    }

    Ok(())
}

/// The settings file holds the app secret: owner read/write only.
#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .with_context(|| format!("Failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Append `suffix` to the file name of `path`.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
