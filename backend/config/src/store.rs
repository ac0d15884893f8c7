//! Settings stores: where option values live.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

use crate::io::{load_settings, write_settings};

/// Key/value option storage.
///
/// Implementations must be safe for concurrent reads; lookups are made per
/// request and must not cache across calls so rotated values apply immediately.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Stored value for `key`, if any.
    async fn get_option(&self, key: &str) -> Result<Option<String>>;

    async fn set_option(&self, key: &str, value: &str) -> Result<()>;

    async fn all_options(&self) -> Result<BTreeMap<String, String>>;
}

/// Process-local store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    options: RwLock<HashMap<String, String>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options<I, K, V>(options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            options: RwLock::new(
                options
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_option(&self, key: &str) -> Result<Option<String>> {
        Ok(self.options.read().await.get(key).cloned())
    }

    async fn set_option(&self, key: &str, value: &str) -> Result<()> {
        self.options
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn all_options(&self) -> Result<BTreeMap<String, String>> {
        Ok(self
            .options
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// Flat YAML file store. Every read goes to disk.
#[derive(Debug)]
pub struct YamlSettingsStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl YamlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for YamlSettingsStore {
    async fn get_option(&self, key: &str) -> Result<Option<String>> {
        Ok(load_settings(&self.path).await?.remove(key))
    }

    async fn set_option(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut options = load_settings(&self.path).await?;
        options.insert(key.to_string(), value.to_string());
        write_settings(&options, &self.path).await
    }

    async fn all_options(&self) -> Result<BTreeMap<String, String>> {
        load_settings(&self.path).await
    }
}
