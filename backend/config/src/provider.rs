//! Two-tier resolution of the Facebook webhook secrets.
//!
//! Each lookup asks the settings store first and falls back to a
//! deployment-time value when the store has nothing usable. Nothing is cached,
//! so a secret rotated through the settings store applies to the next request.

use async_trait::async_trait;
use tracing::warn;

use crate::settings::{FieldType, SettingsField, SettingsRegistry, SettingsService};

/// Settings section holding the webhook credentials.
pub const WEBHOOK_SECTION: &str = "shimmer_facebook_webhook_section";
/// Option key of the Facebook app secret.
pub const APP_SECRET_KEY: &str = "shimmer_facebook_app_secret";
/// Option key of the subscription verify token.
pub const VERIFY_TOKEN_KEY: &str = "shimmer_facebook_verify_token";

/// Deployment-time fallback for the app secret.
pub const APP_SECRET_ENV: &str = "FACEBOOK_APP_SECRET";
/// Deployment-time fallback for the verify token.
pub const VERIFY_TOKEN_ENV: &str = "FACEBOOK_WEBHOOK_VERIFY_TOKEN";

/// Register the webhook section and its two credential fields.
pub fn register_webhook_settings(registry: &mut SettingsRegistry) {
    registry.register_section(
        WEBHOOK_SECTION,
        "Facebook Webhook",
        Some(
            "Facebook App credentials used to verify the webhook subscription and \
             authenticate live video notifications."
                .to_string(),
        ),
    );
    registry.register_field(
        SettingsField::new(
            APP_SECRET_KEY,
            WEBHOOK_SECTION,
            "Facebook App Secret",
            FieldType::Password,
        )
        .with_description("Found in Facebook App Settings > Basic"),
    );
    registry.register_field(
        SettingsField::new(
            VERIFY_TOKEN_KEY,
            WEBHOOK_SECTION,
            "Webhook Verify Token",
            FieldType::Text,
        )
        .with_description(
            "A token you choose; enter the same value when configuring the webhook in Facebook",
        ),
    );
}

/// Source of the webhook secrets, resolved per request.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn verify_token(&self) -> Option<String>;

    async fn app_secret(&self) -> Option<String>;
}

/// Deployment-time secrets, immutable for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct FallbackSecrets {
    pub verify_token: Option<String>,
    pub app_secret: Option<String>,
}

impl FallbackSecrets {
    /// Read `FACEBOOK_WEBHOOK_VERIFY_TOKEN` and `FACEBOOK_APP_SECRET`.
    pub fn from_env() -> Self {
        Self {
            verify_token: std::env::var(VERIFY_TOKEN_ENV).ok(),
            app_secret: std::env::var(APP_SECRET_ENV).ok(),
        }
    }
}

/// Settings store first, then [`FallbackSecrets`].
#[derive(Clone)]
pub struct LayeredConfigProvider {
    settings: SettingsService,
    fallback: FallbackSecrets,
}

impl LayeredConfigProvider {
    pub fn new(settings: SettingsService, fallback: FallbackSecrets) -> Self {
        Self { settings, fallback }
    }

    async fn resolve(&self, key: &str, fallback: Option<&String>) -> Option<String> {
        match self.settings.get(key).await {
            Ok(Some(value)) if !value.is_empty() => return Some(value),
            Ok(_) => {}
            Err(e) => warn!(key = %key, error = %e, "Settings lookup failed; trying fallback"),
        }
        non_empty(fallback)
    }
}

#[async_trait]
impl ConfigProvider for LayeredConfigProvider {
    async fn verify_token(&self) -> Option<String> {
        self.resolve(VERIFY_TOKEN_KEY, self.fallback.verify_token.as_ref())
            .await
    }

    async fn app_secret(&self) -> Option<String> {
        self.resolve(APP_SECRET_KEY, self.fallback.app_secret.as_ref())
            .await
    }
}

/// Fixed secrets, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    pub verify_token: Option<String>,
    pub app_secret: Option<String>,
}

impl StaticConfigProvider {
    pub fn new(verify_token: Option<&str>, app_secret: Option<&str>) -> Self {
        Self {
            verify_token: verify_token.map(str::to_string),
            app_secret: app_secret.map(str::to_string),
        }
    }
}

#[async_trait]
impl ConfigProvider for StaticConfigProvider {
    async fn verify_token(&self) -> Option<String> {
        non_empty(self.verify_token.as_ref())
    }

    async fn app_secret(&self) -> Option<String> {
        non_empty(self.app_secret.as_ref())
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemorySettingsStore, SettingsStore};
    use anyhow::anyhow;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn service(store: Arc<dyn SettingsStore>) -> SettingsService {
        let mut registry = SettingsRegistry::new();
        register_webhook_settings(&mut registry);
        SettingsService::new(registry, store)
    }

    fn fallback(token: Option<&str>, secret: Option<&str>) -> FallbackSecrets {
        FallbackSecrets {
            verify_token: token.map(str::to_string),
            app_secret: secret.map(str::to_string),
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl SettingsStore for BrokenStore {
        async fn get_option(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow!("disk unavailable"))
        }

        async fn set_option(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow!("disk unavailable"))
        }

        async fn all_options(&self) -> anyhow::Result<BTreeMap<String, String>> {
            Err(anyhow!("disk unavailable"))
        }
    }

    #[test]
    fn registers_section_and_fields() {
        let mut registry = SettingsRegistry::new();
        register_webhook_settings(&mut registry);
        assert_eq!(registry.sections()[0].id, WEBHOOK_SECTION);
        assert_eq!(registry.fields_in(WEBHOOK_SECTION).count(), 2);
        assert!(registry.field(APP_SECRET_KEY).unwrap().field_type.is_secret());
        assert!(!registry.field(VERIFY_TOKEN_KEY).unwrap().field_type.is_secret());
    }

    #[tokio::test]
    async fn settings_value_wins_over_fallback() {
        let store = Arc::new(InMemorySettingsStore::with_options([
            (VERIFY_TOKEN_KEY, "from-settings"),
            (APP_SECRET_KEY, "secret-from-settings"),
        ]));
        let provider =
            LayeredConfigProvider::new(service(store), fallback(Some("from-env"), Some("env-secret")));
        assert_eq!(provider.verify_token().await.as_deref(), Some("from-settings"));
        assert_eq!(provider.app_secret().await.as_deref(), Some("secret-from-settings"));
    }

    #[tokio::test]
    async fn empty_setting_uses_fallback() {
        let store = Arc::new(InMemorySettingsStore::with_options([(VERIFY_TOKEN_KEY, "")]));
        let provider = LayeredConfigProvider::new(service(store), fallback(Some("from-env"), None));
        assert_eq!(provider.verify_token().await.as_deref(), Some("from-env"));
        assert_eq!(provider.app_secret().await, None);
    }

    #[tokio::test]
    async fn empty_fallback_is_absent() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = LayeredConfigProvider::new(service(store), fallback(Some(""), Some("")));
        assert_eq!(provider.verify_token().await, None);
        assert_eq!(provider.app_secret().await, None);
    }

    #[tokio::test]
    async fn rotation_applies_to_next_lookup() {
        let store = Arc::new(InMemorySettingsStore::new());
        let settings = service(store.clone());
        let provider = LayeredConfigProvider::new(settings.clone(), FallbackSecrets::default());

        settings.update(APP_SECRET_KEY, "old").await.unwrap();
        assert_eq!(provider.app_secret().await.as_deref(), Some("old"));
        settings.update(APP_SECRET_KEY, "new").await.unwrap();
        assert_eq!(provider.app_secret().await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn store_errors_fall_back() {
        let provider =
            LayeredConfigProvider::new(service(Arc::new(BrokenStore)), fallback(None, Some("env-secret")));
        assert_eq!(provider.app_secret().await.as_deref(), Some("env-secret"));
        assert_eq!(provider.verify_token().await, None);
    }

    #[tokio::test]
    async fn static_provider_treats_empty_as_absent() {
        let provider = StaticConfigProvider::new(Some(""), Some("s"));
        assert_eq!(provider.verify_token().await, None);
        assert_eq!(provider.app_secret().await.as_deref(), Some("s"));
    }
}
