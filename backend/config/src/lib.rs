//! `shimmer-config`: settings and secret resolution for the webhook receiver.
//!
//! Provides:
//! - A settings registry (sections and typed fields with defaults and sanitizers)
//! - Settings stores: in-memory and a YAML file re-read on every lookup
//! - Atomic YAML writes with rolling backups
//! - The two-tier config provider (settings store, then deployment-time fallback)
//! - Redaction of secret values for display
//! - Startup validation of the webhook secrets

pub mod io;
pub mod provider;
pub mod redact;
pub mod settings;
pub mod store;
pub mod validation;

// Re-export most-used types at crate root.
pub use io::{config_dir, load_settings, settings_file_path, write_settings};
pub use provider::{
    register_webhook_settings, ConfigProvider, FallbackSecrets, LayeredConfigProvider,
    StaticConfigProvider, APP_SECRET_ENV, APP_SECRET_KEY, VERIFY_TOKEN_ENV, VERIFY_TOKEN_KEY,
    WEBHOOK_SECTION,
};
pub use redact::{redact_secret, redact_snapshot};
pub use settings::{
    FieldType, SettingsError, SettingsField, SettingsRegistry, SettingsSection, SettingsService,
};
pub use store::{InMemorySettingsStore, SettingsStore, YamlSettingsStore};
pub use validation::{validate, ConfigValidationError, ValidationReport};
