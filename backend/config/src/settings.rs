//! Settings registry: sections and typed fields that components register at startup.
//!
//! The registry describes what can be stored; values live in a [`SettingsStore`].
//! [`SettingsService`] joins the two so lookups fall back to registered defaults
//! and updates are sanitized per field type.

use crate::store::SettingsStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

/// Markup tags are stripped from text settings.
static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Runs of horizontal whitespace collapse to a single space.
static SPACE_RUN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Errors raised by the settings layer.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown settings field: {0}")]
    UnknownField(String),

    #[error("settings store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// How a field is edited and sanitized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    #[default]
    Text,
    /// Secret value; redacted whenever displayed.
    Password,
    Textarea,
    Checkbox,
}

impl FieldType {
    pub fn is_secret(self) -> bool {
        matches!(self, FieldType::Password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSection {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
}

/// A registered field. `id` doubles as the option key in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsField {
    pub id: String,
    pub section: String,
    pub title: String,
    pub field_type: FieldType,
    pub description: Option<String>,
    pub default: String,
}

impl SettingsField {
    pub fn new(
        id: impl Into<String>,
        section: impl Into<String>,
        title: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            id: id.into(),
            section: section.into(),
            title: title.into(),
            field_type,
            description: None,
            default: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }
}

/// Ordered collection of sections and fields.
#[derive(Debug, Clone, Default)]
pub struct SettingsRegistry {
    sections: Vec<SettingsSection>,
    fields: Vec<SettingsField>,
}

impl SettingsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a section. Re-registering an id replaces the earlier entry in place.
    pub fn register_section(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        description: Option<String>,
    ) {
        let section = SettingsSection {
            id: id.into(),
            title: title.into(),
            description,
        };
        match self.sections.iter_mut().find(|s| s.id == section.id) {
            Some(existing) => *existing = section,
            None => self.sections.push(section),
        }
    }

    /// Register a field. Re-registering an id replaces the earlier entry in place.
    pub fn register_field(&mut self, field: SettingsField) {
        match self.fields.iter_mut().find(|f| f.id == field.id) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn sections(&self) -> &[SettingsSection] {
        &self.sections
    }

    pub fn fields(&self) -> &[SettingsField] {
        &self.fields
    }

    pub fn fields_in<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a SettingsField> {
        self.fields.iter().filter(move |f| f.section == section)
    }

    pub fn field(&self, id: &str) -> Option<&SettingsField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Sanitize a raw value for the given field. Unknown fields use text rules.
    pub fn sanitize(&self, id: &str, raw: &str) -> String {
        let field_type = self.field(id).map(|f| f.field_type).unwrap_or_default();
        match field_type {
            FieldType::Text | FieldType::Password => sanitize_text(raw, false),
            FieldType::Textarea => sanitize_text(raw, true),
            FieldType::Checkbox => sanitize_checkbox(raw),
        }
    }
}

fn sanitize_text(raw: &str, keep_newlines: bool) -> String {
    let stripped = TAG_PATTERN.replace_all(raw, "");
    let cleaned: String = stripped
        .chars()
        .map(|c| match c {
            '\n' if keep_newlines => '\n',
            '\r' if keep_newlines => '\r',
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();

    if keep_newlines {
        cleaned
            .replace("\r\n", "\n")
            .lines()
            .map(|line| SPACE_RUN_PATTERN.replace_all(line, " ").trim().to_string())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    } else {
        SPACE_RUN_PATTERN.replace_all(&cleaned, " ").trim().to_string()
    }
}

fn sanitize_checkbox(raw: &str) -> String {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => "1".to_string(),
        _ => String::new(),
    }
}

/// Registry plus store: the facade other crates read and write settings through.
#[derive(Clone)]
pub struct SettingsService {
    registry: Arc<SettingsRegistry>,
    store: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn new(registry: SettingsRegistry, store: Arc<dyn SettingsStore>) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
        }
    }

    pub fn registry(&self) -> &SettingsRegistry {
        &self.registry
    }

    /// Stored value, else the registered default, else `None` for unregistered keys.
    pub async fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        if let Some(value) = self.store.get_option(key).await? {
            return Ok(Some(value));
        }
        Ok(self.registry.field(key).map(|f| f.default.clone()))
    }

    /// Sanitize and store a value for a registered field, returning what was stored.
    pub async fn update(&self, key: &str, raw: &str) -> Result<String, SettingsError> {
        if self.registry.field(key).is_none() {
            return Err(SettingsError::UnknownField(key.to_string()));
        }
        let value = self.registry.sanitize(key, raw);
        self.store.set_option(key, &value).await?;
        tracing::info!(key = %key, "Updated setting");
        Ok(value)
    }

    /// Every registered field with its current effective value, in registration order.
    pub async fn snapshot(&self) -> Result<Vec<(SettingsField, String)>, SettingsError> {
        let stored = self.store.all_options().await?;
        Ok(self
            .registry
            .fields()
            .iter()
            .map(|field| {
                let value = stored
                    .get(&field.id)
                    .cloned()
                    .unwrap_or_else(|| field.default.clone());
                (field.clone(), value)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySettingsStore;

    fn registry() -> SettingsRegistry {
        let mut registry = SettingsRegistry::new();
        registry.register_section("general", "General", None);
        registry.register_field(SettingsField::new("name", "general", "Name", FieldType::Text));
        registry.register_field(
            SettingsField::new("secret", "general", "Secret", FieldType::Password)
                .with_default("fallback"),
        );
        registry.register_field(SettingsField::new("notes", "general", "Notes", FieldType::Textarea));
        registry.register_field(SettingsField::new("enabled", "general", "Enabled", FieldType::Checkbox));
        registry
    }

    #[test]
    fn reregistering_replaces_in_place() {
        let mut registry = registry();
        registry.register_field(SettingsField::new("name", "general", "Display name", FieldType::Text));
        assert_eq!(registry.fields().len(), 4);
        assert_eq!(registry.fields()[0].title, "Display name");
    }

    #[test]
    fn fields_in_filters_by_section() {
        let mut registry = registry();
        registry.register_section("other", "Other", None);
        registry.register_field(SettingsField::new("x", "other", "X", FieldType::Text));
        let ids: Vec<_> = registry.fields_in("other").map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["x"]);
    }

    #[test]
    fn sanitizes_text_fields() {
        let registry = registry();
        assert_eq!(registry.sanitize("name", "  <b>abc</b>\n  def\t"), "abc def");
        assert_eq!(registry.sanitize("secret", " s3cr3t "), "s3cr3t");
    }

    #[test]
    fn textarea_keeps_line_breaks() {
        let registry = registry();
        assert_eq!(registry.sanitize("notes", "line one  \r\n <i>line</i>   two"), "line one\nline two");
    }

    #[test]
    fn checkbox_normalizes_truthy_values() {
        let registry = registry();
        assert_eq!(registry.sanitize("enabled", "on"), "1");
        assert_eq!(registry.sanitize("enabled", "TRUE"), "1");
        assert_eq!(registry.sanitize("enabled", "0"), "");
    }

    #[tokio::test]
    async fn get_falls_back_to_registered_default() {
        let service = SettingsService::new(registry(), Arc::new(InMemorySettingsStore::new()));
        assert_eq!(service.get("secret").await.unwrap().as_deref(), Some("fallback"));
        assert_eq!(service.get("name").await.unwrap().as_deref(), Some(""));
        assert_eq!(service.get("unregistered").await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_rejects_unknown_fields() {
        let service = SettingsService::new(registry(), Arc::new(InMemorySettingsStore::new()));
        let err = service.update("nope", "value").await.unwrap_err();
        assert!(matches!(err, SettingsError::UnknownField(ref k) if k == "nope"));
    }

    #[tokio::test]
    async fn update_sanitizes_before_storing() {
        let service = SettingsService::new(registry(), Arc::new(InMemorySettingsStore::new()));
        let stored = service.update("name", " <p>Tenth</p> ").await.unwrap();
        assert_eq!(stored, "Tenth");
        assert_eq!(service.get("name").await.unwrap().as_deref(), Some("Tenth"));
    }

    #[tokio::test]
    async fn snapshot_lists_all_fields_in_order() {
        let service = SettingsService::new(registry(), Arc::new(InMemorySettingsStore::new()));
        service.update("name", "x").await.unwrap();
        let snapshot = service.snapshot().await.unwrap();
        let pairs: Vec<_> = snapshot.iter().map(|(f, v)| (f.id.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![("name", "x"), ("secret", "fallback"), ("notes", ""), ("enabled", "")]
        );
    }
}
