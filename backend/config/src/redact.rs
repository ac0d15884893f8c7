//! Settings redaction: produce safe-to-display snapshots by masking secrets.
//!
//! Password fields are always masked; other fields are masked when their key
//! names a credential.

use crate::settings::SettingsField;

/// Key fragments that mark a value as a credential.
static SENSITIVE_KEY_PARTS: &[&str] = &[
    "secret",
    "token",
    "password",
    "api_key",
    "apikey",
    "private_key",
];

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEY_PARTS.iter().any(|part| key.contains(part))
}

/// Mask a secret, keeping the first 4 characters as a hint when the value is long enough.
pub fn redact_secret(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    if value.chars().count() > 8 {
        format!("{}***", value.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

/// Redact a settings snapshot into `(key, display value)` pairs.
pub fn redact_snapshot(snapshot: &[(SettingsField, String)]) -> Vec<(String, String)> {
    snapshot
        .iter()
        .map(|(field, value)| {
            let shown = if field.field_type.is_secret() || is_sensitive_key(&field.id) {
                redact_secret(value)
            } else {
                value.clone()
            };
            (field.id.clone(), shown)
        })
        .collect()
}
