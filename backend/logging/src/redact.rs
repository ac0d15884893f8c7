//! Log Redaction Layer
//!
//! Scrubs webhook signatures and bearer tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static HUB_SIGNATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsha(?:1|256)=[0-9a-f]+").unwrap());
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = HUB_SIGNATURE_RE.replace_all(input, "[REDACTED_SIGNATURE]");
    BEARER_RE
        .replace_all(&redacted, "[REDACTED_TOKEN]")
        .into_owned()
}
