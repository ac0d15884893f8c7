//! Startup validation of the webhook secrets.
//!
//! Nothing here blocks startup; an unconfigured secret is a legal state in
//! which the endpoint rejects requests. The report tells operators why.

use thiserror::Error;

/// A validation finding with the setting it concerns.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation findings from one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the resolved verify token and app secret.
pub fn validate(verify_token: Option<&str>, app_secret: Option<&str>) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_verify_token(verify_token, &mut report);
    validate_app_secret(app_secret, &mut report);
    report
}

fn validate_verify_token(token: Option<&str>, report: &mut ValidationReport) {
    let path = crate::provider::VERIFY_TOKEN_KEY;
    let Some(token) = token else {
        report.warn(path, "Verify token not configured; subscription handshakes will be rejected");
        return;
    };
    if token.trim() != token {
        report.error(path, "Verify token has leading or trailing whitespace; comparison is exact");
    }
}

fn validate_app_secret(secret: Option<&str>, report: &mut ValidationReport) {
    let path = crate::provider::APP_SECRET_KEY;
    let Some(secret) = secret else {
        report.warn(path, "App secret not configured; notifications will be rejected");
        return;
    };
    if secret.trim() != secret {
        report.error(path, "App secret has leading or trailing whitespace; signatures will not match");
        return;
    }
    // Facebook app secrets are 32 lowercase hex characters.
    let looks_like_app_secret =
        secret.len() == 32 && secret.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !looks_like_app_secret {
        report.warn(path, "App secret does not look like a Facebook app secret (32 hex characters)");
    }
}
