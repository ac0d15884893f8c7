//! `shimmer webhook-info`: what to enter in the Facebook app dashboard.

use anyhow::Result;
use shimmer_config::{validate, ConfigProvider};

use crate::config::ServerConfig;
use crate::terminal_output::{note_info, note_success, note_warn, BOLD, RESET};

const SETUP_STEPS: &[&str] = &[
    "Create a Facebook App at developers.facebook.com",
    "In the app, open Settings > Basic and copy the App Secret",
    "Store it: shimmer settings set shimmer_facebook_app_secret <secret>",
    "Choose a Verify Token (any random string) and store it: shimmer settings set shimmer_facebook_verify_token <token>",
    "In the app, add the \"Webhooks\" product and pick the Page object",
    "Click \"Add Callback URL\" and enter the webhook URL above",
    "Enter the same Verify Token and click \"Verify and Save\"",
    "Subscribe to the live_videos field for your page",
];

pub async fn run(config: &ServerConfig, provider: &dyn ConfigProvider) -> Result<()> {
    println!("\n{BOLD}Webhook URL{RESET}");
    match config.webhook_url() {
        Some(url) => println!("  {url}\n"),
        None => {
            println!("  <public base URL>{}\n", config.webhook_path);
            note_warn("SHIMMER_PUBLIC_URL is not set; prefix the path with your public HTTPS origin");
        }
    }

    let verify_token = provider.verify_token().await;
    let app_secret = provider.app_secret().await;
    let report = validate(verify_token.as_deref(), app_secret.as_deref());
    if report.errors.is_empty() && report.warnings.is_empty() {
        note_success("Verify token and app secret are configured");
    }
    for finding in report.errors.iter().chain(&report.warnings) {
        note_warn(&finding.to_string());
    }

    println!("\n{BOLD}Setup{RESET}");
    for (n, step) in SETUP_STEPS.iter().enumerate() {
        println!("  {}. {step}", n + 1);
    }
    println!();
    note_info(&format!(
        "Settings file: {} (FACEBOOK_WEBHOOK_VERIFY_TOKEN and FACEBOOK_APP_SECRET are used when it has no value)",
        config.settings_file.display()
    ));
    Ok(())
}
