//! Webhook sink
//!
//! Posts alerts to Slack, Discord or a generic JSON endpoint.
//!
//! Features:
//! - Per-platform formatting
//! - Severity filtering (below `min_severity` is skipped, not failed)
//! - Bounded request time, so a stalled endpoint cannot hold up the alert path

use std::time::Duration;

use super::NotificationSink;
use crate::error::NotifyError;
use crate::logic::alert::{Alert, Severity};

/// Overall per-request limit (connect + send + response)
const WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// Webhook platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookPlatform {
    Slack,
    Discord,
    Generic,
}

impl WebhookPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookPlatform::Slack => "slack",
            WebhookPlatform::Discord => "discord",
            WebhookPlatform::Generic => "generic",
        }
    }

    /// Guess the platform from the webhook host.
    pub fn detect(url: &str) -> Self {
        let url = url.to_lowercase();
        if url.contains("hooks.slack.com") {
            WebhookPlatform::Slack
        } else if url.contains("discord.com/api/webhooks") || url.contains("discordapp.com/api/webhooks") {
            WebhookPlatform::Discord
        } else {
            WebhookPlatform::Generic
        }
    }
}

pub struct WebhookSink {
    name: String,
    url: String,
    platform: WebhookPlatform,
    min_severity: Severity,
    agent: ureq::Agent,
}

impl WebhookSink {
    pub fn new(name: &str, url: &str, platform: WebhookPlatform) -> Self {
        Self {
            name: format!("webhook:{}", name),
            url: url.to_string(),
            platform,
            min_severity: Severity::Low,
            agent: build_agent(Duration::from_secs(WEBHOOK_TIMEOUT_SECS)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Format payload for the configured platform
    pub fn format_payload(&self, alert: &Alert) -> String {
        match self.platform {
            WebhookPlatform::Slack => format_slack(alert),
            WebhookPlatform::Discord => format_discord(alert),
            WebhookPlatform::Generic => format_generic(alert),
        }
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

fn title(alert: &Alert) -> String {
    format!("[{}] Crisis alert {}", alert.severity, alert.alert_id)
}

fn message(alert: &Alert) -> String {
    format!(
        "Sustained distress detected: risk {:.3} over {} samples ({:.0} min window).",
        alert.risk_score, alert.window_snapshot.sample_count, alert.window_snapshot.window_minutes
    )
}

fn format_slack(alert: &Alert) -> String {
    serde_json::json!({
        "blocks": [
            {
                "type": "header",
                "text": { "type": "plain_text", "text": title(alert), "emoji": true }
            },
            {
                "type": "section",
                "text": { "type": "mrkdwn", "text": message(alert) }
            },
            {
                "type": "section",
                "fields": [
                    { "type": "mrkdwn", "text": format!("*Severity:* {}", alert.severity) },
                    { "type": "mrkdwn", "text": format!("*Host:* {}", alert.machine_info.hostname) },
                    { "type": "mrkdwn", "text": format!("*Evidence:* {} screenshots", alert.evidence.screenshot_refs.len()) }
                ]
            }
        ],
        "attachments": [{ "color": alert.severity.color() }]
    })
    .to_string()
}

fn format_discord(alert: &Alert) -> String {
    serde_json::json!({
        "embeds": [{
            "title": title(alert),
            "description": message(alert),
            "color": u32::from_str_radix(&alert.severity.color()[1..], 16).unwrap_or(0),
            "fields": [
                { "name": "Severity", "value": alert.severity.as_str(), "inline": true },
                { "name": "Host", "value": alert.machine_info.hostname, "inline": true }
            ],
            "timestamp": alert.created_at.to_rfc3339()
        }]
    })
    .to_string()
}

fn format_generic(alert: &Alert) -> String {
    serde_json::to_string(alert).unwrap_or_else(|_| "{}".to_string())
}

impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        if alert.severity < self.min_severity {
            log::debug!(
                "{} skipped: {} below {}",
                self.name,
                alert.severity,
                self.min_severity
            );
            return Ok(());
        }

        let body = self.format_payload(alert);
        match self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(&body)
        {
            Ok(resp) => {
                log::info!("Alert sent to {} ({}): {}", self.name, self.platform.as_str(), resp.status());
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to send alert to {}: {}", self.name, e);
                Err(NotifyError::Network(e.to_string()))
            }
        }
    }
}
