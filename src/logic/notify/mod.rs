//! Notification Module - Alert fan-out
//!
//! Every sink implements `NotificationSink`. A sink failure is isolated:
//! it is logged and counted, other sinks still run, and alert creation
//! is never rolled back.
//!
//! # Sinks
//! - `log_sink.rs`: System log line
//! - `summary.rs`: Consolidated `alert_summary.txt`
//! - `email.rs`: RFC 5322 message dropped into an MTA pickup directory
//! - `webhook.rs`: Slack / Discord / generic JSON webhook

pub mod email;
pub mod log_sink;
pub mod summary;
pub mod webhook;

pub use email::EmailSink;
pub use log_sink::LogSink;
pub use summary::SummaryFileSink;
pub use webhook::{WebhookPlatform, WebhookSink};

use crate::error::NotifyError;
use crate::logic::alert::Alert;
use crate::logic::config::{AlertConfig, NotificationMethod};

pub trait NotificationSink: Send + Sync {
    /// Short name used in logs and stats
    fn name(&self) -> &str;

    fn notify(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Build the configured sinks, in configuration order.
pub fn build_sinks(config: &AlertConfig) -> Vec<Box<dyn NotificationSink>> {
    let mut sinks: Vec<Box<dyn NotificationSink>> = Vec::new();

    for method in &config.notification_methods {
        match method {
            NotificationMethod::Log => sinks.push(Box::new(LogSink)),
            NotificationMethod::File => {
                sinks.push(Box::new(SummaryFileSink::in_dir(&config.alert_log_dir)))
            }
            NotificationMethod::Email => sinks.push(Box::new(EmailSink::new(
                config.admin_email.clone(),
                &config.email_outbox_dir,
            ))),
            NotificationMethod::Webhook => match &config.webhook_url {
                Some(url) => sinks.push(Box::new(
                    WebhookSink::new("default", url, WebhookPlatform::detect(url))
                        .with_min_severity(config.webhook_min_severity),
                )),
                None => log::warn!("Webhook notification requested but no URL configured"),
            },
        }
    }

    sinks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::alert::test_support::sample_alert;
    use crate::logic::alert::Severity;
    use std::net::TcpListener;

    /// URL on a local port with nothing listening
    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/hook", addr)
    }

    #[test]
    fn test_build_sinks_follows_config_order() {
        let config = AlertConfig {
            notification_methods: vec![
                NotificationMethod::File,
                NotificationMethod::Log,
                NotificationMethod::Email,
            ],
            ..Default::default()
        };

        let names: Vec<String> = build_sinks(&config).iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["file", "log", "email"]);
    }

    #[test]
    fn test_webhook_without_url_is_skipped() {
        let config = AlertConfig {
            notification_methods: vec![NotificationMethod::Webhook],
            webhook_url: None,
            ..Default::default()
        };
        assert!(build_sinks(&config).is_empty());
    }

    #[test]
    fn test_webhook_honours_configured_min_severity() {
        let url = closed_port_url();
        let filtered = AlertConfig {
            notification_methods: vec![NotificationMethod::Webhook],
            webhook_url: Some(url.clone()),
            webhook_min_severity: Severity::Critical,
            ..Default::default()
        };
        let sinks = build_sinks(&filtered);
        assert_eq!(sinks.len(), 1);
        // MEDIUM is below the cutoff: skipped, never sent
        assert!(sinks[0].notify(&sample_alert(0.6)).is_ok());
        // CRITICAL goes out and fails against the closed port
        assert!(sinks[0].notify(&sample_alert(0.9)).is_err());

        let unfiltered = AlertConfig {
            notification_methods: vec![NotificationMethod::Webhook],
            webhook_url: Some(url),
            ..Default::default()
        };
        assert!(build_sinks(&unfiltered)[0].notify(&sample_alert(0.6)).is_err());
    }
}
