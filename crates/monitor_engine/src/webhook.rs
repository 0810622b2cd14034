use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};

use crate::report::{NewEndpoints, ReportError, Reporter};

/// Posts a count-only embed to a Discord webhook.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    url: String,
    client: reqwest::Client,
}

impl DiscordWebhook {
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(url: impl Into<String>) -> Result<Self, ReportError> {
        Self::with_timeout(url, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ReportError::Webhook(err.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

pub fn discord_payload(hostname: &str, new_count: usize) -> Value {
    let noun = if new_count == 1 { "endpoint" } else { "endpoints" };
    json!({
        "content": "",
        "embeds": [{
            "title": format!("New Endpoints Found - {hostname}"),
            "description": format!("{new_count} new {noun} found"),
        }]
    })
}

#[async_trait::async_trait]
impl Reporter for DiscordWebhook {
    fn name(&self) -> &'static str {
        "discord-webhook"
    }

    async fn report(&self, new: NewEndpoints<'_>) -> Result<(), ReportError> {
        let payload = discord_payload(new.target.hostname(), new.endpoints.len());
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await
            .map_err(|err| ReportError::Webhook(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::WebhookStatus(status.as_u16()));
        }
        Ok(())
    }
}
