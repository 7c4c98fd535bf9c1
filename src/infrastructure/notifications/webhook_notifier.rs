use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::domain::repositories::notifications::MembershipNotifier;

const CONTENT_LIMIT: usize = 2000;

/// Pushes join-request notices to a chat webhook (Discord-shaped payload).
pub struct WebhookMembershipNotifier {
    webhook_url: Url,
    client: Client,
}

impl WebhookMembershipNotifier {
    pub fn new(webhook_url: Url) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3))
            .build()
            .expect("reqwest client must build");

        Self {
            webhook_url,
            client,
        }
    }
}

#[async_trait]
impl MembershipNotifier for WebhookMembershipNotifier {
    async fn notify_join_request(
        &self,
        band_id: Uuid,
        requester_name: String,
        instruments: Vec<String>,
    ) -> Result<()> {
        let content = truncate(format!(
            "**Join request** for band `{}`\n> {} ({})",
            band_id,
            requester_name.trim(),
            instruments.join(", ")
        ));

        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({ "content": content }))
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "membership webhook returned non-success status: {}",
            response.status()
        ))
    }
}

fn sanitize_reqwest_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("membership webhook request timed out");
    }
    if error.is_connect() {
        return anyhow!("membership webhook connection failed");
    }
    anyhow!("membership webhook request failed")
}

fn truncate(mut content: String) -> String {
    const SUFFIX: &str = "\n… (truncated)";

    if content.chars().count() <= CONTENT_LIMIT {
        return content;
    }

    let allowed = CONTENT_LIMIT.saturating_sub(SUFFIX.chars().count());
    let truncated: String = content.chars().take(allowed).collect();
    content.clear();
    content.push_str(&truncated);
    content.push_str(SUFFIX);
    content
}
