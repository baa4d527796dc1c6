// In crates/notifier/src/telegram.rs

use crate::{Error, Notifier, Result};
use app_config::TelegramSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Credentials {
    bot_token: String,
    chat_id: String,
}

/// Sends messages through the Telegram Bot API `sendMessage` method.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http_client: Client,
    api_base_url: String,
    /// `None` when the token or chat id is missing; every send then fails fast.
    credentials: Option<Credentials>,
    /// The configured chat id, reported even without a token.
    recipient: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(settings: &TelegramSettings) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        let credentials = settings.credentials().map(|(token, chat_id)| Credentials {
            bot_token: token.to_string(),
            chat_id: chat_id.to_string(),
        });

        Ok(Self {
            http_client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            credentials,
            recipient: settings.recipient().map(str::to_string),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "Telegram"
    }

    fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        let Some(credentials) = &self.credentials else {
            tracing::error!("Telegram bot token or chat id is not set. Message dropped.");
            return Err(Error::NotConfigured);
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base_url, credentials.bot_token);
        let request = SendMessageRequest {
            chat_id: &credentials.chat_id,
            text,
        };

        // The URL embeds the bot token, so it is stripped from any transport error.
        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::RequestFailed(e.without_url()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::RequestFailed(e.without_url()))?;

        interpret_response(status, &body)?;
        tracing::info!(text, "Telegram message delivered.");
        Ok(())
    }
}

fn interpret_response(status: u16, body: &str) -> Result<()> {
    let parsed = serde_json::from_str::<TelegramResponse>(body).ok();
    match parsed {
        Some(TelegramResponse { ok: true, .. }) if (200..300).contains(&status) => Ok(()),
        Some(TelegramResponse { description, .. }) => Err(Error::Rejected {
            status,
            description: description.unwrap_or_else(|| "no description".to_string()),
        }),
        None => Err(Error::Rejected {
            status,
            description: body.chars().take(200).collect(),
        }),
    }
}
