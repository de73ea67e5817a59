// src/services/notifier.rs

//! Telegram notification service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::models::{Credentials, NotificationConfig, TelegramConfig};
use crate::services::{Delivery, Notifier};
use crate::utils::truncate_graphemes;

/// Sends messages through the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
    max_message_chars: usize,
}

impl TelegramNotifier {
    pub fn new(
        client: Client,
        telegram: &TelegramConfig,
        credentials: &Credentials,
        notifications: &NotificationConfig,
    ) -> Self {
        Self {
            client,
            endpoint: send_message_url(&telegram.api_base, &credentials.bot_token),
            chat_id: credentials.chat_id.clone(),
            max_message_chars: notifications.max_message_chars,
        }
    }
}

/// Build the `sendMessage` URL for a bot token.
fn send_message_url(api_base: &str, bot_token: &str) -> String {
    format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), bot_token)
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Delivery {
        let text = truncate_graphemes(message, self.max_message_chars);
        let form = [("chat_id", self.chat_id.as_str()), ("text", text.as_str())];

        // The endpoint embeds the bot token; errors are logged without the URL.
        match self.client.post(&self.endpoint).form(&form).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                log::info!("Message sent successfully");
                Delivery::Sent
            }
            Ok(response) => {
                let status = response.status();
                log::warn!("Failed to send message: {}", status);
                Delivery::Rejected(status.as_u16())
            }
            Err(e) => {
                let reason = e.without_url().to_string();
                log::error!("Error sending message: {}", reason);
                Delivery::Failed(reason)
            }
        }
    }
}
