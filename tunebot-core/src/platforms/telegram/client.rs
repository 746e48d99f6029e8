// File: tunebot-core/src/platforms/telegram/client.rs

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;

use tunebot_common::models::{BotCommand, ChatId, OutgoingMessage};

use crate::http::endpoint;
use crate::Error;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct ReplyParameters {
    message_id: i64,
    allow_sending_without_reply: bool,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_parameters: Option<ReplyParameters>,
}

#[derive(Debug, Serialize)]
struct SetMyCommandsRequest<'a> {
    commands: &'a [BotCommand],
}

/// Thin wrapper over the Telegram Bot API methods the bots use.
///
/// The bot token is part of every request URL, so transport errors are
/// stripped of their URL before they can reach a log line.
pub struct TelegramBotClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramBotClient {
    pub fn new(http: reqwest::Client, api_base_url: &str, bot_token: &str) -> Self {
        Self {
            http,
            base_url: endpoint(api_base_url, &format!("bot{bot_token}")),
        }
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Option<Duration>) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        trace!("(Telegram) calling {method}");
        let mut req = self.http.post(endpoint(&self.base_url, method)).json(body);
        if let Some(t) = timeout {
            req = req.timeout(t);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::Platform(format!("{method} request failed: {}", e.without_url())))?;
        let status = resp.status();
        let api: ApiResponse<T> = resp.json().await.map_err(|e| {
            Error::Platform(format!("{method} returned an invalid body ({status}): {}", e.without_url()))
        })?;

        if !api.ok {
            let code = api.error_code.unwrap_or(i64::from(status.as_u16()));
            let desc = api.description.unwrap_or_else(|| "no description".into());
            return Err(Error::Platform(format!("{method} failed ({code}): {desc}")));
        }
        api.result
            .ok_or_else(|| Error::Platform(format!("{method} response has no result")))
    }

    pub async fn get_me(&self) -> Result<TelegramUser, Error> {
        self.call("getMe", &serde_json::json!({}), None).await
    }

    /// Long-polls for new messages. The HTTP timeout is stretched past the
    /// server-side poll timeout so an idle poll is not reported as an error.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>, Error> {
        let body = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &body, Some(Duration::from_secs(timeout_secs + 10)))
            .await
    }

    pub async fn send_message(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<(), Error> {
        let body = SendMessageRequest {
            chat_id,
            text: &message.text,
            parse_mode: message.parse_mode.as_api_str(),
            reply_parameters: message.reply_to.map(|message_id| ReplyParameters {
                message_id,
                allow_sending_without_reply: true,
            }),
        };
        let _sent: TelegramMessage = self.call("sendMessage", &body, None).await?;
        Ok(())
    }

    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<(), Error> {
        let _ok: bool = self
            .call("setMyCommands", &SetMyCommandsRequest { commands }, None)
            .await?;
        Ok(())
    }
}
