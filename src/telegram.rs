use crate::config::TelegramConfig;
use crate::error::NotifyError;
use crate::post::Post;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait Notifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct SendMessageForm<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through the Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(cfg: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!(
                "{}/bot{}/sendMessage",
                cfg.api_base.trim_end_matches('/'),
                cfg.bot_token
            ),
            chat_id: cfg.chat_id.clone(),
            disable_web_page_preview: cfg.disable_web_page_preview,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let form = SendMessageForm {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: self.disable_web_page_preview,
        };

        let res = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            // reqwest errors carry the URL, which holds the token
            .map_err(|e| NotifyError::Network(e.without_url().to_string()))?;

        let body = res
            .text()
            .await
            .map_err(|e| NotifyError::Network(e.without_url().to_string()))?;
        check_ack(&body)
    }
}

/// Success only when the payload explicitly says `"ok": true`.
pub fn check_ack(body: &str) -> Result<(), NotifyError> {
    let resp: ApiResponse = serde_json::from_str(body)?;
    if resp.ok == Some(true) {
        return Ok(());
    }
    Err(NotifyError::Rejected(
        resp.description.unwrap_or_else(|| "unknown".to_string()),
    ))
}

pub fn format_post_message(site_label: &str, post: &Post) -> String {
    format!(
        "🎬 پست جدید در {}:\n<a href='{}'>{}</a>",
        escape_html(site_label),
        escape_html(&post.link),
        escape_html(&post.title)
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
