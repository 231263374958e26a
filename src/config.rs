use crate::error::ConfigError;
use crate::extract::PostRule;
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site_url: String,
    #[serde(default)]
    pub site_label: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; post-watch)".to_string()
}

fn default_state_file() -> String {
    "mvbc_state.json".to_string()
}

#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub disable_web_page_preview: bool,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: default_api_base(),
            disable_web_page_preview: false,
        }
    }
}

// Keeps the bot token out of logs.
impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("disable_web_page_preview", &self.disable_web_page_preview)
            .finish()
    }
}

/// CSS selectors locating post containers and, within each, the title link.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_container_selector")]
    pub container: String,
    #[serde(default = "default_entry_selector")]
    pub entry: String,
}

fn default_container_selector() -> String {
    "div[class*='posts-group'] article".to_string()
}

fn default_entry_selector() -> String {
    "h2[class*='entry-title'] > a".to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            container: default_container_selector(),
            entry: default_entry_selector(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            site_label: None,
            user_agent: default_user_agent(),
            state_file: default_state_file(),
            telegram: TelegramConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl Config {
    /// Reads the optional JSON file, overlays the process environment and
    /// validates the result.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let display = path.display().to_string();
        let data = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: display.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&data).map_err(|e| ConfigError::Parse {
            path: display,
            message: e.to_string(),
        })
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SITE_URL") {
            self.site_url = v;
        }
        if let Some(v) = lookup("SITE_LABEL") {
            self.site_label = Some(v);
        }
        if let Some(v) = lookup("USER_AGENT") {
            self.user_agent = v;
        }
        if let Some(v) = lookup("STATE_FILE") {
            self.state_file = v;
        }
        if let Some(v) = lookup("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = v;
        }
        if let Some(v) = lookup("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = v;
        }
        if let Some(v) = lookup("TELEGRAM_API_BASE") {
            self.telegram.api_base = v;
        }
        if let Some(v) = lookup("DISABLE_WEB_PAGE_PREVIEW") {
            self.telegram.disable_web_page_preview = parse_flag("DISABLE_WEB_PAGE_PREVIEW", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site_url.trim().is_empty() {
            return Err(ConfigError::Missing("site_url"));
        }
        Url::parse(&self.site_url).map_err(|e| ConfigError::Invalid {
            name: "site_url",
            message: e.to_string(),
        })?;
        if self.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::Missing("telegram.bot_token"));
        }
        if self.telegram.chat_id.trim().is_empty() {
            return Err(ConfigError::Missing("telegram.chat_id"));
        }
        Url::parse(&self.telegram.api_base).map_err(|e| ConfigError::Invalid {
            name: "telegram.api_base",
            message: e.to_string(),
        })?;
        if self.state_file.trim().is_empty() {
            return Err(ConfigError::Missing("state_file"));
        }
        self.post_rule()?;
        Ok(())
    }

    pub fn post_rule(&self) -> Result<PostRule, ConfigError> {
        PostRule::new(&self.extraction.container, &self.extraction.entry)
    }

    /// Name of the site as shown in notifications.
    pub fn site_label(&self) -> String {
        if let Some(label) = self.site_label.as_deref().filter(|l| !l.trim().is_empty()) {
            return label.to_string();
        }
        Url::parse(&self.site_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.site_url.clone())
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            message: format!("expected a boolean, got {:?}", other),
        }),
    }
}
