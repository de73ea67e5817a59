//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ListingSelectors;

/// Environment variable holding the Telegram chat identifier.
pub const CHAT_ID_VAR: &str = "CHAT_ID";

/// Environment variable holding the Telegram bot token.
pub const BOT_TOKEN_VAR: &str = "BOT_API";

/// Telegram's message length limit, in UTF-16 code units.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Search pages to watch, fetched in order
    #[serde(default = "defaults::targets")]
    pub targets: Vec<String>,

    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// How listings are located on a search page
    #[serde(default)]
    pub selectors: ListingSelectors,

    /// Seen-listing store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Telegram bot endpoint and credentials
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Notification formatting
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("cannot read {}: {e}", path.display())))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from `path` if the file exists, defaults otherwise.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_if_exists(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Fill in bot credentials from the process environment.
    ///
    /// Values already present in the config file are overridden.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Fill in bot credentials using an arbitrary variable lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(chat_id) = lookup(CHAT_ID_VAR) {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(bot_token) = lookup(BOT_TOKEN_VAR) {
            self.telegram.bot_token = Some(bot_token);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.targets.is_empty() {
            return Err(AppError::validation("No targets defined"));
        }
        for target in &self.targets {
            require_http_url("target", target)?;
        }
        require_http_url("crawler.origin", &self.crawler.origin)?;
        require_http_url("telegram.api_base", &self.telegram.api_base)?;
        if self.store.path.as_os_str().is_empty() {
            return Err(AppError::validation("store.path is empty"));
        }
        if self.notifications.message_template.trim().is_empty() {
            return Err(AppError::validation(
                "notifications.message_template is empty",
            ));
        }
        if self.notifications.max_message_chars == 0
            || self.notifications.max_message_chars > TELEGRAM_MESSAGE_LIMIT
        {
            return Err(AppError::validation(format!(
                "notifications.max_message_chars must be between 1 and {TELEGRAM_MESSAGE_LIMIT}"
            )));
        }
        self.selectors.compile()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: defaults::targets(),
            crawler: CrawlerConfig::default(),
            selectors: ListingSelectors::default(),
            store: StoreConfig::default(),
            telegram: TelegramConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

fn require_http_url(field: &str, value: &str) -> Result<()> {
    let parsed = Url::parse(value)
        .map_err(|e| AppError::validation(format!("{field} '{value}' is not a URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::validation(format!(
            "{field} '{value}' must use http or https"
        )));
    }
    Ok(())
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Scheme and host that relative listing links are joined onto
    #[serde(default = "defaults::origin")]
    pub origin: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Minimum gap between the starts of two page fetches, in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum pages fetched at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            origin: defaults::origin(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Seen-listing store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding every listing seen so far
    #[serde(default = "defaults::store_path")]
    pub path: PathBuf,

    /// Abort the run on a corrupt store instead of starting from empty
    #[serde(default)]
    pub strict: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: defaults::store_path(),
            strict: false,
        }
    }
}

/// Telegram bot endpoint and credentials.
#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Bot token, normally supplied through `BOT_API`
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Target chat, normally supplied through `CHAT_ID`
    #[serde(default)]
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    /// Check that both credentials are present.
    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::new(self.chat_id.as_deref(), self.bot_token.as_deref())
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            bot_token: None,
            chat_id: None,
        }
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Bot credentials that passed the presence check.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub chat_id: String,
    pub bot_token: String,
}

impl Credentials {
    /// Build credentials, rejecting absent or blank values.
    pub fn new(chat_id: Option<&str>, bot_token: Option<&str>) -> Result<Self> {
        let chat_id = chat_id.map(str::trim).filter(|s| !s.is_empty());
        let bot_token = bot_token.map(str::trim).filter(|s| !s.is_empty());

        match (chat_id, bot_token) {
            (Some(chat_id), Some(bot_token)) => Ok(Self {
                chat_id: chat_id.to_string(),
                bot_token: bot_token.to_string(),
            }),
            (chat_id, bot_token) => {
                let mut missing = Vec::new();
                if chat_id.is_none() {
                    missing.push(CHAT_ID_VAR);
                }
                if bot_token.is_none() {
                    missing.push(BOT_TOKEN_VAR);
                }
                Err(AppError::MissingCredentials(missing))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("chat_id", &self.chat_id)
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

/// Notification formatting.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Message template, see [`crate::models::Listing::format`]
    #[serde(default = "defaults::message_template")]
    pub message_template: String,

    /// Longest message sent, in UTF-16 code units; longer text is truncated
    #[serde(default = "defaults::max_message_chars")]
    pub max_message_chars: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            message_template: defaults::message_template(),
            max_message_chars: defaults::max_message_chars(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn targets() -> Vec<String> {
        vec!["https://www.pararius.com/apartments/utrecht/0-1200/radius-50/since-3".into()]
    }

    // Crawler defaults
    pub fn origin() -> String {
        "https://www.pararius.com".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/124.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        0
    }
    pub fn max_concurrent() -> usize {
        1
    }

    // Store defaults
    pub fn store_path() -> PathBuf {
        PathBuf::from("previous_results.json")
    }

    // Telegram defaults
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }

    // Notification defaults
    pub fn message_template() -> String {
        "New search result {index}: {content}\nLink: {href}".into()
    }
    pub fn max_message_chars() -> usize {
        super::TELEGRAM_MESSAGE_LIMIT
    }
}
