//! Process configuration, read once at startup.

use thiserror::Error;

use crate::backend::DEFAULT_ASK_ENDPOINT;

/// Model used when `MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Label printed before the reference list when `REFERENCES_LABEL` is not set.
pub const DEFAULT_REFERENCES_LABEL: &str = "相关文档：";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("{var} is not a valid URL: {value}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("failed to load .env: {0}")]
    DotEnv(#[source] dotenvy::Error),
}

/// Chat identifiers permitted to use the bot.
///
/// An empty list places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList(Vec<String>);

impl AllowList {
    /// Parses a comma-separated list, trimming entries and dropping empty ones.
    pub fn parse(input: &str) -> Self {
        Self(
            input
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// Returns `true` when every chat is permitted.
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if `chat_id` may use the bot.
    pub fn permits(&self, chat_id: i64) -> bool {
        self.is_unrestricted() || self.0.iter().any(|id| *id == chat_id.to_string())
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }
}

/// Immutable configuration shared by the bot and the query service.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub library_id: String,
    pub model: String,
    pub bot_token: Option<String>,
    pub bot_name: String,
    pub allow_list: AllowList,
    pub ask_endpoint: String,
    pub references_label: String,
}

impl Config {
    /// Loads `.env` from the working directory if present, then reads the
    /// process environment. Variables already set in the environment win.
    ///
    /// A missing `.env` is fine; one that cannot be read or parsed is an error.
    pub fn load() -> Result<Self, ConfigError> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_env()
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let ask_endpoint = get("ASK_ENDPOINT").unwrap_or_else(|| DEFAULT_ASK_ENDPOINT.to_string());
        if reqwest::Url::parse(&ask_endpoint).is_err() {
            return Err(ConfigError::InvalidUrl {
                var: "ASK_ENDPOINT",
                value: ask_endpoint,
            });
        }

        Ok(Self {
            api_key: require("API_KEY")?,
            library_id: require("LIBRARY_ID")?,
            model: get("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            bot_token: get("BOT_TOKEN"),
            bot_name: get("BOT_NAME")
                .map(|name| name.trim_start_matches('@').to_string())
                .unwrap_or_default(),
            allow_list: get("ALLOW_CHAT_ID")
                .map(|ids| AllowList::parse(&ids))
                .unwrap_or_default(),
            ask_endpoint,
            references_label: get("REFERENCES_LABEL")
                .unwrap_or_else(|| DEFAULT_REFERENCES_LABEL.to_string()),
        })
    }

    /// Returns the bot token, which only the bot needs.
    pub fn require_bot_token(&self) -> Result<&str, ConfigError> {
        self.bot_token
            .as_deref()
            .ok_or(ConfigError::Missing("BOT_TOKEN"))
    }
}

fn check_dotenv<T>(result: dotenvy::Result<T>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e)),
    }
}
