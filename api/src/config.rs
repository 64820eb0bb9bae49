use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use chrono::FixedOffset;

pub const DEFAULT_HIDDEN_ACCOUNTS: &[&str] = &["微信支付", "微信收款助手"];

const WECHAT_ARTICLE_HOST: &str = "mp.weixin.qq.com";

#[derive(Clone, Debug)]
pub struct Config {
    /// Account cache (`wxpy.pkl` or its extracted JSON)
    pub account_cache_path: PathBuf,
    /// UserName -> puid cache (`wxpy_puid.pkl` or its extracted JSON)
    pub puid_cache_path: PathBuf,
    /// The bridge's SQLite message log
    pub message_log_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Base URL used in feed self links and OPML exports.
    /// Derived from the request's Host header when unset.
    pub public_base_url: Option<String>,
    pub default_feed_limit: u64,
    pub max_feed_limit: u64,
    /// Seconds an assembled feed is reused; 0 disables the cache
    pub feed_cache_ttl_secs: u64,
    /// Display names never exposed as feeds
    pub hidden_accounts: Vec<String>,
    /// Channel id prefixed to every `slave_origin_uid` in the log
    pub slave_channel_id: String,
    /// Restrict feeds to these `msg_type` values; empty means all
    pub message_types: Vec<String>,
    /// Shared links must point at one of these hosts; empty keeps every link
    pub article_hosts: Vec<String>,
    /// Offset applied to log timestamps stored without one
    pub log_utc_offset: FixedOffset,
    pub title_max_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account_cache_path: PathBuf::from("data/wxpy.pkl"),
            puid_cache_path: PathBuf::from("data/wxpy_puid.pkl"),
            message_log_path: PathBuf::from("data/tgdata.db"),
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_base_url: None,
            default_feed_limit: 100,
            max_feed_limit: 500,
            feed_cache_ttl_secs: 300,
            hidden_accounts: DEFAULT_HIDDEN_ACCOUNTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            slave_channel_id: "blueset.wechat".to_string(),
            message_types: Vec::new(),
            article_hosts: Vec::new(),
            log_utc_offset: FixedOffset::east_opt(8 * 3600).expect("+08:00 is a valid offset"),
            title_max_chars: 64,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let message_types = env::var("FEED_MESSAGE_TYPES")
            .map(|v| split_list(&v))
            .unwrap_or(defaults.message_types);
        let article_hosts = env::var("ARTICLE_HOSTS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| default_article_hosts(&message_types));

        let config = Self {
            account_cache_path: env::var("WXPY_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.account_cache_path),
            puid_cache_path: env::var("WXPY_PUID_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.puid_cache_path),
            message_log_path: env::var("TGDATA_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.message_log_path),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            default_feed_limit: parse_var("DEFAULT_FEED_LIMIT", defaults.default_feed_limit)?,
            max_feed_limit: parse_var("MAX_FEED_LIMIT", defaults.max_feed_limit)?,
            feed_cache_ttl_secs: parse_var("FEED_CACHE_TTL_SECS", defaults.feed_cache_ttl_secs)?,
            hidden_accounts: env::var("HIDDEN_ACCOUNTS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.hidden_accounts),
            slave_channel_id: env::var("SLAVE_CHANNEL_ID").unwrap_or(defaults.slave_channel_id),
            message_types,
            article_hosts,
            log_utc_offset: parse_var("LOG_UTC_OFFSET", defaults.log_utc_offset)?,
            title_max_chars: parse_var("TITLE_MAX_CHARS", defaults.title_max_chars)?,
        };

        anyhow::ensure!(
            config.default_feed_limit >= 1 && config.default_feed_limit <= config.max_feed_limit,
            "DEFAULT_FEED_LIMIT must be between 1 and MAX_FEED_LIMIT ({})",
            config.max_feed_limit
        );
        anyhow::ensure!(config.title_max_chars > 0, "TITLE_MAX_CHARS must be positive");

        Ok(config)
    }

    /// SQLite connection string for the message log, opened read-only
    pub fn message_log_url(&self) -> String {
        format!("sqlite://{}?mode=ro", self.message_log_path.display())
    }

    /// Clamp a requested item count into the configured bounds
    pub fn clamp_feed_limit(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_feed_limit)
            .clamp(1, self.max_feed_limit)
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

/// An articles-only feed keeps WeChat article links unless told otherwise
fn default_article_hosts(message_types: &[String]) -> Vec<String> {
    if message_types.len() == 1 && message_types[0].eq_ignore_ascii_case("Link") {
        vec![WECHAT_ARTICLE_HOST.to_string()]
    } else {
        Vec::new()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
