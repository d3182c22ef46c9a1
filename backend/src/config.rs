use std::{env, time::Duration};

use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_AIRTABLE_API_BASE: &str = "https://api.airtable.com/v0";
pub const DEFAULT_TABLE_NAME: &str = "Testimonials";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_NAME: &str = "Portfolio Testimonials";
const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 15;
const MIN_UPSTREAM_TIMEOUT_SECONDS: u64 = 3;

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub row_store: RowStoreConfig,
    /// `None` locks every moderation endpoint.
    pub admin_token: Option<String>,
    /// Allowed CORS origin; `None` allows any.
    pub site_url: Option<String>,
    pub rebuild_hook_url: Option<Url>,
    pub notification: Option<NotificationConfig>,
    pub upstream_timeout: Duration,
}

#[derive(Clone)]
pub struct RowStoreConfig {
    pub api_base: String,
    pub base_id: String,
    pub api_key: String,
    pub table_name: String,
}

#[derive(Clone)]
pub struct NotificationConfig {
    pub recipient: String,
    /// Without SMTP credentials submissions are only logged.
    pub smtp: Option<SmtpConfig>,
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; values are trimmed and blank means unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match read("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got `{raw}`"))?,
            None => DEFAULT_PORT,
        };

        let api_base = read("AIRTABLE_API_BASE")
            .unwrap_or_else(|| DEFAULT_AIRTABLE_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        Url::parse(&api_base).with_context(|| format!("invalid AIRTABLE_API_BASE: {api_base}"))?;

        let row_store = RowStoreConfig {
            api_base,
            base_id: read("AIRTABLE_BASE_ID").context("AIRTABLE_BASE_ID is required")?,
            api_key: read("AIRTABLE_API_KEY").context("AIRTABLE_API_KEY is required")?,
            table_name: read("AIRTABLE_TABLE_NAME").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
        };

        let rebuild_hook_url = match read("REBUILD_HOOK_URL").or_else(|| read("NETLIFY_BUILD_HOOK")) {
            Some(raw) => {
                Some(Url::parse(&raw).with_context(|| format!("invalid rebuild hook URL: {raw}"))?)
            },
            None => None,
        };

        let smtp = match (read("SMTP_USERNAME"), read("SMTP_PASSWORD")) {
            (Some(username), Some(password)) => {
                let port = match read("SMTP_PORT") {
                    Some(raw) => raw
                        .parse::<u16>()
                        .with_context(|| format!("SMTP_PORT must be a port number, got `{raw}`"))?,
                    None => DEFAULT_SMTP_PORT,
                };
                Some(SmtpConfig {
                    host: read("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                    port,
                    username,
                    password,
                    from_name: read("SMTP_FROM_NAME").unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
                })
            },
            _ => None,
        };
        let notification = read("NOTIFICATION_EMAIL").map(|recipient| NotificationConfig {
            recipient,
            smtp,
        });

        let timeout_seconds = match read("UPSTREAM_TIMEOUT_SECONDS") {
            Some(raw) => raw.parse::<u64>().with_context(|| {
                format!("UPSTREAM_TIMEOUT_SECONDS must be a whole number, got `{raw}`")
            })?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
        };

        Ok(Self {
            bind_addr: read("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port,
            row_store,
            admin_token: read("ADMIN_TOKEN"),
            site_url: read("SITE_URL"),
            rebuild_hook_url,
            notification,
            upstream_timeout: Duration::from_secs(timeout_seconds.max(MIN_UPSTREAM_TIMEOUT_SECONDS)),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
