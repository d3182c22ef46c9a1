use std::sync::Arc;

use anyhow::Result;

use crate::{
    config::AppConfig, notify::SubmissionNotifier, rate_limit::RateLimiter, rebuild::RebuildHook,
    row_store::AirtableClient,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub row_store: AirtableClient,
    pub rate_limiter: RateLimiter,
    pub notifier: Option<SubmissionNotifier>,
    pub rebuild_hook: Option<RebuildHook>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        Self::with_rate_limiter(config, RateLimiter::in_memory())
    }

    pub fn with_rate_limiter(config: AppConfig, rate_limiter: RateLimiter) -> Result<Self> {
        let row_store = AirtableClient::new(&config.row_store, config.upstream_timeout)?;
        let notifier = config
            .notification
            .as_ref()
            .map(SubmissionNotifier::from_config)
            .transpose()?;
        let rebuild_hook = config
            .rebuild_hook_url
            .clone()
            .map(|url| RebuildHook::new(url, config.upstream_timeout))
            .transpose()?;

        Ok(Self {
            config: Arc::new(config),
            row_store,
            rate_limiter,
            notifier,
            rebuild_hook,
        })
    }

    /// Exact `Bearer <token>` match, compared in constant time. Always false
    /// when no admin token is configured.
    pub fn is_admin_authorization(&self, header_value: Option<&str>) -> bool {
        match (self.config.admin_token.as_deref(), header_value) {
            (Some(token), Some(presented)) => {
                crate::auth::constant_time_eq(presented, &format!("Bearer {token}"))
            },
            _ => false,
        }
    }
}
