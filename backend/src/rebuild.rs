use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

/// Webhook that redeploys the static site after a testimonial is approved.
#[derive(Clone)]
pub struct RebuildHook {
    http: reqwest::Client,
    url: Url,
}

impl RebuildHook {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build rebuild hook HTTP client")?;
        Ok(Self { http, url })
    }

    pub async fn trigger(&self) -> Result<()> {
        let response = self
            .http
            .post(self.url.clone())
            .send()
            .await
            .context("rebuild hook request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("rebuild hook returned HTTP {}: {body}", status.as_u16());
        }
        tracing::info!("site rebuild triggered");
        Ok(())
    }
}
