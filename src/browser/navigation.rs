use crate::core::{BrowserConfig, BrowserTrait, SiteConfig, WaitUntil};
use crate::errors::Result;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// Drives a tab from the site root to the article found by the configured
/// search query.
pub struct Navigator<'a> {
    site: &'a SiteConfig,
    navigation_timeout_ms: u64,
    element_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigationResult {
    pub url: String,
    pub duration_ms: u64,
}

impl<'a> Navigator<'a> {
    pub fn new(site: &'a SiteConfig, browser: &BrowserConfig) -> Self {
        Self {
            site,
            navigation_timeout_ms: browser.navigation_timeout_ms,
            element_timeout_ms: browser.element_timeout_ms,
        }
    }

    /// On success the infobox is present and queryable. Nothing is said about
    /// full load or network idle. A missing infobox surfaces as
    /// `ProbeError::Timeout` and is not retried.
    pub async fn open_target_article<B: BrowserTrait>(
        &self,
        browser: &B,
        tab: &B::TabHandle,
    ) -> Result<NavigationResult> {
        let start_time = Instant::now();

        debug!(url = %self.site.base_url, "opening site root");
        browser
            .navigate(
                tab,
                &self.site.base_url,
                WaitUntil::DomContentLoaded,
                self.navigation_timeout_ms,
            )
            .await?;

        browser
            .wait_for_selector(tab, &self.site.search_selector, self.element_timeout_ms)
            .await?;
        browser
            .fill(tab, &self.site.search_selector, &self.site.query)
            .await?;
        browser
            .press(tab, &self.site.search_selector, "Enter")
            .await?;

        browser
            .wait_for_selector(tab, &self.site.infobox_selector, self.element_timeout_ms)
            .await?;

        let url = browser.get_url(tab).await?;
        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(url = %url, duration_ms, query = %self.site.query, "article opened");

        Ok(NavigationResult { url, duration_ms })
    }
}
