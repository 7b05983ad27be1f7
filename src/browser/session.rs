use crate::browser::navigation::{NavigationResult, Navigator};
use crate::core::{BrowserTrait, Config};
use crate::errors::{ProbeError, Result};
use crate::utils::ScreenshotManager;
use crate::validation::{FieldExpectation, FieldValidator, ValidationOutcome};
use std::path::Path;
use tracing::{info, warn};

/// One browser and one tab, owned for the length of a single check run.
///
/// Sessions are created per test and passed around explicitly; nothing about
/// them is global.
pub struct PageSession<B: BrowserTrait> {
    browser: B,
    tab: B::TabHandle,
    config: Config,
    validator: FieldValidator,
    session_id: String,
}

impl<B: BrowserTrait> PageSession<B> {
    pub async fn new(mut browser: B, config: Config) -> Result<Self> {
        config.validate()?;
        browser.launch(&config.browser).await?;
        let tab = browser.new_tab().await?;
        let validator = FieldValidator::new(&config.site, &config.validation);
        let session_id = uuid::Uuid::new_v4().to_string();

        info!(session_id = %session_id, headless = config.browser.headless, "session started");

        Ok(Self {
            browser,
            tab,
            config,
            validator,
            session_id,
        })
    }

    pub async fn open_target_article(&self) -> Result<NavigationResult> {
        Navigator::new(&self.config.site, &self.config.browser)
            .open_target_article(&self.browser, &self.tab)
            .await
    }

    pub async fn validate_field_value(
        &self,
        expectation: &FieldExpectation,
    ) -> Result<ValidationOutcome> {
        self.validator
            .validate_field_value(&self.browser, &self.tab, expectation)
            .await
    }

    /// Negative check: passes only when the row exists and does not show
    /// the expected phrase. Returns the mismatch for reporting.
    pub async fn expect_mismatch(&self, expectation: &FieldExpectation) -> Result<ProbeError> {
        match self.validate_field_value(expectation).await {
            Err(err @ ProbeError::Mismatch { .. }) => Ok(err),
            Err(other) => Err(other),
            Ok(outcome) => Err(ProbeError::UnexpectedMatch {
                expected: outcome.expected,
                actual: outcome.row_text,
            }),
        }
    }

    pub async fn current_url(&self) -> Result<String> {
        self.browser.get_url(&self.tab).await
    }

    pub async fn save_screenshot(&self, path: &Path) -> Result<usize> {
        let written = ScreenshotManager::save_to_file(&self.browser, &self.tab, path).await?;
        info!(path = %path.display(), bytes = written, "screenshot saved");
        Ok(written)
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn tab(&self) -> &B::TabHandle {
        &self.tab
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn close(mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            warn!(session_id = %self.session_id, error = %e, "browser did not close cleanly");
            return Err(e);
        }
        info!(session_id = %self.session_id, "session closed");
        Ok(())
    }
}

impl PageSession<crate::browser::ChromeBrowser> {
    /// Headless Chrome with default settings
    pub async fn quick_start() -> Result<Self> {
        Self::with_config(Config::default()).await
    }

    /// Visible, slowed-down Chrome for recording a run
    pub async fn demo_mode() -> Result<Self> {
        Self::with_config(Config::demo()).await
    }

    pub async fn with_config(config: Config) -> Result<Self> {
        Self::new(crate::browser::ChromeBrowser::new(), config).await
    }
}
