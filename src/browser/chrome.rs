use crate::core::{BrowserConfig, BrowserTrait, WaitUntil};
use crate::errors::{ProbeError, Result};
use crate::utils::javascript::{fresh_document_condition, inner_texts_script, JavaScriptRunner};
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::util::Timeout;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Chrome browser implementation
pub struct ChromeBrowser {
    browser: Option<Browser>,
    slow_mo: Duration,
}

impl ChromeBrowser {
    pub fn new() -> Self {
        Self {
            browser: None,
            slow_mo: Duration::ZERO,
        }
    }

    async fn settle(&self) {
        if !self.slow_mo.is_zero() {
            tokio::time::sleep(self.slow_mo).await;
        }
    }

    fn element_at<'a>(tab: &'a Arc<Tab>, selector: &str, index: usize) -> Result<Element<'a>> {
        let mut elements = tab
            .find_elements(selector)
            .map_err(|e| ProbeError::ElementNotFound(format!("{}: {}", selector, e)))?;

        if index >= elements.len() {
            return Err(ProbeError::ElementNotFound(format!(
                "{} (index {} of {})",
                selector,
                index,
                elements.len()
            )));
        }
        Ok(elements.swap_remove(index))
    }
}

fn map_wait_error(err: anyhow::Error, selector: &str, timeout_ms: u64) -> ProbeError {
    if err.downcast_ref::<Timeout>().is_some() {
        debug!(selector, "wait_for_selector gave up");
        ProbeError::Timeout {
            selector: selector.to_string(),
            timeout_ms,
        }
    } else {
        err.into()
    }
}

impl Default for ChromeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserTrait for ChromeBrowser {
    type TabHandle = Arc<Tab>;

    async fn launch(&mut self, config: &BrowserConfig) -> Result<()> {
        let window_size_arg = format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        );

        let user_agent_arg = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&window_size_arg),
        ];

        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }

        for arg in &config.args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .args(args)
            .build()
            .map_err(|e| ProbeError::LaunchFailed(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| ProbeError::LaunchFailed(e.to_string()))?;

        debug!(headless = config.headless, "chrome launched");
        self.browser = Some(browser);
        self.slow_mo = Duration::from_millis(config.slow_mo_ms);
        Ok(())
    }

    async fn new_tab(&self) -> Result<Self::TabHandle> {
        let browser = self
            .browser
            .as_ref()
            .ok_or(ProbeError::BrowserNotLaunched)?;

        let tab = browser
            .new_tab()
            .map_err(|e| ProbeError::TabCreationFailed(e.to_string()))?;

        Ok(tab)
    }

    async fn navigate(
        &self,
        tab: &Self::TabHandle,
        url: &str,
        wait_until: WaitUntil,
        timeout_ms: u64,
    ) -> Result<()> {
        // the tab may still report readyState for the document it is leaving
        let previous_origin = match wait_until {
            WaitUntil::DomContentLoaded => self
                .execute_script(tab, "performance.timeOrigin")
                .await
                .unwrap_or(Value::Null),
            WaitUntil::Load => Value::Null,
        };

        tab.navigate_to(url)
            .map_err(|e| ProbeError::NavigationFailed(e.to_string()))?;

        match wait_until {
            WaitUntil::Load => {
                tab.wait_until_navigated()
                    .map_err(|e| ProbeError::NavigationFailed(e.to_string()))?;
            }
            WaitUntil::DomContentLoaded => {
                let parsed = JavaScriptRunner::wait_for_condition(
                    self,
                    tab,
                    &fresh_document_condition(&previous_origin),
                    timeout_ms,
                    50,
                )
                .await?;
                if !parsed {
                    return Err(ProbeError::Timeout {
                        selector: "document".to_string(),
                        timeout_ms,
                    });
                }
            }
        }

        self.settle().await;
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        tab: &Self::TabHandle,
        selector: &str,
        timeout_ms: u64,
    ) -> Result<()> {
        tab.wait_for_element_with_custom_timeout(selector, Duration::from_millis(timeout_ms))
            .map_err(|e| map_wait_error(e, selector, timeout_ms))?;
        Ok(())
    }

    async fn fill(&self, tab: &Self::TabHandle, selector: &str, text: &str) -> Result<()> {
        {
            let element = Self::element_at(tab, selector, 0)?;
            element
                .call_js_fn("function() { this.value = ''; }", vec![], false)
                .map_err(|e| ProbeError::JavaScriptFailed(e.to_string()))?;
            element.type_into(text)?;
        }

        self.settle().await;
        Ok(())
    }

    async fn press(&self, tab: &Self::TabHandle, selector: &str, key: &str) -> Result<()> {
        Self::element_at(tab, selector, 0)?.focus()?;
        tab.press_key(key)?;

        self.settle().await;
        Ok(())
    }

    async fn inner_texts(&self, tab: &Self::TabHandle, selector: &str) -> Result<Vec<String>> {
        let result = self
            .execute_script(tab, &inner_texts_script(selector))
            .await?;
        let raw = result.as_str().ok_or_else(|| {
            ProbeError::JavaScriptFailed(format!("no text list returned for '{}'", selector))
        })?;
        Ok(serde_json::from_str(raw)?)
    }

    async fn call_function_on(
        &self,
        tab: &Self::TabHandle,
        selector: &str,
        index: usize,
        function_declaration: &str,
        args: Vec<Value>,
    ) -> Result<Value> {
        let element = Self::element_at(tab, selector, index)?;
        let result = element
            .call_js_fn(function_declaration, args, false)
            .map_err(|e| ProbeError::JavaScriptFailed(e.to_string()))?;

        Ok(result.value.unwrap_or(Value::Null))
    }

    async fn execute_script(&self, tab: &Self::TabHandle, script: &str) -> Result<Value> {
        let result = tab
            .evaluate(script, false)
            .map_err(|e| ProbeError::JavaScriptFailed(e.to_string()))?;

        Ok(result.value.unwrap_or(Value::Null))
    }

    async fn take_screenshot(&self, tab: &Self::TabHandle) -> Result<Vec<u8>> {
        let screenshot = tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| ProbeError::ScreenshotFailed(e.to_string()))?;

        Ok(screenshot)
    }

    async fn get_url(&self, tab: &Self::TabHandle) -> Result<String> {
        Ok(tab.get_url())
    }

    fn is_running(&self) -> bool {
        self.browser.is_some()
    }

    async fn close(&mut self) -> Result<()> {
        // dropping Browser kills the child process
        self.browser = None;
        Ok(())
    }
}
