use crate::core::config::BrowserConfig;
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::Value;

/// How far a navigation must progress before `navigate` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// Initial HTML parsed; subresources may still be loading.
    DomContentLoaded,
    Load,
}

/// The page-automation collaborator.
///
/// Every call blocks the caller until the browser answers or the relevant
/// timeout elapses. A tab handle must not be driven from two tasks at once.
#[async_trait]
pub trait BrowserTrait: Send + Sync {
    type TabHandle: Send + Sync;

    /// Launch a new browser instance
    async fn launch(&mut self, config: &BrowserConfig) -> Result<()>;

    /// Create a new tab/page
    async fn new_tab(&self) -> Result<Self::TabHandle>;

    async fn navigate(
        &self,
        tab: &Self::TabHandle,
        url: &str,
        wait_until: WaitUntil,
        timeout_ms: u64,
    ) -> Result<()>;

    /// Wait until `selector` matches something, or fail with `ProbeError::Timeout`.
    async fn wait_for_selector(
        &self,
        tab: &Self::TabHandle,
        selector: &str,
        timeout_ms: u64,
    ) -> Result<()>;

    /// Replace the value of the first input matching `selector`.
    async fn fill(&self, tab: &Self::TabHandle, selector: &str, text: &str) -> Result<()>;

    /// Focus the first element matching `selector` and press `key`.
    async fn press(&self, tab: &Self::TabHandle, selector: &str, key: &str) -> Result<()>;

    /// Rendered text of every element matching `selector`, in document order.
    async fn inner_texts(&self, tab: &Self::TabHandle, selector: &str) -> Result<Vec<String>>;

    /// Run `function_declaration` in the page with `this` bound to the
    /// `index`-th element matching `selector`.
    async fn call_function_on(
        &self,
        tab: &Self::TabHandle,
        selector: &str,
        index: usize,
        function_declaration: &str,
        args: Vec<Value>,
    ) -> Result<Value>;

    /// Execute JavaScript in the browser
    async fn execute_script(&self, tab: &Self::TabHandle, script: &str) -> Result<Value>;

    /// PNG of the current viewport
    async fn take_screenshot(&self, tab: &Self::TabHandle) -> Result<Vec<u8>>;

    async fn get_url(&self, tab: &Self::TabHandle) -> Result<String>;

    /// Check if browser is still running
    fn is_running(&self) -> bool;

    /// Close the browser
    async fn close(&mut self) -> Result<()>;
}
