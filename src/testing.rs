//! Offline stand-ins for the browser.
//!
//! [`StaticPage`] serves fixture HTML through the same [`BrowserTrait`] the
//! Chrome driver implements, so navigation and validation can be exercised
//! without a browser or network. Pages are parsed with `scraper` on every
//! query; there is no script engine, so in-page functions are answered by
//! emulating the few snippets this crate sends.

use crate::browser::PageSession;
use crate::core::{BrowserConfig, BrowserTrait, Config, WaitUntil};
use crate::errors::{ProbeError, Result};
use crate::validation::highlight::{HIGHLIGHT_NUMBER_FN, SCROLL_INTO_VIEW_FN};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

pub const PORTAL_HTML: &str = include_str!("../tests/fixtures/portal.html");
pub const EARTH_ARTICLE_HTML: &str = include_str!("../tests/fixtures/earth_article.html");
pub const EARTH_ARTICLE_SPLIT_NUMBER_HTML: &str =
    include_str!("../tests/fixtures/earth_article_split_number.html");
pub const EARTH_ARTICLE_WITHOUT_OXYGEN_HTML: &str =
    include_str!("../tests/fixtures/earth_article_without_oxygen.html");

pub const SITE_ROOT: &str = "https://ru.wikipedia.org/";
pub const EARTH_ARTICLE_URL: &str = "https://ru.wikipedia.org/wiki/Земля";

const NO_RESULTS_HTML: &str =
    "<html><body><p class=\"mw-search-nonefound\">Соответствий запросу не найдено.</p></body></html>";
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// An in-page function invocation recorded by [`StaticPage`].
#[derive(Debug, Clone)]
pub struct ScriptCall {
    pub selector: String,
    pub index: usize,
    pub function_declaration: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticTab;

#[derive(Default)]
struct PageState {
    url: String,
    html: String,
    inputs: HashMap<String, String>,
    script_calls: Vec<ScriptCall>,
}

#[derive(Default)]
pub struct StaticPage {
    routes: HashMap<String, String>,
    search_results: HashMap<String, (String, String)>,
    failing_scripts: bool,
    launched: bool,
    state: Mutex<PageState>,
}

impl StaticPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page that is already showing `html`.
    pub fn serving(html: &str) -> Self {
        let page = Self::new();
        {
            let mut state = page.state();
            state.url = "about:static".to_string();
            state.html = html.to_string();
        }
        page
    }

    pub fn with_route(mut self, url: &str, html: &str) -> Self {
        self.routes.insert(url.to_string(), html.to_string());
        self
    }

    /// Pressing Enter in a field holding `query` loads `html` at `url`.
    pub fn with_search_result(mut self, query: &str, url: &str, html: &str) -> Self {
        self.search_results
            .insert(query.to_string(), (url.to_string(), html.to_string()));
        self
    }

    /// Make every in-page function call fail, like a page with a broken
    /// script context.
    pub fn with_failing_scripts(mut self) -> Self {
        self.failing_scripts = true;
        self
    }

    pub fn script_calls(&self) -> Vec<ScriptCall> {
        self.state().script_calls.clone()
    }

    pub fn input_value(&self, selector: &str) -> Option<String> {
        self.state().inputs.get(selector).cloned()
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector).map_err(|e| {
            ProbeError::JavaScriptFailed(format!("invalid selector '{}': {:?}", selector, e))
        })
    }

    fn count_matches(&self, selector: &str) -> Result<usize> {
        let selector = Self::parse_selector(selector)?;
        let document = Html::parse_document(&self.state().html);
        let count = document.select(&selector).count();
        Ok(count)
    }

    fn require(&self, selector: &str) -> Result<()> {
        if self.count_matches(selector)? == 0 {
            return Err(ProbeError::ElementNotFound(selector.to_string()));
        }
        Ok(())
    }
}

fn single_text_node_contains(element: ElementRef<'_>, needle: &str) -> bool {
    element
        .descendants()
        .filter_map(|node| node.value().as_text())
        .any(|text| text.contains(needle))
}

#[async_trait]
impl BrowserTrait for StaticPage {
    type TabHandle = StaticTab;

    async fn launch(&mut self, _config: &BrowserConfig) -> Result<()> {
        self.launched = true;
        Ok(())
    }

    async fn new_tab(&self) -> Result<Self::TabHandle> {
        if !self.launched {
            return Err(ProbeError::BrowserNotLaunched);
        }
        Ok(StaticTab)
    }

    async fn navigate(
        &self,
        _tab: &Self::TabHandle,
        url: &str,
        _wait_until: WaitUntil,
        _timeout_ms: u64,
    ) -> Result<()> {
        let html = self
            .routes
            .get(url)
            .ok_or_else(|| ProbeError::NavigationFailed(format!("no fixture for {}", url)))?;

        let mut state = self.state();
        state.url = url.to_string();
        state.html = html.clone();
        state.inputs.clear();
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        _tab: &Self::TabHandle,
        selector: &str,
        timeout_ms: u64,
    ) -> Result<()> {
        // static content never changes, so absent now means absent forever
        if self.count_matches(selector)? == 0 {
            return Err(ProbeError::Timeout {
                selector: selector.to_string(),
                timeout_ms,
            });
        }
        Ok(())
    }

    async fn fill(&self, _tab: &Self::TabHandle, selector: &str, text: &str) -> Result<()> {
        self.require(selector)?;
        self.state()
            .inputs
            .insert(selector.to_string(), text.to_string());
        Ok(())
    }

    async fn press(&self, _tab: &Self::TabHandle, selector: &str, key: &str) -> Result<()> {
        self.require(selector)?;
        if key != "Enter" {
            return Ok(());
        }

        let mut state = self.state();
        let query = state.inputs.get(selector).cloned().unwrap_or_default();
        match self.search_results.get(&query) {
            Some((url, html)) => {
                state.url = url.clone();
                state.html = html.clone();
            }
            None => {
                state.url = format!("{}?search={}", state.url, query);
                state.html = NO_RESULTS_HTML.to_string();
            }
        }
        state.inputs.clear();
        Ok(())
    }

    async fn inner_texts(&self, _tab: &Self::TabHandle, selector: &str) -> Result<Vec<String>> {
        let selector = Self::parse_selector(selector)?;
        let document = Html::parse_document(&self.state().html);
        let texts = document
            .select(&selector)
            .map(|element| element.text().collect::<String>())
            .collect();
        Ok(texts)
    }

    async fn call_function_on(
        &self,
        _tab: &Self::TabHandle,
        selector: &str,
        index: usize,
        function_declaration: &str,
        args: Vec<Value>,
    ) -> Result<Value> {
        self.state().script_calls.push(ScriptCall {
            selector: selector.to_string(),
            index,
            function_declaration: function_declaration.to_string(),
            args: args.clone(),
        });

        if self.failing_scripts {
            return Err(ProbeError::JavaScriptFailed(
                "script context unavailable".to_string(),
            ));
        }

        let parsed = Self::parse_selector(selector)?;
        let document = Html::parse_document(&self.state().html);
        let element = document
            .select(&parsed)
            .nth(index)
            .ok_or_else(|| ProbeError::ElementNotFound(format!("{} (index {})", selector, index)))?;

        let result = if function_declaration == HIGHLIGHT_NUMBER_FN {
            let needle = args.first().and_then(Value::as_str).unwrap_or_default();
            Value::Bool(!needle.is_empty() && single_text_node_contains(element, needle))
        } else if function_declaration == SCROLL_INTO_VIEW_FN {
            Value::Bool(true)
        } else {
            Value::Null
        };
        Ok(result)
    }

    async fn execute_script(&self, _tab: &Self::TabHandle, _script: &str) -> Result<Value> {
        if self.failing_scripts {
            return Err(ProbeError::JavaScriptFailed(
                "script context unavailable".to_string(),
            ));
        }
        Ok(Value::Null)
    }

    async fn take_screenshot(&self, _tab: &Self::TabHandle) -> Result<Vec<u8>> {
        Ok(PNG_SIGNATURE.to_vec())
    }

    async fn get_url(&self, _tab: &Self::TabHandle) -> Result<String> {
        Ok(self.state().url.clone())
    }

    fn is_running(&self) -> bool {
        self.launched
    }

    async fn close(&mut self) -> Result<()> {
        self.launched = false;
        Ok(())
    }
}

pub struct TestHelper;

impl TestHelper {
    /// Settings for offline runs: no highlight pause, short timeouts.
    pub fn offline_config() -> Config {
        let mut config = Config::default();
        config.site.base_url = SITE_ROOT.to_string();
        config.browser.navigation_timeout_ms = 1000;
        config.browser.element_timeout_ms = 1000;
        config.validation.highlight_pause_ms = 0;
        config
    }

    /// Portal with a search box whose "Земля" search lands on `article_html`.
    pub fn wikipedia_fixture(article_html: &str) -> StaticPage {
        StaticPage::new()
            .with_route(SITE_ROOT, PORTAL_HTML)
            .with_search_result("Земля", EARTH_ARTICLE_URL, article_html)
    }

    pub async fn offline_session(article_html: &str) -> Result<PageSession<StaticPage>> {
        PageSession::new(Self::wikipedia_fixture(article_html), Self::offline_config()).await
    }

    /// A launched page already showing `html`, with its tab.
    pub async fn static_page_with(html: &str) -> Result<(StaticPage, StaticTab)> {
        let mut page = StaticPage::serving(html);
        page.launch(&BrowserConfig::default()).await?;
        let tab = page.new_tab().await?;
        Ok((page, tab))
    }
}

/// Route `tracing` output through the test harness; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn new_tab_requires_launch() {
        let page = StaticPage::serving("<p>hi</p>");
        let err = assert_err!(page.new_tab().await);
        assert!(matches!(err, ProbeError::BrowserNotLaunched));
    }

    #[tokio::test]
    async fn search_enter_loads_result_page() {
        let mut page = TestHelper::wikipedia_fixture(EARTH_ARTICLE_HTML);
        assert_ok!(page.launch(&BrowserConfig::default()).await);
        let tab = assert_ok!(page.new_tab().await);

        assert_ok!(
            page.navigate(&tab, SITE_ROOT, WaitUntil::DomContentLoaded, 1000)
                .await
        );
        assert_ok!(page.fill(&tab, "input[name='search']", "Земля").await);
        assert_eq!(
            page.input_value("input[name='search']").as_deref(),
            Some("Земля")
        );
        assert_ok!(page.press(&tab, "input[name='search']", "Enter").await);

        assert_eq!(page.get_url(&tab).await.unwrap(), EARTH_ARTICLE_URL);
        assert_ok!(page.wait_for_selector(&tab, "table.infobox", 1000).await);
    }

    #[tokio::test]
    async fn unknown_query_lands_on_empty_results() {
        let mut page = TestHelper::wikipedia_fixture(EARTH_ARTICLE_HTML);
        page.launch(&BrowserConfig::default()).await.unwrap();
        let tab = page.new_tab().await.unwrap();

        page.navigate(&tab, SITE_ROOT, WaitUntil::Load, 1000)
            .await
            .unwrap();
        page.fill(&tab, "input[name='search']", "Марс").await.unwrap();
        page.press(&tab, "input[name='search']", "Enter").await.unwrap();

        let err = assert_err!(page.wait_for_selector(&tab, "table.infobox", 1000).await);
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn highlight_emulation_checks_single_text_nodes() {
        let (page, tab) = TestHelper::static_page_with(
            "<table><tr><td>20<b>,95</b> и 20,95</td></tr><tr><td>20<b>,95</b></td></tr></table>",
        )
        .await
        .unwrap();
        let args = vec![Value::String("20,95".to_string())];

        let whole = page
            .call_function_on(&tab, "tr", 0, HIGHLIGHT_NUMBER_FN, args.clone())
            .await
            .unwrap();
        assert_eq!(whole, Value::Bool(true));

        let split = page
            .call_function_on(&tab, "tr", 1, HIGHLIGHT_NUMBER_FN, args)
            .await
            .unwrap();
        assert_eq!(split, Value::Bool(false));
        assert_eq!(page.script_calls().len(), 2);
    }

    #[tokio::test]
    async fn inner_texts_flatten_descendants() {
        let (page, tab) =
            TestHelper::static_page_with("<ul><li>a<i>b</i>c</li><li>d</li></ul>")
                .await
                .unwrap();
        let texts = page.inner_texts(&tab, "li").await.unwrap();
        assert_eq!(texts, vec!["abc".to_string(), "d".to_string()]);
    }
}
