use crate::core::BrowserTrait;
use crate::errors::Result;

pub struct JavaScriptRunner;

impl JavaScriptRunner {
    /// Poll `condition` until it evaluates to `true` or `timeout_ms` elapses.
    ///
    /// Script errors during polling are treated as "not yet"; the page may be
    /// between documents while navigating.
    pub async fn wait_for_condition<B: BrowserTrait>(
        browser: &B,
        tab: &B::TabHandle,
        condition: &str,
        timeout_ms: u64,
        poll_interval_ms: u64,
    ) -> Result<bool> {
        let start_time = std::time::Instant::now();
        let timeout = tokio::time::Duration::from_millis(timeout_ms);
        let poll_interval = tokio::time::Duration::from_millis(poll_interval_ms);

        while start_time.elapsed() < timeout {
            if let Ok(result) = browser.execute_script(tab, condition).await {
                if result.as_bool() == Some(true) {
                    return Ok(true);
                }
            }

            tokio::time::sleep(poll_interval).await;
        }

        Ok(false)
    }
}

/// Quote `value` as a JavaScript string literal.
pub fn js_string(value: &str) -> String {
    // JSON string syntax is a subset of JS string syntax
    serde_json::Value::String(value.to_string()).to_string()
}

/// Expression yielding `JSON.stringify`-ed inner texts of all matches.
pub fn inner_texts_script(selector: &str) -> String {
    format!(
        "JSON.stringify(Array.from(document.querySelectorAll({})).map(e => e.innerText))",
        js_string(selector)
    )
}

/// Expression that becomes true once a document other than the one with
/// `previous_origin` as its `performance.timeOrigin` has been parsed.
pub fn fresh_document_condition(previous_origin: &serde_json::Value) -> String {
    format!(
        "performance.timeOrigin !== {} && document.readyState !== 'loading'",
        previous_origin
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_string_escapes_quotes() {
        assert_eq!(js_string("input[name='search']"), "\"input[name='search']\"");
        assert_eq!(js_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn inner_texts_script_embeds_selector() {
        let script = inner_texts_script("table.infobox tr");
        assert!(script.contains("querySelectorAll(\"table.infobox tr\")"));
        assert!(script.starts_with("JSON.stringify("));
    }

    #[test]
    fn fresh_document_condition_excludes_previous_origin() {
        let condition = fresh_document_condition(&serde_json::json!(1729345678901.5));
        assert_eq!(
            condition,
            "performance.timeOrigin !== 1729345678901.5 && document.readyState !== 'loading'"
        );

        let condition = fresh_document_condition(&serde_json::Value::Null);
        assert!(condition.starts_with("performance.timeOrigin !== null &&"));
    }
}
