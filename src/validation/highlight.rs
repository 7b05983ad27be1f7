use crate::browser::locator::ResolvedElement;
use crate::core::BrowserTrait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Wraps the first text node occurrence of `numberText` in a marked `span`.
/// Returns `false` when no single text node holds the whole string.
pub const HIGHLIGHT_NUMBER_FN: &str = r#"
function(numberText) {
    const walker = document.createTreeWalker(this, NodeFilter.SHOW_TEXT);

    while (walker.nextNode()) {
        const textNode = walker.currentNode;
        const at = textNode.nodeValue.indexOf(numberText);
        if (at === -1) continue;

        const span = document.createElement('span');
        span.textContent = numberText;
        span.style.outline = '4px solid red';
        span.style.backgroundColor = 'rgba(255, 200, 200, 0.6)';
        span.style.padding = '2px 4px';
        span.style.borderRadius = '4px';

        const afterNode = document.createTextNode(
            textNode.nodeValue.slice(at + numberText.length)
        );
        textNode.nodeValue = textNode.nodeValue.slice(0, at);

        textNode.parentNode.insertBefore(span, textNode.nextSibling);
        textNode.parentNode.insertBefore(afterNode, span.nextSibling);
        return true;
    }
    return false;
}
"#;

pub const SCROLL_INTO_VIEW_FN: &str =
    "function() { this.scrollIntoView({ behavior: 'smooth', block: 'center' }); return true; }";

/// Outline the matched number inside `row`, scroll the row to the middle of
/// the viewport and hold still for `pause` so a recording catches it.
///
/// Never fails: whatever goes wrong is logged and reported as `false`.
pub async fn highlight_match<B: BrowserTrait>(
    browser: &B,
    tab: &B::TabHandle,
    row: &ResolvedElement,
    number_text: &str,
    pause: Duration,
) -> bool {
    let highlighted = match row
        .evaluate(
            browser,
            tab,
            HIGHLIGHT_NUMBER_FN,
            vec![Value::String(number_text.to_string())],
        )
        .await
    {
        Ok(value) => value.as_bool().unwrap_or(false),
        Err(e) => {
            warn!(error = %e, "highlight script failed");
            false
        }
    };

    if !highlighted {
        debug!(number_text, "no single text node holds the number, skipping highlight");
    }

    if let Err(e) = row.evaluate(browser, tab, SCROLL_INTO_VIEW_FN, vec![]).await {
        warn!(error = %e, "scroll into view failed");
    }

    if !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }

    highlighted
}
