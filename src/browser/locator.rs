use crate::core::BrowserTrait;
use crate::errors::Result;
use serde_json::Value;

/// A lazily resolved element query: a CSS selector, an optional text filter
/// and a position among the filtered matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementQuery {
    selector: String,
    has_text: Option<String>,
    nth: usize,
}

/// A concrete match: the `index`-th element of `selector` in document order.
#[derive(Debug, Clone)]
pub struct ResolvedElement {
    pub selector: String,
    pub index: usize,
    pub inner_text: String,
}

impl ElementQuery {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            has_text: None,
            nth: 0,
        }
    }

    /// Descendants of this query's matches.
    pub fn locator(&self, child: &str) -> Self {
        Self::new(format!("{} {}", self.selector, child))
    }

    /// Keep only elements whose text contains `text` (case-sensitive, as-is).
    pub fn filter_has_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.nth = index;
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Indexes into `texts` of the elements that pass the text filter.
    fn matching_indexes<'a>(&'a self, texts: &'a [String]) -> impl Iterator<Item = usize> + 'a {
        texts
            .iter()
            .enumerate()
            .filter(move |(_, text)| match &self.has_text {
                Some(needle) => text.contains(needle.as_str()),
                None => true,
            })
            .map(|(index, _)| index)
    }

    pub async fn resolve<B: BrowserTrait>(
        &self,
        browser: &B,
        tab: &B::TabHandle,
    ) -> Result<Option<ResolvedElement>> {
        let mut texts = browser.inner_texts(tab, &self.selector).await?;
        let Some(index) = self.matching_indexes(&texts).nth(self.nth) else {
            return Ok(None);
        };

        Ok(Some(ResolvedElement {
            selector: self.selector.clone(),
            index,
            inner_text: texts.swap_remove(index),
        }))
    }

    pub async fn count<B: BrowserTrait>(&self, browser: &B, tab: &B::TabHandle) -> Result<usize> {
        let texts = browser.inner_texts(tab, &self.selector).await?;
        Ok(self.matching_indexes(&texts).count())
    }
}

impl ResolvedElement {
    pub async fn evaluate<B: BrowserTrait>(
        &self,
        browser: &B,
        tab: &B::TabHandle,
        function_declaration: &str,
        args: Vec<Value>,
    ) -> Result<Value> {
        browser
            .call_function_on(tab, &self.selector, self.index, function_declaration, args)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHelper;

    const TABLE: &str = r#"<html><body>
        <table class="infobox">
            <tr><th>Масса</th><td>5,97 кг</td></tr>
            <tr><td>Кислород в коре</td></tr>
            <tr><td>20,95 % — кислород (O2)</td></tr>
            <tr><td>кислород ещё раз</td></tr>
        </table>
        <table><tr><td>кислород вне инфобокса</td></tr></table>
    </body></html>"#;

    #[test]
    fn locator_chains_with_descendant_combinator() {
        let rows = ElementQuery::new("table.infobox").locator("tr");
        assert_eq!(rows.selector(), "table.infobox tr");
    }

    #[tokio::test]
    async fn filter_is_case_sensitive_and_nth_counts_matches() {
        let (page, tab) = TestHelper::static_page_with(TABLE).await.unwrap();
        let rows = ElementQuery::new("table.infobox").locator("tr");

        let first = rows
            .clone()
            .filter_has_text("кислород")
            .resolve(&page, &tab)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.index, 2);
        assert!(first.inner_text.contains("20,95"));

        let second = rows
            .clone()
            .filter_has_text("кислород")
            .nth(1)
            .resolve(&page, &tab)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.index, 3);

        assert_eq!(
            rows.clone().filter_has_text("кислород").count(&page, &tab).await.unwrap(),
            2
        );
        assert_eq!(rows.count(&page, &tab).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn resolve_without_match_is_none() {
        let (page, tab) = TestHelper::static_page_with(TABLE).await.unwrap();
        let missing = ElementQuery::new("table.infobox tr")
            .filter_has_text("азот")
            .resolve(&page, &tab)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
