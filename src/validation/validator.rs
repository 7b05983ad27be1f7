use crate::browser::locator::ElementQuery;
use crate::core::{BrowserTrait, SiteConfig, ValidationConfig};
use crate::errors::{ProbeError, Result};
use crate::validation::highlight::highlight_match;
use crate::validation::text::{normalize, ExpectedValue, UnitTemplate};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

pub const OXYGEN_LABEL: &str = "кислород";
pub const OXYGEN_TEMPLATE: &str = "{} % — кислород (O2)";

/// What to look for: the row label and the phrase the row must contain.
#[derive(Debug, Clone, Serialize)]
pub struct FieldExpectation {
    pub label: String,
    pub value: ExpectedValue,
    pub template: UnitTemplate,
}

impl FieldExpectation {
    pub fn new(label: impl Into<String>, value: f64, template: &str) -> Result<Self> {
        let label = label.into();
        if label.is_empty() {
            return Err(ProbeError::InvalidExpectation(
                "label must not be empty".to_string(),
            ));
        }
        Ok(Self {
            label,
            value: ExpectedValue::new(value)?,
            template: UnitTemplate::new(template)?,
        })
    }

    /// Share of oxygen in Earth's atmosphere, as the article phrases it.
    pub fn oxygen(value: f64) -> Result<Self> {
        Self::new(OXYGEN_LABEL, value, OXYGEN_TEMPLATE)
    }

    pub fn expected_substring(&self) -> String {
        self.template.render(&self.value.to_decimal_comma())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub label: String,
    pub expected: String,
    pub row_text: String,
    pub highlighted: bool,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

/// Fails with `Mismatch` unless `expected` occurs in `row_text` once both are
/// normalized. The error carries the raw row text.
pub fn assert_row_contains(row_text: &str, expected: &str) -> Result<()> {
    if normalize(row_text).contains(&normalize(expected)) {
        return Ok(());
    }
    Err(ProbeError::Mismatch {
        expected: expected.to_string(),
        actual: row_text.to_string(),
    })
}

pub struct FieldValidator {
    rows: ElementQuery,
    highlight: bool,
    highlight_pause: Duration,
}

impl FieldValidator {
    pub fn new(site: &SiteConfig, validation: &ValidationConfig) -> Self {
        Self {
            rows: ElementQuery::new(site.infobox_selector.as_str()).locator(&site.row_selector),
            highlight: validation.highlight,
            highlight_pause: Duration::from_millis(validation.highlight_pause_ms),
        }
    }

    /// Assert that the first infobox row mentioning `expectation.label` shows
    /// the expected phrase, then highlight the number in the page.
    ///
    /// The infobox must already be present.
    pub async fn validate_field_value<B: BrowserTrait>(
        &self,
        browser: &B,
        tab: &B::TabHandle,
        expectation: &FieldExpectation,
    ) -> Result<ValidationOutcome> {
        let row = self
            .rows
            .clone()
            .filter_has_text(expectation.label.as_str())
            .resolve(browser, tab)
            .await?
            .ok_or_else(|| ProbeError::RowNotFound {
                label: expectation.label.clone(),
                selector: self.rows.selector().to_string(),
            })?;

        debug!(label = %expectation.label, row_text = %row.inner_text, "row located");

        let expected = expectation.expected_substring();
        assert_row_contains(&row.inner_text, &expected)?;
        info!(label = %expectation.label, expected = %expected, "field value matches");

        let highlighted = if self.highlight {
            highlight_match(
                browser,
                tab,
                &row,
                &expectation.value.to_decimal_comma(),
                self.highlight_pause,
            )
            .await
        } else {
            false
        };

        Ok(ValidationOutcome {
            label: expectation.label.clone(),
            expected,
            row_text: row.inner_text,
            highlighted,
            checked_at: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oxygen_expectation_formats_phrase() {
        let expectation = FieldExpectation::oxygen(20.95).unwrap();
        assert_eq!(expectation.label, "кислород");
        assert_eq!(expectation.expected_substring(), "20,95 % — кислород (O2)");
    }

    #[test]
    fn empty_label_is_rejected() {
        assert!(FieldExpectation::new("", 1.0, "{} %").is_err());
    }

    #[test]
    fn containment_ignores_space_variants() {
        let row = "Состав атмосферы\t78,08\u{a0}% — азот (N2)\n20,95\u{202f}% — кислород (O2)";
        assert!(assert_row_contains(row, "20,95 % — кислород (O2)").is_ok());
    }

    #[test]
    fn mismatch_keeps_raw_row_text() {
        let row = "20,95\u{a0}% — кислород (O2)";
        match assert_row_contains(row, "25,0 % — кислород (O2)") {
            Err(ProbeError::Mismatch { expected, actual }) => {
                assert_eq!(expected, "25,0 % — кислород (O2)");
                assert_eq!(actual, row);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn bare_number_is_not_enough() {
        // the phrase is anchored to the label, not just the number
        assert!(assert_row_contains("20,95 % — азот (N2)", "20,95 % — кислород (O2)").is_err());
    }
}
