//! Text shaping for infobox comparisons.
//!
//! Pages render the same value with different space and dash code points
//! (`20,95\u{a0}%`, `20,95\u{202f}%`, `20,95 %`). Comparisons go through
//! [`normalize`]; anything shown to a human keeps the original text.

use crate::errors::{ProbeError, Result};
use serde::Serialize;
use std::fmt;

const NO_BREAK_SPACE: char = '\u{00A0}';
const NARROW_NO_BREAK_SPACE: char = '\u{202F}';
const THIN_SPACE: char = '\u{2009}';
const EM_DASH: char = '\u{2014}';

const CANONICAL_DASH: char = '-';
const PLACEHOLDER: &str = "{}";

/// Map space and dash variants to plain ASCII and trim the ends.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            NO_BREAK_SPACE | NARROW_NO_BREAK_SPACE | THIN_SPACE => ' ',
            EM_DASH => CANONICAL_DASH,
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Render `value` with a decimal comma. A fractional part is always present,
/// so `25.0` becomes `"25,0"`.
pub fn decimal_comma(value: f64) -> String {
    let mut text = value.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text.replace('.', ",")
}

/// A percentage the page is expected to show.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpectedValue(f64);

impl ExpectedValue {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(ProbeError::InvalidExpectation(format!(
                "expected value must be finite, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn to_decimal_comma(&self) -> String {
        decimal_comma(self.0)
    }
}

impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A phrase with a single `{}` slot for the formatted number,
/// e.g. `"{} % — кислород (O2)"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitTemplate(String);

impl UnitTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        match template.matches(PLACEHOLDER).count() {
            1 => Ok(Self(template)),
            0 => Err(ProbeError::InvalidExpectation(format!(
                "template '{}' has no '{}' placeholder",
                template, PLACEHOLDER
            ))),
            _ => Err(ProbeError::InvalidExpectation(format!(
                "template '{}' has more than one '{}' placeholder",
                template, PLACEHOLDER
            ))),
        }
    }

    pub fn render(&self, number: &str) -> String {
        self.0.replacen(PLACEHOLDER, number, 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_variants_normalize_equal() {
        let plain = normalize("20,95 %");
        assert_eq!(normalize("20,95\u{a0}%"), plain);
        assert_eq!(normalize("20,95\u{202f}%"), plain);
        assert_eq!(normalize("20,95\u{2009}%"), plain);
    }

    #[test]
    fn em_dash_becomes_hyphen_and_ends_are_trimmed() {
        assert_eq!(
            normalize("\u{a0} 20,95 % \u{2014} кислород (O2)\n"),
            "20,95 % - кислород (O2)"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        for sample in [
            "",
            "   ",
            "\u{a0}20,95\u{202f}% \u{2014} кислород (O2)\u{2009}",
            "78,08 % — азот (N2)\t20,95 % — кислород (O2)",
            "plain ascii - text",
        ] {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample {:?}", sample);
        }
    }

    #[test]
    fn other_dashes_are_left_alone() {
        assert_eq!(normalize("a \u{2013} b"), "a \u{2013} b");
    }

    #[test]
    fn decimal_comma_formats() {
        assert_eq!(decimal_comma(20.95), "20,95");
        assert_eq!(decimal_comma(25.0), "25,0");
        assert_eq!(decimal_comma(0.934), "0,934");
        assert_eq!(decimal_comma(-1.5), "-1,5");
    }

    #[test]
    fn expected_value_rejects_non_finite() {
        assert!(ExpectedValue::new(f64::NAN).is_err());
        assert!(ExpectedValue::new(f64::INFINITY).is_err());
        let value = ExpectedValue::new(20.95).unwrap();
        assert_eq!(value.value(), 20.95);
        assert_eq!(value.to_decimal_comma(), "20,95");
    }

    #[test]
    fn template_renders_number() {
        let template = UnitTemplate::new("{} % — кислород (O2)").unwrap();
        assert_eq!(template.render("20,95"), "20,95 % — кислород (O2)");
    }

    #[test]
    fn template_needs_exactly_one_placeholder() {
        assert!(UnitTemplate::new("% — кислород (O2)").is_err());
        assert!(UnitTemplate::new("{} and {}").is_err());
    }
}
