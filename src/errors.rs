use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Browser not launched")]
    BrowserNotLaunched,

    #[error("Tab creation failed: {0}")]
    TabCreationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Timed out after {timeout_ms}ms waiting for '{selector}'")]
    Timeout { selector: String, timeout_ms: u64 },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("No row containing '{label}' found in '{selector}'")]
    RowNotFound { label: String, selector: String },

    #[error("Row does not contain '{expected}': {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("Row unexpectedly contains '{expected}': {actual}")]
    UnexpectedMatch { expected: String, actual: String },

    #[error("Invalid expectation: {0}")]
    InvalidExpectation(String),

    #[error("JavaScript execution failed: {0}")]
    JavaScriptFailed(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Chrome error: {0}")]
    ChromeError(String),
}

pub type Result<T> = std::result::Result<T, ProbeError>;

// headless_chrome errors without a more specific variant
impl From<anyhow::Error> for ProbeError {
    fn from(err: anyhow::Error) -> Self {
        ProbeError::ChromeError(err.to_string())
    }
}

impl ProbeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Timeout { .. })
    }

    pub fn is_row_not_found(&self) -> bool {
        matches!(self, ProbeError::RowNotFound { .. })
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, ProbeError::Mismatch { .. })
    }

    pub fn is_unexpected_match(&self) -> bool {
        matches!(self, ProbeError::UnexpectedMatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_message_carries_both_sides() {
        let err = ProbeError::Mismatch {
            expected: "25,0 % — кислород (O2)".to_string(),
            actual: "20,95\u{a0}% — кислород (O2)".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("25,0 % — кислород (O2)"));
        assert!(message.contains("20,95\u{a0}%"));
        assert!(err.is_mismatch());
        assert!(!err.is_row_not_found());
    }

    #[test]
    fn row_not_found_names_label() {
        let err = ProbeError::RowNotFound {
            label: "кислород".to_string(),
            selector: "table.infobox tr".to_string(),
        };
        assert!(err.to_string().contains("кислород"));
        assert!(err.is_row_not_found());
        assert!(!err.is_timeout());
    }

    #[test]
    fn unexpected_match_is_its_own_kind() {
        let err = ProbeError::UnexpectedMatch {
            expected: "20,95 % — кислород (O2)".to_string(),
            actual: "20,95\u{a0}% — кислород (O2)".to_string(),
        };
        assert!(err.is_unexpected_match());
        assert!(!err.is_mismatch());
        assert!(err.to_string().contains("unexpectedly"));
    }

    #[test]
    fn anyhow_errors_become_chrome_errors() {
        let err: ProbeError = anyhow::anyhow!("connection closed").into();
        assert!(matches!(err, ProbeError::ChromeError(ref m) if m == "connection closed"));
    }
}
