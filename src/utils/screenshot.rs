use crate::core::BrowserTrait;
use crate::errors::{ProbeError, Result};
use std::path::Path;

pub struct ScreenshotManager;

impl ScreenshotManager {
    pub async fn save_to_file<B: BrowserTrait>(
        browser: &B,
        tab: &B::TabHandle,
        file_path: &Path,
    ) -> Result<usize> {
        let screenshot_bytes = browser.take_screenshot(tab).await?;
        if screenshot_bytes.is_empty() {
            return Err(ProbeError::ScreenshotFailed(
                "browser returned an empty image".to_string(),
            ));
        }

        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(file_path, &screenshot_bytes).await?;
        Ok(screenshot_bytes.len())
    }
}
