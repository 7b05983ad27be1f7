pub mod browser;
pub mod config;

pub use browser::{BrowserTrait, WaitUntil};
pub use config::{BrowserConfig, Config, SiteConfig, ValidationConfig, Viewport};
