pub mod browser;
pub mod core;
pub mod errors;
pub mod testing;
pub mod utils;
pub mod validation;

pub use browser::{ChromeBrowser, ElementQuery, NavigationResult, Navigator, PageSession};
pub use crate::core::{BrowserTrait, Config, WaitUntil};
pub use errors::{ProbeError, Result};
pub use validation::{FieldExpectation, FieldValidator, ValidationOutcome};

pub type DefaultSession = PageSession<ChromeBrowser>;
