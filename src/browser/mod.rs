pub mod chrome;
pub mod locator;
pub mod navigation;
pub mod session;

pub use chrome::ChromeBrowser;
pub use locator::{ElementQuery, ResolvedElement};
pub use navigation::{NavigationResult, Navigator};
pub use session::PageSession;
