pub mod driver;
pub mod page;
pub mod session;
pub mod stealth;

#[cfg(any(test, feature = "testing"))]
pub mod fake;

pub use driver::{LaunchOptions, WebDriverLauncher};
pub use page::WebDriverSession;
pub use session::{BrowserSession, SessionLauncher, Target};
