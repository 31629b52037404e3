//! Headless Chrome session management
//!
//! - [`LaunchOptions`] / [`PageTimings`]: how the browser is started and how long to wait per page
//! - [`BrowserSession`]: one browser with one tab, closed on drop
//! - [`ensure_browser`]: find an installed Chrome or download Chromium
//! - [`ChromeLauncher`]: the [`DriverFactory`](crate::scraper::DriverFactory) used in production

pub mod config;
pub mod element;
pub mod session;

pub use config::{DESKTOP_USER_AGENT, LaunchOptions, PageTimings};
pub use session::{BrowserSession, ChromeLauncher, ensure_browser, resolve_executable};
