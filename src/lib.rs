//! # product-watch
//!
//! Scrape Olive Young product listings with headless Chrome, keep a list of
//! favorites in a JSON file, refresh their prices, and export them to Excel
//! from a small web UI.
//!
//! ## Running the web UI
//!
//! ```bash
//! # Listen on 0.0.0.0:5000 (or $PORT), state in ./product_watch_data.json
//! cargo run --bin product-watch
//!
//! # Watch the browser while it scrapes
//! cargo run --bin product-watch -- --headed
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use product_watch::{ChromeLauncher, ProductSource, Scraper};
//!
//! # fn main() -> product_watch::Result<()> {
//! let scraper = Scraper::new(ChromeLauncher::default());
//!
//! // Two result pages for each keyword, keyword-major
//! let keywords = vec!["선크림".to_string(), "토너".to_string()];
//! let products = scraper.search(&keywords, 2)?;
//!
//! // Re-read the detail page of each product that has a code
//! let refreshed = scraper.refresh(products)?;
//! println!("{} products", refreshed.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Chrome session management and launch configuration
//! - [`extract`]: per-field extraction from result items and detail pages
//! - [`scraper`]: search and refresh scrapes over a page driver
//! - [`store`]: JSON-file state with results and favorites
//! - [`export`]: `.xlsx` export of favorites
//! - [`web`]: axum routes and HTML views (requires the `web` feature)
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod scraper;
pub mod store;

#[cfg(feature = "web")]
pub mod web;

pub use browser::{BrowserSession, ChromeLauncher, LaunchOptions, PageTimings};
pub use error::{BrowserError, Result};
pub use extract::{FieldOutcome, FieldSource};
pub use model::{Product, ProductId};
pub use scraper::{DriverFactory, PageDriver, ProductSource, Scraper, SiteConfig};
pub use store::{AppData, Store};

#[cfg(feature = "web")]
pub use web::{AppState, router};
