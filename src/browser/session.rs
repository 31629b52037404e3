use crate::browser::config::{LaunchOptions, PageTimings};
use crate::error::{BrowserError, Result};
use crate::browser::element::is_no_match;
use crate::extract::FieldSource;
use crate::scraper::{DriverFactory, PageDriver};
use headless_chrome::{Browser, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Resource count once the document is complete, -1 while it is still loading
const RESOURCE_COUNT_JS: &str =
    "document.readyState === 'complete' ? performance.getEntriesByType('resource').length : -1";

/// Browser session that manages one Chrome/Chromium instance and a single tab.
///
/// Dropping the session closes its tabs and shuts the browser down.
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Tab every navigation goes through
    tab: Arc<Tab>,

    timings: PageTimings,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions, timings: PageTimings) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Hide automation flags from bot detection
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        launch_opts.idle_browser_timeout = options.idle_timeout;
        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.path = resolve_executable(&options)?;
        launch_opts.user_data_dir = options.user_data_dir;
        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        if let Some(user_agent) = &options.user_agent {
            tab.set_user_agent(user_agent, None, None)
                .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to set user agent: {}", e)))?;
        }

        log::debug!("Browser launched (headless: {})", options.headless);
        Ok(Self { browser, tab, timings })
    }

    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Navigate to a URL using the session tab
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Wait until the page stops issuing requests.
    ///
    /// headless_chrome has no network-idle event, so this polls the number of
    /// resource-timing entries and returns once it has stayed unchanged for
    /// the idle window. Hitting the timeout is logged, not returned.
    pub fn wait_for_network_idle(&self) -> Result<()> {
        let deadline = Instant::now() + self.timings.idle_timeout;
        let mut last = self.resource_count()?;
        let mut stable_since = Instant::now();

        loop {
            if last >= 0 && stable_since.elapsed() >= self.timings.idle_window {
                return Ok(());
            }
            if Instant::now() >= deadline {
                log::debug!("Network did not go idle within {:?}", self.timings.idle_timeout);
                return Ok(());
            }

            std::thread::sleep(IDLE_POLL_INTERVAL);

            let count = self.resource_count()?;
            if count != last {
                last = count;
                stable_since = Instant::now();
            }
        }
    }

    fn resource_count(&self) -> Result<i64> {
        let result = self
            .tab
            .evaluate(RESOURCE_COUNT_JS, false)
            .map_err(|e| BrowserError::EvaluationFailed(e.to_string()))?;

        Ok(result.value.and_then(|v| v.as_i64()).unwrap_or(-1))
    }

    /// Close the browser tabs
    pub fn close(&self) -> Result<()> {
        // headless_chrome has no explicit shutdown; the process exits when Browser drops
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        for tab in tabs {
            let _ = tab.close(false); // Ignore errors on individual tab closes
        }
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to close browser session: {}", e);
        }
        log::debug!("Browser session closed");
    }
}

impl PageDriver for BrowserSession {
    fn open(&mut self, url: &str) -> Result<()> {
        self.navigate(url)?;
        self.wait_for_navigation()?;
        self.wait_for_network_idle()?;
        std::thread::sleep(self.timings.settle_delay);
        Ok(())
    }

    fn items(&self, selector: &str) -> Result<Vec<Box<dyn FieldSource + '_>>> {
        // find_elements reports an empty match as an error
        match self.tab.find_elements(selector) {
            Ok(elements) => Ok(elements
                .into_iter()
                .map(|element| Box::new(element) as Box<dyn FieldSource + '_>)
                .collect()),
            Err(e) if is_no_match(&e) => {
                log::debug!("No elements for '{}'", selector);
                Ok(Vec::new())
            }
            Err(e) => Err(BrowserError::TabOperationFailed(format!("Failed to query '{}': {}", selector, e))),
        }
    }

    fn document(&self) -> Result<&dyn FieldSource> {
        let tab: &Tab = &self.tab;
        Ok(tab)
    }
}

/// Chrome binary to launch.
///
/// `None` means no installed browser was found and headless_chrome should use
/// (and on first use download) its pinned Chromium.
pub fn resolve_executable(options: &LaunchOptions) -> Result<Option<PathBuf>> {
    if let Some(path) = &options.chrome_path {
        if !path.exists() {
            return Err(BrowserError::LaunchFailed(format!("Browser not found at {}", path.display())));
        }
        return Ok(Some(path.clone()));
    }

    match headless_chrome::browser::default_executable() {
        Ok(path) => Ok(Some(path)),
        Err(e) if options.fetch_browser && cfg!(feature = "fetch") => {
            log::debug!("No installed browser ({}), falling back to Chromium download", e);
            Ok(None)
        }
        Err(e) => Err(BrowserError::LaunchFailed(e)),
    }
}

/// Make a browser available before the first scrape, downloading Chromium if needed
pub fn ensure_browser(options: &LaunchOptions) -> Result<()> {
    match resolve_executable(options)? {
        Some(path) => {
            log::info!("Using browser at {}", path.display());
            Ok(())
        }
        None => {
            log::info!("No browser installed, downloading Chromium");
            BrowserSession::launch(options.clone(), PageTimings::immediate()).map(drop)
        }
    }
}

/// Launches a headless Chrome session per scrape call
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    pub options: LaunchOptions,
    pub timings: PageTimings,
}

impl ChromeLauncher {
    pub fn new(options: LaunchOptions, timings: PageTimings) -> Self {
        Self { options, timings }
    }
}

impl DriverFactory for ChromeLauncher {
    type Driver = BrowserSession;

    fn launch(&self) -> Result<BrowserSession> {
        BrowserSession::launch(self.options.clone(), self.timings)
    }
}
