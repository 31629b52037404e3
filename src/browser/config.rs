use std::path::PathBuf;
use std::time::Duration;

/// Desktop user agent presented to the target site
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Options for launching a Chrome/Chromium instance
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,

    pub window_width: u32,
    pub window_height: u32,

    /// Custom Chrome binary; auto-detected when `None`
    pub chrome_path: Option<PathBuf>,

    /// Persistent profile directory
    pub user_data_dir: Option<PathBuf>,

    /// Chrome sandbox; usually disabled inside containers
    pub sandbox: bool,

    /// User agent override applied to every tab
    pub user_agent: Option<String>,

    /// Idle time after which headless_chrome considers the browser dead
    pub idle_timeout: Duration,

    /// Download headless_chrome's pinned Chromium when no Chrome is installed
    pub fetch_browser: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 900,
            chrome_path: None,
            user_data_dir: None,
            sandbox: false,
            user_agent: Some(DESKTOP_USER_AGENT.to_string()),
            idle_timeout: Duration::from_secs(10 * 60),
            fetch_browser: false,
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn fetch_browser(mut self, fetch_browser: bool) -> Self {
        self.fetch_browser = fetch_browser;
        self
    }

    /// Override (or clear, with `None`) the user agent
    pub fn user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Timings used after each navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTimings {
    /// How long the resource count must stay unchanged to count as idle
    pub idle_window: Duration,

    /// Upper bound on the network-idle wait; reaching it is not an error
    pub idle_timeout: Duration,

    /// Fixed pause after the page went idle
    pub settle_delay: Duration,
}

impl Default for PageTimings {
    fn default() -> Self {
        Self {
            idle_window: Duration::from_millis(500),
            idle_timeout: Duration::from_secs(10),
            settle_delay: Duration::from_millis(1000),
        }
    }
}

impl PageTimings {
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// No waiting at all, for pages that are already rendered
    pub fn immediate() -> Self {
        Self {
            idle_window: Duration::ZERO,
            idle_timeout: Duration::ZERO,
            settle_delay: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_options_builder() {
        let opts = LaunchOptions::new()
            .headless(false)
            .window_size(800, 600)
            .chrome_path("/usr/bin/chromium")
            .sandbox(true)
            .fetch_browser(true);

        assert!(!opts.headless);
        assert!(opts.fetch_browser);
        assert_eq!(opts.window_width, 800);
        assert_eq!(opts.window_height, 600);
        assert_eq!(opts.chrome_path, Some(PathBuf::from("/usr/bin/chromium")));
        assert!(opts.sandbox);
    }

    #[test]
    fn test_launch_options_default_user_agent() {
        let opts = LaunchOptions::default();
        assert!(opts.headless);
        assert!(!opts.fetch_browser);
        assert_eq!(opts.user_agent.as_deref(), Some(DESKTOP_USER_AGENT));

        let cleared = opts.user_agent(None);
        assert!(cleared.user_agent.is_none());
    }

    #[test]
    fn test_page_timings_default() {
        let timings = PageTimings::default();
        assert_eq!(timings.settle_delay, Duration::from_secs(1));
        assert!(timings.idle_window < timings.idle_timeout);

        let custom = timings.settle_delay(Duration::from_millis(250));
        assert_eq!(custom.settle_delay, Duration::from_millis(250));
    }
}
