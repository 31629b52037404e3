//! product-watch web server
//!
//! Serves the search / favorites UI and scrapes Olive Young on demand with a
//! headless Chrome launched per request.

use anyhow::Context;
use clap::Parser;
use product_watch::browser::{LaunchOptions, PageTimings, ensure_browser};
use product_watch::web::{AppState, DEFAULT_MAX_PAGES, router};
use product_watch::{ChromeLauncher, Scraper, Store};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "product-watch")]
#[command(version)]
#[command(about = "Olive Young product scraper with favorites and Excel export", long_about = None)]
struct Cli {
    /// Port to listen on (binds all interfaces)
    #[arg(long, short = 'p', env = "PORT", default_value = "5000")]
    port: u16,

    /// JSON file holding results and favorites
    #[arg(long, env = "DATA_FILE", default_value = "product_watch_data.json")]
    data_file: PathBuf,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, env = "CHROME_PATH", value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// Download Chromium at startup when no browser is installed
    #[arg(long, env = "FETCH_BROWSER", default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    fetch_browser: bool,

    /// Largest page count accepted per keyword
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Pause after each page goes idle, in milliseconds
    #[arg(long, default_value_t = 1000)]
    page_delay_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut options = LaunchOptions::new().headless(!cli.headed).fetch_browser(cli.fetch_browser);
    if let Some(path) = cli.chrome_path {
        options = options.chrome_path(path);
    }
    let timings = PageTimings::default().settle_delay(Duration::from_millis(cli.page_delay_ms));

    log::info!("product-watch v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Browser mode: {}", if options.headless { "headless" } else { "headed" });

    let check = options.clone();
    match tokio::task::spawn_blocking(move || ensure_browser(&check)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::warn!("Browser setup failed, searches will fail until one is installed: {}", e),
        Err(e) => log::warn!("Browser setup aborted: {}", e),
    }

    let store = Store::open(&cli.data_file)
        .with_context(|| format!("Failed to load state from {}", cli.data_file.display()))?;
    let scraper = Scraper::new(ChromeLauncher::new(options, timings));
    let state = AppState::new(store, scraper).max_pages(cli.max_pages);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, cli.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Shutting down");
        })
        .await?;

    Ok(())
}
