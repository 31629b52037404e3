//! Search and refresh scrapes over a sequence of pages
//!
//! A [`Scraper`] opens one browser session per call through its
//! [`DriverFactory`], visits pages strictly one after another and runs the
//! extractor over each. The session is dropped (and the browser closed) on
//! every exit path.

pub mod site;

pub use site::SiteConfig;

use crate::error::{BrowserError, Result};
use crate::extract::{FieldSource, extract_detail, extract_listing};
use crate::model::{Product, now_timestamp};

/// One open browser page that can be pointed at URLs
pub trait PageDriver {
    /// Navigate and wait until the page has settled
    fn open(&mut self, url: &str) -> Result<()>;

    /// Every element matching `selector`, in document order; empty when none match
    fn items(&self, selector: &str) -> Result<Vec<Box<dyn FieldSource + '_>>>;

    /// The whole current document
    fn document(&self) -> Result<&dyn FieldSource>;
}

/// Opens a fresh [`PageDriver`] for each scrape call
pub trait DriverFactory: Send + Sync {
    type Driver: PageDriver;

    fn launch(&self) -> Result<Self::Driver>;
}

/// Product lookups used by the web layer
pub trait ProductSource: Send + Sync {
    /// Scrape `max_pages` result pages for every keyword, keyword-major
    fn search(&self, keywords: &[String], max_pages: u32) -> Result<Vec<Product>>;

    /// Re-read each product's detail page; output matches input length and order
    fn refresh(&self, products: Vec<Product>) -> Result<Vec<Product>>;
}

pub struct Scraper<F> {
    factory: F,
    site: SiteConfig,
}

impl<F: DriverFactory> Scraper<F> {
    pub fn new(factory: F) -> Self {
        Self::with_site(factory, SiteConfig::default())
    }

    pub fn with_site(factory: F, site: SiteConfig) -> Self {
        Self { factory, site }
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    fn scrape_results_page(&self, driver: &mut F::Driver, keyword: &str, page: u32, out: &mut Vec<Product>) -> Result<()> {
        let url = self.site.search_page(keyword, page);
        log::info!("Scraping '{}' page {}: {}", keyword, page, url);
        driver.open(&url)?;

        let items = driver.items(&self.site.listing.item)?;
        let scraped_at = now_timestamp();
        let before = out.len();
        for item in &items {
            let fields = extract_listing(&**item, &self.site.listing);
            out.push(fields.into_product(keyword, &scraped_at));
        }

        log::info!("Found {} products for '{}' page {}", out.len() - before, keyword, page);
        Ok(())
    }

    fn refresh_one(&self, driver: &mut F::Driver, product: &mut Product) -> Result<()> {
        let url = self.site.detail_page(&product.product_code);
        log::info!("Refreshing {}: {}", product.product_code, url);
        driver.open(&url)?;

        let fields = extract_detail(driver.document()?, &self.site.detail);
        fields.apply(product, &now_timestamp());
        Ok(())
    }
}

impl<F: DriverFactory> ProductSource for Scraper<F> {
    fn search(&self, keywords: &[String], max_pages: u32) -> Result<Vec<Product>> {
        if max_pages == 0 {
            return Err(BrowserError::InvalidInput("page count must be at least 1".to_string()));
        }
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let mut driver = self.factory.launch()?;
        let mut products = Vec::new();
        for keyword in keywords {
            for page in 1..=max_pages {
                self.scrape_results_page(&mut driver, keyword, page, &mut products)?;
            }
        }

        Ok(products)
    }

    fn refresh(&self, mut products: Vec<Product>) -> Result<Vec<Product>> {
        if !products.iter().any(Product::has_code) {
            return Ok(products);
        }

        let mut driver = self.factory.launch()?;
        for product in products.iter_mut().filter(|p| p.has_code()) {
            if let Err(e) = self.refresh_one(&mut driver, product) {
                log::warn!("Refresh of {} failed: {}", product.product_code, e);
                product.status = Some(e.to_string());
            }
        }

        Ok(products)
    }
}
