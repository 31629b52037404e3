//! Field extraction from result-list items and goods-detail pages
//!
//! Every lookup is independent: a missing element or a failed read is
//! reported as a [`FieldOutcome`] and never stops the other fields from
//! being read. Folding the outcomes into a [`Product`] applies the defaults
//! (empty string for list items, prior value for detail pages).

use crate::model::Product;
use regex::Regex;
use std::sync::LazyLock;

static GOODS_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"goodsNo=([A-Z0-9]+)").expect("hardcoded regex pattern is valid"));

/// Result of looking up one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Element found and its text (or attribute) read
    Found(String),

    /// No element matched the selector
    Missing { selector: String },

    /// The element exists but reading it failed
    Failed { selector: String, reason: String },
}

impl FieldOutcome {
    pub fn missing(selector: &str) -> Self {
        Self::Missing { selector: selector.to_string() }
    }

    pub fn failed(selector: &str, reason: impl ToString) -> Self {
        Self::Failed { selector: selector.to_string(), reason: reason.to_string() }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Found value, or `fallback` after logging why the field was not read
    pub fn or_else(self, field: &str, fallback: String) -> String {
        match self {
            Self::Found(value) => value,
            Self::Missing { selector } => {
                log::debug!("Field '{}' missing (selector '{}')", field, selector);
                fallback
            }
            Self::Failed { selector, reason } => {
                log::debug!("Field '{}' unreadable (selector '{}'): {}", field, selector, reason);
                fallback
            }
        }
    }
}

/// Read access to a DOM scope: a single list item or a whole page
pub trait FieldSource {
    /// Trimmed inner text of the first element matching `selector`
    fn text(&self, selector: &str) -> FieldOutcome;

    /// Attribute `name` of the first element matching `selector`
    fn attribute(&self, selector: &str, name: &str) -> FieldOutcome;
}

/// Selectors for one item on the search-results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSelectors {
    /// Matches each result item on the page
    pub item: String,
    pub brand: String,
    pub name: String,
    pub price: String,
    pub benefit: String,
    /// Anchor whose `href` carries the goods number
    pub link: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            item: "li.flag.li_result".to_string(),
            brand: ".tx_brand".to_string(),
            name: ".tx_name".to_string(),
            price: ".tx_cur .tx_num".to_string(),
            benefit: ".prd_flag".to_string(),
            link: ".prd_thumb".to_string(),
        }
    }
}

/// Selectors on the goods-detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSelectors {
    pub brand: String,
    pub name: String,
    pub price: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            brand: ".prd_brand".to_string(),
            name: ".prd_name".to_string(),
            price: ".price .price-2 strong".to_string(),
        }
    }
}

/// Raw outcomes for one search-result item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFields {
    pub brand: FieldOutcome,
    pub name: FieldOutcome,
    pub price: FieldOutcome,
    pub benefit: FieldOutcome,
    pub link: FieldOutcome,
}

impl ListingFields {
    /// Build a new record, defaulting every unread field to ""
    pub fn into_product(self, keyword: &str, scraped_at: &str) -> Product {
        let mut product = Product::new(keyword, scraped_at);
        product.product_code = self.link.value().and_then(product_code).unwrap_or_default();
        product.brand = self.brand.or_else("brand", String::new());
        product.name = self.name.or_else("name", String::new());
        product.price = self.price.or_else("price", String::new());
        product.benefit = self.benefit.or_else("benefit", String::new());
        product
    }
}

/// Raw outcomes for a goods-detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFields {
    pub brand: FieldOutcome,
    pub name: FieldOutcome,
    pub price: FieldOutcome,
}

impl DetailFields {
    /// Overwrite the fields that were read, keep the rest, stamp the update
    pub fn apply(self, product: &mut Product, updated_at: &str) {
        product.brand = self.brand.or_else("brand", std::mem::take(&mut product.brand));
        product.name = self.name.or_else("name", std::mem::take(&mut product.name));
        product.price = self.price.or_else("price", std::mem::take(&mut product.price));
        product.updated_at = Some(updated_at.to_string());
        product.status = None;
    }
}

pub fn extract_listing(item: &dyn FieldSource, selectors: &ListingSelectors) -> ListingFields {
    ListingFields {
        brand: item.text(&selectors.brand),
        name: item.text(&selectors.name),
        price: item.text(&selectors.price),
        benefit: item.text(&selectors.benefit),
        link: item.attribute(&selectors.link, "href"),
    }
}

pub fn extract_detail(page: &dyn FieldSource, selectors: &DetailSelectors) -> DetailFields {
    DetailFields {
        brand: page.text(&selectors.brand),
        name: page.text(&selectors.name),
        price: page.text(&selectors.price),
    }
}

/// Goods number from a detail-page link, e.g. `...getGoodsDetail.do?goodsNo=A000000184228`
pub fn product_code(href: &str) -> Option<String> {
    GOODS_NO.captures(href).map(|caps| caps[1].to_string())
}
