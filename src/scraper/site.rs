use crate::extract::{DetailSelectors, ListingSelectors};

pub const SEARCH_URL: &str = "https://www.oliveyoung.co.kr/store/search/getSearchMain.do";
pub const DETAIL_URL: &str = "https://www.oliveyoung.co.kr/store/goods/getGoodsDetail.do";

/// Where and how to read the target site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub search_url: String,
    pub detail_url: String,
    pub listing: ListingSelectors,
    pub detail: DetailSelectors,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            search_url: SEARCH_URL.to_string(),
            detail_url: DETAIL_URL.to_string(),
            listing: ListingSelectors::default(),
            detail: DetailSelectors::default(),
        }
    }
}

impl SiteConfig {
    /// Search-results URL for `keyword`, 1-based `page`
    pub fn search_page(&self, keyword: &str, page: u32) -> String {
        format!("{}?query={}&page={}", self.search_url, urlencoding::encode(keyword), page)
    }

    pub fn detail_page(&self, product_code: &str) -> String {
        format!("{}?goodsNo={}", self.detail_url, urlencoding::encode(product_code))
    }
}
