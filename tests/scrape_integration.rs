use product_watch::{ChromeLauncher, LaunchOptions, PageTimings, ProductSource, Scraper, SiteConfig};
use std::path::Path;
use tempfile::TempDir;

const SEARCH_HTML: &str = r#"<html><body><ul>
<li class="flag li_result">
  <a class="prd_thumb" href="/store/goods/getGoodsDetail.do?goodsNo=A000000184228&dispCatNo=1">img</a>
  <span class="tx_brand">라운드랩</span><p class="tx_name">자작나무 수분 선크림</p>
  <p class="prd_price"><span class="tx_cur"><span class="tx_num">19,900</span>원</span></p>
  <p class="prd_flag"><span>세일</span></p>
</li>
<li class="flag li_result">
  <a class="prd_thumb" href="javascript:;">img</a>
  <span class="tx_brand">토리든</span><p class="tx_name">다이브인 세럼</p>
</li>
</ul></body></html>"#;

const DETAIL_HTML: &str = r#"<html><body>
<p class="prd_brand"> 라운드랩 </p><p class="prd_name">자작나무 수분 선크림 50ml</p>
<div class="price"><span class="price-2"><strong>17,900</strong></span></div>
</body></html>"#;

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn local_scraper(dir: &TempDir) -> Scraper<ChromeLauncher> {
    let search = dir.path().join("search.html");
    let detail = dir.path().join("detail.html");
    std::fs::write(&search, SEARCH_HTML).expect("write search page");
    std::fs::write(&detail, DETAIL_HTML).expect("write detail page");

    let site = SiteConfig { search_url: file_url(&search), detail_url: file_url(&detail), ..SiteConfig::default() };
    let launcher = ChromeLauncher::new(LaunchOptions::new().headless(true), PageTimings::immediate());
    Scraper::with_site(launcher, site)
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_search_reads_result_items() {
    let dir = TempDir::new().unwrap();
    let scraper = local_scraper(&dir);

    let products = scraper.search(&["선크림".to_string()], 2).expect("search");

    // two items on each of the two pages
    assert_eq!(products.len(), 4);
    assert_eq!(products[0].brand, "라운드랩");
    assert_eq!(products[0].price, "19,900");
    assert_eq!(products[0].product_code, "A000000184228");
    assert_eq!(products[0].benefit, "세일");
    assert_eq!(products[1].price, "");
    assert_eq!(products[1].product_code, "");
}

#[test]
#[ignore]
fn test_refresh_reads_detail_page() {
    let dir = TempDir::new().unwrap();
    let scraper = local_scraper(&dir);

    let products = scraper.search(&["선크림".to_string()], 1).expect("search");
    let refreshed = scraper.refresh(products.clone()).expect("refresh");

    assert_eq!(refreshed.len(), products.len());
    assert_eq!(refreshed[0].brand, "라운드랩");
    assert_eq!(refreshed[0].name, "자작나무 수분 선크림 50ml");
    assert_eq!(refreshed[0].price, "17,900");
    assert!(refreshed[0].updated_at.is_some());
    assert_eq!(refreshed[1], products[1]);
}
