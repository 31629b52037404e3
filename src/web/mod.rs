//! Web UI: search, favorites, refresh and Excel export
//!
//! Handlers share an [`AppState`]. Scrapes run on Tokio's blocking pool and
//! the request waits for them; the store lock is never held during a scrape.
//! Favorites are addressed by record id, so a stale page can at worst name
//! records that no longer exist, which are skipped and counted.

pub mod views;

use crate::error::BrowserError;
use crate::export::{EXPORT_FILE_NAME, XLSX_CONTENT_TYPE, favorites_workbook};
use crate::model::{Product, ProductId};
use crate::scraper::ProductSource;
use crate::store::{Selection, Store};
use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use views::SearchInput;

const FAVORITES_PATH: &str = "/favorites";

/// Default cap on pages per keyword
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub source: Arc<dyn ProductSource>,
    /// Upper bound accepted for the `pages` field
    pub max_pages: u32,
}

impl AppState {
    pub fn new(store: Store, source: impl ProductSource + 'static) -> Self {
        Self { store: Arc::new(store), source: Arc::new(source), max_pages: DEFAULT_MAX_PAGES }
    }

    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(search))
        .route(FAVORITES_PATH, get(favorites))
        .route("/favorites/add", post(add_favorites))
        .route("/favorites/refresh", post(refresh_favorites))
        .route("/favorites/remove", post(remove_favorites))
        .route("/favorites/export", get(export_favorites))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct FlashQuery {
    msg: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchForm {
    #[serde(default)]
    keywords: String,
    #[serde(default)]
    pages: Option<String>,
}

/// Split a comma-separated keyword list, trimming and dropping empties
pub fn normalize_keywords(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|k| !k.is_empty()).map(str::to_string).collect()
}

/// Parse the page count; blank means 1
pub fn parse_pages(raw: Option<&str>, max_pages: u32) -> Result<u32, String> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("1");
    match raw.parse::<u32>() {
        Ok(0) | Err(_) => Err(format!("Page count must be a whole number of at least 1 (got '{}')", raw)),
        Ok(pages) if pages > max_pages => Err(format!("Page count is limited to {}", max_pages)),
        Ok(pages) => Ok(pages),
    }
}

/// Ids from repeated `select` form fields; values that are not ids count as unknown
fn selected_ids(fields: &[(String, String)]) -> (Vec<ProductId>, usize) {
    let mut ids = Vec::new();
    let mut invalid = 0;
    for (key, value) in fields {
        if key != "select" {
            continue;
        }
        match value.parse() {
            Ok(id) => ids.push(id),
            Err(_) => invalid += 1,
        }
    }
    (ids, invalid)
}

fn redirect_with(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{}?msg={}", path, urlencoding::encode(message))).into_response()
}

fn stale_note(unknown: usize) -> String {
    if unknown == 0 {
        String::new()
    } else {
        format!(" ({} selected item(s) no longer exist)", unknown)
    }
}

fn internal_error(context: &str, err: impl std::fmt::Display) -> String {
    log::error!("{}: {}", context, err);
    format!("{}: {}", context, err)
}

/// Run a scrape on the blocking pool
async fn run_blocking<T, F>(f: F) -> Result<T, BrowserError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, BrowserError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .unwrap_or_else(|e| Err(BrowserError::TaskAborted(e.to_string())))
}

async fn index(State(state): State<AppState>, Query(query): Query<FlashQuery>) -> Response {
    match state.store.read(|data| data.results.clone()) {
        Ok(results) => {
            let input = SearchInput { keywords: "", pages: 1 };
            Html(views::results_page(&results, &input, query.msg.as_deref())).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, internal_error("Failed to read state", e)).into_response(),
    }
}

async fn search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Response {
    let keywords = normalize_keywords(&form.keywords);
    let pages_field = form.pages.as_deref();

    let render = |results: &[Product], pages: u32, message: &str| {
        let input = SearchInput { keywords: &form.keywords, pages };
        Html(views::results_page(results, &input, Some(message))).into_response()
    };
    let current = || state.store.read(|data| data.results.clone()).unwrap_or_default();

    let pages = match parse_pages(pages_field, state.max_pages) {
        Ok(pages) => pages,
        Err(message) => return render(&current(), 1, &message),
    };
    if keywords.is_empty() {
        return render(&current(), pages, "Enter at least one keyword");
    }

    log::info!("Search {:?} x {} page(s)", keywords, pages);
    let source = state.source.clone();
    let products = match run_blocking(move || source.search(&keywords, pages)).await {
        Ok(products) => products,
        Err(e) => return render(&current(), pages, &internal_error("Search failed", e)),
    };

    let count = products.len();
    let saved = state.store.update(|data| {
        data.replace_results(products);
        data.results.clone()
    });

    match saved {
        Ok(results) => render(&results, pages, &format!("Found {} products", count)),
        Err(e) => render(&current(), pages, &internal_error("Failed to save results", e)),
    }
}

async fn favorites(State(state): State<AppState>, Query(query): Query<FlashQuery>) -> Response {
    match state.store.read(|data| data.favorites.clone()) {
        Ok(favorites) => Html(views::favorites_page(&favorites, query.msg.as_deref())).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, internal_error("Failed to read state", e)).into_response(),
    }
}

async fn add_favorites(State(state): State<AppState>, Form(fields): Form<Vec<(String, String)>>) -> Response {
    let (ids, invalid) = selected_ids(&fields);

    match state.store.update(|data| data.add_favorites(&ids)) {
        Ok(Selection { applied, unknown }) => redirect_with(
            FAVORITES_PATH,
            &format!("Added {} products to favorites{}", applied, stale_note(unknown + invalid)),
        ),
        Err(e) => redirect_with(FAVORITES_PATH, &internal_error("Failed to save favorites", e)),
    }
}

async fn refresh_favorites(State(state): State<AppState>, Form(fields): Form<Vec<(String, String)>>) -> Response {
    let (ids, invalid) = selected_ids(&fields);

    let (selected, unknown) = match state.store.read(|data| data.select_favorites(&ids)) {
        Ok(found) => found,
        Err(e) => return redirect_with(FAVORITES_PATH, &internal_error("Failed to read state", e)),
    };
    if selected.is_empty() {
        return redirect_with(FAVORITES_PATH, &format!("No favorites selected{}", stale_note(unknown + invalid)));
    }

    let source = state.source.clone();
    let refreshed = match run_blocking(move || source.refresh(selected)).await {
        Ok(refreshed) => refreshed,
        Err(e) => return redirect_with(FAVORITES_PATH, &internal_error("Refresh failed", e)),
    };
    let failed = refreshed.iter().filter(|p| p.status.is_some()).count();

    match state.store.update(|data| data.replace_favorites(refreshed)) {
        Ok(Selection { applied, unknown: removed }) => {
            let mut message = format!("Refreshed {} favorites", applied);
            if failed > 0 {
                message.push_str(&format!(", {} failed", failed));
            }
            message.push_str(&stale_note(unknown + invalid + removed));
            redirect_with(FAVORITES_PATH, &message)
        }
        Err(e) => redirect_with(FAVORITES_PATH, &internal_error("Failed to save favorites", e)),
    }
}

async fn remove_favorites(State(state): State<AppState>, Form(fields): Form<Vec<(String, String)>>) -> Response {
    let (ids, invalid) = selected_ids(&fields);

    match state.store.update(|data| data.remove_favorites(&ids)) {
        Ok(Selection { applied, unknown }) => redirect_with(
            FAVORITES_PATH,
            &format!("Removed {} favorites{}", applied, stale_note(unknown + invalid)),
        ),
        Err(e) => redirect_with(FAVORITES_PATH, &internal_error("Failed to save favorites", e)),
    }
}

async fn export_favorites(State(state): State<AppState>) -> Response {
    let favorites = match state.store.read(|data| data.favorites.clone()) {
        Ok(favorites) => favorites,
        Err(e) => return redirect_with(FAVORITES_PATH, &internal_error("Failed to read state", e)),
    };

    match favorites_workbook(&favorites) {
        Ok(Some(bytes)) => {
            log::info!("Exporting {} favorites", favorites.len());
            (
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME)),
                ],
                bytes,
            )
                .into_response()
        }
        Ok(None) => redirect_with(FAVORITES_PATH, "There are no favorites to export"),
        Err(e) => redirect_with(FAVORITES_PATH, &internal_error("Export failed", e)),
    }
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Response {
    match state.store.read(|data| (data.results.len(), data.favorites.len())) {
        Ok((results, favorites)) => Json(serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "results": results,
            "favorites": favorites,
        }))
        .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, internal_error("Failed to read state", e)).into_response(),
    }
}
