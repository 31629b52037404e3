//! JSON-file persistence for search results and favorites
//!
//! The whole state lives in one pretty-printed UTF-8 file with two arrays,
//! `results` and `favorites`. Every mutation goes through [`Store::update`],
//! which holds the lock while the closure runs and the file is rewritten.

use crate::error::{BrowserError, Result};
use crate::model::{Product, ProductId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Everything persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub results: Vec<Product>,

    #[serde(default)]
    pub favorites: Vec<Product>,
}

/// How many requested ids were acted on and how many no longer exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub applied: usize,
    pub unknown: usize,
}

impl AppData {
    /// Replace the last search wholesale
    pub fn replace_results(&mut self, products: Vec<Product>) {
        self.results = products;
    }

    /// Copy the selected results into favorites, skipping listings already there
    pub fn add_favorites(&mut self, ids: &[ProductId]) -> Selection {
        let mut selection = Selection::default();
        for id in ids {
            let Some(product) = self.results.iter().find(|p| p.id == *id) else {
                selection.unknown += 1;
                continue;
            };

            if self.favorites.iter().any(|f| f.id == product.id || f.same_listing(product)) {
                continue;
            }

            self.favorites.push(product.clone());
            selection.applied += 1;
        }
        selection
    }

    /// Favorites with the given ids, in request order, plus the count of ids not found
    pub fn select_favorites(&self, ids: &[ProductId]) -> (Vec<Product>, usize) {
        let mut unknown = 0;
        let mut selected: Vec<Product> = Vec::new();
        for id in ids {
            if selected.iter().any(|p| p.id == *id) {
                continue;
            }
            match self.favorites.iter().find(|p| p.id == *id) {
                Some(product) => selected.push(product.clone()),
                None => unknown += 1,
            }
        }
        (selected, unknown)
    }

    /// Write refreshed records back over the favorites with the same id.
    ///
    /// A favorite removed while the refresh was running stays removed.
    pub fn replace_favorites(&mut self, refreshed: Vec<Product>) -> Selection {
        let mut selection = Selection::default();
        for product in refreshed {
            match self.favorites.iter_mut().find(|p| p.id == product.id) {
                Some(slot) => {
                    *slot = product;
                    selection.applied += 1;
                }
                None => selection.unknown += 1,
            }
        }
        selection
    }

    pub fn remove_favorites(&mut self, ids: &[ProductId]) -> Selection {
        let before = self.favorites.len();
        self.favorites.retain(|p| !ids.contains(&p.id));
        let applied = before - self.favorites.len();

        let distinct: HashSet<&ProductId> = ids.iter().collect();
        Selection { applied, unknown: distinct.len().saturating_sub(applied) }
    }
}

/// Shared application state backed by a JSON file
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    data: Mutex<AppData>,
}

impl Store {
    /// Load `path`, or start empty when it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = load(&path)?;
        log::info!(
            "Loaded {} results and {} favorites from {}",
            data.results.len(),
            data.favorites.len(),
            path.display()
        );
        Ok(Self { path, data: Mutex::new(data) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, AppData>> {
        self.data.lock().map_err(|_| BrowserError::LockPoisoned)
    }

    /// Run `f` against the current state
    pub fn read<R>(&self, f: impl FnOnce(&AppData) -> R) -> Result<R> {
        let data = self.lock()?;
        Ok(f(&data))
    }

    /// Run `f` against a copy of the state and swap it in once the copy is saved.
    ///
    /// If saving fails the in-memory state is left as it was.
    pub fn update<R>(&self, f: impl FnOnce(&mut AppData) -> R) -> Result<R> {
        let mut data = self.lock()?;
        let mut next = data.clone();
        let value = f(&mut next);
        save(&self.path, &next)?;
        *data = next;
        Ok(value)
    }

    pub fn snapshot(&self) -> Result<AppData> {
        self.read(AppData::clone)
    }
}

/// Read the state file; a missing file is an empty state
pub fn load(path: &Path) -> Result<AppData> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppData::default()),
        Err(source) => return Err(BrowserError::StoreIo { path: path.to_path_buf(), source }),
    };

    serde_json::from_str(&text).map_err(|source| BrowserError::StoreFormat { path: path.to_path_buf(), source })
}

/// Write the state through a temporary sibling file and rename it into place
pub fn save(path: &Path, data: &AppData) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|source| BrowserError::StoreFormat { path: path.to_path_buf(), source })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, json).map_err(|source| BrowserError::StoreIo { path: tmp.clone(), source })?;
    std::fs::rename(&tmp, path).map_err(|source| BrowserError::StoreIo { path: path.to_path_buf(), source })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn product(name: &str, code: &str) -> Product {
        let mut product = Product::new("크림", "2024-05-01 10:00:00");
        product.brand = "에스트라".to_string();
        product.name = name.to_string();
        product.price = "25,000".to_string();
        product.product_code = code.to_string();
        product
    }

    fn state_with_favorites(names: &[&str]) -> AppData {
        AppData {
            results: Vec::new(),
            favorites: names.iter().enumerate().map(|(i, n)| product(n, &format!("A{}", i))).collect(),
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let data = load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(data, AppData::default());
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load(&path), Err(BrowserError::StoreFormat { .. })));
    }

    #[test]
    fn test_save_load_round_trip_keeps_non_ascii() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut favorite = product("아토베리어365 크림", "A000000160906");
        favorite.status = Some("네트워크 오류".to_string());
        favorite.extra.insert("리뷰".to_string(), serde_json::json!("4.9점"));
        let data = AppData { results: vec![product("수분 크림", "")], favorites: vec![favorite] };

        save(&path, &data).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("아토베리어365 크림"));
        assert!(text.contains("\"리뷰\": \"4.9점\""));
        assert!(!text.contains("\\u"));
        assert!(!dir.path().join("state.json.tmp").exists());

        assert_eq!(load(&path).unwrap(), data);
    }

    #[test]
    fn test_load_assigns_ids_to_legacy_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"results": [{"name": "a"}, {"name": "b"}], "favorites": []}"#).unwrap();

        let data = load(&path).unwrap();
        assert_eq!(data.results.len(), 2);
        assert_ne!(data.results[0].id, data.results[1].id);
    }

    #[test]
    fn test_add_favorites_is_idempotent() {
        let mut data = AppData::default();
        data.replace_results(vec![product("a", "A1"), product("b", "A2")]);
        let first = data.results[0].id;

        assert_eq!(data.add_favorites(&[first]), Selection { applied: 1, unknown: 0 });
        assert_eq!(data.add_favorites(&[first]), Selection { applied: 0, unknown: 0 });
        assert_eq!(data.favorites.len(), 1);
    }

    #[test]
    fn test_add_favorites_skips_rescraped_listing() {
        let mut data = AppData::default();
        data.replace_results(vec![product("a", "A1")]);
        data.add_favorites(&[data.results[0].id]);

        // a later search returns the same goods with a new id and timestamp
        let mut again = product("a", "A1");
        again.scraped_at = "2024-06-01 12:00:00".to_string();
        data.replace_results(vec![again]);
        let selection = data.add_favorites(&[data.results[0].id]);

        assert_eq!(selection.applied, 0);
        assert_eq!(data.favorites.len(), 1);
    }

    #[test]
    fn test_add_favorites_counts_stale_ids() {
        let mut data = AppData::default();
        data.replace_results(vec![product("a", "A1")]);
        let selection = data.add_favorites(&[ProductId::new(), data.results[0].id]);
        assert_eq!(selection, Selection { applied: 1, unknown: 1 });
    }

    #[test]
    fn test_remove_first_and_third_leaves_second() {
        let mut data = state_with_favorites(&["first", "second", "third"]);
        let ids = [data.favorites[0].id, data.favorites[2].id];

        let selection = data.remove_favorites(&ids);
        assert_eq!(selection, Selection { applied: 2, unknown: 0 });
        assert_eq!(data.favorites.len(), 1);
        assert_eq!(data.favorites[0].name, "second");
    }

    #[test]
    fn test_remove_unknown_and_repeated_ids() {
        let mut data = state_with_favorites(&["only"]);
        let id = data.favorites[0].id;
        let selection = data.remove_favorites(&[id, id, ProductId::new()]);
        assert_eq!(selection, Selection { applied: 1, unknown: 1 });
        assert!(data.favorites.is_empty());
    }

    #[test]
    fn test_select_and_replace_favorites_by_id() {
        let mut data = state_with_favorites(&["a", "b", "c"]);
        let ids = [data.favorites[2].id, data.favorites[0].id, ProductId::new()];

        let (mut selected, unknown) = data.select_favorites(&ids);
        assert_eq!(unknown, 1);
        assert_eq!(selected.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["c", "a"]);

        selected[0].price = "1,000".to_string();
        selected[1].price = "2,000".to_string();
        // "a" is removed by a concurrent request before the write-back
        let removed = data.favorites[0].id;
        data.remove_favorites(&[removed]);

        let selection = data.replace_favorites(selected);
        assert_eq!(selection, Selection { applied: 1, unknown: 1 });
        assert_eq!(data.favorites.len(), 2);
        assert_eq!(data.favorites[0].name, "b");
        assert_eq!(data.favorites[1].price, "1,000");
    }

    #[test]
    fn test_store_update_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let store = Store::open(&path).unwrap();
        store.update(|data| data.replace_results(vec![product("a", "A1")])).unwrap();

        let reopened = Store::open(&path).unwrap();
        let names = reopened.read(|data| data.results.iter().map(|p| p.name.clone()).collect::<Vec<_>>()).unwrap();
        assert_eq!(names, vec!["a"]);
        assert_eq!(reopened.snapshot().unwrap(), store.snapshot().unwrap());
    }

    #[test]
    fn test_store_update_failed_save_keeps_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing_dir").join("state.json");

        let store = Store::open(&path).unwrap();
        let result = store.update(|data| data.replace_results(vec![product("a", "A1")]));

        assert!(matches!(result, Err(BrowserError::StoreIo { .. })));
        assert!(store.read(|data| data.results.is_empty()).unwrap());
        assert!(!path.exists());
    }
}
