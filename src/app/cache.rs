//! Persistent place id cache
//!
//! Maps a shelter's detail page URL to its resolved place id so later runs can
//! skip the detail page scrape. The file is a flat JSON object
//! (`{"<url>": <id>, ...}`).
//!
//! Loading fails soft: a missing, unreadable or malformed file is an empty
//! cache, and entries that are not non-negative integers or that hold a
//! category id are dropped. Saving goes through a temporary file and a rename
//! so an interrupted write leaves the previous cache intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::app::models::CategoryIds;
use crate::constants::files;
use crate::errors::{CacheError, CacheResult};

/// In-memory view of the place id cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdCache {
    entries: BTreeMap<String, u64>,
}

impl IdCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache from `path`, never failing
    pub async fn load(path: &Path, categories: &CategoryIds) -> Self {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No place id cache at {}", path.display());
                return Self::new();
            }
            Err(e) => {
                warn!("Ignoring unreadable place id cache {}: {}", path.display(), e);
                return Self::new();
            }
        };

        let cache = Self::from_json(&content, categories);
        debug!(
            "Loaded {} cached place ids from {}",
            cache.len(),
            path.display()
        );
        cache
    }

    /// Parse cache file content, dropping anything that is not a usable id
    pub fn from_json(content: &str, categories: &CategoryIds) -> Self {
        let object = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(object)) => object,
            Ok(_) => {
                warn!("Ignoring place id cache: top level is not a JSON object");
                return Self::new();
            }
            Err(e) => {
                warn!("Ignoring malformed place id cache: {}", e);
                return Self::new();
            }
        };

        let entries = object
            .into_iter()
            .filter_map(|(url, value)| {
                let id = parse_cached_id(&value)?;
                categories.accept(id).map(|id| (url, id))
            })
            .collect();

        Self { entries }
    }

    /// Write the cache to `path` atomically
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the temporary file cannot be written or renamed
    pub async fn save(&self, path: &Path) -> CacheResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = temp_path_for(path);
        let content = serde_json::to_string_pretty(&self.entries)?;
        tokio::fs::write(&temp_path, content).await?;

        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            warn!("Failed to move {} into place: {}", temp_path.display(), e);
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(CacheError::AtomicOperationFailed {
                temp_path,
                final_path: path.to_path_buf(),
            });
        }

        debug!("Saved {} place ids to {}", self.len(), path.display());
        Ok(())
    }

    /// Cached place id for `url`, if any
    pub fn get(&self, url: &str) -> Option<u64> {
        self.entries.get(url).copied()
    }

    /// Record a resolved place id; category ids are refused
    ///
    /// Returns whether the id was stored.
    pub fn insert(&mut self, url: impl Into<String>, place_id: u64, categories: &CategoryIds) -> bool {
        match categories.accept(place_id) {
            Some(id) => {
                self.entries.insert(url.into(), id);
                true
            }
            None => false,
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accept JSON numbers and all-digit strings, like the cache files in the wild
fn parse_cached_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
            text.parse().ok()
        }
        _ => None,
    }
}

/// `ids_cache.json` -> `ids_cache.json.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(files::TEMP_FILE_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL_A: &str = "https://book.naturstyrelsen.dk/sted/egeskoven/";
    const URL_B: &str = "https://book.naturstyrelsen.dk/sted/strandengen/";

    #[tokio::test]
    async fn test_missing_file_is_empty_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache = IdCache::load(&temp_dir.path().join("absent.json"), &CategoryIds::default()).await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_empty_cache() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ids_cache.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let cache = IdCache::load(&path, &CategoryIds::default()).await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_directory_instead_of_file_is_empty_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache = IdCache::load(temp_dir.path(), &CategoryIds::default()).await;
        assert!(cache.is_empty());
    }

    #[test]
    fn test_non_object_is_empty_cache() {
        let cache = IdCache::from_json("[1, 2, 3]", &CategoryIds::default());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalid_values_dropped() {
        let content = r#"{
            "a": 101,
            "b": "202",
            "c": -5,
            "d": "12x",
            "e": 1.5,
            "f": null,
            "g": "",
            "h": 3031
        }"#;
        let cache = IdCache::from_json(content, &CategoryIds::default());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(101));
        assert_eq!(cache.get("b"), Some(202));
        assert_eq!(cache.get("h"), None, "category ids never come out of the cache");
    }

    #[test]
    fn test_insert_refuses_category_ids() {
        let categories = CategoryIds::default();
        let mut cache = IdCache::new();

        assert!(!cache.insert(URL_A, 3012, &categories));
        assert!(cache.insert(URL_A, 4711, &categories));
        assert_eq!(cache.get(URL_A), Some(4711));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_save_and_reload_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("ids_cache.json");
        let categories = CategoryIds::default();

        let mut cache = IdCache::new();
        cache.insert(URL_A, 4711, &categories);
        cache.insert(URL_B, 0, &categories);
        cache.save(&path).await.unwrap();

        let reloaded = IdCache::load(&path, &categories).await;
        assert_eq!(reloaded, cache);
        assert!(!temp_path_for(&path).exists(), "temporary file is renamed away");
    }

    #[tokio::test]
    async fn test_save_replaces_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ids_cache.json");
        tokio::fs::write(&path, r#"{"old": 1}"#).await.unwrap();
        let categories = CategoryIds::default();

        let mut cache = IdCache::new();
        cache.insert(URL_A, 4711, &categories);
        cache.save(&path).await.unwrap();

        let reloaded = IdCache::load(&path, &categories).await;
        assert_eq!(reloaded.get("old"), None);
        assert_eq!(reloaded.get(URL_A), Some(4711));
    }

    #[test]
    fn test_temp_path_generation() {
        let temp = temp_path_for(Path::new("/tmp/ids_cache.json"));
        assert_eq!(temp, PathBuf::from("/tmp/ids_cache.json.tmp"));
    }
}
