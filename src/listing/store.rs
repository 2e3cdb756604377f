use super::types::Listing;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

const STORE_VERSION: u32 = 1;

/// Snapshot of every known listing, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingStore {
    pub version: u32,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

impl Default for ListingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingStore {
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            listings: Vec::new(),
        }
    }

    /// Merge freshly ingested listings. An incoming listing replaces the
    /// stored one with the same id in place; new ids are appended in order.
    /// Returns (added, updated).
    pub fn merge(&mut self, incoming: Vec<Listing>) -> (usize, usize) {
        let mut added = 0;
        let mut updated = 0;
        for listing in incoming {
            match self.listings.iter_mut().find(|l| l.id == listing.id) {
                Some(existing) => {
                    *existing = listing;
                    updated += 1;
                }
                None => {
                    self.listings.push(listing);
                    added += 1;
                }
            }
        }
        (added, updated)
    }
}

/// Get the default store path (~/.config/autofinder/listings.json)
pub fn get_store_path() -> PathBuf {
    crate::config::get_config_dir().join("listings.json")
}

/// Load the store from a JSON file
///
/// If the file doesn't exist, returns an empty store.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_store(path: &Path) -> Result<ListingStore> {
    if !path.exists() {
        return Ok(ListingStore::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open listing store at {}", path.display()))?;

    let store: ListingStore = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse listing store at {}", path.display()))?;

    if store.version != STORE_VERSION {
        anyhow::bail!("Unsupported listing store version: {}", store.version);
    }

    Ok(store)
}

/// Save the store atomically so a crash never leaves a half-written file.
pub fn save_store(path: &Path, store: &ListingStore) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, store).context("Failed to serialize listing store")?;

    file.commit().context("Failed to save listing store")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, price: u32) -> Listing {
        Listing {
            price: Some(price),
            ..Listing::new(id)
        }
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_store(&dir.path().join("missing.json")).unwrap();
        assert_eq!(store.version, 1);
        assert!(store.listings.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("listings.json");

        let mut store = ListingStore::new();
        store.merge(vec![listing("a", 10_000), listing("b", 12_500)]);
        save_store(&path, &store).unwrap();

        let loaded = load_store(&path).unwrap();
        assert_eq!(loaded.listings.len(), 2);
        assert_eq!(loaded.listings[1].id, "b");
        assert_eq!(loaded.listings[1].price, Some(12_500));
    }

    #[test]
    fn test_unsupported_version_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");
        std::fs::write(&path, r#"{"version": 7, "listings": []}"#).unwrap();

        let err = load_store(&path).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_merge_replaces_in_place_and_appends() {
        let mut store = ListingStore::new();
        store.merge(vec![listing("a", 1), listing("b", 2)]);

        let (added, updated) = store.merge(vec![listing("b", 20), listing("c", 3)]);
        assert_eq!((added, updated), (1, 1));

        let ids: Vec<&str> = store.listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.listings[1].price, Some(20));
    }
}
