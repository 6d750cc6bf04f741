//! Plain-data I/O boundary: the classified row file coming in, and the
//! override store (corrections + ignored set) going out. The engine itself
//! never touches the filesystem — everything crosses this boundary as
//! already-parsed values.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WalterError};
use crate::models::{OverrideMap, TxRow};

/// Corrections and ignored issue ids, persisted as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideStore {
    #[serde(default)]
    pub overrides: OverrideMap,
    #[serde(default)]
    pub ignored: BTreeSet<String>,
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("walter")
}

pub fn default_store_path() -> PathBuf {
    config_dir().join("overrides.json")
}

/// Load the classified rows handed over by the upstream classifier: a JSON
/// array of row objects.
pub fn load_rows(path: &Path) -> Result<Vec<TxRow>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|_| WalterError::RowFile(path.to_string_lossy().to_string()))
}

pub fn save_rows(path: &Path, rows: &[TxRow]) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

/// Tolerant load: a missing or unreadable store is an empty one, never an
/// error — first run has nothing to correct yet.
pub fn load_store(path: &Path) -> OverrideStore {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        OverrideStore::default()
    }
}

pub fn save_store(path: &Path, store: &OverrideStore) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(store)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("overrides.json");

        let mut store = OverrideStore::default();
        store
            .overrides
            .symbols
            .insert("SPL-7xKq".to_string(), "BONK".to_string());
        store.ignored.insert("market:UNKNOWN".to_string());

        save_store(&path, &store).unwrap();
        let loaded = load_store(&path);
        assert_eq!(loaded.overrides.symbols.get("SPL-7xKq").unwrap(), "BONK");
        assert!(loaded.ignored.contains("market:UNKNOWN"));
    }

    #[test]
    fn test_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_store(&dir.path().join("nope.json"));
        assert!(loaded.overrides.is_empty());
        assert!(loaded.ignored.is_empty());
    }

    #[test]
    fn test_corrupt_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(&path, "{ not json").unwrap();
        let loaded = load_store(&path);
        assert!(loaded.overrides.is_empty());
    }

    #[test]
    fn test_load_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        let rows = vec![TxRow {
            timestamp: "2025-03-01 09:00:00".to_string(),
            tx_type: "Trade".to_string(),
            ..TxRow::default()
        }];
        save_rows(&path, &rows).unwrap();
        let loaded = load_rows(&path).unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn test_load_rows_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "{\"rows\": []}").unwrap();
        assert!(matches!(
            load_rows(&path),
            Err(WalterError::RowFile(_))
        ));
    }
}
