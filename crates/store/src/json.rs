//! File-backed [`StateRepository`]: three independent JSON documents.

use std::path::{Path, PathBuf};

use pipeline::{
    IdCache, IntelligenceLog, Platform, RotationState, Snapshot, StateRepository, StoreError,
};
use tracing::debug;

use crate::io::{read_or_default, write_json};

/// Locations of the three state documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub rotation: PathBuf,
    pub intelligence: PathBuf,
    pub id_cache: PathBuf,
}

impl StatePaths {
    /// Standard layout under `state_dir`.
    ///
    /// The rotation cursor is per platform (each platform has its own account
    /// list); the intelligence accumulator and ID cache are shared.
    ///
    /// ```text
    /// <state_dir>/twitter/rotation_state.json
    /// <state_dir>/linkedin/rotation_state.json
    /// <state_dir>/daily_intelligence.json
    /// <state_dir>/user_id_cache.json
    /// ```
    pub fn for_platform(state_dir: &Path, platform: Platform) -> Self {
        Self {
            rotation: state_dir.join(platform.key()).join("rotation_state.json"),
            intelligence: state_dir.join("daily_intelligence.json"),
            id_cache: state_dir.join("user_id_cache.json"),
        }
    }
}

/// Stores a [`Snapshot`] as three pretty-printed JSON files.
///
/// Each file is replaced atomically; the three together are not. A crash
/// between writes can leave them mutually inconsistent, which the single-writer
/// daily workload tolerates.
///
/// # Preconditions
///
/// Only one process may use a given set of paths at a time.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    paths: StatePaths,
}

impl JsonFileStore {
    pub fn new(paths: StatePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StatePaths {
        &self.paths
    }
}

impl StateRepository for JsonFileStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        let rotation: RotationState = read_or_default(&self.paths.rotation)?;
        let intelligence: IntelligenceLog = read_or_default(&self.paths.intelligence)?;
        let id_cache: IdCache = read_or_default(&self.paths.id_cache)?;
        debug!(
            cursor = rotation.cursor,
            items = intelligence.len(),
            cached_ids = id_cache.len(),
            "state loaded"
        );
        Ok(Snapshot {
            rotation,
            intelligence,
            id_cache,
        })
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        write_json(&self.paths.rotation, &snapshot.rotation)?;
        write_json(&self.paths.intelligence, &snapshot.intelligence)?;
        write_json(&self.paths.id_cache, &snapshot.id_cache)?;
        debug!(
            cursor = snapshot.rotation.cursor,
            items = snapshot.intelligence.len(),
            cached_ids = snapshot.id_cache.len(),
            "state saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pipeline::{AccountId, Category, IntelligenceItem, PlatformUserId, Timestamp};
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(StatePaths::for_platform(dir.path(), Platform::Twitter))
    }

    fn populated() -> Snapshot {
        let ts = Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 10, 15, 8, 30, 0).unwrap());
        let mut snapshot = Snapshot::default();
        snapshot.rotation = RotationState {
            cursor: 2,
            last_run: Some(ts),
            total_accounts: 5,
            last_selection: vec![AccountId::new("acme").unwrap()],
        };
        snapshot.append(IntelligenceItem {
            account: AccountId::new("acme").unwrap(),
            display_name: "Acme".into(),
            platform: Platform::Twitter,
            category: Category::FundRaise,
            headline: "Raises $40M Series B".into(),
            url: "https://x.com/acme/status/1".into(),
            timestamp: ts,
            critical: true,
        });
        snapshot
            .id_cache
            .insert(AccountId::new("acme").unwrap(), PlatformUserId::new(123_456));
        snapshot
    }

    #[test]
    fn missing_documents_bootstrap_to_default() {
        let dir = TempDir::new().unwrap();
        let snapshot = store(&dir).load().unwrap();
        assert_eq!(snapshot, Snapshot::default());
        assert_eq!(snapshot.rotation.cursor, 0);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let snapshot = populated();
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), snapshot);
    }

    #[test]
    fn load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&populated()).unwrap();
        assert_eq!(store.load().unwrap(), store.load().unwrap());
    }

    #[test]
    fn platforms_have_separate_cursors_but_share_intelligence() {
        let dir = TempDir::new().unwrap();
        let twitter = store(&dir);
        let linkedin =
            JsonFileStore::new(StatePaths::for_platform(dir.path(), Platform::LinkedIn));
        twitter.save(&populated()).unwrap();

        let li = linkedin.load().unwrap();
        assert_eq!(li.rotation.cursor, 0);
        assert_eq!(li.intelligence.len(), 1);
        assert_eq!(li.id_cache.len(), 1);
    }

    #[test]
    fn corrupt_document_fails_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(store.paths().rotation.parent().unwrap()).unwrap();
        std::fs::write(&store.paths().rotation, "[1, 2").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
    }
}
