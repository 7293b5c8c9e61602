//! In-memory snapshot of the persisted run state, and the port that loads and
//! saves it.
//!
//! A run loads one [`Snapshot`], mutates it, and saves it back once at the
//! end. Nothing is visible to another process until [`StateRepository::save`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{AccountId, IntelligenceItem, PlatformUserId, RotationState, StoreError};

// ---------------------------------------------------------------------------
// ID cache
// ---------------------------------------------------------------------------

/// Memoised account identifier → platform user ID mapping.
///
/// Append-only. Entries never expire and are never overwritten; a handle that
/// is renamed upstream keeps resolving to the ID it had when first cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdCache(BTreeMap<AccountId, PlatformUserId>);

impl IdCache {
    /// Looks up a cached ID.
    pub fn get(&self, account: &AccountId) -> Option<PlatformUserId> {
        self.0.get(account).copied()
    }

    /// Returns `true` if `account` has a cached ID.
    pub fn contains(&self, account: &AccountId) -> bool {
        self.0.contains_key(account)
    }

    /// Caches `id` for `account` unless an entry already exists.
    ///
    /// Returns `true` if the entry was added.
    pub fn insert(&mut self, account: AccountId, id: PlatformUserId) -> bool {
        match self.0.entry(account) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Intelligence accumulator
// ---------------------------------------------------------------------------

/// Intelligence items accumulated across runs, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceLog {
    #[serde(default)]
    items: Vec<IntelligenceItem>,
}

impl IntelligenceLog {
    pub fn push(&mut self, item: IntelligenceItem) {
        self.items.push(item);
    }

    /// All items, in insertion order.
    pub fn items(&self) -> &[IntelligenceItem] {
        &self.items
    }

    /// Items whose timestamp falls on `day` in `tz`.
    pub fn for_day(&self, day: NaiveDate, tz: Tz) -> Vec<&IntelligenceItem> {
        self.items
            .iter()
            .filter(|item| item.timestamp.local_date(tz) == day)
            .collect()
    }

    /// Removes the items that fall on `day` in `tz`; returns how many.
    pub fn clear_day(&mut self, day: NaiveDate, tz: Tz) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.timestamp.local_date(tz) != day);
        before - self.items.len()
    }

    /// Removes items dated strictly before `cutoff` in `tz`; returns how many.
    pub fn prune_before(&mut self, cutoff: NaiveDate, tz: Tz) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.timestamp.local_date(tz) >= cutoff);
        before - self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything a run reads at start and writes back at the end.
///
/// The default value is the first-run bootstrap state: cursor 0, no
/// accumulated items, empty ID cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub rotation: RotationState,
    pub intelligence: IntelligenceLog,
    pub id_cache: IdCache,
}

impl Snapshot {
    /// Adds an item to the in-memory accumulator.
    pub fn append(&mut self, item: IntelligenceItem) {
        self.intelligence.push(item);
    }
}

/// Durable home of a [`Snapshot`] across process invocations.
///
/// # Preconditions
///
/// Single writer: at most one process may use a repository's backing storage
/// at a time. The external scheduler guarantees runs never overlap; nothing
/// here enforces it.
pub trait StateRepository: Send + Sync {
    /// Returns the last saved snapshot, or [`Snapshot::default`] for any
    /// document that has never been written.
    fn load(&self) -> Result<Snapshot, StoreError>;

    /// Overwrites the stored snapshot with `snapshot`.
    ///
    /// Implementations backed by several documents need not write them
    /// atomically as a set.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}
