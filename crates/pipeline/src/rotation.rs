//! Account rotation: which slice of the account list a run polls.
//!
//! Given `N` tracked accounts in a stable order, a persisted cursor and a
//! per-run [`Quota`] `K`, a run polls accounts `[cursor, cursor + K)` modulo
//! `N` and the next run starts at `(cursor + K) mod N`. Every account is
//! therefore visited at least once every `ceil(N / K)` runs while the list is
//! unchanged.
//!
//! Selection is pure; persisting the advanced cursor is the coordinator's
//! decision (see [`RotationState::advance`]).

use serde::{Deserialize, Serialize};

use crate::{AccountId, Quota, Timestamp, TrackedAccount};

/// Persisted rotation position for one platform's account list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    /// Index of the first account the next run selects.
    #[serde(default)]
    pub cursor: usize,

    /// When the cursor last advanced.
    #[serde(default)]
    pub last_run: Option<Timestamp>,

    /// Account count at the time of the last advance.
    #[serde(default)]
    pub total_accounts: usize,

    /// Accounts polled by the last advancing run.
    #[serde(default)]
    pub last_selection: Vec<AccountId>,
}

/// The accounts chosen for one run, and where the following run begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    /// Selected accounts, in polling order.
    pub accounts: Vec<&'a TrackedAccount>,
    /// Cursor actually used, after clamping.
    pub start: usize,
    /// Cursor to persist if the run counts as successful.
    pub next_cursor: usize,
    /// Size of the account list the selection was made from.
    pub total: usize,
}

impl Selection<'_> {
    /// Returns `true` if nothing was selected (empty account list).
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Identifiers of the selected accounts.
    pub fn account_ids(&self) -> Vec<AccountId> {
        self.accounts.iter().map(|a| a.id.clone()).collect()
    }
}

/// Chooses the accounts to poll this run.
///
/// - `cursor >= accounts.len()` (the list shrank) restarts the cycle at 0.
/// - `quota >= accounts.len()` selects every account and resets the cursor.
/// - An empty list selects nothing and leaves the cursor at 0.
pub fn select(accounts: &[TrackedAccount], cursor: usize, quota: Quota) -> Selection<'_> {
    let total = accounts.len();
    if total == 0 {
        return Selection {
            accounts: Vec::new(),
            start: 0,
            next_cursor: 0,
            total,
        };
    }

    let k = quota.get();
    if k >= total {
        return Selection {
            accounts: accounts.iter().collect(),
            start: 0,
            next_cursor: 0,
            total,
        };
    }

    let start = if cursor < total { cursor } else { 0 };
    let selected = (0..k).map(|i| &accounts[(start + i) % total]).collect();

    Selection {
        accounts: selected,
        start,
        next_cursor: (start + k) % total,
        total,
    }
}

impl RotationState {
    /// Records a successful run: moves the cursor and remembers what was polled.
    pub fn advance(&mut self, selection: &Selection<'_>, now: Timestamp) {
        self.cursor = selection.next_cursor;
        self.last_run = Some(now);
        self.total_accounts = selection.total;
        self.last_selection = selection.account_ids();
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Where the rotation stands, for operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationInfo {
    pub total_accounts: usize,
    pub per_run: usize,
    /// One-based index of the cycle slot the next run will poll.
    pub cycle: usize,
    /// Runs needed to cover every account once.
    pub cycle_length: usize,
    pub last_selection: Vec<AccountId>,
}

impl RotationInfo {
    /// Computes the rotation position for `total_accounts` under `quota`.
    pub fn new(state: &RotationState, total_accounts: usize, quota: Quota) -> Self {
        let per_run = quota.get();
        let cursor = if state.cursor < total_accounts {
            state.cursor
        } else {
            0
        };
        Self {
            total_accounts,
            per_run,
            cycle: cursor / per_run + 1,
            cycle_length: total_accounts.div_ceil(per_run).max(1),
            last_selection: state.last_selection.clone(),
        }
    }

    /// Returns `true` when every account fits in a single run.
    pub fn covers_all(&self) -> bool {
        self.total_accounts <= self.per_run
    }
}

impl std::fmt::Display for RotationInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.covers_all() {
            write!(
                f,
                "Monitoring all {} accounts (within API limits)",
                self.total_accounts
            )
        } else {
            write!(
                f,
                "Rotation cycle {}/{}: {} accounts this run",
                self.cycle, self.cycle_length, self.per_run
            )
        }
    }
}
