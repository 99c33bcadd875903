//! Window association side table
//!
//! Records, per window id, which stack owns the window and at which
//! level it sits. This is an explicit owned mapping keyed by window id
//! rather than metadata attached to the windows themselves: a window
//! record never holds its owner, and a dropped stack is never kept
//! alive by windows it once created.
//!
//! One process-wide table exists by default; every consumer also
//! accepts an explicitly injected table so tests can run against a
//! private one.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::window::{ManagedWindow, WindowLevel};

/// Ownership metadata for one registered window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    /// Id of the owning stack; `None` for externally created windows.
    pub owner: Option<u64>,

    /// Level the window occupies in its owner; `None` for root windows.
    pub level: Option<WindowLevel>,
}

#[derive(Debug, Clone)]
struct Entry {
    window: ManagedWindow,
    association: Association,
}

/// Arena-style side table mapping window ids to their associations.
///
/// All operations are O(1) and safe to call for ids that were never
/// registered. Entries are mutated only by the owning stack; external
/// code registers foreign windows through [`AssociationTable::register_external`].
#[derive(Debug, Default)]
pub struct AssociationTable {
    entries: Mutex<HashMap<u64, Entry>>,
}

impl AssociationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default table.
    pub fn global() -> Arc<AssociationTable> {
        static GLOBAL: OnceLock<Arc<AssociationTable>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(AssociationTable::new())))
    }

    /// Association for `window_id`, or `None` if it was never
    /// registered (or has been cleared).
    pub fn get(&self, window_id: u64) -> Option<Association> {
        self.entries.lock().get(&window_id).map(|e| e.association)
    }

    /// Record `window` as owned by `owner` at `level`.
    ///
    /// Re-registering an id replaces the previous entry.
    pub fn set(&self, window: &ManagedWindow, owner: Option<u64>, level: Option<WindowLevel>) {
        self.entries.lock().insert(
            window.id,
            Entry {
                window: window.clone(),
                association: Association { owner, level },
            },
        );
    }

    /// Remove the entry for `window_id`. No-op for unknown ids.
    pub fn clear(&self, window_id: u64) {
        let _ = self.entries.lock().remove(&window_id);
    }

    /// Register a window no stack manages, so transition logic can
    /// still account for it when `ignore_unmanaged` is off.
    pub fn register_external(&self, window: &ManagedWindow) {
        self.set(window, None, window.level);
    }

    /// Snapshot of every registered window with its association.
    pub fn windows(&self) -> Vec<(ManagedWindow, Association)> {
        self.entries
            .lock()
            .values()
            .map(|e| (e.window.clone(), e.association))
            .collect()
    }

    /// Whether `window_id` currently has an entry.
    pub fn contains(&self, window_id: u64) -> bool {
        self.entries.lock().contains_key(&window_id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
