use std::collections::HashMap;

use crate::sdf::Path;

use super::key::InstanceKey;

/// Registrations and unregistrations queued since the last change processing.
///
/// Filled by any number of threads (behind the cache's mutex) and drained in
/// one piece by `InstanceCache::process_changes`.
#[derive(Debug, Default)]
pub(crate) struct PendingChanges {
    pub(crate) added: HashMap<InstanceKey, Vec<Path>>,
    pub(crate) removed: HashMap<InstanceKey, Vec<Path>>,
}

impl PendingChanges {
    /// Queue `path` as a new instance of `key`.
    ///
    /// Returns true if this is the first pending registration for `key`.
    pub(crate) fn push_added(&mut self, key: InstanceKey, path: Path) -> bool {
        let paths = self.added.entry(key).or_default();
        paths.push(path);
        paths.len() == 1
    }

    /// Queue `path` for removal from the prototype of `key`.
    pub(crate) fn push_removed(&mut self, key: InstanceKey, path: Path) {
        self.removed.entry(key).or_default().push(path);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Paths queued for removal under `key` that were not also re-registered
    /// under `key` in the same batch.
    pub(crate) fn removals_net_of_additions(&self, key: &InstanceKey, removed: &[Path]) -> Vec<Path> {
        let mut removed = removed.to_vec();
        removed.sort();
        removed.dedup();

        let Some(added) = self.added.get(key) else {
            return removed;
        };

        let mut added = added.clone();
        added.sort();

        removed.retain(|path| added.binary_search(path).is_err());
        removed
    }
}
