//! The instancing cache.
//!
//! Registration is the only concurrent entry point: composition workers call
//! [`InstanceCache::register_instance_prim_index`] through a shared reference
//! and only contend on the pending-change mutex. Everything else that mutates
//! the cache takes `&mut self`, so the borrow checker guarantees that change
//! processing never overlaps registration, queries, or itself.

use std::collections::HashMap;

use anyhow::{ensure, Result};
use parking_lot::Mutex;

use crate::pcp::PrimIndex;
use crate::sdf::Path;
use crate::stage::{LoadRules, PopulationMask};

use super::changes::InstanceChanges;
use super::config::InstanceCacheConfig;
use super::key::InstanceKey;
use super::pending::PendingChanges;
use super::table::PrototypeTable;

/// Name prefix reserved for prototype root prims.
pub const PROTOTYPE_PREFIX: &str = "__Prototype_";

/// Outcome of registering an instanceable prim index.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// No prototype exists for the key yet and this is its first pending
    /// registration; a prototype will be created on the next change processing.
    NeedsNewPrototype,
    /// A prototype exists for the key and this prim index is its source.
    UsesExistingPrototypeAsSource,
    /// Anything else: the index joins an existing or pending prototype as a
    /// plain instance.
    Other,
}

impl Registration {
    /// Returns true if the registered prim index is, or is about to become, the
    /// source of a prototype.
    pub fn uses_index_as_source(self) -> bool {
        matches!(
            self,
            Registration::NeedsNewPrototype | Registration::UsesExistingPrototypeAsSource
        )
    }
}

/// Deduplicates instanceable prim indexes into shared prototypes.
///
/// Prim indexes with equal [`InstanceKey`]s share one prototype, a root prim
/// named `/__Prototype_<N>` whose content is composed from a single *source*
/// prim index. Registrations and unregistrations are queued and only take
/// effect in [`InstanceCache::process_changes`].
#[derive(Debug, Default)]
pub struct InstanceCache {
    config: InstanceCacheConfig,
    table: PrototypeTable,
    pending: Mutex<PendingChanges>,
    last_prototype_index: usize,
}

impl InstanceCache {
    /// Create a cache with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache with an explicit configuration.
    pub fn with_config(config: InstanceCacheConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The configuration this cache was created with.
    pub fn config(&self) -> &InstanceCacheConfig {
        &self.config
    }

    /// Queue an instanceable prim index for assignment to a prototype.
    ///
    /// Safe to call from many threads at once. The answer is computed against
    /// the state left by the last [`process_changes`](Self::process_changes),
    /// so two threads racing on a brand-new key see exactly one
    /// `NeedsNewPrototype` between them.
    pub fn register_instance_prim_index(
        &self,
        prim_index: &PrimIndex,
        mask: Option<&PopulationMask>,
        load_rules: &LoadRules,
    ) -> Registration {
        let path = prim_index.path();
        if !prim_index.is_instanceable() {
            coding_error!("Prim index <{}> is not instanceable", path);
            return Registration::Other;
        }
        if !path.is_absolute_path() {
            coding_error!("Instance prim index path <{}> is not absolute", path);
            return Registration::Other;
        }

        // Compute the key before taking the lock to keep the critical section short.
        let key = InstanceKey::new(prim_index, mask, load_rules);
        let existing_prototype = self.table.prototype_for_key(&key);

        {
            let mut pending = self.pending.lock();
            let first_for_key = pending.push_added(key, path.clone());
            if existing_prototype.is_none() && first_for_key {
                return Registration::NeedsNewPrototype;
            }
        }

        match existing_prototype {
            Some(prototype) if self.table.source_for_prototype(prototype) == Some(path) => {
                Registration::UsesExistingPrototypeAsSource
            }
            _ => Registration::Other,
        }
    }

    /// Queue every registered instance at or below `prim_index_path` for removal.
    pub fn unregister_instance_prim_indexes_under(&self, prim_index_path: &Path) {
        if !require_absolute(prim_index_path, "unregister_instance_prim_indexes_under") {
            return;
        }

        let mut removals = Vec::new();
        for (member, prototype) in self.table.members_under(prim_index_path) {
            let Some(key) = self.table.key_for_prototype(prototype) else {
                verify!(false, "Prototype <{}> of <{}> has no instance key", prototype, member);
                continue;
            };
            removals.push((key.clone(), member.clone()));
        }

        if removals.is_empty() {
            return;
        }

        let mut pending = self.pending.lock();
        for (key, member) in removals {
            pending.push_removed(key, member);
        }
    }

    /// Returns true if registrations or unregistrations are waiting to be processed.
    pub fn has_pending_changes(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    /// Apply all queued registrations and unregistrations.
    ///
    /// Removals are applied first, then additions, and prototypes left without
    /// instances are retired last, so removing the last instance of a
    /// prototype and adding a new one in the same batch re-sources the
    /// prototype instead of replacing it.
    pub fn process_changes(&mut self) -> InstanceChanges {
        let mut changes = InstanceChanges::default();

        let pending = std::mem::take(self.pending.get_mut());
        if pending.is_empty() {
            return changes;
        }

        // Sources removed from prototypes that ended up without instances,
        // for reporting if a later addition re-sources them.
        let mut old_sources = HashMap::new();
        for (key, removed) in &pending.removed {
            let removed = pending.removals_net_of_additions(key, removed);
            self.remove_instances(key, &removed, &mut changes, &mut old_sources);
        }

        let PendingChanges { added, removed } = pending;

        // Only keys are ordered. The first path received for a key must stay
        // first: its caller was told it needs a new prototype and composes it
        // as the source.
        let mut added: Vec<(InstanceKey, Vec<Path>)> = added.into_iter().collect();
        if self.config.deterministic_assignment {
            added.sort_by(|(_, a), (_, b)| a.first().cmp(&b.first()));
        }

        for (key, paths) in added {
            self.create_or_update_prototype(key, paths, &mut changes, &old_sources);
        }

        for key in removed.keys() {
            if let Some(prototype) = self.table.retire_if_unused(key) {
                log::debug!("Instancing: Removing prototype <{}>", prototype);
                changes.push_dead(prototype);
            }
        }

        // Removals are grouped by key in hash order.
        if self.config.deterministic_assignment {
            changes.changed_prototypes.sort_by(|a, b| a.prototype.cmp(&b.prototype));
            changes.dead_prototypes.sort();
        }

        changes
    }

    fn remove_instances(
        &mut self,
        key: &InstanceKey,
        paths: &[Path],
        changes: &mut InstanceChanges,
        old_sources: &mut HashMap<Path, Path>,
    ) {
        if paths.is_empty() {
            return;
        }
        let Some(prototype) = self.table.prototype_for_key(key).cloned() else {
            return;
        };

        let mut removed_source = None;
        for path in paths {
            if self.table.remove_member(&prototype, path) {
                log::debug!(
                    "Instancing: Removed instance prim index <{}> for prototype <{}>",
                    path,
                    prototype
                );
            }

            if self.table.source_for_prototype(&prototype) == Some(path) {
                self.table.clear_source(path);
                removed_source = Some(path.clone());
            }
        }

        let Some(old_source) = removed_source else {
            return;
        };

        // Members are ordered, so the replacement is the smallest remaining
        // path regardless of the order removals arrived in. An empty prototype
        // is left for the retirement pass.
        match self.table.members(&prototype).and_then(|members| members.first()).cloned() {
            Some(new_source) => {
                log::debug!(
                    "Instancing: Changing source <{}> -> <{}> for <{}>",
                    old_source,
                    new_source,
                    prototype
                );
                self.table.set_source(prototype.clone(), new_source.clone());
                changes.push_changed(prototype, old_source, new_source);
            }
            None => {
                old_sources.insert(prototype, old_source);
            }
        }
    }

    fn create_or_update_prototype(
        &mut self,
        key: InstanceKey,
        paths: Vec<Path>,
        changes: &mut InstanceChanges,
        old_sources: &HashMap<Path, Path>,
    ) {
        let Some(first) = paths.first().cloned() else {
            verify!(false, "No prim indexes registered for instancing key: {}", key);
            return;
        };

        let registered = paths.len();
        let mut unique = paths;
        unique.sort();
        unique.dedup();
        if unique.len() != registered {
            coding_error!(
                "Prim indexes registered more than once in a single batch for instancing key: {}",
                key
            );
        }

        let prototype = match self.table.prototype_for_key(&key).cloned() {
            None => {
                let prototype = self.next_prototype_path();
                log::debug!(
                    "Instancing: Creating prototype <{}> with source prim index <{}> for instancing key: {}",
                    prototype,
                    first,
                    key
                );
                self.table.create_prototype(key, prototype.clone(), first.clone());
                changes.push_new(prototype.clone(), first);
                prototype
            }
            Some(prototype) => {
                // The prototype lost its last instance earlier in this batch.
                if self.table.source_for_prototype(&prototype).is_none() {
                    let old_source = old_sources.get(&prototype).cloned().unwrap_or_default();
                    log::debug!(
                        "Instancing: Changing source <{}> -> <{}> for <{}>",
                        old_source,
                        first,
                        prototype
                    );
                    self.table.set_source(prototype.clone(), first.clone());
                    changes.push_changed(prototype.clone(), old_source, first);
                }
                prototype
            }
        };

        for path in &unique {
            log::debug!(
                "Instancing: Added instance prim index <{}> for prototype <{}>",
                path,
                prototype
            );
        }
        self.table.add_members(&prototype, unique);
    }

    fn next_prototype_path(&mut self) -> Path {
        self.last_prototype_index += 1;
        Path::from_validated(format!("/{PROTOTYPE_PREFIX}{}", self.last_prototype_index))
    }

    /// Returns true if `path` is a prototype root prim such as `/__Prototype_1`.
    pub fn is_prototype_path(path: &Path) -> bool {
        path.is_root_prim_path() && path.name().starts_with(PROTOTYPE_PREFIX)
    }

    /// Returns true if `path` is a prototype or lies inside one.
    pub fn is_path_in_prototype(path: &Path) -> bool {
        if path.is_empty() || path.is_absolute_root_path() {
            return false;
        }
        if !require_absolute(path, "is_path_in_prototype") {
            return false;
        }

        path.elements()
            .next()
            .is_some_and(|root_name| root_name.starts_with(PROTOTYPE_PREFIX))
    }

    /// All live prototypes, in path order.
    pub fn all_prototypes(&self) -> Vec<Path> {
        self.table.prototypes().cloned().collect()
    }

    /// Number of live prototypes.
    pub fn num_prototypes(&self) -> usize {
        self.table.len()
    }

    /// Instanceable prim indexes assigned to `prototype`, in path order.
    pub fn instance_prim_indexes_for_prototype(&self, prototype: &Path) -> Vec<Path> {
        self.table
            .members(prototype)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The prototype whose source is exactly `prim_index_path`, or the empty path.
    pub fn prototype_using_prim_index_path(&self, prim_index_path: &Path) -> Path {
        self.table
            .prototype_for_source(prim_index_path)
            .cloned()
            .unwrap_or_default()
    }

    /// The source prim index of `prototype`, or the empty path.
    pub fn source_prim_index_path_for_prototype(&self, prototype: &Path) -> Path {
        self.table.source_for_prototype(prototype).cloned().unwrap_or_default()
    }

    /// The prototype the instanceable prim index at `prim_index_path` is
    /// assigned to, or the empty path.
    pub fn prototype_for_instanceable_prim_index_path(&self, prim_index_path: &Path) -> Path {
        self.table
            .prototype_for_member(prim_index_path)
            .cloned()
            .unwrap_or_default()
    }

    /// `(prototype, source)` pairs for every prototype sourced at or below
    /// `prim_index_path`.
    pub fn prototypes_using_prim_index_path_or_descendants(&self, prim_index_path: &Path) -> Vec<(Path, Path)> {
        if !require_absolute(prim_index_path, "prototypes_using_prim_index_path_or_descendants") {
            return Vec::new();
        }

        self.table
            .sources_under(prim_index_path)
            .map(|(source, prototype)| {
                verify!(
                    self.table.source_for_prototype(prototype) == Some(source),
                    "Prototype <{}> is missing from the prototype to source map",
                    prototype
                );
                (prototype.clone(), source.clone())
            })
            .collect()
    }

    /// Returns true if some prim in a prototype is composed from the prim
    /// index at `prim_index_path`.
    pub fn prototype_uses_prim_index_path(&self, prim_index_path: &Path) -> bool {
        if !require_absolute(prim_index_path, "prototype_uses_prim_index_path") {
            return false;
        }
        self.find_prims_in_prototypes_using(prim_index_path, None)
    }

    /// Paths of the prims in prototypes that are composed from the prim index
    /// at `prim_index_path`.
    ///
    /// With nested instancing one prim index can back several prototype prims:
    /// `/World/Set_1/Prop_1` may back both `/__Prototype_2` and
    /// `/__Prototype_1/Prop_1`.
    pub fn prims_in_prototypes_using_prim_index_path(&self, prim_index_path: &Path) -> Vec<Path> {
        let mut prims = Vec::new();
        if require_absolute(prim_index_path, "prims_in_prototypes_using_prim_index_path") {
            self.find_prims_in_prototypes_using(prim_index_path, Some(&mut prims));
        }
        prims
    }

    // Only prim indexes under a prototype's *source* are used by it. For
    //
    // /World
    //   Set_1        [prototype: </__Prototype_1>]
    //   Set_2        [prototype: </__Prototype_1>]
    // /__Prototype_1 [source: </World/Set_1>]
    //   Prop_1       [prototype: </__Prototype_2>]
    //   Prop_2       [prototype: </__Prototype_2>]
    // /__Prototype_2 [source: </World/Set_1/Prop_1>]
    //   Scope
    //
    // /World/Set_1/Prop_1/Scope is used by /__Prototype_2/Scope, while
    // /World/Set_1/Prop_2/Scope and anything under /World/Set_2 are never
    // composed for a prototype. Prefix-replacing through the nearest instance
    // alone would wrongly report them.
    fn find_prims_in_prototypes_using(&self, prim_index_path: &Path, mut prims: Option<&mut Vec<Path>>) -> bool {
        let mut used = false;

        let mut current = prim_index_path.clone();
        while !current.is_empty() && !current.is_absolute_root_path() {
            let Some((instance, prototype)) = self.table.nearest_member(&current) else {
                break;
            };
            let Some(source) = self.table.source_for_prototype(prototype) else {
                verify!(false, "Prototype <{}> has no source prim index", prototype);
                break;
            };

            if current.has_prefix(source) {
                used = true;
                match prims.as_deref_mut() {
                    Some(prims) => prims.push(prim_index_path.replace_prefix(source, prototype)),
                    None => break,
                }
            }

            // Descendants of an instance belong to at most one prototype. An
            // instance itself may also sit inside an enclosing prototype.
            if *instance != current {
                break;
            }
            current = instance.parent();
        }

        used
    }

    /// Returns true if a strict ancestor of `path` is an instance.
    pub fn is_path_descendant_to_an_instance(&self, path: &Path) -> bool {
        if !require_absolute(path, "is_path_descendant_to_an_instance") {
            return false;
        }
        self.table.nearest_member_ancestor(path).is_some()
    }

    /// The outermost instance strictly above `path`, or the empty path.
    pub fn most_ancestral_instance_path(&self, path: &Path) -> Path {
        if !require_absolute(path, "most_ancestral_instance_path") {
            return Path::default();
        }

        let mut outermost = Path::default();
        let mut current = path.clone();
        while let Some((instance, _)) = self.table.nearest_member_ancestor(&current) {
            outermost = instance.clone();
            current = instance.clone();
        }
        outermost
    }

    /// The prim in a prototype that the stage prim at `prim_path` maps to, or
    /// the empty path if it is not inside an instance.
    ///
    /// `prim_path` may be a prim index path (`/World/Set_2/Prop_1/Scope`) or a
    /// path already inside a prototype (`/__Prototype_1/Prop_1/Scope`). Nested
    /// instances are resolved down to the innermost prototype, so both of the
    /// examples above map to `/__Prototype_2/Scope` even though the prim index
    /// `/World/Set_2/Prop_1/Scope` was never composed.
    pub fn path_in_prototype_for_instance_path(&self, prim_path: &Path) -> Path {
        if !require_absolute(prim_path, "path_in_prototype_for_instance_path") {
            return Path::default();
        }

        let mut current = if Self::is_path_in_prototype(prim_path) {
            let Some((prototype, source)) = self.table.prototype_entry_at_or_before(prim_path) else {
                return Path::default();
            };
            if !prim_path.has_prefix(prototype) {
                return Path::default();
            }
            prim_path.replace_prefix(prototype, source)
        } else {
            prim_path.clone()
        };

        // Walk through non-source instances by re-rooting under the source,
        // whose subtree is guaranteed to have been composed, until the nearest
        // instance is its prototype's source.
        loop {
            let Some((instance, prototype)) = self.table.nearest_member_ancestor(&current) else {
                return Path::default();
            };
            let Some(source) = self.table.source_for_prototype(prototype) else {
                verify!(false, "Prototype <{}> has no source prim index", prototype);
                return Path::default();
            };

            if instance == source {
                return current.replace_prefix(instance, prototype);
            }
            current = current.replace_prefix(instance, source);
        }
    }

    /// Check the consistency of all prototype assignments.
    ///
    /// Holds after every [`process_changes`](Self::process_changes); queued
    /// changes are not considered.
    pub fn validate(&self) -> Result<()> {
        self.table.validate()?;

        for prototype in self.table.prototypes() {
            ensure!(
                Self::is_prototype_path(prototype),
                "Prototype <{prototype}> is outside the reserved namespace"
            );
            let index: usize = prototype.name()[PROTOTYPE_PREFIX.len()..].parse()?;
            ensure!(
                index <= self.last_prototype_index,
                "Prototype <{prototype}> was never allocated"
            );
        }

        Ok(())
    }
}

fn require_absolute(path: &Path, query: &str) -> bool {
    if path.is_absolute_path() {
        return true;
    }
    coding_error!("{}() requires an absolute path but was given <{}>", query, path);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcp::{ArcType, CompositionArc, CompositionKey};
    use crate::sdf;

    fn p(s: &str) -> Path {
        sdf::path(s).unwrap()
    }

    fn index(path: &str, asset: &str) -> PrimIndex {
        PrimIndex::new(
            p(path),
            CompositionKey::new([CompositionArc::new(ArcType::Reference, asset, p("/Root"))]),
        )
    }

    fn register(cache: &InstanceCache, path: &str, asset: &str) -> Registration {
        cache.register_instance_prim_index(&index(path, asset), None, &LoadRules::default())
    }

    #[test]
    fn registration_outcomes() {
        let mut cache = InstanceCache::new();

        assert_eq!(register(&cache, "/A", "set.usda"), Registration::NeedsNewPrototype);
        assert_eq!(register(&cache, "/B", "set.usda"), Registration::Other);
        assert_eq!(register(&cache, "/C", "prop.usda"), Registration::NeedsNewPrototype);
        assert!(cache.has_pending_changes());

        let changes = cache.process_changes();
        assert_eq!(changes.new_prototypes.len(), 2);
        assert!(!cache.has_pending_changes());

        // Re-registering the source of an existing prototype.
        assert_eq!(register(&cache, "/A", "set.usda"), Registration::UsesExistingPrototypeAsSource);
        assert_eq!(register(&cache, "/D", "set.usda"), Registration::Other);
        assert!(Registration::UsesExistingPrototypeAsSource.uses_index_as_source());
        assert!(!Registration::Other.uses_index_as_source());
    }

    #[test]
    fn prototype_paths_are_reserved() {
        assert!(InstanceCache::is_prototype_path(&p("/__Prototype_1")));
        assert!(!InstanceCache::is_prototype_path(&p("/__Prototype_1/Child")));
        assert!(!InstanceCache::is_prototype_path(&p("/World")));

        assert!(InstanceCache::is_path_in_prototype(&p("/__Prototype_1/Child")));
        assert!(InstanceCache::is_path_in_prototype(&p("/__Prototype_12")));
        assert!(!InstanceCache::is_path_in_prototype(&p("/World/__Prototype_1")));
        assert!(!InstanceCache::is_path_in_prototype(&Path::abs_root()));
        assert!(!InstanceCache::is_path_in_prototype(&Path::default()));
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "requires an absolute path"))]
    fn relative_query_paths_are_coding_errors() {
        let cache = InstanceCache::new();
        assert!(!cache.is_path_descendant_to_an_instance(&p("World/Set_1")));
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "is not instanceable"))]
    fn registering_non_instanceable_index_is_a_coding_error() {
        let mut cache = InstanceCache::new();
        let registration = cache.register_instance_prim_index(
            &index("/A", "set.usda").instanceable(false),
            None,
            &LoadRules::default(),
        );
        assert_eq!(registration, Registration::Other);
        assert!(cache.process_changes().is_empty());
    }

    #[test]
    fn prototype_numbering_is_never_reused() {
        let mut cache = InstanceCache::new();

        let _ = register(&cache, "/A", "set.usda");
        let first = cache.process_changes();
        assert_eq!(first.new_prototypes[0].prototype, p("/__Prototype_1"));

        cache.unregister_instance_prim_indexes_under(&p("/A"));
        let retired = cache.process_changes();
        assert_eq!(retired.dead_prototypes, vec![p("/__Prototype_1")]);

        let _ = register(&cache, "/A", "set.usda");
        let again = cache.process_changes();
        assert_eq!(again.new_prototypes[0].prototype, p("/__Prototype_2"));
        cache.validate().unwrap();
    }

    #[test]
    fn unordered_mode_uses_first_received_source() {
        let mut cache = InstanceCache::with_config(InstanceCacheConfig {
            deterministic_assignment: false,
        });

        let _ = register(&cache, "/B", "set.usda");
        let _ = register(&cache, "/A", "set.usda");
        let changes = cache.process_changes();

        assert_eq!(changes.new_prototypes[0].source, p("/B"));
        assert_eq!(cache.instance_prim_indexes_for_prototype(&p("/__Prototype_1")), vec![p("/A"), p("/B")]);
        cache.validate().unwrap();
    }

    #[test]
    fn deterministic_mode_orders_keys_by_first_registration() {
        let mut cache = InstanceCache::new();

        assert_eq!(register(&cache, "/Z", "z.usda"), Registration::NeedsNewPrototype);
        assert_eq!(register(&cache, "/B", "set.usda"), Registration::NeedsNewPrototype);
        assert_eq!(register(&cache, "/A", "set.usda"), Registration::Other);
        let changes = cache.process_changes();

        // /B was told it needs a new prototype, so it is the source even
        // though /A sorts first.
        assert_eq!(changes.new_prototypes[0].prototype, p("/__Prototype_1"));
        assert_eq!(changes.new_prototypes[0].source, p("/B"));
        assert_eq!(changes.new_prototypes[1].prototype, p("/__Prototype_2"));
        assert_eq!(changes.new_prototypes[1].source, p("/Z"));
        assert_eq!(
            cache.instance_prim_indexes_for_prototype(&p("/__Prototype_1")),
            vec![p("/A"), p("/B")]
        );
        cache.validate().unwrap();
    }

    #[test]
    fn source_or_descendant_queries() {
        let mut cache = InstanceCache::new();
        let _ = register(&cache, "/World/Set_1", "set.usda");
        let _ = register(&cache, "/World/Set_2", "set.usda");
        let _ = register(&cache, "/World/Set_1/Prop_1", "prop.usda");
        let _ = register(&cache, "/Other", "other.usda");
        cache.process_changes();

        let pairs = cache.prototypes_using_prim_index_path_or_descendants(&p("/World"));
        // Ordered by source path.
        assert_eq!(
            pairs,
            vec![
                (p("/__Prototype_1"), p("/World/Set_1")),
                (p("/__Prototype_2"), p("/World/Set_1/Prop_1")),
            ]
        );
        assert!(cache
            .prototypes_using_prim_index_path_or_descendants(&p("/World/Set_2"))
            .is_empty());

        assert_eq!(cache.prototype_using_prim_index_path(&p("/World/Set_1")), p("/__Prototype_1"));
        assert!(cache.prototype_using_prim_index_path(&p("/World/Set_2")).is_empty());
        assert_eq!(
            cache.prototype_for_instanceable_prim_index_path(&p("/World/Set_2")),
            p("/__Prototype_1")
        );
        assert_eq!(cache.source_prim_index_path_for_prototype(&p("/__Prototype_1")), p("/World/Set_1"));
        assert_eq!(cache.num_prototypes(), 3);
        assert_eq!(cache.all_prototypes().len(), 3);
    }

    #[test]
    fn most_ancestral_instance() {
        let mut cache = InstanceCache::new();
        let _ = register(&cache, "/World/Set_1", "set.usda");
        let _ = register(&cache, "/World/Set_1/Prop_1", "prop.usda");
        cache.process_changes();

        assert_eq!(
            cache.most_ancestral_instance_path(&p("/World/Set_1/Prop_1/Scope")),
            p("/World/Set_1")
        );
        assert_eq!(cache.most_ancestral_instance_path(&p("/World/Set_1/Prop_1")), p("/World/Set_1"));
        assert!(cache.most_ancestral_instance_path(&p("/World/Set_1")).is_empty());
        assert!(cache.is_path_descendant_to_an_instance(&p("/World/Set_1/Prop_1")));
        assert!(!cache.is_path_descendant_to_an_instance(&p("/World/Set_1")));
    }
}
