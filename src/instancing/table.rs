//! Live prototype assignments.
//!
//! Four interlocking mappings are kept in lockstep here so that every update
//! touches all of them at once:
//! - instance key <-> prototype path
//! - prototype path <-> source prim index path
//! - prototype path -> ordered set of member prim index paths
//! - member prim index path -> prototype path

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{ensure, Result};

use crate::sdf::{self, Path};

use super::key::InstanceKey;

#[derive(Debug, Default)]
pub(crate) struct PrototypeTable {
    key_to_prototype: HashMap<InstanceKey, Path>,
    prototype_to_key: BTreeMap<Path, InstanceKey>,
    prototype_to_source: BTreeMap<Path, Path>,
    source_to_prototype: BTreeMap<Path, Path>,
    prototype_to_members: HashMap<Path, BTreeSet<Path>>,
    member_to_prototype: BTreeMap<Path, Path>,
}

impl PrototypeTable {
    pub(crate) fn prototype_for_key(&self, key: &InstanceKey) -> Option<&Path> {
        self.key_to_prototype.get(key)
    }

    pub(crate) fn key_for_prototype(&self, prototype: &Path) -> Option<&InstanceKey> {
        self.prototype_to_key.get(prototype)
    }

    pub(crate) fn source_for_prototype(&self, prototype: &Path) -> Option<&Path> {
        self.prototype_to_source.get(prototype)
    }

    pub(crate) fn prototype_for_source(&self, source: &Path) -> Option<&Path> {
        self.source_to_prototype.get(source)
    }

    pub(crate) fn prototype_for_member(&self, member: &Path) -> Option<&Path> {
        self.member_to_prototype.get(member)
    }

    pub(crate) fn members(&self, prototype: &Path) -> Option<&BTreeSet<Path>> {
        self.prototype_to_members.get(prototype)
    }

    pub(crate) fn prototypes(&self) -> impl Iterator<Item = &Path> {
        self.prototype_to_key.keys()
    }

    pub(crate) fn len(&self) -> usize {
        self.prototype_to_key.len()
    }

    /// Member entry for `path` or its nearest member ancestor.
    pub(crate) fn nearest_member(&self, path: &Path) -> Option<(&Path, &Path)> {
        sdf::find_longest_prefix(&self.member_to_prototype, path)
    }

    /// Member entry for the nearest strict ancestor of `path`.
    pub(crate) fn nearest_member_ancestor(&self, path: &Path) -> Option<(&Path, &Path)> {
        sdf::find_longest_strict_prefix(&self.member_to_prototype, path)
    }

    /// Members at or below `path`.
    pub(crate) fn members_under<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = (&'a Path, &'a Path)> + 'a {
        sdf::entries_with_prefix(&self.member_to_prototype, path)
    }

    /// Source entries at or below `path`.
    pub(crate) fn sources_under<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = (&'a Path, &'a Path)> + 'a {
        sdf::entries_with_prefix(&self.source_to_prototype, path)
    }

    /// The `(prototype, source)` entry with the greatest prototype path not
    /// after `path`. For a path inside a prototype this is that prototype.
    pub(crate) fn prototype_entry_at_or_before(&self, path: &Path) -> Option<(&Path, &Path)> {
        self.prototype_to_source.range(..=path.clone()).next_back()
    }

    /// Register a new prototype for `key` with `source` as its source index.
    ///
    /// The source still has to be added as a member.
    pub(crate) fn create_prototype(&mut self, key: InstanceKey, prototype: Path, source: Path) {
        self.key_to_prototype.insert(key.clone(), prototype.clone());
        self.prototype_to_key.insert(prototype.clone(), key);
        self.prototype_to_members.entry(prototype.clone()).or_default();
        self.set_source(prototype, source);
    }

    pub(crate) fn set_source(&mut self, prototype: Path, source: Path) {
        self.source_to_prototype.insert(source.clone(), prototype.clone());
        self.prototype_to_source.insert(prototype, source);
    }

    /// Remove `source` from the source mappings if it is a prototype's source.
    pub(crate) fn clear_source(&mut self, source: &Path) -> Option<Path> {
        let prototype = self.source_to_prototype.remove(source)?;
        let removed = self.prototype_to_source.remove(&prototype);
        verify!(
            removed.as_ref() == Some(source),
            "Prototype <{}> was not sourced from <{}>",
            prototype,
            source
        );
        Some(prototype)
    }

    /// Add prim index paths to a prototype's members. Duplicates are ignored.
    pub(crate) fn add_members(&mut self, prototype: &Path, paths: impl IntoIterator<Item = Path>) {
        let members = self.prototype_to_members.entry(prototype.clone()).or_default();
        for path in paths {
            self.member_to_prototype.insert(path.clone(), prototype.clone());
            members.insert(path);
        }
    }

    /// Remove a member path. Returns false if it was not a member.
    pub(crate) fn remove_member(&mut self, prototype: &Path, path: &Path) -> bool {
        let removed = self
            .prototype_to_members
            .get_mut(prototype)
            .is_some_and(|members| members.remove(path));
        if removed {
            self.member_to_prototype.remove(path);
        }
        removed
    }

    /// Drop the prototype for `key` if it has no members left.
    ///
    /// Returns the retired prototype path.
    pub(crate) fn retire_if_unused(&mut self, key: &InstanceKey) -> Option<Path> {
        let prototype = self.key_to_prototype.get(key)?.clone();

        let Some(members) = self.prototype_to_members.get(&prototype) else {
            verify!(false, "Prototype <{}> has no member set", prototype);
            return None;
        };
        if !members.is_empty() {
            return None;
        }

        self.prototype_to_members.remove(&prototype);
        self.key_to_prototype.remove(key);
        self.prototype_to_key.remove(&prototype);
        if let Some(source) = self.prototype_to_source.remove(&prototype) {
            verify!(false, "Retiring prototype <{}> still sourced from <{}>", prototype, source);
            self.source_to_prototype.remove(&source);
        }

        Some(prototype)
    }

    /// Check that all mappings agree with each other.
    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.key_to_prototype.len() == self.prototype_to_key.len(),
            "Instance key and prototype maps differ in size ({} vs {})",
            self.key_to_prototype.len(),
            self.prototype_to_key.len()
        );

        for (prototype, key) in &self.prototype_to_key {
            ensure!(
                self.key_to_prototype.get(key) == Some(prototype),
                "Prototype <{prototype}> is not mapped back from its instance key"
            );

            let members = self.prototype_to_members.get(prototype);
            ensure!(members.is_some(), "Prototype <{prototype}> has no member set");
            let members = members.into_iter().flatten();

            let mut count = 0;
            for member in members {
                count += 1;
                ensure!(
                    self.member_to_prototype.get(member) == Some(prototype),
                    "Member <{member}> of <{prototype}> is not mapped to it"
                );
            }
            ensure!(count > 0, "Live prototype <{prototype}> has no members");

            let source = self.prototype_to_source.get(prototype);
            ensure!(source.is_some(), "Prototype <{prototype}> has no source prim index");
            if let Some(source) = source {
                ensure!(
                    self.prototype_to_members[prototype].contains(source),
                    "Source <{source}> of <{prototype}> is not one of its members"
                );
                ensure!(
                    self.source_to_prototype.get(source) == Some(prototype),
                    "Source <{source}> is not mapped back to <{prototype}>"
                );
            }
        }

        ensure!(
            self.prototype_to_members.len() == self.prototype_to_key.len(),
            "Member sets exist for retired prototypes"
        );
        ensure!(
            self.prototype_to_source.len() == self.source_to_prototype.len(),
            "Source maps differ in size"
        );
        ensure!(
            self.prototype_to_source.len() == self.prototype_to_key.len(),
            "Sources exist for retired prototypes"
        );

        let member_count: usize = self.prototype_to_members.values().map(BTreeSet::len).sum();
        ensure!(
            member_count == self.member_to_prototype.len(),
            "Member map has {} entries but prototypes list {}",
            self.member_to_prototype.len(),
            member_count
        );

        Ok(())
    }
}
