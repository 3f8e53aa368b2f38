use crate::sdf::Path;

/// A prototype created during change processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrototype {
    pub prototype: Path,
    /// Prim index the prototype's content is composed from.
    pub source: Path,
}

/// A prototype whose source prim index was reassigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPrototype {
    pub prototype: Path,
    /// Previous source, or the empty path if it is not known.
    pub old_source: Path,
    pub new_source: Path,
}

/// Prototype changes produced by one `InstanceCache::process_changes` call.
///
/// Consumers use this to create, re-source, or destroy the prototype prims
/// they maintain. Reports from successive batches can be merged with
/// [`InstanceChanges::append`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceChanges {
    pub new_prototypes: Vec<NewPrototype>,
    pub changed_prototypes: Vec<ChangedPrototype>,
    pub dead_prototypes: Vec<Path>,
}

impl InstanceChanges {
    pub fn is_empty(&self) -> bool {
        self.new_prototypes.is_empty() && self.changed_prototypes.is_empty() && self.dead_prototypes.is_empty()
    }

    /// Append the changes from a later batch.
    pub fn append(&mut self, other: InstanceChanges) {
        self.new_prototypes.extend(other.new_prototypes);
        self.changed_prototypes.extend(other.changed_prototypes);
        self.dead_prototypes.extend(other.dead_prototypes);
    }

    pub(crate) fn push_new(&mut self, prototype: Path, source: Path) {
        self.new_prototypes.push(NewPrototype { prototype, source });
    }

    pub(crate) fn push_changed(&mut self, prototype: Path, old_source: Path, new_source: Path) {
        self.changed_prototypes.push(ChangedPrototype {
            prototype,
            old_source,
            new_source,
        });
    }

    pub(crate) fn push_dead(&mut self, prototype: Path) {
        self.dead_prototypes.push(prototype);
    }
}
