use crate::sdf::Path;

/// Restricts which parts of the namespace a stage composes.
///
/// The mask is a minimal sorted set of paths: a prim is populated if it is one
/// of those paths, an ancestor of one, or a descendant of one. No path in the
/// set has another set member as a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PopulationMask {
    paths: Vec<Path>,
}

impl PopulationMask {
    /// Build a mask from arbitrary paths. Redundant descendants are dropped.
    pub fn new(paths: impl IntoIterator<Item = Path>) -> Self {
        let mut paths: Vec<Path> = paths.into_iter().filter(|path| !path.is_empty()).collect();
        paths.sort();
        paths.dedup();

        let mut minimal: Vec<Path> = Vec::with_capacity(paths.len());
        for path in paths {
            // Sorted order places an ancestor directly before its (dropped)
            // descendants, so checking the last kept path is sufficient.
            if minimal.last().is_some_and(|kept| path.has_prefix(kept)) {
                continue;
            }
            minimal.push(path);
        }

        Self { paths: minimal }
    }

    /// A mask that includes everything.
    pub fn all() -> Self {
        Self {
            paths: vec![Path::abs_root()],
        }
    }

    pub fn is_all(&self) -> bool {
        self.paths.len() == 1 && self.paths[0].is_absolute_root_path()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Returns true if `path` is an ancestor of, equal to, or a descendant of
    /// a mask path.
    pub fn includes(&self, path: &Path) -> bool {
        self.paths
            .iter()
            .any(|mask_path| path.has_prefix(mask_path) || mask_path.has_prefix(path))
    }

    /// Returns true if `path` and all of its descendants are included.
    pub fn includes_subtree(&self, path: &Path) -> bool {
        self.paths.iter().any(|mask_path| path.has_prefix(mask_path))
    }

    pub fn add(&mut self, path: Path) {
        *self = Self::new(self.paths.drain(..).chain(std::iter::once(path)));
    }

    pub fn union(&self, other: &PopulationMask) -> PopulationMask {
        Self::new(self.paths.iter().chain(other.paths.iter()).cloned())
    }
}
