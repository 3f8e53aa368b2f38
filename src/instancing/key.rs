use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{Hash, Hasher},
};

use crate::pcp::{ClipSetDefinition, CompositionKey, PrimIndex};
use crate::sdf::Path;
use crate::stage::{LoadRules, PopulationMask};

/// Content-derived identity of an instanceable prim index.
///
/// Prim indexes with equal keys compose identical name children and property
/// opinions and may therefore share a prototype. The key combines the
/// composition key, the clip sets affecting the subtree, and the population
/// mask and load rules re-rooted at the prim index, so two instances at
/// different locations under the same *relative* restrictions compare equal.
///
/// The hash is computed once at construction; keys are hashed repeatedly while
/// the pending-change lock is held.
#[derive(Debug, Clone)]
pub struct InstanceKey {
    composition_key: CompositionKey,
    clip_sets: Vec<ClipSetDefinition>,
    mask: PopulationMask,
    load_rules: LoadRules,
    hash: u64,
}

impl InstanceKey {
    /// Compute the key for `prim_index` under the stage's restrictions.
    ///
    /// `mask` is `None` when the stage has no population mask.
    pub fn new(prim_index: &PrimIndex, mask: Option<&PopulationMask>, load_rules: &LoadRules) -> Self {
        let instance_path = prim_index.path();

        Self::from_parts(
            prim_index.composition_key().clone(),
            prim_index.clip_sets().to_vec(),
            mask.map(|mask| relativize_mask(mask, instance_path)).unwrap_or_default(),
            relativize_load_rules(load_rules, instance_path),
        )
    }

    fn from_parts(
        composition_key: CompositionKey,
        clip_sets: Vec<ClipSetDefinition>,
        mask: PopulationMask,
        load_rules: LoadRules,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        composition_key.hash(&mut hasher);
        clip_sets.hash(&mut hasher);
        mask.hash(&mut hasher);
        load_rules.hash(&mut hasher);

        Self {
            composition_key,
            clip_sets,
            mask,
            load_rules,
            hash: hasher.finish(),
        }
    }

    pub fn composition_key(&self) -> &CompositionKey {
        &self.composition_key
    }

    pub fn clip_sets(&self) -> &[ClipSetDefinition] {
        &self.clip_sets
    }

    /// Population mask relative to the prim index (`/` is the instance).
    pub fn mask(&self) -> &PopulationMask {
        &self.mask
    }

    /// Load rules relative to the prim index (`/` is the instance).
    pub fn load_rules(&self) -> &LoadRules {
        &self.load_rules
    }

    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl Default for InstanceKey {
    fn default() -> Self {
        Self::from_parts(
            CompositionKey::default(),
            Vec::new(),
            PopulationMask::default(),
            LoadRules::default(),
        )
    }
}

/// Re-root the mask paths inside the instance at `/`.
///
/// Mask paths outside the instance (including its ancestors) are dropped
/// rather than mapped to an "include everything" mask.
fn relativize_mask(mask: &PopulationMask, instance_path: &Path) -> PopulationMask {
    PopulationMask::new(
        mask.paths()
            .iter()
            .filter(|path| path.has_prefix(instance_path))
            .map(|path| path.replace_prefix(instance_path, &Path::abs_root())),
    )
}

/// Re-root the load rules inside the instance at `/`.
///
/// The rule in effect for the instance itself becomes the root rule; rules
/// outside the instance are dropped.
fn relativize_load_rules(load_rules: &LoadRules, instance_path: &Path) -> LoadRules {
    let root_rule = load_rules.effective_rule_for_path(instance_path);

    let mut relative: LoadRules = std::iter::once((Path::abs_root(), root_rule))
        .chain(
            load_rules
                .rules_under(instance_path)
                .filter(|(path, _)| path != instance_path)
                .map(|(path, rule)| (path.replace_prefix(instance_path, &Path::abs_root()), *rule)),
        )
        .collect();

    relative.minimize();
    relative
}

impl PartialEq for InstanceKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.composition_key == other.composition_key
            && self.clip_sets == other.clip_sets
            && self.mask == other.mask
            && self.load_rules == other.load_rules
    }
}

impl Eq for InstanceKey {}

impl Hash for InstanceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, arc) in self.composition_key.arcs().iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} @{}@<{}>", arc.arc_type.as_str(), arc.layer_stack, arc.site_path)?;
        }
        write!(f, "]")?;

        for (variant_set, selection) in self.composition_key.variant_selections() {
            write!(f, " {{{variant_set}={selection}}}")?;
        }
        for clip_set in &self.clip_sets {
            write!(f, " clips:{}<{}>", clip_set.name, clip_set.source_prim_path)?;
        }

        write!(f, " mask:")?;
        if self.mask.is_empty() {
            write!(f, "none")?;
        }
        for (index, path) in self.mask.paths().iter().enumerate() {
            write!(f, "{}{path}", if index > 0 { "," } else { "" })?;
        }

        write!(f, " load:")?;
        if self.load_rules.rules().is_empty() {
            write!(f, "all")?;
        }
        for (index, (path, rule)) in self.load_rules.rules().iter().enumerate() {
            write!(f, "{}{path}={rule:?}", if index > 0 { "," } else { "" })?;
        }

        write!(f, " (hash {:016x})", self.hash)
    }
}
