use std::collections::BTreeMap;

use crate::sdf::Path;

use super::{ArcType, ClipSetDefinition};

/// One composition arc contributing opinions to a prim index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositionArc {
    pub arc_type: ArcType,
    /// Identifier of the layer stack the arc targets.
    pub layer_stack: String,
    /// Prim path of the arc's target site within that layer stack.
    pub site_path: Path,
}

impl CompositionArc {
    pub fn new(arc_type: ArcType, layer_stack: impl Into<String>, site_path: Path) -> Self {
        Self {
            arc_type,
            layer_stack: layer_stack.into(),
            site_path,
        }
    }
}

/// Composition-derived identity of a prim index.
///
/// Prim indexes with equal keys compose the same name children and property
/// opinions. The root arc is not part of the key: it is the instance's own
/// site, which differs for every instance and only carries opinions about the
/// instance prim itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompositionKey {
    arcs: Vec<CompositionArc>,
    variant_selections: BTreeMap<String, String>,
}

impl CompositionKey {
    /// Build a key from arcs in strength order.
    pub fn new(arcs: impl IntoIterator<Item = CompositionArc>) -> Self {
        Self {
            arcs: arcs.into_iter().filter(|arc| arc.arc_type != ArcType::Root).collect(),
            variant_selections: BTreeMap::new(),
        }
    }

    /// Record the selection for a variant set.
    pub fn with_variant_selection(mut self, variant_set: impl Into<String>, selection: impl Into<String>) -> Self {
        self.variant_selections.insert(variant_set.into(), selection.into());
        self
    }

    pub fn arcs(&self) -> &[CompositionArc] {
        &self.arcs
    }

    pub fn variant_selections(&self) -> &BTreeMap<String, String> {
        &self.variant_selections
    }
}

/// A composed prim index as reported by the composition engine.
#[derive(Debug, Clone)]
pub struct PrimIndex {
    path: Path,
    instanceable: bool,
    composition_key: CompositionKey,
    clip_sets: Vec<ClipSetDefinition>,
}

impl PrimIndex {
    /// Create an instanceable prim index at `path`.
    pub fn new(path: Path, composition_key: CompositionKey) -> Self {
        Self {
            path,
            instanceable: true,
            composition_key,
            clip_sets: Vec::new(),
        }
    }

    pub fn instanceable(mut self, instanceable: bool) -> Self {
        self.instanceable = instanceable;
        self
    }

    /// Add a clip set affecting this prim index's subtree.
    pub fn with_clip_set(mut self, clip_set: ClipSetDefinition) -> Self {
        self.clip_sets.push(clip_set);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_instanceable(&self) -> bool {
        self.instanceable
    }

    pub fn composition_key(&self) -> &CompositionKey {
        &self.composition_key
    }

    pub fn clip_sets(&self) -> &[ClipSetDefinition] {
        &self.clip_sets
    }
}
