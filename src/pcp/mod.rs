//! Prim cache population outputs consumed by the instancing cache.
//!
//! The composition engine itself lives outside this crate. What it produces
//! for each namespace location is reduced here to the values instancing needs:
//! the prim index path, whether it is instanceable, a composition-derived
//! [`CompositionKey`], and the value clip sets that affect its subtree.

mod clips;
mod prim_index;

pub use clips::{ClipSetDefinition, TimeCode};
pub use prim_index::{CompositionArc, CompositionKey, PrimIndex};

/// Describes the type of arc connecting two nodes in the prim index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArcType {
    // Listed in strength order (LIVERPS). Root is the node for the prim
    // index's own site and has no parent node.
    Root,
    Inherit,
    Variant,
    Relocate,
    Reference,
    Payload,
    Specialize,
}

impl ArcType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArcType::Root => "root",
            ArcType::Inherit => "inherit",
            ArcType::Variant => "variant",
            ArcType::Relocate => "relocate",
            ArcType::Reference => "reference",
            ArcType::Payload => "payload",
            ArcType::Specialize => "specialize",
        }
    }
}
