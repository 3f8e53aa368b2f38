//! Instancing: sharing one composed prototype among prim indexes that would
//! compose identically.
//!
//! The flow is:
//! 1. Composition workers call [`InstanceCache::register_instance_prim_index`]
//!    for every instanceable prim index, possibly concurrently. The returned
//!    [`Registration`] tells the caller whether its prim index is (or will
//!    be) a prototype source and so must be fully composed.
//! 2. [`InstanceCache::unregister_instance_prim_indexes_under`] queues removal
//!    of everything under a recomposed or deleted subtree.
//! 3. [`InstanceCache::process_changes`] applies the batch and reports the
//!    created, re-sourced, and retired prototypes as [`InstanceChanges`].
//!
//! Between batches the cache answers path-mapping queries between the stage
//! namespace, prim index paths, and prototype paths.
//!
//! ```
//! use usd_instancing::instancing::{InstanceCache, Registration};
//! use usd_instancing::pcp::{ArcType, CompositionArc, CompositionKey, PrimIndex};
//! use usd_instancing::sdf;
//! use usd_instancing::stage::LoadRules;
//!
//! let key = CompositionKey::new([CompositionArc::new(
//!     ArcType::Reference,
//!     "set.usda",
//!     sdf::path("/Set").unwrap(),
//! )]);
//! let mut cache = InstanceCache::new();
//! let rules = LoadRules::default();
//!
//! let a = PrimIndex::new(sdf::path("/A").unwrap(), key.clone());
//! let b = PrimIndex::new(sdf::path("/B").unwrap(), key);
//! assert_eq!(cache.register_instance_prim_index(&a, None, &rules), Registration::NeedsNewPrototype);
//! assert_eq!(cache.register_instance_prim_index(&b, None, &rules), Registration::Other);
//!
//! let changes = cache.process_changes();
//! assert_eq!(changes.new_prototypes[0].prototype.as_str(), "/__Prototype_1");
//! assert_eq!(changes.new_prototypes[0].source.as_str(), "/A");
//! ```

mod cache;
mod changes;
mod config;
mod key;
mod pending;
mod table;

pub use cache::{InstanceCache, Registration, PROTOTYPE_PREFIX};
pub use changes::{ChangedPrototype, InstanceChanges, NewPrototype};
pub use config::{InstanceCacheConfig, ASSIGN_PROTOTYPES_DETERMINISTICALLY_ENV};
pub use key::InstanceKey;
