//! `usd_instancing` is a native Rust implementation of the USD instancing
//! cache: the bookkeeping that lets many instanceable prims share a single
//! composed prototype.
//!
//! # Modules
//!
//! - `sdf` - Namespace paths and path-keyed map helpers
//! - `pcp` - Prim index inputs: composition keys and value clip sets
//! - `stage` - Population masks and payload load rules
//! - `instancing` - Instance keys, prototype assignment, and path mapping

#[macro_use]
mod diagnostic;

pub mod instancing;
pub mod pcp;
pub mod sdf;
pub mod stage;

pub use instancing::{InstanceCache, InstanceChanges, InstanceKey, Registration};
