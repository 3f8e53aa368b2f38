//! Stage-level population and load restrictions.
//!
//! These are the inputs a stage hands to the instancing cache alongside each
//! prim index:
//! - `PopulationMask` - which parts of the namespace are composed at all
//! - `LoadRules` - which payload-bearing parts of the namespace are loaded

mod load_rules;
mod population_mask;

pub use load_rules::{LoadRules, Rule};
pub use population_mask::PopulationMask;
