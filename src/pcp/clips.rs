use std::hash::{Hash, Hasher};

use crate::sdf::Path;

/// A time value in a clip metadata mapping.
///
/// Compared and hashed by bit pattern so clip definitions can participate in
/// instance keys. Negative zero is folded into zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeCode(f64);

impl TimeCode {
    pub fn new(value: f64) -> Self {
        Self(if value == 0.0 { 0.0 } else { value })
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for TimeCode {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl PartialEq for TimeCode {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for TimeCode {}

impl Hash for TimeCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// A resolved value clip set affecting a prim index subtree.
///
/// Two instances only share a prototype if the same clip sets, authored at the
/// same sites, apply to both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ClipSetDefinition {
    /// Clip set name (`default` for the unnamed set).
    pub name: String,
    /// Layer stack the clip metadata was authored in.
    pub source_layer_stack: String,
    /// Prim the clip metadata was authored on.
    pub source_prim_path: Path,
    /// Prim in each clip layer the values are read from (`primPath`).
    pub clip_prim_path: Path,
    /// Clip layer asset paths (`assetPaths`).
    pub asset_paths: Vec<String>,
    /// `(stage time, clip index)` pairs (`active`).
    pub active: Vec<(TimeCode, usize)>,
    /// `(stage time, clip time)` pairs (`times`).
    pub times: Vec<(TimeCode, TimeCode)>,
    /// Manifest layer asset path (`manifestAssetPath`).
    pub manifest_asset_path: Option<String>,
    pub interpolate_missing_clip_values: bool,
}
