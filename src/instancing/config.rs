/// Environment variable toggling deterministic prototype assignment.
pub const ASSIGN_PROTOTYPES_DETERMINISTICALLY_ENV: &str = "USD_ASSIGN_PROTOTYPES_DETERMINISTICALLY";

/// Settings for an [`InstanceCache`](super::InstanceCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceCacheConfig {
    /// Process instance keys in order of their first registered path, so that
    /// prototype numbering follows namespace order rather than hash-map order.
    /// Costs a sort per change batch.
    pub deterministic_assignment: bool,
}

impl Default for InstanceCacheConfig {
    fn default() -> Self {
        Self {
            deterministic_assignment: true,
        }
    }
}

impl InstanceCacheConfig {
    /// Read settings from the environment, falling back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(ASSIGN_PROTOTYPES_DETERMINISTICALLY_ENV) {
            match parse_flag(&value) {
                Some(flag) => config.deterministic_assignment = flag,
                None => log::warn!(
                    "Ignoring unrecognized {}={:?}, expected a boolean",
                    ASSIGN_PROTOTYPES_DETERMINISTICALLY_ENV,
                    value
                ),
            }
        }
        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
