//! Scene Description Foundations: the namespace path type and path-keyed map
//! helpers used by the instancing cache.

mod path;

use std::collections::BTreeMap;

use anyhow::Result;

pub use path::{Ancestors, Path};

/// Shorthand for [`Path::new`].
pub fn path(path: &str) -> Result<Path> {
    Path::new(path)
}

/// Finds the entry whose key is `path` or its nearest ancestor.
pub fn find_longest_prefix<'a, V>(map: &'a BTreeMap<Path, V>, path: &Path) -> Option<(&'a Path, &'a V)> {
    if map.is_empty() {
        return None;
    }

    let mut current = path.clone();
    while !current.is_empty() {
        if let Some(entry) = map.get_key_value(&current) {
            return Some(entry);
        }
        current = current.parent();
    }

    None
}

/// Finds the entry whose key is the nearest strict ancestor of `path`.
pub fn find_longest_strict_prefix<'a, V>(map: &'a BTreeMap<Path, V>, path: &Path) -> Option<(&'a Path, &'a V)> {
    if path.is_absolute_root_path() {
        return None;
    }
    find_longest_prefix(map, &path.parent())
}

/// Iterates the entries whose keys are `prefix` or one of its descendants.
pub fn entries_with_prefix<'a, V>(
    map: &'a BTreeMap<Path, V>,
    prefix: &'a Path,
) -> impl Iterator<Item = (&'a Path, &'a V)> + 'a {
    map.range(prefix.clone()..).take_while(move |(path, _)| path.has_prefix(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(paths: &[&str]) -> BTreeMap<Path, usize> {
        paths
            .iter()
            .enumerate()
            .map(|(index, p)| (path(p).unwrap(), index))
            .collect()
    }

    #[test]
    fn longest_prefix_prefers_nearest_ancestor() {
        let map = map_of(&["/World", "/World/Set_1", "/World/Set_1/Prop_1"]);

        let (found, _) = find_longest_prefix(&map, &path("/World/Set_1/Prop_1/Scope").unwrap()).unwrap();
        assert_eq!(found, &path("/World/Set_1/Prop_1").unwrap());

        let (found, _) = find_longest_prefix(&map, &path("/World/Set_1").unwrap()).unwrap();
        assert_eq!(found, &path("/World/Set_1").unwrap());

        assert!(find_longest_prefix(&map, &path("/Other").unwrap()).is_none());
    }

    #[test]
    fn longest_strict_prefix_skips_self() {
        let map = map_of(&["/World", "/World/Set_1"]);

        let (found, _) = find_longest_strict_prefix(&map, &path("/World/Set_1").unwrap()).unwrap();
        assert_eq!(found, &path("/World").unwrap());

        assert!(find_longest_strict_prefix(&map, &path("/World").unwrap()).is_none());
        assert!(find_longest_strict_prefix(&map, &Path::abs_root()).is_none());
    }

    #[test]
    fn prefix_range_is_contiguous() {
        let map = map_of(&["/A", "/A/B", "/A/B/C", "/AB", "/A_x", "/B"]);
        let prefix = path("/A").unwrap();

        let found: Vec<_> = entries_with_prefix(&map, &prefix).map(|(p, _)| p.to_string()).collect();
        assert_eq!(found, vec!["/A", "/A/B", "/A/B/C"]);
    }
}
