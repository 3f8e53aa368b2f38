use crate::sdf::{self, Path};

/// How a load rule treats the payloads of its path and descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Load the path and all of its descendants.
    AllRule,
    /// Load the path itself but none of its descendants (unless they carry
    /// their own rules).
    OnlyRule,
    /// Load neither the path nor its descendants.
    NoneRule,
}

/// Describes which payload-bearing parts of a stage are loaded.
///
/// Rules are kept sorted by path with at most one rule per path. A path without
/// its own rule inherits from its nearest ancestor rule, and a stage without
/// rules loads everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LoadRules {
    rules: Vec<(Path, Rule)>,
}

impl LoadRules {
    /// Rules that load everything.
    pub fn load_all() -> Self {
        Self::default()
    }

    /// Rules that load nothing.
    pub fn load_none() -> Self {
        Self {
            rules: vec![(Path::abs_root(), Rule::NoneRule)],
        }
    }

    pub fn rules(&self) -> &[(Path, Rule)] {
        &self.rules
    }

    /// Replace all rules. When a path appears more than once, the last rule wins.
    pub fn set_rules(&mut self, rules: impl IntoIterator<Item = (Path, Rule)>) {
        self.rules.clear();
        for (path, rule) in rules {
            self.add_rule(path, rule);
        }
    }

    /// Add a rule, replacing any existing rule for the same path.
    pub fn add_rule(&mut self, path: Path, rule: Rule) {
        match self.rules.binary_search_by(|(existing, _)| existing.cmp(&path)) {
            Ok(index) => self.rules[index].1 = rule,
            Err(index) => self.rules.insert(index, (path, rule)),
        }
    }

    pub fn load_with_descendants(&mut self, path: Path) {
        self.add_rule(path, Rule::AllRule);
    }

    pub fn load_without_descendants(&mut self, path: Path) {
        self.add_rule(path, Rule::OnlyRule);
    }

    pub fn unload(&mut self, path: Path) {
        self.add_rule(path, Rule::NoneRule);
    }

    /// The rule that determines how `path` itself is loaded.
    ///
    /// An `AllRule` at or above `path` loads it fully. An `OnlyRule` on `path`
    /// itself yields `OnlyRule`. Otherwise `path` is unloaded, unless some rule
    /// below it loads a descendant, which makes it partially loaded (`OnlyRule`).
    pub fn effective_rule_for_path(&self, path: &Path) -> Rule {
        let (rule_path, rule) = match self.nearest_rule(path) {
            Some((rule_path, rule)) => (Some(rule_path), rule),
            None => (None, Rule::AllRule),
        };

        match rule {
            Rule::AllRule => Rule::AllRule,
            Rule::OnlyRule if rule_path == Some(path) => Rule::OnlyRule,
            Rule::OnlyRule | Rule::NoneRule => {
                let loads_descendant = self
                    .rules
                    .iter()
                    .any(|(other, rule)| other != path && other.has_prefix(path) && *rule != Rule::NoneRule);
                if loads_descendant {
                    Rule::OnlyRule
                } else {
                    Rule::NoneRule
                }
            }
        }
    }

    /// Returns true if the payload at `path` is loaded.
    pub fn is_loaded(&self, path: &Path) -> bool {
        self.effective_rule_for_path(path) != Rule::NoneRule
    }

    /// Remove rules that do not change behavior.
    ///
    /// A rule is redundant when its nearest ancestor rule already implies it:
    /// `AllRule` below `AllRule` (or below nothing), `NoneRule` below `NoneRule`
    /// or below an `OnlyRule`.
    pub fn minimize(&mut self) {
        let mut kept: Vec<(Path, Rule)> = Vec::with_capacity(self.rules.len());

        for (path, rule) in std::mem::take(&mut self.rules) {
            let inherited = kept
                .iter()
                .rev()
                .find(|(ancestor, _)| path != *ancestor && path.has_prefix(ancestor))
                .map(|(_, ancestor_rule)| match ancestor_rule {
                    Rule::AllRule => Rule::AllRule,
                    Rule::OnlyRule | Rule::NoneRule => Rule::NoneRule,
                })
                .unwrap_or(Rule::AllRule);

            if rule != inherited || rule == Rule::OnlyRule {
                kept.push((path, rule));
            }
        }

        self.rules = kept;
    }

    /// Nearest rule at or above `path`.
    fn nearest_rule(&self, path: &Path) -> Option<(&Path, Rule)> {
        self.rules
            .iter()
            .rev()
            .find(|(rule_path, _)| path.has_prefix(rule_path))
            .map(|(rule_path, rule)| (rule_path, *rule))
    }

    /// Rules at or below `path`, in order.
    pub(crate) fn rules_under<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a (Path, Rule)> + 'a {
        let start = self.rules.partition_point(|(rule_path, _)| rule_path < path);
        self.rules[start..]
            .iter()
            .take_while(move |(rule_path, _)| rule_path.has_prefix(path))
    }
}

/// Convenience for tests and callers building rules inline.
impl FromIterator<(Path, Rule)> for LoadRules {
    fn from_iter<T: IntoIterator<Item = (Path, Rule)>>(iter: T) -> Self {
        let mut rules = LoadRules::default();
        rules.set_rules(iter);
        rules
    }
}

impl From<&sdf::Path> for LoadRules {
    /// Rules that load only the subtree at `path`.
    fn from(path: &sdf::Path) -> Self {
        [(Path::abs_root(), Rule::NoneRule), (path.clone(), Rule::AllRule)]
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Path {
        sdf::path(s).unwrap()
    }

    #[test]
    fn default_loads_everything() {
        let rules = LoadRules::default();
        assert_eq!(rules.effective_rule_for_path(&p("/World")), Rule::AllRule);
        assert!(rules.is_loaded(&p("/World/Set_1")));
    }

    #[test]
    fn load_none() {
        let rules = LoadRules::load_none();
        assert_eq!(rules.effective_rule_for_path(&p("/World")), Rule::NoneRule);
        assert_eq!(rules.effective_rule_for_path(&Path::abs_root()), Rule::NoneRule);
    }

    #[test]
    fn later_rule_replaces_earlier_for_same_path() {
        let mut rules = LoadRules::default();
        rules.unload(p("/World"));
        rules.load_with_descendants(p("/World"));
        assert_eq!(rules.rules(), &[(p("/World"), Rule::AllRule)]);
    }

    #[test]
    fn effective_rules() {
        let rules: LoadRules = [
            (Path::abs_root(), Rule::NoneRule),
            (p("/World/Set_1"), Rule::AllRule),
            (p("/World/Set_2"), Rule::OnlyRule),
            (p("/World/Set_1/Heavy"), Rule::NoneRule),
        ]
        .into_iter()
        .collect();

        // Unloaded ancestor with a loaded descendant is partially loaded.
        assert_eq!(rules.effective_rule_for_path(&p("/World")), Rule::OnlyRule);
        // An AllRule wins even when a descendant is unloaded.
        assert_eq!(rules.effective_rule_for_path(&p("/World/Set_1")), Rule::AllRule);
        assert_eq!(rules.effective_rule_for_path(&p("/World/Set_1/Heavy")), Rule::NoneRule);
        assert_eq!(rules.effective_rule_for_path(&p("/World/Set_2")), Rule::OnlyRule);
        // Descendants of an OnlyRule path are unloaded.
        assert_eq!(rules.effective_rule_for_path(&p("/World/Set_2/Child")), Rule::NoneRule);
        assert_eq!(rules.effective_rule_for_path(&p("/World/Set_3")), Rule::NoneRule);
    }

    #[test]
    fn minimize_drops_redundant_rules() {
        let mut rules: LoadRules = [
            (Path::abs_root(), Rule::AllRule),
            (p("/A"), Rule::AllRule),
            (p("/B"), Rule::NoneRule),
            (p("/B/C"), Rule::NoneRule),
            (p("/D"), Rule::OnlyRule),
            (p("/D/E"), Rule::NoneRule),
            (p("/D/F"), Rule::AllRule),
        ]
        .into_iter()
        .collect();

        rules.minimize();

        assert_eq!(
            rules.rules(),
            &[(p("/B"), Rule::NoneRule), (p("/D"), Rule::OnlyRule), (p("/D/F"), Rule::AllRule)]
        );
    }

    #[test]
    fn minimize_preserves_behavior() {
        let mut rules: LoadRules = [
            (Path::abs_root(), Rule::NoneRule),
            (p("/A"), Rule::NoneRule),
            (p("/A/B"), Rule::AllRule),
            (p("/A/B/C"), Rule::AllRule),
        ]
        .into_iter()
        .collect();
        let before = rules.clone();

        rules.minimize();

        assert_eq!(rules.rules(), &[(Path::abs_root(), Rule::NoneRule), (p("/A/B"), Rule::AllRule)]);
        for probe in ["/", "/A", "/A/B", "/A/B/C", "/A/X", "/Z"] {
            assert_eq!(
                rules.effective_rule_for_path(&p(probe)),
                before.effective_rule_for_path(&p(probe)),
                "{probe}"
            );
        }
    }

    #[test]
    fn rules_under_a_path() {
        let rules: LoadRules = [
            (p("/A"), Rule::NoneRule),
            (p("/A/B"), Rule::AllRule),
            (p("/AB"), Rule::NoneRule),
        ]
        .into_iter()
        .collect();

        let prefix = p("/A");
        let under: Vec<_> = rules.rules_under(&prefix).map(|(path, _)| path.to_string()).collect();
        assert_eq!(under, vec!["/A", "/A/B"]);
    }

    #[test]
    fn subtree_rules_from_path() {
        let rules = LoadRules::from(&p("/World/Set_1"));
        assert!(rules.is_loaded(&p("/World/Set_1/Prop")));
        assert!(rules.is_loaded(&p("/World")));
        assert!(!rules.is_loaded(&p("/World/Set_2")));
    }
}
