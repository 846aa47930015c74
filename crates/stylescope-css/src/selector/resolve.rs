//! Nesting resolution.
//!
//! [CSS Nesting § 3](https://www.w3.org/TR/css-nesting-1/#nest-selector)
//! "The nesting selector `&` represents the elements matched by the parent
//! rule's selector." Rules without `&` are joined to their parent with a
//! descendant combinator, as if the nested selector began with `& `.

use stylescope_common::warning::warn_once;

use super::{ResolvedSelector, split_selector_list};
use crate::source::{RuleId, StyleSheet};

/// Default number of resolved variants per rule above which fan-out is
/// reported as suspicious.
pub const DEFAULT_FAN_OUT_WARNING: usize = 16;

/// Stand-in for `&` in a rule that has no parent rule.
///
/// [CSS Nesting § 3](https://www.w3.org/TR/css-nesting-1/#nest-selector)
/// "If the nesting selector is used in a top-level style rule, it represents
/// the same elements as `:scope`."
const TOP_LEVEL_NESTING: &str = ":scope";

/// Flattens nested rules into browser-equivalent selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorResolver {
    fan_out_warning: usize,
}

impl Default for SelectorResolver {
    fn default() -> Self {
        Self::new(DEFAULT_FAN_OUT_WARNING)
    }
}

impl SelectorResolver {
    /// Create a resolver that warns when a rule expands into more than
    /// `fan_out_warning` selectors.
    #[must_use]
    pub const fn new(fan_out_warning: usize) -> Self {
        Self { fan_out_warning }
    }

    /// Resolve one rule of `sheet`.
    ///
    /// A rule without a parent resolves to its selector unchanged (a top-level
    /// `&` becomes `:scope`). A nested rule fans out once per comma branch of
    /// its resolved parent, in parent order. Unknown ids resolve to nothing.
    #[must_use]
    pub fn resolve(&self, sheet: &StyleSheet, id: RuleId) -> Vec<ResolvedSelector> {
        self.resolve_texts(sheet, id)
            .into_iter()
            .map(|text| ResolvedSelector::new(text, id))
            .collect()
    }

    /// Resolve every rule of `sheet`, indexed by [`RuleId`].
    ///
    /// Parents are always resolved before their nested rules, so each rule is
    /// resolved exactly once.
    #[must_use]
    pub fn resolve_all(&self, sheet: &StyleSheet) -> Vec<Vec<ResolvedSelector>> {
        let mut texts: Vec<Vec<String>> = Vec::with_capacity(sheet.rules.len());
        for (id, rule) in sheet.iter() {
            let resolved = match rule.parent.and_then(|parent| texts.get(parent.0)) {
                Some(parents) => nest_selector(parents, &rule.selector),
                None => vec![resolve_top_level(&rule.selector)],
            };
            self.check_fan_out(sheet, id, resolved.len());
            texts.push(resolved);
        }

        texts
            .into_iter()
            .enumerate()
            .map(|(index, variants)| {
                variants
                    .into_iter()
                    .map(|text| ResolvedSelector::new(text, RuleId(index)))
                    .collect()
            })
            .collect()
    }

    fn resolve_texts(&self, sheet: &StyleSheet, id: RuleId) -> Vec<String> {
        let Some(rule) = sheet.get(id) else {
            return Vec::new();
        };
        let resolved = match rule.parent {
            Some(parent) => nest_selector(&self.resolve_texts(sheet, parent), &rule.selector),
            None => vec![resolve_top_level(&rule.selector)],
        };
        self.check_fan_out(sheet, id, resolved.len());
        resolved
    }

    fn check_fan_out(&self, sheet: &StyleSheet, id: RuleId, variants: usize) {
        if variants <= self.fan_out_warning {
            return;
        }
        if let Some(rule) = sheet.get(id) {
            warn_once(
                "Selector",
                &format!(
                    "nesting fan-out produced {variants} variants for '{}' ({}:{})",
                    rule.selector, sheet.id, rule.start_line
                ),
            );
        }
    }
}

/// Resolve one rule of `sheet` with the default fan-out threshold.
#[must_use]
pub fn resolve(sheet: &StyleSheet, id: RuleId) -> Vec<ResolvedSelector> {
    SelectorResolver::default().resolve(sheet, id)
}

/// Combine already-resolved parent selectors with a nested selector.
///
/// Parent texts are split into comma branches first, so `.a, .b` with
/// `&--x` yields `.a--x` and `.b--x`. Each branch of the child is combined
/// with each parent branch (parent-major order): `&` occurrences are replaced
/// textually, otherwise the child is appended after a space. A child that
/// begins with a combinator (`> .x`) reads naturally after that space.
///
/// With no parent branches the child stands alone, as at top level.
#[must_use]
pub fn nest_selector(parents: &[String], child: &str) -> Vec<String> {
    let parent_branches: Vec<String> = parents.iter().flat_map(|p| split_selector_list(p)).collect();
    if parent_branches.is_empty() {
        return vec![resolve_top_level(child)];
    }
    let child_branches = split_selector_list(child);

    let mut resolved = Vec::with_capacity(parent_branches.len() * child_branches.len());
    for parent in &parent_branches {
        for branch in &child_branches {
            if branch.contains('&') {
                resolved.push(branch.replace('&', parent));
            } else {
                resolved.push(format!("{parent} {branch}"));
            }
        }
    }
    resolved
}

fn resolve_top_level(selector: &str) -> String {
    if selector.contains('&') {
        selector.replace('&', TOP_LEVEL_NESTING)
    } else {
        selector.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceRule;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_nest_ampersand_fans_out_per_parent_branch() {
        assert_eq!(nest_selector(&strings(&[".a, .b"]), "&--x"), strings(&[".a--x", ".b--x"]));
    }

    #[test]
    fn test_nest_without_ampersand_uses_descendant_join() {
        assert_eq!(
            nest_selector(&strings(&[".card"]), "> .title, p"),
            strings(&[".card > .title", ".card p"])
        );
    }

    #[test]
    fn test_nest_replaces_every_ampersand() {
        assert_eq!(nest_selector(&strings(&[".a"]), "& + &"), strings(&[".a + .a"]));
    }

    #[test]
    fn test_top_level_keeps_selector_list_intact() {
        let sheet = StyleSheet::new("a.css", vec![SourceRule::new(".a, .b", "color: red")]);
        let resolved = resolve(&sheet, RuleId(0));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].text, ".a, .b");
    }

    #[test]
    fn test_top_level_ampersand_is_scope() {
        let sheet = StyleSheet::new("a.css", vec![SourceRule::new("&.dark", "")]);
        assert_eq!(resolve(&sheet, RuleId(0))[0].text, ":scope.dark");
    }

    #[test]
    fn test_resolve_all_matches_resolve() {
        let sheet = StyleSheet::parse("a.css", ".a, .b { .c { &:hover { x: y } } }");
        let resolver = SelectorResolver::default();
        let all = resolver.resolve_all(&sheet);
        for (id, _) in sheet.iter() {
            assert_eq!(all[id.0], resolver.resolve(&sheet, id));
        }
        assert_eq!(all[2][1].text, ".b .c:hover");
    }

    #[test]
    fn test_unknown_rule_resolves_to_nothing() {
        let sheet = StyleSheet::new("a.css", Vec::new());
        assert!(resolve(&sheet, RuleId(3)).is_empty());
    }
}
