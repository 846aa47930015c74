//! Ghost class detection: classes on the target that no rule targets.

mod utility;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::analysis::RuleMatch;
use crate::matcher::{ReasonKind, TargetIdentity, css_escape};

pub use utility::{is_utility_class, utility_family};

/// Which of the target's classes are styled, and which are not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostClassReport {
    /// Classes with no matching rule that follow no known utility
    /// convention, sorted.
    pub ghost_classes: Vec<String>,
    /// Classes referenced by at least one matched rule, sorted.
    pub defined_classes: Vec<String>,
    /// Number of classes on the target.
    pub total_classes: usize,
    /// `!ghost_classes.is_empty()`
    pub has_ghosts: bool,
}

/// Classify each of the identity's classes as defined, utility or ghost.
///
/// A class is defined if a match gave it as a `class` reason, or if its
/// selector form (`.name`, escaped) appears in any matched selector, which
/// covers classes the reason pass did not tag. Utility classes are neither
/// defined nor ghosts.
#[must_use]
pub fn detect<'a>(
    identity: &TargetIdentity,
    matches: impl IntoIterator<Item = &'a RuleMatch>,
) -> GhostClassReport {
    let mut defined: BTreeSet<&str> = BTreeSet::new();
    let mut selectors: Vec<&str> = Vec::new();

    for rule_match in matches {
        for reason in &rule_match.reasons {
            if reason.kind == ReasonKind::Class
                && let Some(class) = identity.classes.get(&reason.name)
            {
                let _ = defined.insert(class.as_str());
            }
        }
        selectors.push(&rule_match.selector);
    }

    for class in &identity.classes {
        if defined.contains(class.as_str()) {
            continue;
        }
        let needle = format!(".{}", css_escape(class));
        if selectors.iter().any(|selector| selector.contains(&needle)) {
            let _ = defined.insert(class.as_str());
        }
    }

    let ghost_classes: Vec<String> = identity
        .classes
        .iter()
        .filter(|class| !defined.contains(class.as_str()) && !is_utility_class(class))
        .cloned()
        .collect();

    GhostClassReport {
        has_ghosts: !ghost_classes.is_empty(),
        ghost_classes,
        defined_classes: defined.into_iter().map(ToString::to_string).collect(),
        total_classes: identity.classes.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchReason;
    use crate::selector::Specificity;
    use crate::source::RuleId;

    fn rule_match(selector: &str, reasons: Vec<MatchReason>) -> RuleMatch {
        RuleMatch {
            selector: selector.to_string(),
            original_selector: selector.to_string(),
            reasons,
            context: String::new(),
            start_line: 1,
            end_line: 1,
            body: String::new(),
            specificity: Specificity::ZERO,
            rule: RuleId(0),
        }
    }

    #[test]
    fn test_reason_and_substring_passes() {
        let identity = TargetIdentity::new()
            .with_class("card")
            .with_class("hidden-gem")
            .with_class("orphan");
        let matches = vec![
            rule_match(".card", vec![MatchReason::new(ReasonKind::Class, "card")]),
            rule_match(".x .hidden-gem-wrapper, .hidden-gem", Vec::new()),
        ];
        let report = detect(&identity, &matches);
        assert_eq!(report.defined_classes, vec!["card", "hidden-gem"]);
        assert_eq!(report.ghost_classes, vec!["orphan"]);
        assert_eq!(report.total_classes, 3);
        assert!(report.has_ghosts);
    }

    #[test]
    fn test_utility_classes_are_not_ghosts() {
        let identity = TargetIdentity::new().with_class("flex").with_class("is-open");
        let report = detect(&identity, std::iter::empty::<&RuleMatch>());
        assert!(report.ghost_classes.is_empty());
        assert!(report.defined_classes.is_empty());
        assert!(!report.has_ghosts);
    }

    #[test]
    fn test_serializes_camel_case() {
        let report = detect(&TargetIdentity::new().with_class("orphan"), std::iter::empty::<&RuleMatch>());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ghostClasses"][0], "orphan");
        assert_eq!(json["totalClasses"], 1);
        assert_eq!(json["hasGhosts"], true);
    }
}
