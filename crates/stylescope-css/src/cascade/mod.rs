//! Property-level cascade conflicts between matched rules.
//!
//! This module orders competing declarations per
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/),
//! restricted to the steps that can be decided statically: importance,
//! specificity and order of appearance. Origins and `@layer` order are not
//! modelled; layers only show up in the context string.

mod declaration;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::FileMatches;
use crate::selector::Specificity;

pub use declaration::{Declaration, parse_declarations};

/// The order in which the host document links its stylesheets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOrder {
    files: Vec<String>,
}

impl LinkOrder {
    /// Build from file identities in link order (first linked first).
    #[must_use]
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// Position of `file` in the link order.
    ///
    /// Identities compare equal when identical or when one is a path suffix
    /// of the other (`css/site.css` links `/srv/app/css/site.css`). The last
    /// matching link wins, as a stylesheet linked twice applies at its later
    /// position.
    #[must_use]
    pub fn position(&self, file: &str) -> Option<usize> {
        self.files
            .iter()
            .rposition(|linked| same_file(linked, file))
    }

    /// Sort key for a file: linked files rank above unlinked ones by link
    /// position; `input_index` breaks ties among unlinked files.
    #[must_use]
    pub fn rank(&self, file: &str, input_index: usize) -> FileRank {
        FileRank {
            link: self.position(file).map_or(0, |position| position + 1),
            input: input_index,
        }
    }

    /// `true` if no files are linked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn same_file(linked: &str, file: &str) -> bool {
    fn is_suffix(long: &str, short: &str) -> bool {
        long.strip_suffix(short)
            .is_some_and(|prefix| prefix.ends_with('/') || prefix.ends_with('\\'))
    }
    linked == file || is_suffix(file, linked) || is_suffix(linked, file)
}

/// [§ 6.4.4 Order of Appearance](https://www.w3.org/TR/css-cascade-4/#cascade-order)
///
/// A file's position in the cascade: higher ranks come later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FileRank {
    /// 1-based link position, 0 if the file is not linked.
    link: usize,
    /// Analysis input order.
    input: usize,
}

/// One declaration competing for a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Property name.
    pub property: String,
    /// Declared value (without `!important`).
    pub value: String,
    /// Whether the declaration is `!important`.
    pub important: bool,
    /// Specificity of the matched selector.
    pub specificity: Specificity,
    /// The file declaring it.
    pub file: String,
    /// The resolved selector that matched.
    pub selector: String,
    /// At-rule context string.
    pub context: String,
    /// 1-based start line of the declaring rule.
    pub line: usize,
    #[serde(skip)]
    file_rank: FileRank,
    /// (rule index, declaration index) within the file.
    #[serde(skip)]
    position: (usize, usize),
}

impl Candidate {
    /// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
    ///
    /// Compare two candidates by cascade precedence; `Greater` wins.
    ///
    /// STEP 1: `!important` outranks normal declarations.
    /// STEP 2: Higher specificity wins.
    /// STEP 3: A later-linked file wins.
    /// STEP 4: Within a file, the later declaration wins.
    #[must_use]
    pub fn cascade_cmp(&self, other: &Self) -> Ordering {
        self.important
            .cmp(&other.important)
            .then_with(|| self.specificity.cmp(&other.specificity))
            .then_with(|| self.file_rank.cmp(&other.file_rank))
            .then_with(|| self.position.cmp(&other.position))
    }
}

/// The outcome of one property conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeDecision {
    /// The declaration that applies.
    pub winner: Candidate,
    /// Every other declaration, closest competitor first.
    pub losers: Vec<Candidate>,
}

/// Collect every declaration of every regular match, grouped by property.
///
/// `files` must be in analysis input order; link order and source position
/// are recorded on each candidate so arrival order never matters.
#[must_use]
pub fn collect_candidates(
    files: &[FileMatches],
    link_order: &LinkOrder,
) -> BTreeMap<String, Vec<Candidate>> {
    let mut by_property: BTreeMap<String, Vec<Candidate>> = BTreeMap::new();

    for (input_index, file) in files.iter().enumerate() {
        let file_rank = link_order.rank(&file.file, input_index);
        for rule_match in &file.matches {
            for (index, declaration) in parse_declarations(&rule_match.body).into_iter().enumerate() {
                by_property
                    .entry(declaration.property.clone())
                    .or_default()
                    .push(Candidate {
                        property: declaration.property,
                        value: declaration.value,
                        important: declaration.important,
                        specificity: rule_match.specificity,
                        file: file.file.clone(),
                        selector: rule_match.selector.clone(),
                        context: rule_match.context.clone(),
                        line: rule_match.start_line,
                        file_rank,
                        position: (rule_match.rule.0, index),
                    });
            }
        }
    }

    by_property
}

/// Decide every property declared by two or more candidates.
///
/// Properties with a single candidate are not conflicts and are omitted.
#[must_use]
pub fn resolve_conflicts(
    by_property: BTreeMap<String, Vec<Candidate>>,
) -> BTreeMap<String, CascadeDecision> {
    by_property
        .into_iter()
        .filter(|(_, candidates)| candidates.len() > 1)
        .filter_map(|(property, candidates)| {
            decide(candidates).map(|decision| (property, decision))
        })
        .collect()
}

/// Rank candidates for one property. `None` only for an empty list.
#[must_use]
pub fn decide(mut candidates: Vec<Candidate>) -> Option<CascadeDecision> {
    candidates.sort_by(|a, b| b.cascade_cmp(a));
    let mut ranked = candidates.into_iter();
    let winner = ranked.next()?;
    Some(CascadeDecision {
        winner,
        losers: ranked.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(specificity: Specificity, important: bool, file_rank: FileRank) -> Candidate {
        Candidate {
            property: "color".to_string(),
            value: "red".to_string(),
            important,
            specificity,
            file: String::new(),
            selector: String::new(),
            context: String::new(),
            line: 1,
            file_rank,
            position: (0, 0),
        }
    }

    #[test]
    fn test_link_order_rank() {
        let order = LinkOrder::new(["base.css", "theme.css"]);
        assert!(order.rank("theme.css", 0) > order.rank("base.css", 1));
        assert!(order.rank("base.css", 5) > order.rank("other.css", 9));
        assert!(order.rank("b.css", 3) > order.rank("a.css", 2));
        assert_eq!(order.position("/srv/app/theme.css"), Some(1));
        assert_eq!(order.position("mytheme.css"), None);
    }

    #[test]
    fn test_important_beats_specificity() {
        let order = LinkOrder::new(["a.css", "b.css", "c.css"]);
        let decision = decide(vec![
            candidate(Specificity::new(1, 0, 0), false, order.rank("a.css", 0)),
            candidate(Specificity::new(2, 0, 0), false, order.rank("b.css", 1)),
            candidate(Specificity::ZERO, true, order.rank("c.css", 2)),
        ])
        .unwrap();
        assert!(decision.winner.important);
        assert_eq!(decision.losers[0].specificity, Specificity::new(2, 0, 0));
        assert_eq!(decision.losers[1].specificity, Specificity::new(1, 0, 0));
    }

    #[test]
    fn test_later_file_breaks_specificity_tie() {
        let order = LinkOrder::new(["a.css", "b.css"]);
        let spec = Specificity::new(0, 1, 0);
        let decision = decide(vec![
            candidate(spec, false, order.rank("b.css", 0)),
            candidate(spec, false, order.rank("a.css", 1)),
        ])
        .unwrap();
        assert_eq!(decision.winner.file_rank, order.rank("b.css", 0));
    }

    #[test]
    fn test_single_candidate_is_not_a_conflict() {
        let mut by_property = BTreeMap::new();
        let _ = by_property.insert(
            "color".to_string(),
            vec![candidate(Specificity::ZERO, false, FileRank::default())],
        );
        assert!(resolve_conflicts(by_property).is_empty());
        assert!(decide(Vec::new()).is_none());
    }
}
