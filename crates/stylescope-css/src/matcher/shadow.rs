//! Shadow-DOM selectors: `::part()` and `::slotted()`.
//!
//! [CSS Shadow Parts § 4.1](https://www.w3.org/TR/css-shadow-parts-1/#part)
//! and [CSS Scoping § 3.2.2](https://www.w3.org/TR/css-scoping-1/#slotted-pseudo).
//! These cross a component boundary, so they are matched with substring
//! heuristics and kept out of the element's own cascade.

use super::{MatchReason, MatchResult, ReasonKind, TargetMatcher};
use crate::selector::balanced_argument;

const PART: &str = "::part(";
const SLOTTED: &str = "::slotted(";

/// `true` if the selector styles across a shadow boundary.
#[must_use]
pub fn is_shadow_selector(selector: &str) -> bool {
    let lower = selector.to_ascii_lowercase();
    lower.contains(PART) || lower.contains(SLOTTED)
}

impl TargetMatcher {
    /// Match a shadow-DOM selector.
    ///
    /// `::part(name)` matches when `name` is one of the identity's parts, or
    /// when one of the identity's classes or ids appears anywhere in the
    /// selector (the host side), or its tag appears as a whole word.
    /// `::slotted(inner)` matches when one of the identity's classes appears
    /// in `inner`.
    #[must_use]
    pub fn match_shadow(&self, selector: &str) -> MatchResult {
        let lower = selector.to_ascii_lowercase();
        let identity = self.identity();
        let mut reasons = Vec::new();

        if lower.contains(PART) {
            for name in pseudo_arguments(selector, &lower, PART)
                .iter()
                .flat_map(|argument| argument.split_whitespace())
            {
                if identity.shadow_parts.contains(name) {
                    push_unique(&mut reasons, MatchReason::new(ReasonKind::Part, name));
                }
            }
            for class in &identity.classes {
                if selector.contains(class.as_str()) {
                    push_unique(&mut reasons, MatchReason::new(ReasonKind::Host, format!(".{class}")));
                }
            }
            for id in &identity.ids {
                if selector.contains(id.as_str()) {
                    push_unique(&mut reasons, MatchReason::new(ReasonKind::Host, format!("#{id}")));
                }
            }
            if let Some(tag) = identity.tag.as_deref()
                && contains_word(&lower, tag)
            {
                push_unique(&mut reasons, MatchReason::new(ReasonKind::Host, tag));
            }
        }

        if lower.contains(SLOTTED) {
            for inner in pseudo_arguments(selector, &lower, SLOTTED) {
                for class in &identity.classes {
                    if inner.contains(class.as_str()) {
                        push_unique(&mut reasons, MatchReason::new(ReasonKind::Slotted, class.clone()));
                    }
                }
            }
        }

        MatchResult::from_reasons(reasons)
    }
}

/// Arguments of every `pseudo` occurrence, taken from the original text.
fn pseudo_arguments<'a>(selector: &'a str, lower: &str, pseudo: &str) -> Vec<&'a str> {
    let mut arguments = Vec::new();
    let mut from = 0;
    while let Some(found) = lower[from..].find(pseudo) {
        let start = from + found + pseudo.len();
        if let Some(argument) = balanced_argument(&selector[start..]) {
            arguments.push(argument);
        }
        from = start;
    }
    arguments
}

/// `word` occurs in `text` delimited by non-identifier characters.
fn contains_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    text.match_indices(word).any(|(at, _)| {
        let before = text[..at].chars().next_back();
        let after = text[at + word.len()..].chars().next();
        !before.is_some_and(is_name_char) && !after.is_some_and(is_name_char)
    })
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn push_unique(reasons: &mut Vec<MatchReason>, reason: MatchReason) {
    if !reasons.contains(&reason) {
        reasons.push(reason);
    }
}
