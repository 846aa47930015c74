//! CSS selector text handling: nesting resolution and specificity.
//!
//! Selectors are handled as text, not as a full
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) grammar. Resolution
//! substitutes ancestor selectors into nested ones; matching and ghost
//! detection then work on the flattened text and its functional pseudo-class
//! expansion (see [`expand_functional_pseudo`]).

mod resolve;
mod specificity;

use serde::Serialize;

use crate::source::RuleId;

pub use resolve::{DEFAULT_FAN_OUT_WARNING, SelectorResolver, nest_selector, resolve};
pub use specificity::{Specificity, calculate_specificity};

/// Functional pseudo-classes whose selector-list argument is appended to the
/// expanded form.
const EXPANDED_PSEUDO_CLASSES: &[&str] = &[":is(", ":where(", ":not(", ":has("];

/// A flattened, `&`-free selector produced from one [`SourceRule`](crate::source::SourceRule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSelector {
    /// The browser-equivalent selector text.
    pub text: String,
    /// `text` followed by the arguments of any `:is()`, `:where()`, `:not()`
    /// and `:has()`, space-joined. Equal to `text` when there are none.
    pub expanded: String,
    /// The rule this selector was resolved from.
    pub rule: RuleId,
}

impl ResolvedSelector {
    /// Wrap resolved selector text, computing its expanded form.
    #[must_use]
    pub fn new(text: impl Into<String>, rule: RuleId) -> Self {
        let text = text.into();
        let expanded = expand_functional_pseudo(&text);
        Self {
            text,
            expanded,
            rule,
        }
    }
}

/// [§ 4.1 Selector Lists](https://www.w3.org/TR/selectors-4/#grouping)
/// "A comma-separated list of selectors represents the union of all elements
/// selected by each of the individual selectors in the list."
///
/// Split at commas that are not inside parentheses, brackets or strings.
/// Branches are trimmed; empty branches are dropped.
#[must_use]
pub fn split_selector_list(text: &str) -> Vec<String> {
    let mut branches = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in text.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            current.push(c);
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                push_branch(&mut branches, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    push_branch(&mut branches, &current);
    branches
}

fn push_branch(branches: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        branches.push(trimmed.to_string());
    }
}

/// Append the argument lists of `:is()`, `:where()`, `:not()` and `:has()`
/// to the selector, space-joined.
///
/// `.card:is(.a, .b)` expands to `.card:is(.a, .b) .a, .b`, so identifier
/// matching sees `.b` followed by end-of-string the same way it would at top
/// level. Nested occurrences are expanded too, since every occurrence in the
/// original text is visited. Unbalanced arguments run to the end of input.
#[must_use]
pub fn expand_functional_pseudo(selector: &str) -> String {
    let lower = selector.to_ascii_lowercase();
    let mut arguments = Vec::new();

    for pseudo in EXPANDED_PSEUDO_CLASSES {
        let mut from = 0;
        while let Some(found) = lower[from..].find(pseudo) {
            let start = from + found + pseudo.len();
            if let Some(argument) = balanced_argument(&selector[start..]) {
                let argument = argument.trim();
                if !argument.is_empty() {
                    arguments.push((start, argument.to_string()));
                }
            }
            from = start;
        }
    }

    if arguments.is_empty() {
        return selector.to_string();
    }

    // Source order, regardless of which pseudo-class produced the argument.
    arguments.sort_by_key(|(start, _)| *start);
    let mut expanded = selector.to_string();
    for (_, argument) in arguments {
        expanded.push(' ');
        expanded.push_str(&argument);
    }
    expanded
}

/// Given text just after an opening `(`, return the text up to its matching
/// `)`, or the remainder if it never closes.
pub(crate) fn balanced_argument(text: &str) -> Option<&str> {
    let mut depth = 1usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..i]);
                }
            }
            _ => {}
        }
    }
    if text.is_empty() { None } else { Some(text) }
}
