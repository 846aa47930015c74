//! Matching resolved selectors against one target element.
//!
//! The matcher answers "could this selector be styling the target?" by
//! looking for the target's identifiers in the selector text, with boundary
//! checks so `.btn` never matches `.btn-group`. It does not evaluate
//! combinators or structural pseudo-classes; a rule that names the target's
//! class is reported even if its ancestor part would not match in a real
//! document.

mod identity;
mod shadow;

use std::fmt;
use std::str::FromStr;

use regex::RegexSet;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use stylescope_common::warning::warn_once;
use thiserror::Error;

use crate::selector::{ResolvedSelector, expand_functional_pseudo};

pub use identity::TargetIdentity;
pub use shadow::is_shadow_selector;

/// What kind of identifier a match was made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ReasonKind {
    /// `.class`
    Class,
    /// `#id`
    Id,
    /// A type selector (only considered when the identity has a class or id)
    Tag,
    /// `[data-*]`
    DataAttr,
    /// `::part(name)` naming one of the identity's parts
    Part,
    /// `::part()` whose host portion mentions the identity
    Host,
    /// `::slotted(inner)` mentioning one of the identity's classes
    Slotted,
}

/// One reason a selector matched, displayed as `kind: name`
/// (`class: btn`, `data-attr: data-state`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MatchReason {
    /// Identifier kind.
    pub kind: ReasonKind,
    /// The identifier as it appears on the target (class name, id, tag, ...).
    pub name: String,
}

impl MatchReason {
    /// Create a reason.
    #[must_use]
    pub fn new(kind: ReasonKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.name)
    }
}

/// A string that is not of the form `kind: name`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid match reason '{0}'")]
pub struct ParseReasonError(String);

impl FromStr for MatchReason {
    type Err = ParseReasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s.split_once(": ").ok_or_else(|| ParseReasonError(s.to_string()))?;
        let kind = kind.parse().map_err(|_| ParseReasonError(s.to_string()))?;
        Ok(Self::new(kind, name))
    }
}

impl From<MatchReason> for String {
    fn from(reason: MatchReason) -> Self {
        reason.to_string()
    }
}

impl TryFrom<String> for MatchReason {
    type Error = ParseReasonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Outcome of matching one selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Whether any identifier matched.
    pub matches: bool,
    /// Deduplicated reasons, in identity order (classes, ids, data
    /// attributes, tag).
    pub reasons: Vec<MatchReason>,
}

impl MatchResult {
    /// The "no match" result.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            matches: false,
            reasons: Vec::new(),
        }
    }

    fn from_reasons(reasons: Vec<MatchReason>) -> Self {
        Self {
            matches: !reasons.is_empty(),
            reasons,
        }
    }
}

/// Characters that may follow a class or id name in a selector.
///
/// Anything else (`-`, letters, digits, `_`) would mean the name continues.
const NAME_END: &str = r"(?:$|[\s,:.\[#>+~)])";

/// A [`TargetIdentity`] compiled into one regex set, built once and reused
/// for every selector of every stylesheet.
#[derive(Debug, Clone)]
pub struct TargetMatcher {
    identity: TargetIdentity,
    patterns: RegexSet,
    /// `reasons[i]` is reported when pattern `i` matches.
    reasons: Vec<MatchReason>,
}

impl TargetMatcher {
    /// Compile the identity's class, id, data-attribute and tag patterns.
    ///
    /// If compilation fails the matcher matches nothing and a warning is
    /// printed.
    #[must_use]
    pub fn new(identity: &TargetIdentity) -> Self {
        let identity = identity.normalized();
        let mut patterns = Vec::new();
        let mut reasons = Vec::new();

        // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
        for class in &identity.classes {
            patterns.push(format!(r"\.{}{NAME_END}", regex::escape(&css_escape(class))));
            reasons.push(MatchReason::new(ReasonKind::Class, class.clone()));
        }
        // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
        for id in &identity.ids {
            patterns.push(format!(r"#{}{NAME_END}", regex::escape(&css_escape(id))));
            reasons.push(MatchReason::new(ReasonKind::Id, id.clone()));
        }
        // [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
        for attribute in &identity.data_attributes {
            patterns.push(format!(
                r"(?i)\[\s*{}\s*(?:\]|=|[~|^$*]=)",
                regex::escape(attribute)
            ));
            reasons.push(MatchReason::new(ReasonKind::DataAttr, attribute.clone()));
        }
        // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
        // Only alongside a class or id; a bare tag would match most rules.
        if let Some(tag) = identity.tag.as_deref()
            && !(identity.classes.is_empty() && identity.ids.is_empty())
        {
            patterns.push(format!(
                r"(?i)(?:^|[\s>+~,(]){}(?:$|[\s>+~,)\[:.#])",
                regex::escape(tag)
            ));
            reasons.push(MatchReason::new(ReasonKind::Tag, tag));
        }

        let patterns = match RegexSet::new(&patterns) {
            Ok(set) => set,
            Err(err) => {
                warn_once(
                    "Matcher",
                    &format!("could not compile target identity, matching nothing: {err}"),
                );
                reasons.clear();
                RegexSet::empty()
            }
        };

        Self {
            identity,
            patterns,
            reasons,
        }
    }

    /// The (normalized) identity this matcher was built for.
    #[must_use]
    pub const fn identity(&self) -> &TargetIdentity {
        &self.identity
    }

    /// Match a selector given as text. Its functional pseudo-class expansion
    /// is computed here.
    #[must_use]
    pub fn match_selector(&self, selector: &str) -> MatchResult {
        self.match_forms(selector, &expand_functional_pseudo(selector))
    }

    /// Match a resolved selector, using its precomputed expansion.
    #[must_use]
    pub fn match_resolved(&self, selector: &ResolvedSelector) -> MatchResult {
        self.match_forms(&selector.text, &selector.expanded)
    }

    /// A hit on either form counts; each identifier is reported once.
    fn match_forms(&self, text: &str, expanded: &str) -> MatchResult {
        if text.trim().is_empty() {
            return MatchResult::none();
        }
        let mut hits: Vec<usize> = self.patterns.matches(text).into_iter().collect();
        if expanded != text {
            hits.extend(self.patterns.matches(expanded));
            hits.sort_unstable();
            hits.dedup();
        }
        let reasons = hits
            .into_iter()
            .filter_map(|index| self.reasons.get(index).cloned())
            .collect();
        MatchResult::from_reasons(reasons)
    }
}

/// Match one selector against an identity, compiling a matcher for the call.
///
/// Prefer building a [`TargetMatcher`] once when matching many selectors.
#[must_use]
pub fn match_selector(selector: &str, identity: &TargetIdentity) -> MatchResult {
    TargetMatcher::new(identity).match_selector(selector)
}

/// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
///
/// Escape a class or id name the way it must be written in a selector:
/// characters outside `[A-Za-z0-9_-]` (and non-ASCII) get a backslash, so
/// `md:flex` becomes `md\:flex` and `w-1/2` becomes `w-1\/2`. A leading
/// digit is written as a hex escape (`2xl` becomes `\32 xl`).
#[must_use]
pub fn css_escape(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        if i == 0 && c.is_ascii_digit() {
            escaped.push_str(&format!("\\{:x} ", u32::from(c)));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            escaped.push(c);
        } else {
            escaped.push('\\');
            escaped.push(c);
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> TargetIdentity {
        TargetIdentity::new()
            .with_tag("button")
            .with_class("btn")
            .with_id("save")
            .with_data_attribute("data-state")
    }

    #[test]
    fn test_reason_display_and_parse() {
        let reason = MatchReason::new(ReasonKind::DataAttr, "data-state");
        assert_eq!(reason.to_string(), "data-attr: data-state");
        assert_eq!("data-attr: data-state".parse::<MatchReason>(), Ok(reason));
        assert!("nonsense".parse::<MatchReason>().is_err());
    }

    #[test]
    fn test_class_boundary() {
        let matcher = TargetMatcher::new(&identity());
        assert!(matcher.match_selector(".btn").matches);
        assert!(matcher.match_selector(".btn:hover").matches);
        assert!(matcher.match_selector(".toolbar > .btn").matches);
        assert!(!matcher.match_selector(".btn-group").matches);
        assert!(!matcher.match_selector(".btn_primary").matches);
    }

    #[test]
    fn test_reasons_in_identity_order() {
        let matcher = TargetMatcher::new(&identity());
        let result = matcher.match_selector("button#save.btn[data-state=open]");
        let reasons: Vec<String> = result.reasons.iter().map(ToString::to_string).collect();
        assert_eq!(
            reasons,
            vec!["class: btn", "id: save", "data-attr: data-state", "tag: button"]
        );
    }

    #[test]
    fn test_tag_requires_class_or_id() {
        let tag_only = TargetIdentity::new().with_tag("div");
        assert!(!match_selector("div", &tag_only).matches);
        let matcher = TargetMatcher::new(&identity());
        assert!(matcher.match_selector("form button").matches);
        assert!(!matcher.match_selector("form button-group").matches);
    }

    #[test]
    fn test_expanded_form_is_searched() {
        let matcher = TargetMatcher::new(&identity());
        let result = matcher.match_selector(".card:is(.primary, .btn)");
        assert!(result.matches);
        assert_eq!(result.reasons, vec![MatchReason::new(ReasonKind::Class, "btn")]);
    }

    #[test]
    fn test_empty_selector_never_matches() {
        assert_eq!(TargetMatcher::new(&identity()).match_selector("  "), MatchResult::none());
    }

    #[test]
    fn test_css_escape() {
        assert_eq!(css_escape("md:flex"), "md\\:flex");
        assert_eq!(css_escape("w-1/2"), "w-1\\/2");
        assert_eq!(css_escape("2xl"), "\\32 xl");
        assert_eq!(css_escape("plain-name_1"), "plain-name_1");
    }

    #[test]
    fn test_escaped_utility_class_matches() {
        let identity = TargetIdentity::new().with_class("md:flex");
        assert!(match_selector(".md\\:flex", &identity).matches);
        assert!(!match_selector(".md", &identity).matches);
    }
}
