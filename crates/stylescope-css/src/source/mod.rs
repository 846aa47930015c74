//! Source rules as authored in a stylesheet.
//!
//! A [`StyleSheet`] owns an arena of [`SourceRule`]s in source (pre-)order.
//! Nesting is expressed through [`RuleId`] parent links, so a parent rule
//! always has a smaller id than any of its nested rules.

mod scanner;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use stylescope_common::fingerprint::fingerprint_all;
use thiserror::Error;

pub use scanner::StyleSheetScanner;

/// A type-safe index into a stylesheet's rule arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RuleId(pub usize);

/// One enclosing at-rule, e.g. `@media (max-width: 600px)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AtRuleContext {
    /// The at-keyword name without the `@` (`media`, `layer`, `supports`, ...).
    pub name: String,
    /// The prelude text with whitespace collapsed.
    pub params: String,
}

impl AtRuleContext {
    /// Create an at-rule context entry.
    #[must_use]
    pub fn new(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
        }
    }
}

impl fmt::Display for AtRuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "@{}", self.name)
        } else {
            write!(f, "@{} {}", self.name, self.params)
        }
    }
}

/// Render an at-rule chain outermost first, e.g.
/// `@media (max-width: 600px) > @layer base`. Empty for top-level rules.
#[must_use]
pub fn context_string(chain: &[AtRuleContext]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" > ")
}

/// One CSS rule as authored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRule {
    /// Raw selector text, possibly containing `&` or a comma-separated list.
    pub selector: String,
    /// The rule's own declarations (nested rules excluded), `;`-separated.
    pub body: String,
    /// The enclosing style rule, for nesting.
    pub parent: Option<RuleId>,
    /// Enclosing at-rules, outermost first.
    pub at_rules: Vec<AtRuleContext>,
    /// 1-based line of the selector.
    pub start_line: usize,
    /// 1-based line of the closing brace.
    pub end_line: usize,
}

impl SourceRule {
    /// Create a top-level rule with no at-rule context.
    #[must_use]
    pub fn new(selector: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            body: body.into(),
            parent: None,
            at_rules: Vec::new(),
            start_line: 1,
            end_line: 1,
        }
    }

    /// Set the parent rule.
    #[must_use]
    pub const fn with_parent(mut self, parent: RuleId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the line span.
    #[must_use]
    pub const fn with_lines(mut self, start_line: usize, end_line: usize) -> Self {
        self.start_line = start_line;
        self.end_line = end_line;
        self
    }

    /// Append an enclosing at-rule (outermost first).
    #[must_use]
    pub fn within(mut self, at_rule: AtRuleContext) -> Self {
        self.at_rules.push(at_rule);
        self
    }

    /// The at-rule context rendered for display.
    #[must_use]
    pub fn context(&self) -> String {
        context_string(&self.at_rules)
    }
}

/// Errors from reading stylesheets off disk.
///
/// Matching itself never fails; this only covers the I/O boundary.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The stylesheet file could not be read.
    #[error("failed to read stylesheet '{}'", path.display())]
    Read {
        /// Path of the unreadable file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// All rules of one CSS/SCSS file, identified by `id` (usually its path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    /// File identity, used for link order and reporting.
    pub id: String,
    /// Rules in source order. Parents precede their nested rules.
    pub rules: Vec<SourceRule>,
    fingerprint: u64,
}

impl StyleSheet {
    /// Wrap an already-parsed rule list.
    ///
    /// Parent links must point backwards (`parent < self`); links that do not
    /// are dropped so resolution can never loop.
    #[must_use]
    pub fn new(id: impl Into<String>, mut rules: Vec<SourceRule>) -> Self {
        for (index, rule) in rules.iter_mut().enumerate() {
            if rule.parent.is_some_and(|parent| parent.0 >= index) {
                rule.parent = None;
            }
        }
        let fingerprint = fingerprint_all(rules.iter());
        Self {
            id: id.into(),
            rules,
            fingerprint,
        }
    }

    /// Scan CSS/SCSS text into a stylesheet.
    #[must_use]
    pub fn parse(id: impl Into<String>, text: &str) -> Self {
        Self::new(id, StyleSheetScanner::new(text).run())
    }

    /// Read and scan a stylesheet file. The file's display path becomes its id.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Read`] if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(path.display().to_string(), &text))
    }

    /// Look up a rule by id.
    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<&SourceRule> {
        self.rules.get(id.0)
    }

    /// Iterate rules with their ids in source order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &SourceRule)> {
        self.rules.iter().enumerate().map(|(i, rule)| (RuleId(i), rule))
    }

    /// Content fingerprint of the rule list.
    #[must_use]
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_string_outermost_first() {
        let chain = vec![
            AtRuleContext::new("media", "(max-width: 600px)"),
            AtRuleContext::new("layer", ""),
        ];
        assert_eq!(context_string(&chain), "@media (max-width: 600px) > @layer");
        assert_eq!(context_string(&[]), "");
    }

    #[test]
    fn test_forward_parent_links_are_dropped() {
        let sheet = StyleSheet::new(
            "a.css",
            vec![SourceRule::new(".a", "").with_parent(RuleId(0))],
        );
        assert_eq!(sheet.rules[0].parent, None);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = StyleSheet::parse("a.css", ".a { color: red }");
        let b = StyleSheet::parse("b.css", ".a { color: red }");
        let c = StyleSheet::parse("a.css", ".a { color: blue }");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let err = StyleSheet::load("/definitely/not/here.css").unwrap_err();
        assert!(err.to_string().contains("not/here.css"));
    }
}
