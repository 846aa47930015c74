//! The analysis pipeline: resolve, match, then derive conflicts and ghosts.
//!
//! Per-file work is independent and may run on a rayon pool. The cascade
//! re-derives order from link order and source position afterwards, so file
//! completion order never affects the report.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::cache::{CacheKey, MatchCache};
use crate::cascade::{CascadeDecision, LinkOrder, collect_candidates, resolve_conflicts};
use crate::ghost::{GhostClassReport, detect};
use crate::matcher::{MatchReason, MatchResult, TargetIdentity, TargetMatcher, is_shadow_selector};
use crate::selector::{
    DEFAULT_FAN_OUT_WARNING, SelectorResolver, Specificity, calculate_specificity, split_selector_list,
};
use crate::source::{RuleId, SourceRule, StyleSheet};

/// Analysis settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Analyze files on the rayon thread pool.
    pub parallel: bool,
    /// Warn when one rule resolves into more selectors than this.
    pub fan_out_warning: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            fan_out_warning: DEFAULT_FAN_OUT_WARNING,
        }
    }
}

/// One resolved selector of one rule that matched the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    /// The resolved selector, narrowed to the comma branches that matched.
    pub selector: String,
    /// The selector as authored (may contain `&` or a list).
    pub original_selector: String,
    /// Why it matched.
    pub reasons: Vec<MatchReason>,
    /// At-rule context, outermost first; empty at top level.
    pub context: String,
    /// 1-based first line of the rule.
    pub start_line: usize,
    /// 1-based last line of the rule.
    pub end_line: usize,
    /// The rule's own declarations.
    pub body: String,
    /// Highest specificity among the branches in `selector`.
    pub specificity: Specificity,
    /// The matched rule within its file.
    #[serde(skip)]
    pub rule: RuleId,
}

/// Matches found in one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMatches {
    /// File identity.
    pub file: String,
    /// Matches that take part in the element's cascade, in source order.
    pub matches: Vec<RuleMatch>,
    /// `::part()` / `::slotted()` matches, reported separately.
    pub shadow_matches: Vec<RuleMatch>,
}

impl FileMatches {
    /// A file with no matches.
    #[must_use]
    pub fn empty(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            matches: Vec::new(),
            shadow_matches: Vec::new(),
        }
    }

    /// `true` if neither category has a match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.shadow_matches.is_empty()
    }
}

/// Everything learned about one target across a set of stylesheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Per-file matches, in input order.
    pub files: Vec<FileMatches>,
    /// Property name to cascade decision, for properties declared by two or
    /// more matched rules.
    pub conflicts: BTreeMap<String, CascadeDecision>,
    /// Classes with no matching rule.
    pub ghosts: GhostClassReport,
}

impl AnalysisReport {
    /// Every regular match, file by file.
    pub fn matches(&self) -> impl Iterator<Item = &RuleMatch> {
        self.files.iter().flat_map(|file| file.matches.iter())
    }

    /// Every shadow-DOM match, file by file.
    pub fn shadow_matches(&self) -> impl Iterator<Item = &RuleMatch> {
        self.files.iter().flat_map(|file| file.shadow_matches.iter())
    }

    /// The decision for one property, if it was contested.
    #[must_use]
    pub fn conflict(&self, property: &str) -> Option<&CascadeDecision> {
        self.conflicts.get(property)
    }
}

/// Runs the resolver, matcher, cascade and ghost detector over a set of
/// stylesheets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer<'c> {
    options: AnalyzerOptions,
    cache: Option<&'c MatchCache>,
}

impl<'c> Analyzer<'c> {
    /// Create an analyzer without a cache.
    #[must_use]
    pub const fn new(options: AnalyzerOptions) -> Self {
        Self {
            options,
            cache: None,
        }
    }

    /// Memoize per-file results in `cache`.
    #[must_use]
    pub const fn with_cache(mut self, cache: &'c MatchCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The options in use.
    #[must_use]
    pub const fn options(&self) -> AnalyzerOptions {
        self.options
    }

    /// Analyze `identity` against `sheets`.
    ///
    /// STEP 1: Compile one matcher for the identity.
    /// STEP 2: Match every file (in parallel if enabled, through the cache
    ///         if one is set).
    /// STEP 3: Collect declarations of regular matches and resolve conflicts.
    /// STEP 4: Detect ghost classes over regular and shadow matches.
    #[must_use]
    pub fn analyze(
        &self,
        identity: &TargetIdentity,
        sheets: &[StyleSheet],
        link_order: &LinkOrder,
    ) -> AnalysisReport {
        // STEP 1
        let matcher = TargetMatcher::new(identity);

        // STEP 2
        let shared: Vec<Arc<FileMatches>> = if self.options.parallel {
            sheets
                .par_iter()
                .map(|sheet| self.match_file_cached(&matcher, sheet))
                .collect()
        } else {
            sheets
                .iter()
                .map(|sheet| self.match_file_cached(&matcher, sheet))
                .collect()
        };
        let files: Vec<FileMatches> = shared.into_iter().map(Arc::unwrap_or_clone).collect();

        // STEP 3
        let conflicts = resolve_conflicts(collect_candidates(&files, link_order));

        // STEP 4
        let all_matches = files
            .iter()
            .flat_map(|file| file.matches.iter().chain(file.shadow_matches.iter()));
        let ghosts = detect(matcher.identity(), all_matches);

        AnalysisReport {
            files,
            conflicts,
            ghosts,
        }
    }

    fn match_file_cached(&self, matcher: &TargetMatcher, sheet: &StyleSheet) -> Arc<FileMatches> {
        match self.cache {
            Some(cache) => cache.get_or_insert_with(CacheKey::new(sheet, matcher.identity()), || {
                self.match_file(matcher, sheet)
            }),
            None => Arc::new(self.match_file(matcher, sheet)),
        }
    }

    /// Resolve and match every rule of one stylesheet.
    ///
    /// Each resolved selector is matched branch by branch: in
    /// `#sidebar, .btn` only the branches that hit the target contribute to
    /// the match and its specificity, and `::part()` / `::slotted()`
    /// branches are reported apart from the rest of their list.
    #[must_use]
    pub fn match_file(&self, matcher: &TargetMatcher, sheet: &StyleSheet) -> FileMatches {
        let resolver = SelectorResolver::new(self.options.fan_out_warning);
        let mut file = FileMatches::empty(sheet.id.clone());

        for (rule_id, resolved) in resolver.resolve_all(sheet).into_iter().enumerate() {
            let Some(rule) = sheet.get(RuleId(rule_id)) else {
                continue;
            };
            for selector in resolved {
                let mut regular_hits = Vec::new();
                let mut shadow_hits = Vec::new();
                for branch in split_selector_list(&selector.text) {
                    if is_shadow_selector(&branch) {
                        let result = matcher.match_shadow(&branch);
                        if result.matches {
                            shadow_hits.push((branch, result));
                        }
                        continue;
                    }
                    let result = if branch == selector.text {
                        matcher.match_resolved(&selector)
                    } else {
                        matcher.match_selector(&branch)
                    };
                    if result.matches {
                        regular_hits.push((branch, result));
                    }
                }

                if let Some(rule_match) = RuleMatch::from_hits(rule, selector.rule, regular_hits) {
                    file.matches.push(rule_match);
                }
                if let Some(rule_match) = RuleMatch::from_hits(rule, selector.rule, shadow_hits) {
                    file.shadow_matches.push(rule_match);
                }
            }
        }

        file
    }
}

impl RuleMatch {
    /// Combine the matching branches of one resolved selector. Reasons are
    /// deduplicated in branch order; specificity is the highest among the
    /// branches. `None` when no branch matched.
    fn from_hits(rule: &SourceRule, id: RuleId, hits: Vec<(String, MatchResult)>) -> Option<Self> {
        if hits.is_empty() {
            return None;
        }
        let mut branches = Vec::with_capacity(hits.len());
        let mut reasons: Vec<MatchReason> = Vec::new();
        let mut specificity = Specificity::ZERO;
        for (branch, result) in hits {
            specificity = specificity.max(calculate_specificity(&branch));
            for reason in result.reasons {
                if !reasons.contains(&reason) {
                    reasons.push(reason);
                }
            }
            branches.push(branch);
        }

        Some(Self {
            selector: branches.join(", "),
            original_selector: rule.selector.clone(),
            reasons,
            context: rule.context(),
            start_line: rule.start_line,
            end_line: rule.end_line,
            body: rule.body.clone(),
            specificity,
            rule: id,
        })
    }
}

/// Analyze with default options and no cache.
#[must_use]
pub fn analyze(
    identity: &TargetIdentity,
    sheets: &[StyleSheet],
    link_order: &LinkOrder,
) -> AnalysisReport {
    Analyzer::default().analyze(identity, sheets, link_order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_file_records_context_and_lines() {
        let sheet = StyleSheet::parse(
            "a.css",
            "@media (max-width: 600px) {\n  .btn {\n    color: red;\n  }\n}\n",
        );
        let identity = TargetIdentity::new().with_class("btn");
        let file = Analyzer::default().match_file(&TargetMatcher::new(&identity), &sheet);
        assert_eq!(file.matches.len(), 1);
        let rule_match = &file.matches[0];
        assert_eq!(rule_match.context, "@media (max-width: 600px)");
        assert_eq!((rule_match.start_line, rule_match.end_line), (2, 4));
        assert_eq!(rule_match.body, "color: red");
    }

    #[test]
    fn test_shadow_selectors_are_separate() {
        let sheet = StyleSheet::parse("a.css", ".btn::part(label) { color: red } .btn { color: blue }");
        let identity = TargetIdentity::new().with_class("btn");
        let file = Analyzer::default().match_file(&TargetMatcher::new(&identity), &sheet);
        assert_eq!(file.matches.len(), 1);
        assert_eq!(file.shadow_matches.len(), 1);
        assert_eq!(file.shadow_matches[0].selector, ".btn::part(label)");
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let sheets = vec![
            StyleSheet::parse("a.css", ".x { color: red } .x:hover { color: blue }"),
            StyleSheet::parse("b.css", "#main .x { color: green }"),
        ];
        let identity = TargetIdentity::new().with_class("x").with_class("ghost-one");
        let order = LinkOrder::new(["a.css", "b.css"]);
        let parallel = Analyzer::new(AnalyzerOptions::default()).analyze(&identity, &sheets, &order);
        let sequential = Analyzer::new(AnalyzerOptions {
            parallel: false,
            ..AnalyzerOptions::default()
        })
        .analyze(&identity, &sheets, &order);
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.conflict("color").unwrap().winner.value, "green");
    }

    #[test]
    fn test_cache_is_used() {
        let cache = MatchCache::new(4);
        let sheets = vec![StyleSheet::parse("a.css", ".x { color: red }")];
        let identity = TargetIdentity::new().with_class("x");
        let analyzer = Analyzer::default().with_cache(&cache);
        let first = analyzer.analyze(&identity, &sheets, &LinkOrder::default());
        assert_eq!(cache.len(), 1);
        let second = analyzer.analyze(&identity, &sheets, &LinkOrder::default());
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }
}
