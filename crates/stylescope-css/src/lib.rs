//! Static CSS analysis for one target element.
//!
//! Given the identifiers of an HTML element and a set of CSS/SCSS files, this
//! crate answers three questions the way a browser would:
//! - which rules apply to the element (including nested and `&` rules),
//! - which of its classes are not styled anywhere ("ghost classes"),
//! - which declaration wins each property declared more than once.
//!
//! # Scope
//!
//! This crate implements:
//! - **Stylesheet scanning** ([§ 5.4 Parser Algorithms](https://www.w3.org/TR/css-syntax-3/#parser-algorithms))
//!   - Qualified rules, declarations and nested rules
//!   - Grouping at-rules recorded as context (`@media`, `@layer`, `@supports`, ...)
//!   - SCSS comments, `@at-root` and control directives
//!
//! - **Selector resolution** ([CSS Nesting](https://www.w3.org/TR/css-nesting-1/))
//!   - `&` substitution with comma fan-out
//!   - Implicit descendant nesting
//!   - Functional pseudo-class expansion (`:is()`, `:where()`, `:not()`, `:has()`)
//!
//! - **Target matching**
//!   - Boundary-aware class, id, data attribute and tag matching
//!   - `::part()` and `::slotted()` as a separate category
//!
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Specificity ([Selectors Level 4 § 17](https://www.w3.org/TR/selectors-4/#specificity-rules))
//!   - Importance, specificity and order of appearance
//!
//! - **Ghost class detection** with a utility-class allowlist
//!
//! # Not Implemented
//!
//! - Structural matching against a DOM (combinators are not evaluated)
//! - Origins and `@layer` ordering in the cascade
//! - Inline styles

/// Per-file pipeline and aggregate report.
pub mod analysis;
/// Bounded match cache shared between workers.
pub mod cache;
/// Declaration extraction and conflict resolution per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Ghost class detection.
pub mod ghost;
/// Target identity and selector matching.
pub mod matcher;
/// Nesting resolution and specificity per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Source rules and the stylesheet scanner.
pub mod source;

// Re-exports for convenience
pub use analysis::{AnalysisReport, Analyzer, AnalyzerOptions, FileMatches, RuleMatch, analyze};
pub use cache::MatchCache;
pub use cascade::{CascadeDecision, Candidate, LinkOrder, resolve_conflicts};
pub use ghost::{GhostClassReport, detect};
pub use matcher::{MatchReason, MatchResult, ReasonKind, TargetIdentity, TargetMatcher, match_selector};
pub use selector::{ResolvedSelector, SelectorResolver, Specificity, calculate_specificity, resolve};
pub use source::{AtRuleContext, RuleId, SourceError, SourceRule, StyleSheet};
