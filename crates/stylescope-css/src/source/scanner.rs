//! Stylesheet scanner producing [`SourceRule`]s with nesting and line spans.
//!
//! This is not a full CSS tokenizer. It walks the text at the block level,
//! in the shape of [§ 5.4 Parser Algorithms](https://www.w3.org/TR/css-syntax-3/#parser-algorithms):
//! a block's contents are a list of at-rules, qualified rules and
//! declarations, and qualified rules may nest per
//! [CSS Nesting § 2](https://www.w3.org/TR/css-nesting-1/#nesting).

use stylescope_common::warning::warn_once;

use super::{AtRuleContext, RuleId, SourceRule};

/// At-rules whose block holds rules that stay in the cascade, recorded as
/// context on every rule inside them.
const GROUPING_AT_RULES: &[&str] = &[
    "media",
    "supports",
    "layer",
    "container",
    "scope",
    "document",
    "starting-style",
];

/// SCSS control directives whose block contents are scanned as if inline.
const TRANSPARENT_AT_RULES: &[&str] = &["if", "else", "each", "for", "while"];

/// Block-level stylesheet scanner.
pub struct StyleSheetScanner {
    /// The input with comments blanked out (newlines preserved)
    input: Vec<char>,
    /// Current position in the input
    position: usize,
    /// Current 1-based line
    line: usize,
    /// Collected rules, in pre-order
    rules: Vec<SourceRule>,
}

impl StyleSheetScanner {
    /// Create a scanner over CSS or SCSS text.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: strip_comments(input),
            position: 0,
            line: 1,
            rules: Vec::new(),
        }
    }

    /// Scan the whole input and return the rules in source order.
    #[must_use]
    pub fn run(mut self) -> Vec<SourceRule> {
        let _ = self.consume_block_contents(None, &[], true);
        self.rules
    }

    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    /// [§ 5.4.4 Consume a style block's contents](https://www.w3.org/TR/css-syntax-3/#consume-style-block)
    ///
    /// Consume items up to the closing `}` of the current block (or EOF at top
    /// level). Nested rules are pushed into the arena; declarations are
    /// returned for the enclosing rule's body.
    fn consume_block_contents(
        &mut self,
        parent: Option<RuleId>,
        context: &[AtRuleContext],
        top_level: bool,
    ) -> Vec<String> {
        let mut declarations = Vec::new();

        loop {
            self.consume_whitespace();
            match self.peek() {
                None => {
                    if !top_level {
                        warn_once(
                            "Scanner",
                            &format!("unterminated block closed at end of input (line {})", self.line),
                        );
                    }
                    return declarations;
                }
                Some('}') => {
                    self.advance();
                    if !top_level {
                        return declarations;
                    }
                    // Stray closing brace at top level: skip it.
                }
                Some(';') => self.advance(),
                Some('@') => {
                    let inline = self.consume_at_rule(parent, context);
                    declarations.extend(inline);
                }
                Some(_) => {
                    let start_line = self.line;
                    let (text, terminator) = self.consume_prelude();
                    if terminator == Some('{') {
                        self.consume_qualified_rule(&text, start_line, parent, context);
                    } else if !top_level {
                        let declaration = collapse_whitespace(&text);
                        if !declaration.is_empty() {
                            declarations.push(declaration);
                        }
                    }
                }
            }
        }
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    ///
    /// The rule is pushed before its block is consumed so it precedes every
    /// rule nested inside it.
    fn consume_qualified_rule(
        &mut self,
        prelude: &str,
        start_line: usize,
        parent: Option<RuleId>,
        context: &[AtRuleContext],
    ) {
        let id = RuleId(self.rules.len());
        self.rules.push(SourceRule {
            selector: collapse_whitespace(prelude),
            body: String::new(),
            parent,
            at_rules: context.to_vec(),
            start_line,
            end_line: start_line,
        });

        let declarations = self.consume_block_contents(Some(id), context, false);
        let end_line = self.line;
        if let Some(rule) = self.rules.get_mut(id.0) {
            rule.body = declarations.join("; ");
            rule.end_line = end_line;
        }
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    ///
    /// Returns declarations that belong to the enclosing rule (from SCSS
    /// control directives, which are scanned as if inline).
    fn consume_at_rule(&mut self, parent: Option<RuleId>, context: &[AtRuleContext]) -> Vec<String> {
        let start_line = self.line;
        self.advance(); // @

        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                name.push(c.to_ascii_lowercase());
                self.advance();
            } else {
                break;
            }
        }

        let (prelude, terminator) = self.consume_prelude();
        if terminator != Some('{') {
            // Block-less at-rule (`@import`, `@use`, `@include x;`): nothing to scan.
            return Vec::new();
        }
        let params = collapse_whitespace(&prelude);

        match name.as_str() {
            grouping if GROUPING_AT_RULES.contains(&grouping) => {
                let mut inner = context.to_vec();
                inner.push(AtRuleContext::new(name.clone(), params));
                let declarations = self.consume_block_contents(parent, &inner, false);
                // [CSS Nesting § 3.2](https://www.w3.org/TR/css-nesting-1/#conditionals)
                // Declarations directly inside a nested conditional rule apply to
                // the enclosing rule's element under that condition.
                if parent.is_some() && !declarations.is_empty() {
                    self.rules.push(SourceRule {
                        selector: "&".to_string(),
                        body: declarations.join("; "),
                        parent,
                        at_rules: inner,
                        start_line,
                        end_line: self.line,
                    });
                }
            }
            transparent if TRANSPARENT_AT_RULES.contains(&transparent) => {
                return self.consume_block_contents(parent, context, false);
            }
            "at-root" if params.is_empty() => {
                let _ = self.consume_block_contents(None, context, false);
            }
            "at-root" | "nest" => {
                let rule_parent = if name == "nest" { parent } else { None };
                self.consume_qualified_rule(&params, start_line, rule_parent, context);
            }
            _ => self.skip_block(),
        }
        Vec::new()
    }

    /// Consume text up to a depth-0 `{`, `;` or `}`.
    ///
    /// `{` and `;` are consumed; `}` is left for the enclosing block. Strings,
    /// parentheses, brackets and SCSS `#{...}` interpolation are skipped over
    /// as opaque text.
    fn consume_prelude(&mut self) -> (String, Option<char>) {
        let mut text = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        while let Some(c) = self.peek() {
            if let Some(q) = quote {
                text.push(c);
                self.advance();
                if c == '\\' {
                    if let Some(escaped) = self.peek() {
                        text.push(escaped);
                        self.advance();
                    }
                } else if c == q {
                    quote = None;
                }
                continue;
            }

            match c {
                '"' | '\'' => quote = Some(c),
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                '{' if text.ends_with('#') => depth += 1,
                '}' if depth > 0 => depth -= 1,
                '{' | ';' if depth == 0 => {
                    self.advance();
                    return (text, Some(c));
                }
                '}' => return (text, Some('}')),
                _ => {}
            }
            text.push(c);
            self.advance();
        }

        (text, None)
    }

    /// Skip a block whose opening `{` was already consumed, including any
    /// nested blocks.
    fn skip_block(&mut self) {
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        while let Some(c) = self.peek() {
            self.advance();
            if let Some(q) = quote {
                if c == '\\' {
                    self.advance();
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' => quote = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            if c == '\n' {
                self.line += 1;
            }
            self.position += 1;
        }
    }
}

/// Blank out `/* ... */` comments and SCSS `//` line comments, keeping
/// newlines so line numbers stay correct.
///
/// `//` only starts a comment outside strings and parentheses and after
/// whitespace or a block/statement boundary, which keeps `url(http://...)`
/// and `"http://..."` intact.
fn strip_comments(input: &str) -> Vec<char> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut quote: Option<char> = None;
    let mut parens = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = next {
                    out.push(escaped);
                    i += 1;
                }
            } else if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match (c, next) {
            ('/', Some('*')) => {
                out.push(' ');
                out.push(' ');
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    out.push(if chars[i] == '\n' { '\n' } else { ' ' });
                    i += 1;
                }
                if i < chars.len() {
                    out.push(' ');
                    out.push(' ');
                    i += 2;
                }
                continue;
            }
            ('/', Some('/'))
                if parens == 0
                    && out
                        .last()
                        .is_none_or(|&prev: &char| prev.is_whitespace() || matches!(prev, ';' | '{' | '}')) =>
            {
                while i < chars.len() && chars[i] != '\n' {
                    out.push(' ');
                    i += 1;
                }
                continue;
            }
            ('"' | '\'', _) => quote = Some(c),
            ('(', _) => parens += 1,
            (')', _) => parens = parens.saturating_sub(1),
            _ => {}
        }
        out.push(c);
        i += 1;
    }

    out
}

/// Collapse whitespace runs into single spaces and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_block_comment_keeps_lines() {
        let stripped: String = strip_comments("a /* x\ny */ b").into_iter().collect();
        assert_eq!(stripped.matches('\n').count(), 1);
        assert!(!stripped.contains('x'));
        assert!(stripped.ends_with('b'));
    }

    #[test]
    fn test_strip_line_comment_but_not_urls() {
        let stripped: String =
            strip_comments(".a { background: url(http://x.test/a.png); } // note\n.b {}")
                .into_iter()
                .collect();
        assert!(stripped.contains("http://x.test/a.png"));
        assert!(!stripped.contains("note"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  .a \n  .b  "), ".a .b");
    }
}
