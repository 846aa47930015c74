//! Selector specificity.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use serde::Serialize;

use super::split_selector_list;

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
/// "A selector's specificity is calculated for a given element as follows:
///  - count the number of ID selectors in the selector (= A)
///  - count the number of class selectors, attributes selectors, and pseudo-classes in the selector (= B)
///  - count the number of type selectors and pseudo-elements in the selector (= C)
///
/// Specificities are compared by comparing the three components in order."
///
/// The leading slot is reserved for inline styles and is always zero here,
/// so `#id .cls` is `(0,1,1,0)`. Ordering is lexicographic, leading slot first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Specificity(pub u32, pub u32, pub u32, pub u32);

impl Specificity {
    /// The zero vector, also used for selectors that fail to parse.
    pub const ZERO: Self = Self(0, 0, 0, 0);

    /// Create a specificity with (A, B, C) components and no inline slot.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self(0, a, b, c)
    }

    /// Number of ID selectors (A).
    #[must_use]
    pub const fn ids(self) -> u32 {
        self.1
    }

    /// Number of class, attribute and pseudo-class selectors (B).
    #[must_use]
    pub const fn classes(self) -> u32 {
        self.2
    }

    /// Number of type selectors and pseudo-elements (C).
    #[must_use]
    pub const fn types(self) -> u32 {
        self.3
    }

    const fn plus(self, other: Self) -> Self {
        Self(
            self.0.saturating_add(other.0),
            self.1.saturating_add(other.1),
            self.2.saturating_add(other.2),
            self.3.saturating_add(other.3),
        )
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.0, self.1, self.2, self.3)
    }
}

/// Compute the specificity of a selector, or [`Specificity::ZERO`] if it
/// cannot be parsed.
///
/// A selector list takes the maximum over its branches.
/// [§ 17](https://www.w3.org/TR/selectors-4/#specificity-rules):
/// "The specificity of an :is(), :not(), or :has() pseudo-class is replaced
/// by the specificity of the most specific complex selector in its selector
/// list argument", and "the specificity of a :where() pseudo-class is
/// replaced by zero".
#[must_use]
pub fn calculate_specificity(selector: &str) -> Specificity {
    list_specificity(selector).unwrap_or(Specificity::ZERO)
}

fn list_specificity(text: &str) -> Option<Specificity> {
    let branches = split_selector_list(text);
    if branches.is_empty() {
        return None;
    }
    let mut max = Specificity::ZERO;
    for branch in &branches {
        max = max.max(complex_specificity(branch)?);
    }
    Some(max)
}

/// Sum the simple selectors of one complex selector. `None` on malformed
/// input (dangling `.`/`#`, unbalanced brackets or parentheses, stray
/// characters).
fn complex_specificity(text: &str) -> Option<Specificity> {
    let mut spec = Specificity::ZERO;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            // Combinators contribute nothing. "ignore the universal selector";
            // `&` only survives here when resolution did not run. `|` is a
            // namespace separator (`svg|circle`).
            ' ' | '\t' | '\n' | '>' | '+' | '~' | '*' | '&' | '|' => {}

            '#' => {
                if consume_ident(&mut chars).is_empty() {
                    return None;
                }
                spec.1 += 1;
            }

            // `%placeholder` is an SCSS class-like selector.
            '.' | '%' => {
                if consume_ident(&mut chars).is_empty() {
                    return None;
                }
                spec.2 += 1;
            }

            '[' => {
                consume_bracket(&mut chars)?;
                spec.2 += 1;
            }

            ':' => {
                let pseudo_element = chars.peek() == Some(&':');
                if pseudo_element {
                    let _ = chars.next();
                }
                let name = consume_ident(&mut chars).to_ascii_lowercase();
                if name.is_empty() {
                    return None;
                }
                let argument = if chars.peek() == Some(&'(') {
                    let _ = chars.next();
                    Some(consume_parenthesized(&mut chars)?)
                } else {
                    None
                };
                spec = spec.plus(pseudo_specificity(&name, argument.as_deref(), pseudo_element)?);
            }

            '\\' => {
                // Escaped first character of a type selector.
                let _ = chars.next()?;
                let _ = consume_ident(&mut chars);
                spec.3 += 1;
            }

            c if is_ident_start_char(c) || c == '-' => {
                let _ = consume_ident(&mut chars);
                // `ns|tag`: the namespace prefix is not a type selector.
                if chars.peek() != Some(&'|') {
                    spec.3 += 1;
                }
            }

            _ => return None,
        }
    }

    Some(spec)
}

/// Specificity contributed by one pseudo-class or pseudo-element.
fn pseudo_specificity(name: &str, argument: Option<&str>, pseudo_element: bool) -> Option<Specificity> {
    if pseudo_element {
        // [CSS Scoping § 3.2.2](https://www.w3.org/TR/css-scoping-1/#slotted-pseudo)
        // "The specificity of ::slotted() is that of a pseudo-element, plus
        // the specificity of its argument."
        let mut spec = Specificity::new(0, 0, 1);
        if name == "slotted"
            && let Some(argument) = argument
        {
            spec = spec.plus(list_specificity(argument)?);
        }
        return Some(spec);
    }

    let spec = match name {
        "where" => Specificity::ZERO,
        "is" | "not" | "has" | "matches" | "-webkit-any" | "-moz-any" => match argument {
            Some(argument) => list_specificity(argument)?,
            None => Specificity::new(0, 1, 0),
        },
        // [§ 17](https://www.w3.org/TR/selectors-4/#specificity-rules)
        // "The specificity of an :nth-child() or :nth-last-child() selector is
        // the specificity of the pseudo class itself (counting as one
        // pseudo-class selector) plus the specificity of the most specific
        // complex selector in its selector list argument (if any)."
        "nth-child" | "nth-last-child" => {
            let of_selector = argument.and_then(|argument| {
                let lower = argument.to_ascii_lowercase();
                lower.find(" of ").map(|at| argument[at + 4..].to_string())
            });
            let base = Specificity::new(0, 1, 0);
            match of_selector {
                Some(list) => base.plus(list_specificity(&list)?),
                None => base,
            }
        }
        // [CSS Scoping § 3.2.1](https://www.w3.org/TR/css-scoping-1/#host-selector)
        // ":host() ... specificity is that of a pseudo-class, plus the
        // specificity of its argument."
        "host" | "host-context" => {
            let base = Specificity::new(0, 1, 0);
            match argument {
                Some(argument) => base.plus(list_specificity(argument)?),
                None => base,
            }
        }
        // CSS Modules scoping wrappers are transparent.
        "global" | "local" => match argument {
            Some(argument) => list_specificity(argument)?,
            None => Specificity::ZERO,
        },
        // CSS2 pseudo-elements written with a single colon.
        "before" | "after" | "first-line" | "first-letter" => Specificity::new(0, 0, 1),
        _ => Specificity::new(0, 1, 0),
    };
    Some(spec)
}

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

/// Consume an identifier, keeping escapes (`\:`, `\32 `) as part of it.
fn consume_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if c == '\\' {
            let _ = chars.next();
            if chars.peek().is_some() {
                ident.push('\\');
                consume_escape(chars, &mut ident);
            }
        } else if is_ident_char(c) {
            ident.push(c);
            let _ = chars.next();
        } else {
            break;
        }
    }
    ident
}

/// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
/// A hex escape is up to six hex digits followed by at most one whitespace
/// code point, which belongs to the escape (`\32 xl` is one identifier).
///
/// Called after the backslash; appends the escape's text to `ident`.
fn consume_escape(chars: &mut Peekable<Chars<'_>>, ident: &mut String) {
    let mut hex_digits = 0;
    while hex_digits < 6
        && let Some(&c) = chars.peek()
        && c.is_ascii_hexdigit()
    {
        ident.push(c);
        let _ = chars.next();
        hex_digits += 1;
    }
    if hex_digits == 0 {
        if let Some(escaped) = chars.next() {
            ident.push(escaped);
        }
    } else if chars.peek().is_some_and(char::is_ascii_whitespace) {
        let _ = chars.next();
        ident.push(' ');
    }
}

/// Consume an attribute selector body after `[`, through the closing `]`.
fn consume_bracket(chars: &mut Peekable<Chars<'_>>) -> Option<()> {
    let mut quote: Option<char> = None;
    for c in chars.by_ref() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, ']') => return Some(()),
            _ => {}
        }
    }
    None
}

/// Consume a function argument after `(`, through the matching `)`.
fn consume_parenthesized(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut depth = 1usize;
    let mut argument = String::new();
    for c in chars.by_ref() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(argument);
                }
            }
            _ => {}
        }
        argument.push(c);
    }
    None
}
