//! Declaration extraction from rule bodies.

use serde::Serialize;

/// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
///
/// A CSS declaration (e.g., `color: red`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// The property name, lower-cased unless it is a custom property.
    pub property: String,
    /// The value with `!important` removed.
    pub value: String,
    /// Whether the declaration has `!important`.
    pub important: bool,
}

/// Split a rule body into declarations.
///
/// Declarations are separated by `;` outside parentheses and strings, so
/// `url(data:image/png;base64,...)` stays whole. The first `:` separates the
/// property from the value. A declaration with an empty property or value is
/// dropped.
#[must_use]
pub fn parse_declarations(body: &str) -> Vec<Declaration> {
    split_declarations(body)
        .into_iter()
        .filter_map(parse_declaration)
        .collect()
}

fn split_declarations(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

fn parse_declaration(text: &str) -> Option<Declaration> {
    let (property, value) = text.split_once(':')?;
    let property = property.trim();
    // [CSS Variables § 2](https://www.w3.org/TR/css-variables-1/#defining-variables)
    // Custom property names are case-sensitive.
    let property = if property.starts_with("--") {
        property.to_string()
    } else {
        property.to_ascii_lowercase()
    };
    let (value, important) = trim_important(value.trim());
    if property.is_empty() || value.is_empty() {
        return None;
    }
    Some(Declaration {
        property,
        value: value.to_string(),
        important,
    })
}

/// Remove a trailing `!important` from a declaration value.
///
/// [§ 6.4.2 Important declarations](https://www.w3.org/TR/css-cascade-4/#importance)
///
/// "A declaration is important if it has a !important annotation, i.e.
/// if the last two (non-whitespace, non-comment) tokens in its value are
/// a <delim-token> with the value "!" followed by an <ident-token> with
/// a value that is an ASCII case-insensitive match for "important"."
///
/// STEP 1: Check the value ends with "important" (case-insensitive).
/// STEP 2: Skip any whitespace between "!" and "important".
/// STEP 3: Check for "!".
/// STEP 4: Remove any remaining trailing whitespace.
fn trim_important(value: &str) -> (&str, bool) {
    const IMPORTANT: &str = "important";

    // STEP 1: Check for "important"
    let Some(split) = value.len().checked_sub(IMPORTANT.len()) else {
        return (value, false);
    };
    if !value.is_char_boundary(split) || !value[split..].eq_ignore_ascii_case(IMPORTANT) {
        return (value, false);
    }

    // STEP 2: Skip whitespace between ! and important
    let rest = value[..split].trim_end();

    // STEP 3: Check for !
    let Some(rest) = rest.strip_suffix('!') else {
        return (value, false);
    };

    // STEP 4: Remove trailing whitespace
    (rest.trim_end(), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let declarations = parse_declarations("color: red; Margin : 0 auto");
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[1].property, "margin");
        assert_eq!(declarations[1].value, "0 auto");
    }

    #[test]
    fn test_important_variants() {
        let declarations = parse_declarations("color: red !important; top: 0 ! IMPORTANT; left: important");
        assert!(declarations[0].important);
        assert_eq!(declarations[0].value, "red");
        assert!(declarations[1].important);
        assert_eq!(declarations[1].value, "0");
        assert!(!declarations[2].important);
        assert_eq!(declarations[2].value, "important");
    }

    #[test]
    fn test_semicolon_inside_url_is_kept() {
        let declarations = parse_declarations("background: url(data:image/png;base64,AAAA); color: red");
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].value, "url(data:image/png;base64,AAAA)");
    }

    #[test]
    fn test_custom_property_keeps_case() {
        let declarations = parse_declarations("--Brand-Color: #fff");
        assert_eq!(declarations[0].property, "--Brand-Color");
    }

    #[test]
    fn test_missing_side_is_dropped() {
        assert!(parse_declarations("color:; : red; nonsense; ;").is_empty());
    }
}
