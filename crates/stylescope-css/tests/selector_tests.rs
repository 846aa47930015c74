//! Integration tests for selector resolution and specificity.

use quickcheck_macros::quickcheck;
use stylescope_css::selector::{
    SelectorResolver, Specificity, calculate_specificity, expand_functional_pseudo, nest_selector,
    resolve,
};
use stylescope_css::source::{RuleId, SourceRule, StyleSheet};

/// Resolved texts of every rule, in rule order.
fn resolve_texts(css: &str) -> Vec<Vec<String>> {
    let sheet = StyleSheet::parse("test.scss", css);
    SelectorResolver::default()
        .resolve_all(&sheet)
        .into_iter()
        .map(|variants| variants.into_iter().map(|selector| selector.text).collect())
        .collect()
}

#[test]
fn test_ampersand_fan_out_preserves_parent_order() {
    let texts = resolve_texts(".a, .b { &--x { color: red } }");
    assert_eq!(texts[1], vec![".a--x", ".b--x"]);
}

#[test]
fn test_plain_nesting_uses_descendant_combinator() {
    let texts = resolve_texts(".nav { a { color: red } > li { margin: 0 } }");
    assert_eq!(texts[1], vec![".nav a"]);
    assert_eq!(texts[2], vec![".nav > li"]);
}

#[test]
fn test_deep_nesting_with_fan_out_at_two_levels() {
    let texts = resolve_texts(".a, .b { .c, .d { &:hover { x: y } } }");
    assert_eq!(
        texts[2],
        vec![".a .c:hover", ".a .d:hover", ".b .c:hover", ".b .d:hover"]
    );
}

#[test]
fn test_ampersand_inside_pseudo_argument() {
    let texts = resolve_texts(".card { :not(&) { color: red } }");
    assert_eq!(texts[1], vec![":not(.card)"]);
}

#[test]
fn test_resolved_selectors_never_contain_ampersand() {
    let css = "& .x { } .a { &.b { & + & { } } @media print { color: red } }";
    for variants in resolve_texts(css) {
        for text in variants {
            assert!(!text.contains('&'), "unresolved nesting selector in '{text}'");
        }
    }
}

#[test]
fn test_resolve_single_rule_by_id() {
    let sheet = StyleSheet::new(
        "a.css",
        vec![
            SourceRule::new(".menu", "color: red"),
            SourceRule::new("&__item", "color: blue").with_parent(RuleId(0)),
        ],
    );
    let resolved = resolve(&sheet, RuleId(1));
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].text, ".menu__item");
    assert_eq!(resolved[0].rule, RuleId(1));
}

#[test]
fn test_expanded_form_appends_arguments() {
    let sheet = StyleSheet::parse("a.css", ".x:is(.primary, .secondary) {}");
    let resolved = resolve(&sheet, RuleId(0));
    assert_eq!(resolved[0].expanded, ".x:is(.primary, .secondary) .primary, .secondary");
    assert_eq!(
        expand_functional_pseudo(":where(.a) :has(> .b)"),
        ":where(.a) :has(> .b) .a > .b"
    );
}

#[test]
fn test_nest_with_empty_parent_stands_alone() {
    assert_eq!(nest_selector(&[], ".x"), vec![".x"]);
}

#[test]
fn test_specificity_examples() {
    assert_eq!(calculate_specificity(":where(.a, .b)"), Specificity(0, 0, 0, 0));
    assert!(calculate_specificity(":is(.a, .b)").classes() >= 1);
    assert_eq!(calculate_specificity("#id .cls"), Specificity(0, 1, 1, 0));
    assert_eq!(calculate_specificity("ul > li.item:first-child"), Specificity::new(0, 2, 2));
    assert_eq!(calculate_specificity(":host(.dark) .label"), Specificity::new(0, 3, 0));
}

#[test]
fn test_specificity_of_resolved_nesting() {
    let texts = resolve_texts("#app { .btn { &:hover { } } }");
    assert_eq!(calculate_specificity(&texts[2][0]), Specificity::new(1, 2, 0));
}

#[quickcheck]
fn prop_top_level_rule_resolves_to_itself(selector: String) -> bool {
    if selector.contains('&') {
        return true;
    }
    let sheet = StyleSheet::new("p.css", vec![SourceRule::new(selector.clone(), "")]);
    let resolved = resolve(&sheet, RuleId(0));
    resolved.len() == 1 && resolved[0].text == selector
}

#[quickcheck]
fn prop_specificity_is_total(selector: String) -> bool {
    let specificity = calculate_specificity(&selector);
    specificity.0 == 0 && specificity >= Specificity::ZERO
}

#[test]
fn test_fan_out_warning_threshold_does_not_change_resolution() {
    let sheet = StyleSheet::parse("fan.scss", ".a, .b { .c, .d { &--x { } } }");
    let warned = SelectorResolver::new(1).resolve_all(&sheet);
    assert_eq!(warned, SelectorResolver::default().resolve_all(&sheet));
    assert_eq!(warned[2].len(), 4);
}
