//! Integration tests for ghost class detection.

use quickcheck_macros::quickcheck;
use stylescope_css::ghost::{detect, is_utility_class, utility_family};
use stylescope_css::matcher::TargetIdentity;
use stylescope_css::source::StyleSheet;
use stylescope_css::{AnalysisReport, LinkOrder, RuleMatch, analyze};

fn run(classes: &[&str], css: &str) -> AnalysisReport {
    let identity = classes
        .iter()
        .fold(TargetIdentity::new(), |identity, class| identity.with_class(*class));
    analyze(&identity, &[StyleSheet::parse("site.css", css)], &LinkOrder::default())
}

#[test]
fn test_utility_table_entries_are_never_ghosts() {
    let report = run(&["flex", "is-active", "Btn_primary_a1b2c"], "");
    assert!(report.ghosts.ghost_classes.is_empty());
    assert_eq!(report.ghosts.total_classes, 3);
}

#[test]
fn test_unreferenced_class_is_always_reported() {
    let report = run(&["card", "card-shadowless"], ".card { padding: 1rem }");
    assert_eq!(report.ghosts.ghost_classes, vec!["card-shadowless"]);
    assert_eq!(report.ghosts.defined_classes, vec!["card"]);
    assert!(report.ghosts.has_ghosts);
}

#[test]
fn test_class_only_inside_functional_pseudo_is_defined() {
    let report = run(&["item", "selected"], ".list > :is(.item, .row):not(.selected) { color: red }");
    assert!(report.ghosts.ghost_classes.is_empty());
    assert_eq!(report.ghosts.defined_classes, vec!["item", "selected"]);
}

#[test]
fn test_nested_definition_counts() {
    let report = run(&["menu", "menu__item"], ".menu { &__item { color: blue } }");
    assert!(report.ghosts.ghost_classes.is_empty());
}

#[test]
fn test_shadow_matches_define_classes() {
    let report = run(&["chip"], ":host ::slotted(.chip) { margin: 0 }");
    assert!(report.ghosts.ghost_classes.is_empty());
    assert_eq!(report.ghosts.defined_classes, vec!["chip"]);
}

#[test]
fn test_class_is_never_both_ghost_and_defined() {
    let report = run(
        &["a", "b", "c", "mt-4", "zzz"],
        ".a .b { x: y } .c:hover { x: y } .zzz-other { x: y }",
    );
    for ghost in &report.ghosts.ghost_classes {
        assert!(!report.ghosts.defined_classes.contains(ghost));
    }
    assert_eq!(report.ghosts.ghost_classes, vec!["zzz"]);
}

#[test]
fn test_utility_families() {
    assert_eq!(utility_family("css-1x2y3z"), Some("css-in-js"));
    assert_eq!(utility_family("bi-alarm"), Some("icon"));
    assert_eq!(utility_family("aos-animate"), Some("animation"));
    assert_eq!(utility_family("Card_title_9fK2a"), Some("css-modules"));
    assert!(!is_utility_class("sidebar"));
}

#[test]
fn test_detect_does_not_touch_identity() {
    let identity = TargetIdentity::new().with_class("orphan");
    let before = identity.clone();
    let _ = detect(&identity, std::iter::empty::<&RuleMatch>());
    assert_eq!(identity, before);
}

#[quickcheck]
fn prop_detect_is_idempotent(classes: Vec<String>, css: String) -> bool {
    let identity = classes
        .into_iter()
        .fold(TargetIdentity::new(), TargetIdentity::with_class);
    let sheets = [StyleSheet::parse("p.css", &css)];
    let first = analyze(&identity, &sheets, &LinkOrder::default());
    let second = analyze(&identity, &sheets, &LinkOrder::default());
    first.ghosts == second.ghosts
}
