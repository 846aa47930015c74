//! Naming conventions of classes that are expected to have no rule in the
//! project's own stylesheets: utility frameworks, JavaScript hooks, build
//! tool output, icon fonts and animation libraries.
//!
//! The table is closed. A convention missing from it shows up as a ghost.

use std::sync::LazyLock;

use regex::RegexSet;
use stylescope_common::warning::warn_once;

/// One family of conventional class names.
struct UtilityPattern {
    /// Short label, used in diagnostics.
    family: &'static str,
    pattern: &'static str,
}

const UTILITY_PATTERNS: &[UtilityPattern] = &[
    // Responsive, state and dark-mode variants (`md:flex`, `hover:underline`)
    UtilityPattern {
        family: "variant",
        pattern: r"^(?:sm|md|lg|xl|2xl|hover|focus|focus-within|focus-visible|active|visited|disabled|group-hover|peer-focus|dark|motion-safe|motion-reduce|first|last|odd|even|print):.+$",
    },
    // Layout keywords
    UtilityPattern {
        family: "layout",
        pattern: r"^(?:block|inline|inline-block|flex|inline-flex|grid|inline-grid|contents|table|hidden|container|static|fixed|absolute|relative|sticky|visible|invisible|truncate|italic|underline|uppercase|lowercase|capitalize|sr-only|not-sr-only|clearfix|row|col)$",
    },
    // Spacing: `m-4`, `px-2`, `-mt-1`, `p-[3px]`, `space-x-4`, `gap-2`
    UtilityPattern {
        family: "spacing",
        pattern: r"^-?(?:m|p)[trblxyse]?-(?:\d+(?:\.\d+)?|px|auto|\[.+\])$",
    },
    UtilityPattern {
        family: "spacing",
        pattern: r"^-?(?:space-[xy]|gap(?:-[xy])?)-(?:\d+(?:\.\d+)?|px|\[.+\])$",
    },
    // Sizing: `w-full`, `h-1/2`, `max-w-lg`, `min-h-screen`, `size-8`
    UtilityPattern {
        family: "sizing",
        pattern: r"^(?:w|h|min-w|min-h|max-w|max-h|size)-.+$",
    },
    // Color and decoration: `text-blue-500`, `bg-white`, `border-2`
    UtilityPattern {
        family: "color",
        pattern: r"^(?:text|bg|border|ring|outline|fill|stroke|from|via|to|divide|placeholder|accent|caret|decoration)-.+$",
    },
    // Flexbox and grid: `justify-between`, `items-center`, `col-span-2`
    UtilityPattern {
        family: "flex-grid",
        pattern: r"^(?:flex|grid|justify|items|content|self|place|order|basis|grow|shrink|col|row|auto-cols|auto-rows)-.+$",
    },
    // Position: `top-0`, `inset-x-0`, `z-10`, `-left-2`
    UtilityPattern {
        family: "position",
        pattern: r"^-?(?:top|right|bottom|left|inset(?:-[xy])?|z|start|end)-.+$",
    },
    // Typography: `font-bold`, `leading-tight`, `tracking-wide`
    UtilityPattern {
        family: "typography",
        pattern: r"^(?:font|leading|tracking|whitespace|break|align|list|indent|line-clamp)-.+$",
    },
    // Effects, transitions and layout misc.
    UtilityPattern {
        family: "effects",
        pattern: r"^(?:shadow|opacity|rounded|blur|transition|duration|ease|delay|animate|transform|scale|rotate|translate-[xy]|skew-[xy]|cursor|select|pointer-events|overflow(?:-[xy])?|object|aspect|display|float|clear|box|isolation|mix-blend|backdrop)-.+$",
    },
    UtilityPattern {
        family: "effects",
        pattern: r"^(?:shadow|rounded|border|transition|transform|grow|shrink|filter|blur)$",
    },
    // State and JavaScript-hook prefixes: `is-active`, `js-toggle`, `qa-login`
    UtilityPattern {
        family: "state",
        pattern: r"^(?:is|has|js|u|t|qa|test)-.+$",
    },
    // CSS Modules hashed names: `Button_primary_a1b2c`
    UtilityPattern {
        family: "css-modules",
        pattern: r"^[A-Za-z][A-Za-z0-9-]*_[A-Za-z0-9-]+_[A-Za-z0-9]{5}$",
    },
    UtilityPattern {
        family: "css-modules",
        pattern: r"^_[A-Za-z0-9]{5,}$",
    },
    // CSS-in-JS generated names: `css-1x2y3z`, `sc-bdVaJa`, `svelte-xyz123`
    UtilityPattern {
        family: "css-in-js",
        pattern: r"^(?:css|sc|jsx|emotion|tw|svelte|astro|styled|jss)-[A-Za-z0-9_-]+$",
    },
    // Icon fonts: `fa-home`, `fas`, `bi-alarm`, `material-icons`
    UtilityPattern {
        family: "icon",
        pattern: r"^(?:fa|fas|far|fab|fal|fad|bi|icon|glyphicon|material-icons|material-symbols-outlined|mdi|ion|ti|ri|bx|lucide)(?:-.*)?$",
    },
    // Animation libraries: `animate__fadeIn`, `aos-animate`, `wow`
    UtilityPattern {
        family: "animation",
        pattern: r"^(?:animate__.+|aos-.+|wow|animated)$",
    },
];

static UTILITY_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(UTILITY_PATTERNS.iter().map(|entry| entry.pattern)).unwrap_or_else(|err| {
        warn_once(
            "Ghost",
            &format!("utility class table failed to compile, no class is exempt: {err}"),
        );
        RegexSet::empty()
    })
});

/// `true` if `class` follows a known utility, state or generated-name
/// convention.
#[must_use]
pub fn is_utility_class(class: &str) -> bool {
    UTILITY_SET.is_match(class)
}

/// The convention family `class` belongs to, if any (`"spacing"`, `"state"`,
/// `"css-modules"`, ...).
#[must_use]
pub fn utility_family(class: &str) -> Option<&'static str> {
    UTILITY_SET
        .matches(class)
        .iter()
        .next()
        .and_then(|index| UTILITY_PATTERNS.get(index))
        .map(|entry| entry.family)
}
