//! The analyzed element's identifiers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use stylescope_common::fingerprint::fingerprint;

/// Identifiers of the analyzed element (and, depending on the caller, its
/// descendants).
///
/// All fields are sets, so insertion order never affects results. Missing
/// fields deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetIdentity {
    /// Class names, without the leading `.`.
    pub classes: BTreeSet<String>,
    /// Ids, without the leading `#`.
    pub ids: BTreeSet<String>,
    /// Lower-case tag name.
    pub tag: Option<String>,
    /// Data attribute names, with the leading `data-`.
    pub data_attributes: BTreeSet<String>,
    /// Shadow part names exposed through `part="..."`.
    pub shadow_parts: BTreeSet<String>,
}

impl TargetIdentity {
    /// An empty identity (matches nothing).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag name.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Add one class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let _ = self.classes.insert(class.into());
        self
    }

    /// Add every class of a whitespace-separated `class` attribute value.
    ///
    /// [§ 3.2.6 The class attribute](https://html.spec.whatwg.org/multipage/dom.html#classes)
    /// "the value must be a set of space-separated tokens"
    #[must_use]
    pub fn with_class_attribute(mut self, value: &str) -> Self {
        self.classes.extend(value.split_whitespace().map(ToString::to_string));
        self
    }

    /// Add one id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let _ = self.ids.insert(id.into());
        self
    }

    /// Add a data attribute; the `data-` prefix is added if missing.
    #[must_use]
    pub fn with_data_attribute(mut self, name: &str) -> Self {
        let _ = self.data_attributes.insert(data_attribute_name(name));
        self
    }

    /// Add a shadow part name.
    #[must_use]
    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        let _ = self.shadow_parts.insert(part.into());
        self
    }

    /// `true` when there is nothing to match on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.ids.is_empty()
            && self.tag.is_none()
            && self.data_attributes.is_empty()
            && self.shadow_parts.is_empty()
    }

    /// Stable fingerprint, used as half of a match cache key.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        fingerprint(self)
    }

    /// Copy with blank entries dropped, the tag lower-cased and data
    /// attributes lower-cased and `data-` prefixed.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            classes: non_blank(&self.classes, ToString::to_string),
            ids: non_blank(&self.ids, ToString::to_string),
            tag: self
                .tag
                .as_deref()
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_ascii_lowercase),
            data_attributes: non_blank(&self.data_attributes, data_attribute_name),
            shadow_parts: non_blank(&self.shadow_parts, ToString::to_string),
        }
    }
}

fn non_blank(values: &BTreeSet<String>, map: impl Fn(&str) -> String) -> BTreeSet<String> {
    values
        .iter()
        .map(String::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(map)
        .collect()
}

fn data_attribute_name(name: &str) -> String {
    let name = name.trim().to_ascii_lowercase();
    if name.starts_with("data-") {
        name
    } else {
        format!("data-{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_attribute_is_split() {
        let identity = TargetIdentity::new().with_class_attribute("  btn  btn-primary\tbtn ");
        assert_eq!(identity.classes.len(), 2);
        assert!(identity.classes.contains("btn-primary"));
    }

    #[test]
    fn test_normalized() {
        let identity = TargetIdentity::new()
            .with_tag(" BUTTON ")
            .with_class(" ")
            .with_data_attribute("State")
            .normalized();
        assert_eq!(identity.tag.as_deref(), Some("button"));
        assert!(identity.classes.is_empty());
        assert!(identity.data_attributes.contains("data-state"));
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let identity: TargetIdentity =
            serde_json::from_str(r#"{"classes": ["a", "b"], "dataAttributes": ["data-x"]}"#)
                .unwrap();
        assert_eq!(identity.classes.len(), 2);
        assert!(identity.ids.is_empty());
        assert!(identity.tag.is_none());
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let a = TargetIdentity::new().with_class("x").with_class("y");
        let b = TargetIdentity::new().with_class("y").with_class("x");
        assert_eq!(a.fingerprint(), b.fingerprint());
    }
}
