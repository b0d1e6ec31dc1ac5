//! Diff computation between recorded state (olds) and desired state (news).

use serde::Serialize;

use crate::property::{PropertyMap, PropertyValue};

/// The overall classification of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiffKind {
    /// No visible change.
    None,
    /// Changes exist and every one can be applied in place.
    Some,
    /// At least one changed property forces delete-then-create.
    Replace,
}

/// The result of diffing a resource's olds against its news.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDiff {
    /// Overall classification.
    pub kind: DiffKind,
    /// Names of every property that changed, sorted.
    pub changed: Vec<String>,
    /// The subset of `changed` that triggers replacement, sorted.
    pub replaces: Vec<String>,
}

impl ResourceDiff {
    /// True when the diff forces replacement.
    pub fn requires_replace(&self) -> bool {
        self.kind == DiffKind::Replace
    }
}

/// Compute the set of changed property names between `olds` and `news` and
/// classify the result against the handler's replace-trigger set.
///
/// A property counts as changed when it was added, removed, or its value
/// differs. An unknown marker on either side always counts as changed: an
/// unknown can never be proven equal to anything.
pub fn diff_properties(
    olds: &PropertyMap,
    news: &PropertyMap,
    replace_triggers: &[&str],
) -> ResourceDiff {
    let mut changed = Vec::new();

    for (name, old_value) in olds {
        match news.get(name) {
            Some(new_value) if values_equal(old_value, new_value) => {},
            _ => changed.push(name.clone()),
        }
    }
    for name in news.keys() {
        if !olds.contains_key(name) {
            changed.push(name.clone());
        }
    }
    changed.sort();
    changed.dedup();

    let replaces: Vec<String> = changed
        .iter()
        .filter(|name| replace_triggers.contains(&name.as_str()))
        .cloned()
        .collect();

    let kind = if !replaces.is_empty() {
        DiffKind::Replace
    } else if !changed.is_empty() {
        DiffKind::Some
    } else {
        DiffKind::None
    };

    ResourceDiff {
        kind,
        changed,
        replaces,
    }
}

fn values_equal(a: &PropertyValue, b: &PropertyValue) -> bool {
    match (a, b) {
        (PropertyValue::Unknown, _) | (_, PropertyValue::Unknown) => false,
        (PropertyValue::Sequence(xs), PropertyValue::Sequence(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        },
        (PropertyValue::Mapping(xs), PropertyValue::Mapping(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        },
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{decode_properties, MarshalOptions, UNKNOWN_VALUE};
    use serde_json::json;

    fn bag(value: serde_json::Value) -> PropertyMap {
        decode_properties(&value, MarshalOptions::STATE).unwrap()
    }

    #[test]
    fn test_no_change() {
        let olds = bag(json!({"name": "prod", "region": "us-east"}));
        let news = olds.clone();
        let diff = diff_properties(&olds, &news, &["name", "region"]);
        assert_eq!(diff.kind, DiffKind::None);
        assert!(diff.changed.is_empty());
        assert!(diff.replaces.is_empty());
    }

    #[test]
    fn test_in_place_change() {
        let olds = bag(json!({"name": "prod", "region": "us-east", "ttl_days": 7}));
        let news = bag(json!({"name": "prod", "region": "us-east", "ttl_days": 30}));
        let diff = diff_properties(&olds, &news, &["name", "region"]);
        assert_eq!(diff.kind, DiffKind::Some);
        assert_eq!(diff.changed, vec!["ttl_days"]);
        assert!(diff.replaces.is_empty());
    }

    #[test]
    fn test_replace_trigger() {
        let olds = bag(json!({"name": "prod", "region": "us-east"}));
        let news = bag(json!({"name": "staging", "region": "us-east"}));
        let diff = diff_properties(&olds, &news, &["name", "region"]);
        assert_eq!(diff.kind, DiffKind::Replace);
        assert_eq!(diff.changed, vec!["name"]);
        assert_eq!(diff.replaces, vec!["name"]);
        assert!(diff.requires_replace());
    }

    #[test]
    fn test_added_and_removed_properties() {
        let olds = bag(json!({"name": "prod", "ttl_days": 7}));
        let news = bag(json!({"name": "prod", "tags": {"team": "data"}}));
        let diff = diff_properties(&olds, &news, &["name"]);
        assert_eq!(diff.kind, DiffKind::Some);
        assert_eq!(diff.changed, vec!["tags", "ttl_days"]);
    }

    #[test]
    fn test_unknown_always_counts_as_changed() {
        let olds = bag(json!({"name": "prod", "region": "us-east"}));
        let news = bag(json!({"name": UNKNOWN_VALUE, "region": "us-east"}));
        let diff = diff_properties(&olds, &news, &["name", "region"]);
        assert_eq!(diff.kind, DiffKind::Replace);
        assert_eq!(diff.replaces, vec!["name"]);
    }

    #[test]
    fn test_nested_mapping_compared_by_value() {
        let olds = bag(json!({"name": "r", "data": {"a": 1, "b": [1, 2]}}));
        let news = bag(json!({"name": "r", "data": {"a": 1, "b": [1, 2]}}));
        assert_eq!(diff_properties(&olds, &news, &["name"]).kind, DiffKind::None);

        let news = bag(json!({"name": "r", "data": {"a": 1, "b": [1, 3]}}));
        let diff = diff_properties(&olds, &news, &["name"]);
        assert_eq!(diff.kind, DiffKind::Some);
        assert_eq!(diff.changed, vec!["data"]);
    }
}
