//! Two-tier tag reconciliation
//!
//! Tags are declared in two tiers: caller-wide defaults and
//! resource-specific overrides. The control plane only ever sees the merged
//! ("effective") set; on read the default tier is subtracted back out so the
//! declared override set round-trips unchanged. Keys reserved by the
//! provider are never written or projected.

use crate::api::types::TagMap;

/// Key prefix reserved for provider-internal bookkeeping tags. Entries
/// under it are stripped before tags are written or projected.
pub const RESERVED_KEY_PREFIX: &str = "aws:";

/// Merge defaults with resource-specific overrides; override wins on key
/// collision.
pub fn merge(defaults: &TagMap, overrides: &TagMap) -> TagMap {
    let mut merged = defaults.clone();
    for (k, v) in overrides {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

/// Drop reserved bookkeeping keys.
pub fn strip_reserved(tags: &TagMap) -> TagMap {
    tags.iter()
        .filter(|(k, _)| !k.starts_with(RESERVED_KEY_PREFIX))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Subtract the default tier from an effective set, leaving the
/// resource-specific overrides.
///
/// Exactly the entries whose value matches the default set are removed, so
/// re-merging the result with the same defaults reproduces the effective
/// set.
pub fn override_view(effective: &TagMap, defaults: &TagMap) -> TagMap {
    effective
        .iter()
        .filter(|(k, v)| defaults.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// The patch needed to turn one effective tag set into another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagDiff {
    /// Keys present before but absent now.
    pub remove: Vec<String>,
    /// Entries that are new or whose value changed.
    pub upsert: TagMap,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.upsert.is_empty()
    }
}

/// Compute the patch to apply when the effective tag set changes.
pub fn diff(old: &TagMap, new: &TagMap) -> TagDiff {
    let remove = old
        .keys()
        .filter(|k| !new.contains_key(*k))
        .cloned()
        .collect();
    let upsert = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    TagDiff { remove, upsert }
}
