use crate::model::{IdentityKey, MissingEntry, ReconciliationResult, ReferenceKeySet, RegistryMapping};

/// Placeholder label for a missing key the mapping cannot resolve.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// `keys(registry) - reference` by exact canonical key.
///
/// Both inputs hold only canonical keys, so no fuzzy or partial matching is
/// possible here. Missing entries come out sorted by key.
pub fn reconcile(registry: &RegistryMapping, reference: &ReferenceKeySet) -> ReconciliationResult {
    let missing_keys: Vec<&IdentityKey> = registry
        .keys()
        .filter(|key| !reference.contains(key))
        .collect();

    let mut missing: Vec<MissingEntry> = missing_keys
        .into_iter()
        .map(|key| MissingEntry {
            key: key.clone(),
            label: registry.label(key).unwrap_or(UNKNOWN_LABEL).to_string(),
        })
        .collect();
    // Output order: ascending canonical key.
    missing.sort_by(|a, b| a.key.cmp(&b.key));

    ReconciliationResult {
        registry_count: registry.len(),
        reference_count: reference.len(),
        missing_count: missing.len(),
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(entries: &[(&str, &str)]) -> RegistryMapping {
        entries.iter().copied().collect()
    }

    fn reference(keys: &[&str]) -> ReferenceKeySet {
        keys.iter().collect()
    }

    #[test]
    fn one_of_two_missing() {
        let r = reconcile(
            &registry(&[("a@x.com", "Alice A"), ("b@x.com", "Bob B")]),
            &reference(&["a@x.com"]),
        );
        assert_eq!(r.registry_count, 2);
        assert_eq!(r.reference_count, 1);
        assert_eq!(r.missing_count, 1);
        assert_eq!(r.missing[0].key.as_str(), "b@x.com");
        assert_eq!(r.missing[0].label, "Bob B");
    }

    #[test]
    fn empty_registry_has_nothing_missing() {
        let r = reconcile(&RegistryMapping::new(), &reference(&["a@x.com", "b@x.com", "c@x.com"]));
        assert_eq!((r.registry_count, r.reference_count, r.missing_count), (0, 3, 0));
        assert!(r.missing.is_empty());
    }

    #[test]
    fn case_differences_do_not_count_as_missing() {
        let r = reconcile(&registry(&[("C@X.com", "Cat C")]), &reference(&["c@x.com"]));
        assert_eq!(r.missing_count, 0);
    }

    #[test]
    fn near_misses_are_still_missing() {
        // Typos in the local part or domain never match.
        let r = reconcile(
            &registry(&[("jsmith@gmail.com", "J Smith"), ("jdoe@gmail.com", "J Doe")]),
            &reference(&["jsmith@gmial.com", "j.doe@gmail.com"]),
        );
        assert_eq!(r.missing_count, 2);
    }

    #[test]
    fn missing_is_sorted_by_key() {
        let r = reconcile(
            &registry(&[("zed@x.com", "Z"), ("amy@x.com", "A"), ("Mo@x.com", "M")]),
            &ReferenceKeySet::new(),
        );
        let keys: Vec<&str> = r.missing.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, ["amy@x.com", "mo@x.com", "zed@x.com"]);
    }

    #[test]
    fn reference_only_keys_are_ignored() {
        let r = reconcile(&registry(&[("a@x.com", "A")]), &reference(&["a@x.com", "extra@x.com"]));
        assert_eq!(r.missing_count, 0);
        assert_eq!(r.reference_count, 2);
    }
}
