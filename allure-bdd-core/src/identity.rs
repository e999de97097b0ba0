//! Identifiers for test cases, containers and their history.

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::context::FeatureInfo;

/// A fresh random identifier: a v4 uuid as 32 lowercase hex characters.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Identity shared by every run of the same scenario with the same arguments.
pub fn history_id(title: &str, argument_hash: &str) -> String {
    format!("{title}{argument_hash}")
}

/// Container id derived from feature metadata alone. Equal metadata gives the
/// same id within a process; absent metadata maps to the empty-feature id.
pub fn feature_container_id(info: Option<&FeatureInfo>) -> String {
    let empty = FeatureInfo::empty();
    let info = info.unwrap_or(&empty);

    let mut hasher = DefaultHasher::new();
    info.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn checkout() -> FeatureInfo {
        FeatureInfo::new("en-US", "Checkout", "Paying for a cart", ["epic:Checkout"])
    }

    #[test]
    fn new_ids_are_unique_compact_hex() {
        let ids = (0..1000).map(|_| new_id()).collect::<HashSet<_>>();
        assert_eq!(ids.len(), 1000);

        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn new_id_is_safe_across_threads() {
        let handles = (0..8)
            .map(|_| std::thread::spawn(|| (0..100).map(|_| new_id()).collect::<Vec<_>>()))
            .collect::<Vec<_>>();
        let ids = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), 800);
    }

    #[test]
    fn history_id_without_arguments_is_title() {
        assert_eq!(history_id("Pay by card", ""), "Pay by card");
        assert_eq!(history_id("Pay by card", "-42"), "Pay by card-42");
    }

    #[test]
    fn equal_metadata_gives_equal_container_id() {
        assert_eq!(
            feature_container_id(Some(&checkout())),
            feature_container_id(Some(&checkout()))
        );
    }

    #[test]
    fn different_metadata_gives_different_container_id() {
        let mut other = checkout();
        other.description = "Paying for a wishlist".into();
        assert_ne!(
            feature_container_id(Some(&checkout())),
            feature_container_id(Some(&other))
        );

        let mut tagged = checkout();
        tagged.tags.push("smoke".into());
        assert_ne!(
            feature_container_id(Some(&checkout())),
            feature_container_id(Some(&tagged))
        );
    }

    #[test]
    fn absent_feature_uses_empty_sentinel() {
        assert_eq!(
            feature_container_id(None),
            feature_container_id(Some(&FeatureInfo::empty()))
        );
        assert_ne!(feature_container_id(None), feature_container_id(Some(&checkout())));
    }
}
