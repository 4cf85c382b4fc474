//! Property tests for identifier derivation.

use proptest::prelude::*;
use qgraph_normalize::{question_id, slugify, subject_id};

proptest! {
    #[test]
    fn slugs_are_identifier_safe(value in ".*", prefix in "[A-Z]{0,3}-?") {
        let slug = slugify(&value, &prefix, true);
        let body = &slug[prefix.len()..];
        prop_assert!(slug.starts_with(&prefix));
        prop_assert!(!body.is_empty());
        prop_assert!(!body.starts_with('-'));
        prop_assert!(!body.ends_with('-'));
        prop_assert!(!body.contains("--"));
        prop_assert!(body.chars().all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '-'));
    }

    #[test]
    fn slugify_is_idempotent(value in ".*") {
        let once = slugify(&value, "", true);
        prop_assert_eq!(slugify(&once, "", true), once);
    }

    #[test]
    fn ids_are_pure(name in "[ -~]{0,40}", year in proptest::option::of(1990i32..2030), no in "[Qq]?\\.?[0-9]{1,3}") {
        prop_assert_eq!(subject_id(&name), subject_id(&name));
        prop_assert_eq!(question_id(year, "CS", &no), question_id(year, "CS", &no));
    }

    #[test]
    fn spacing_and_case_variants_share_ids(words in proptest::collection::vec("[a-z]{1,8}", 1..4)) {
        let spaced = words.join("   ");
        let upper = words.join(" ").to_uppercase();
        prop_assert_eq!(subject_id(&spaced), subject_id(&upper));
    }
}
