use proptest::prelude::*;
use repo_fs::NormalizedPath;

proptest! {
    #[test]
    fn test_normalization_invariants(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();

        prop_assert!(!as_str.contains('\\'));

        // A leading "//" marks a network path; nowhere else may separators repeat.
        let is_network = as_str.starts_with("//") && !as_str.starts_with("///");
        if is_network {
            prop_assert!(!as_str[2..].contains("//"));
        } else {
            prop_assert!(!as_str.contains("//"));
        }

        prop_assert!(!as_str.split('/').any(|seg| seg == "."));

        let roundtripped = NormalizedPath::new(path.to_native());
        prop_assert_eq!(path, roundtripped);
    }

    #[test]
    fn test_join_properties(a in "\\PC*", b in "\\PC*") {
        let p1 = NormalizedPath::new(&a);
        let joined = p1.join(&b);

        prop_assert!(!joined.as_str().contains('\\'));

        if b.is_empty() || b == "." {
            prop_assert_eq!(joined, p1);
        }
    }

    #[test]
    fn test_relative_to_inverts_join(
        base in "/[a-z]{1,8}(/[a-z0-9]{1,8}){0,3}",
        rel in "[a-z0-9]{1,8}(/[a-z0-9.]{1,8}){0,3}",
    ) {
        let base = NormalizedPath::new(&base);
        let rel = NormalizedPath::new(&rel);
        let joined = base.join(rel.as_str());
        prop_assert_eq!(joined.relative_to(&base), Some(rel));
    }
}
