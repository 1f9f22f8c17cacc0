use proptest::prelude::*;
use repo_storage::{EntryRewriter, Rewrite};

proptest! {
    #[test]
    fn rewritten_paths_stay_below_base(
        name in "[a-z./\\\\]{0,24}",
        strip in any::<bool>(),
        nested in proptest::option::of("[a-z]{1,4}(/[a-z]{1,4})?"),
    ) {
        let rewriter = EntryRewriter::new(strip, nested.as_deref());
        if let Ok(Rewrite::Write(path)) = rewriter.rewrite(&name, false) {
            prop_assert!(!path.is_empty());
            prop_assert!(!path.is_absolute());
            prop_assert!(!path.has_parent_segments());
        }
    }

    #[test]
    fn nested_rewrites_come_from_inside_the_prefix(
        root in "[a-z]{1,6}",
        inner in "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
    ) {
        let rewriter = EntryRewriter::new(true, Some("app"));
        let inside = format!("{root}/app/{inner}");
        let outside = format!("{root}/lib/{inner}");

        prop_assert_eq!(
            rewriter.rewrite(&inside, false).unwrap(),
            Rewrite::Write(inner.as_str().into())
        );
        prop_assert!(matches!(rewriter.rewrite(&outside, false).unwrap(), Rewrite::Skip(_)));
    }
}
