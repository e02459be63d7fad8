// 🔢 Code Composer - composite account codes
//
// A node's code is derived, never stored: the manual codes of its
// ancestors and itself, root to leaf, joined with "-".
//
// Example: Class "1000" → Group "1100" → Sub-Group "" → Control "1110"
//          composes to "1000-1100-1110"

use crate::entities::AccountNode;

/// Separator between code segments
pub const CODE_SEPARATOR: &str = "-";

/// Shown in place of a composed code when every segment is empty
pub const EMPTY_CODE_PLACEHOLDER: &str = "—";

/// Join the non-empty segments, root first.
///
/// Absent entries (an unresolved link in the chain) and empty codes are
/// skipped. An all-empty chain composes to "".
pub fn compose_code<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    segments
        .into_iter()
        .flatten()
        .filter(|code| !code.is_empty())
        .collect::<Vec<_>>()
        .join(CODE_SEPARATOR)
}

/// Compose from a resolved ancestor path (root → ... → node)
pub fn compose_path(path: &[&AccountNode]) -> String {
    compose_code(path.iter().map(|node| Some(node.manual_code.as_str())))
}

/// Code as rendered in lists and pickers
pub fn display_code(code: &str) -> &str {
    if code.is_empty() {
        EMPTY_CODE_PLACEHOLDER
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{NodeKind, Status};
    use proptest::prelude::*;

    #[test]
    fn test_compose_joins_in_order() {
        assert_eq!(compose_code([Some("1000"), Some("1100")]), "1000-1100");
        assert_eq!(compose_code([Some("1"), Some("2"), Some("3"), Some("4"), Some("5")]), "1-2-3-4-5");
    }

    #[test]
    fn test_compose_skips_empty_and_absent() {
        assert_eq!(compose_code([Some("1000"), None, Some(""), Some("1110")]), "1000-1110");
        assert_eq!(compose_code([Some(""), None]), "");
        assert_eq!(compose_code(Vec::<Option<&str>>::new()), "");
    }

    #[test]
    fn test_compose_path_uses_manual_codes() {
        let class = AccountNode::with_id("c1".into(), NodeKind::Class, None, "Assets".into(), "1000".into(), Status::Active);
        let group = AccountNode::with_id(
            "g1".into(),
            NodeKind::Group,
            Some("c1".into()),
            "Current Assets".into(),
            "1100".into(),
            Status::Active,
        );

        assert_eq!(compose_path(&[&class, &group]), "1000-1100");
    }

    #[test]
    fn test_display_code_placeholder() {
        assert_eq!(display_code(""), "—");
        assert_eq!(display_code("1000"), "1000");
    }

    proptest! {
        #[test]
        fn compose_matches_filtered_join(codes in proptest::collection::vec(proptest::option::of("[0-9A-Z]{0,4}"), 0..6)) {
            let expected: Vec<&str> = codes
                .iter()
                .filter_map(|c| c.as_deref())
                .filter(|c| !c.is_empty())
                .collect();
            let composed = compose_code(codes.iter().map(|c| c.as_deref()));

            prop_assert_eq!(composed, expected.join("-"));
        }
    }
}
