//! Property-based tests for path parsing and rendering.
//!
//! These tests use proptest to generate random segments and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{Path, PathSegment};
    use proptest::prelude::*;

    fn segment_strategy() -> impl Strategy<Value = PathSegment> {
        (
            "[a-z][a-z-]{0,12}",
            proptest::option::of(("[a-z-]{1,8}", "[^\\s]{1,16}")),
            proptest::option::of("[a-z:/.0-9]{1,24}"),
        )
            .prop_map(|(element_type, identity, namespace)| {
                let segment = match identity {
                    Some((attribute, value)) => {
                        PathSegment::identified_by(element_type, attribute, value)
                    }
                    None => PathSegment::singleton(element_type),
                };
                match namespace {
                    Some(namespace) => segment.in_namespace(namespace),
                    None => segment,
                }
            })
    }

    // ============================================================================
    // Display / FromStr property tests
    // ============================================================================

    proptest! {
        /// Property: rendering a path and parsing it back yields the same path
        #[test]
        fn display_then_parse_is_identity(segments in proptest::collection::vec(segment_strategy(), 1..6)) {
            let path = Path::new(segments).unwrap();
            let rendered = path.to_string();
            let parsed: Path = rendered.parse().unwrap();
            prop_assert_eq!(parsed, path);
        }

        /// Property: a path keeps its segment count through rendering
        #[test]
        fn rendering_preserves_segment_count(segments in proptest::collection::vec(segment_strategy(), 1..6)) {
            let count = segments.len();
            let path = Path::new(segments).unwrap();
            let parsed: Path = path.to_string().parse().unwrap();
            prop_assert_eq!(parsed.len(), count);
        }

        /// Property: parent() and last() together cover every segment
        #[test]
        fn parent_plus_last_is_whole_path(segments in proptest::collection::vec(segment_strategy(), 1..6)) {
            let path = Path::new(segments.clone()).unwrap();
            let mut rebuilt = path.parent().to_vec();
            rebuilt.push(path.last().clone());
            prop_assert_eq!(rebuilt, segments);
        }

        /// Property: parsing arbitrary text never panics
        #[test]
        fn parse_never_panics(input in ".*") {
            let _ = input.parse::<Path>();
        }
    }
}
