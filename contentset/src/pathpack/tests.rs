//! Round-trip testing of the whole pipeline (build -> encode -> decode ->
//! replay) over generated and fixed path sets.

use crate::pathpack::{decode_paths, encode_paths, Decodable, Encodable, PathGraph};
use crate::testing::{body_paths, dist_paths};
use more_asserts::assert_lt;
use proptest::prelude::*;
use test_case::test_case;

/// Joins segment lists into canonical `/a/b/c` paths.
fn join_paths(segments: Vec<Vec<String>>) -> Vec<String> {
    segments
        .into_iter()
        .map(|segments| format!("/{}", segments.join("/")))
        .collect()
}

fn sorted(mut paths: Vec<String>) -> Vec<String> {
    paths.sort();
    paths
}

fn roundtrip(paths: &[String]) -> Vec<String> {
    let bytes = encode_paths(paths).expect("encoding succeeds");
    decode_paths(&bytes).expect("decoding succeeds")
}

proptest! {
    // A small alphabet makes shared prefixes and suffixes likely.
    #[test]
    fn paths_survive_as_a_multiset(
        segments in prop::collection::vec(prop::collection::vec("[a-d]{1,2}", 1..6), 0..300)
    ) {
        let paths = join_paths(segments);
        prop_assert_eq!(sorted(roundtrip(&paths)), sorted(paths));
    }

    #[test]
    fn graphs_survive_unchanged(
        segments in prop::collection::vec(prop::collection::vec("[a-z0-9._-]{1,8}", 1..8), 1..100)
    ) {
        let graph = PathGraph::build(join_paths(segments));
        let bytes = graph.encode().expect("encoding succeeds");
        prop_assert_eq!(PathGraph::decode(&bytes).expect("decoding succeeds"), graph);
    }

    #[test]
    fn unicode_names_survive(
        segments in prop::collection::vec(prop::collection::vec("[^/\\x00]{1,4}", 1..4), 1..30)
    ) {
        let paths = join_paths(segments);
        prop_assert_eq!(sorted(roundtrip(&paths)), sorted(paths));
    }

    #[test]
    fn input_order_does_not_change_the_payload(
        segments in prop::collection::vec(prop::collection::vec("[a-c]{1,2}", 1..5), 1..50)
    ) {
        let paths = join_paths(segments);
        let mut reversed = paths.clone();
        reversed.reverse();

        let forward = encode_paths(&paths).expect("encoding succeeds");
        let backward = encode_paths(&reversed).expect("encoding succeeds");
        prop_assert_eq!(forward, backward);
    }
}

#[test]
fn empty_input_roundtrips() {
    let bytes = encode_paths(Vec::<String>::new()).expect("encoding succeeds");
    assert!(bytes.is_empty());
    assert!(decode_paths(&bytes).expect("decoding succeeds").is_empty());
}

#[test_case(&["/a"]; "one path")]
#[test_case(&["/a/a"]; "one name used twice")]
#[test_case(&["/a/a/a", "/a/a", "/a"]; "one name at every depth")]
#[test_case(&["/a", "/a"]; "duplicate path")]
#[test_case(&["/a/b", "/a/b/c"]; "path ending where another continues")]
fn small_sets_roundtrip(paths: &[&str]) {
    let paths: Vec<String> = paths.iter().map(|path| path.to_string()).collect();
    assert_eq!(sorted(roundtrip(&paths)), sorted(paths));
}

#[test]
fn body_paths_roundtrip() {
    let paths = body_paths();
    assert_eq!(sorted(roundtrip(&paths)), sorted(paths));
}

#[test]
fn distinct_paths_roundtrip_and_compact() {
    let paths = dist_paths(550);
    let bytes = encode_paths(&paths).expect("encoding succeeds");

    let decoded = decode_paths(&bytes).expect("decoding succeeds");
    assert_eq!(decoded.len(), 550);
    assert_eq!(sorted(decoded), sorted(paths.clone()));

    let verbatim: usize = paths.iter().map(String::len).sum();
    assert_lt!(bytes.len(), verbatim / 2);
}
