//! End-to-end encoding and decoding through the public API

use contentset::pathpack::{Decodable, DecodeError, Encodable, PathGraph};
use contentset::testing::{body_paths, dist_paths, product_paths};
use contentset::{decode_content_set, encode_content_set, Error};

use assert_matches::assert_matches;
use more_asserts::assert_lt;
use test_case::test_case;

fn sorted(mut paths: Vec<String>) -> Vec<String> {
    paths.sort();
    paths
}

#[test_case(body_paths(); "anatomy paths")]
#[test_case(dist_paths(550); "distinct paths")]
#[test_case(product_paths(); "product paths")]
#[test_case(Vec::new(); "no paths")]
fn content_sets_roundtrip(paths: Vec<String>) {
    let payload = encode_content_set(&paths).unwrap();
    let decoded = decode_content_set(&payload, "").unwrap();

    assert_eq!(sorted(decoded), sorted(paths));
}

#[test]
fn prefix_is_joined_with_a_single_slash() {
    let payload = encode_content_set(&dist_paths(550)).unwrap();

    for prefix in ["/this_is_a_prefix", "/this_is_a_prefix/"] {
        let decoded = decode_content_set(&payload, prefix).unwrap();
        let expected: Vec<String> = dist_paths(550)
            .iter()
            .map(|path| format!("/this_is_a_prefix{path}"))
            .collect();

        assert_eq!(sorted(decoded), sorted(expected));
    }
}

#[test]
fn shared_layout_compacts_well() {
    let paths = product_paths();
    let payload = encode_content_set(&paths).unwrap();

    let verbatim: usize = paths.iter().map(String::len).sum();
    assert_lt!(payload.len() * 10, verbatim);
}

#[test]
fn decoded_graph_matches_built_graph() {
    let graph = PathGraph::build(product_paths());
    let payload = graph.encode().unwrap();

    assert_eq!(PathGraph::decode(&payload).unwrap(), graph);
}

#[test]
fn corrupted_payload_never_panics() {
    let payload = encode_content_set(&body_paths()).unwrap();

    for index in 0..payload.len() {
        for flip in [0x01u8, 0x80, 0xFF] {
            let mut corrupted = payload.clone();
            corrupted[index] ^= flip;
            // Corruption either decodes to some path set or fails cleanly.
            let _ = decode_content_set(&corrupted, "");
        }
    }
}

#[test]
fn truncated_payload_is_a_format_error() {
    let payload = encode_content_set(&product_paths()).unwrap();
    let truncated = &payload[..payload.len() - 1];

    assert_matches!(
        decode_content_set(truncated, ""),
        Err(Error::Format(DecodeError::UnexpectedEndOfData))
    );
}
