//! Packaging content sets for legacy and current clients

use contentset::governor::{
    ContentExtensions, ExtensionFormat, ExtensionSizeGovernor, GovernorConfig,
    DEFAULT_PER_ITEM_LIMIT,
};
use contentset::prefix::ContentPrefix;
use contentset::testing::dist_paths;
use contentset::{decode_content_set, Error};

use assert_matches::assert_matches;

#[test_log::test]
fn legacy_clients_are_limited_to_185_content_sets() {
    let governor = ExtensionSizeGovernor::new(GovernorConfig::default());
    let prefix = ContentPrefix::default();

    let at_limit = dist_paths(DEFAULT_PER_ITEM_LIMIT);
    let result = governor.package(&prefix, &at_limit, ExtensionFormat::PerItem);
    assert_matches!(result, Ok(ContentExtensions::PerItem(paths)) if paths == at_limit);

    let over_limit = dist_paths(DEFAULT_PER_ITEM_LIMIT + 1);
    let result = governor.package(&prefix, &over_limit, ExtensionFormat::PerItem);
    assert_matches!(result, Err(Error::TooManyContentSets { count: 186, limit: 185 }));
}

#[test_log::test]
fn current_clients_get_the_full_set_behind_the_environment_prefix() {
    let governor = ExtensionSizeGovernor::new(GovernorConfig::default());
    let prefix = ContentPrefix::resolve("/some org/$env/", Some("Awesome Environment #1"));
    let paths = dist_paths(550);

    let extensions = governor
        .package(&prefix, &paths, ExtensionFormat::Compacted)
        .unwrap();
    let ContentExtensions::Compacted { payload, path_count } = extensions else {
        panic!("expected a compacted payload");
    };
    assert_eq!(path_count, 550);

    let decoded = decode_content_set(&payload, prefix.as_str()).unwrap();
    assert_eq!(decoded.len(), 550);
    for path in decoded {
        assert!(path.starts_with("/some+org/Awesome+Environment+%231/content/dist"));
    }
}
