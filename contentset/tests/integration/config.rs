//! Settings loaded from the environment
//!
//! This is the only test touching `CONTENTSET_` variables, so it cannot race
//! with other tests reading them.

use contentset::config::Settings;
use contentset::governor::ExtensionSizeGovernor;

#[test]
fn environment_overrides_governor_settings() {
    std::env::set_var("CONTENTSET_GOVERNOR__PER_ITEM_LIMIT", "3");
    std::env::set_var("CONTENTSET_GOVERNOR__MAX_PAYLOAD_BYTES", "4096");

    let settings = Settings::new(None::<&str>);

    std::env::remove_var("CONTENTSET_GOVERNOR__PER_ITEM_LIMIT");
    std::env::remove_var("CONTENTSET_GOVERNOR__MAX_PAYLOAD_BYTES");

    let settings = settings.unwrap();
    assert_eq!(settings.governor.per_item_limit, 3);
    assert_eq!(settings.governor.max_payload_bytes, Some(4096));

    let governor = ExtensionSizeGovernor::new(settings.governor);
    assert_eq!(governor.config().per_item_limit, 3);
}
