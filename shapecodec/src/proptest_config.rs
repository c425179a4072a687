//! Shared proptest configuration.
use proptest::test_runner::Config;

/// Under Miri, run a handful of cases and keep failure persistence off the filesystem.
pub(crate) fn proptest_cfg() -> Config {
    if cfg!(miri) {
        Config {
            failure_persistence: None,
            cases: 5,
            ..Config::default()
        }
    } else {
        Config::default()
    }
}
