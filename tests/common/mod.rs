use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use zenkit::{Zendesk, ZendeskConfig};

#[allow(dead_code)]
pub fn fixture_path(relative: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

#[allow(dead_code)]
pub fn read_fixture(relative: impl AsRef<Path>) -> String {
    fs::read_to_string(fixture_path(relative)).expect("fixture file should be readable")
}

/// Client pointed at a mock server, with fast retries so tests stay quick.
#[allow(dead_code)]
pub fn mock_client(base_url: &str) -> Zendesk {
    Zendesk::with_config(
        ZendeskConfig::new("testaccount", "agent@example.com", "token")
            .with_base_url(base_url)
            .with_backoff_base(Duration::from_millis(10)),
    )
    .unwrap()
}
