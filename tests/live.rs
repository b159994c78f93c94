//! Scenario runs against the real PetFriends service
//!
//! Ignored by default: they need network access and an account. Run with
//!
//! ```text
//! PETFRIENDS_EMAIL=... PETFRIENDS_PASSWORD=... cargo test --test live -- --ignored --test-threads=1
//! ```
//!
//! The service is shared state, so these runs leave pets behind and can be
//! affected by earlier runs.

use std::path::{Path, PathBuf};

use petfriends::common::config::Config;
use petfriends::common::logging;
use petfriends::testing;
use petfriends::PetFriends;

fn bundled_scenarios() -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
        .expect("Failed to read scenarios dir")
        .map(|entry| entry.expect("Failed to read dir entry").path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("yml"))
        .collect();
    paths.sort();
    paths
}

#[tokio::test]
#[ignore = "talks to the live PetFriends service"]
async fn test_bundled_scenarios_against_live_service() {
    logging::init_test();

    let config = Config::load().expect("Failed to load config");
    let credentials = config
        .credentials()
        .expect("Set PETFRIENDS_EMAIL and PETFRIENDS_PASSWORD");
    let client = PetFriends::from_config(&config).expect("Failed to create client");

    let results = testing::run_suite(&client, &credentials, &bundled_scenarios(), true).await;
    let failed = testing::print_summary(&results);

    assert_eq!(failed, 0, "{} scenarios failed", failed);
}
