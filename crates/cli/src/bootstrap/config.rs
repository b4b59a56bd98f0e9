//! Thin wrapper around the infrastructure config loader so `main` doesn't
//! reach past the bootstrap layer for I/O (§9 "pass as immutable
//! configuration... avoid ambient singletons").

use std::path::Path;

use autofilter_domain::ConfigTables;

pub async fn load_tables(config_path: &Path) -> ConfigTables {
    autofilter_infrastructure::load_config_tables(config_path).await
}

/// Outcome of `-t/--test-config`: whether the file parsed as written,
/// distinct from "parsed, but the loader fell back to defaults" — a
/// missing file is a success (§4.A: absence is not an error) while a
/// present-but-malformed file is the failure §6 asks `-t` to catch.
pub enum ConfigCheck {
    Ok,
    Missing,
    ParseFailed(String),
}

pub async fn check_config(config_path: &Path) -> ConfigCheck {
    match tokio::fs::read_to_string(config_path).await {
        Ok(text) => match ConfigTables::parse(&text) {
            Ok(_) => ConfigCheck::Ok,
            Err(err) => ConfigCheck::ParseFailed(err.to_string()),
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => ConfigCheck::Missing,
        Err(err) => ConfigCheck::ParseFailed(err.to_string()),
    }
}
