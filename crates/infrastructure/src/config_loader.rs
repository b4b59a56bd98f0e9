use std::path::Path;

use autofilter_domain::ConfigTables;
use tracing::{info, warn};

/// Loads the config file at `path`, falling back to built-in defaults if
/// the file is absent or fails to parse (§4.A, §7). Never fails: the
/// daemon always has a usable set of tables after this call.
pub async fn load_config_tables(path: &Path) -> ConfigTables {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no config file present, using defaults");
            return ConfigTables::defaults();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read config, using defaults");
            return ConfigTables::defaults();
        }
    };

    match ConfigTables::parse(&text) {
        Ok(tables) => {
            info!(path = %path.display(), "loaded config");
            tables
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config parse failed, using defaults");
            ConfigTables::defaults()
        }
    }
}
