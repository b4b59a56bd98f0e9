use std::path::PathBuf;

use async_trait::async_trait;
use autofilter_application::ports::BotStorePort;
use autofilter_domain::{AutofilterError, BotSet};
use tracing::{debug, warn};

/// Filesystem-backed bot artifact store (§4.G). Reads tolerate a missing
/// file as an empty set; writes go through a randomly-suffixed temp file
/// and `rename`, so a reader never observes a partial artifact.
pub struct FileBotStore {
    path: PathBuf,
}

impl FileBotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl BotStorePort for FileBotStore {
    async fn load(&self, now: i64) -> Result<BotSet, AutofilterError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(BotSet::parse(&text, now)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "bot artifact missing, treating as empty");
                Ok(BotSet::new())
            }
            Err(err) => Err(AutofilterError::Io(format!(
                "reading {}: {err}",
                self.path.display()
            ))),
        }
    }

    async fn persist(&self, set: &BotSet) -> Result<(), AutofilterError> {
        let contents = set.serialize();
        let suffix = format!("{:016x}", fastrand::u64(..));
        let mut tmp_name = self.path.as_os_str().to_os_string();
        tmp_name.push(format!(".tmp.{suffix}.tmp"));
        let tmp_path = PathBuf::from(tmp_name);

        tokio::fs::write(&tmp_path, contents)
            .await
            .map_err(|err| AutofilterError::Io(format!("writing {}: {err}", tmp_path.display())))?;

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| {
                AutofilterError::Io(format!(
                    "renaming {} to {}: {err}",
                    tmp_path.display(),
                    self.path.display()
                ))
            })?;

        warn_on_empty(set);
        Ok(())
    }
}

fn warn_on_empty(set: &BotSet) {
    if set.is_empty() {
        debug!("persisted empty bot set");
    }
}
