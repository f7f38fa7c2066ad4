use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::warn;

use feeder_common::{FeedTime, StoredTimes};

/// Durable home of the feed-time list. Loading never fails: a missing or
/// malformed file resets to an empty list which is immediately written
/// back, and a failed save is logged while the in-memory list stays the
/// source of truth.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Vec<FeedTime> {
        match fs::read(&self.path) {
            Ok(raw) => match serde_json::from_slice::<StoredTimes>(&raw) {
                Ok(stored) => return stored.times,
                Err(err) => {
                    warn!(
                        "malformed config {}: {err}; resetting to empty",
                        self.path.display()
                    );
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                warn!(
                    "failed to read config {}: {err}; resetting to empty",
                    self.path.display()
                );
            }
        }

        self.save(&[]);
        Vec::new()
    }

    pub fn save(&self, times: &[FeedTime]) {
        if let Err(err) = self.try_save(times) {
            warn!("failed to save config {}: {err:#}", self.path.display());
        }
    }

    fn try_save(&self, times: &[FeedTime]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(&StoredTimes::new(times.to_vec()))?;
        fs::write(&self.path, payload)?;
        Ok(())
    }
}
