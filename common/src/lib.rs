pub mod config;
pub mod schedule;
pub mod types;
pub mod wire;

pub use config::{FeederSettings, StoredTimes};
pub use schedule::{should_trigger, FeedSchedule, TriggerLedger};
pub use types::{FeedTime, FeedTimeError, WifiStatus};
pub use wire::{TARE_COMMAND, TARE_LINE};
