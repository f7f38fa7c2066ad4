use feeder_common::{FeedSchedule, TriggerLedger, WifiStatus};

/// Everything the request handler and the autonomous checks both touch.
/// A single event-loop thread owns it, so plain `&mut` access is enough;
/// there is no locking anywhere in the controller.
#[derive(Debug)]
pub struct ControllerState {
    pub schedule: FeedSchedule,
    pub ledger: TriggerLedger,
    /// Most recent load-cell reading in grams. No history is kept.
    pub weight_g: f32,
    pub wifi: WifiStatus,
}

impl ControllerState {
    pub fn new(schedule: FeedSchedule) -> Self {
        Self {
            schedule,
            ledger: TriggerLedger::new(),
            weight_g: 0.0,
            wifi: WifiStatus::Connecting,
        }
    }
}
