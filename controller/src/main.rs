mod clock;
mod gate;
mod http;
mod link;
mod run;
mod state;
mod store;

use std::path::PathBuf;

use tracing::{info, warn};

use feeder_common::{FeedSchedule, FeederSettings, WifiStatus};

use crate::gate::{GateActuator, LoggingGateDrive};
use crate::run::EventLoop;
use crate::state::ControllerState;
use crate::store::ConfigStore;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = FeederSettings::from_env();

    let data_dir = std::env::var("FEEDER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./.feeder"));
    let store = ConfigStore::new(data_dir.join("config.json"));
    let schedule = FeedSchedule::from_times(store.load());
    info!("loaded {} feed time(s)", schedule.len());

    let mut state = ControllerState::new(schedule);
    state.wifi = startup_wifi_status(&settings);

    let gate = GateActuator::new(LoggingGateDrive);
    EventLoop::bind(settings, state, gate, store)?.run()
}

/// Network association happens outside this core; all we keep is its
/// outcome, fixed for the life of the process.
fn startup_wifi_status(settings: &FeederSettings) -> WifiStatus {
    if std::env::var("FEEDER_WIFI_ERROR").is_ok_and(|value| value == "1") {
        warn!(
            "wifi association timed out after {}s; serving error page only",
            settings.wifi_timeout_secs
        );
        return WifiStatus::Error {
            timeout_secs: settings.wifi_timeout_secs,
        };
    }

    let url = std::env::var("FEEDER_DASHBOARD_URL")
        .unwrap_or_else(|_| format!("http://127.0.0.1:{}", settings.http_port));
    info!("dashboard at {url}");
    WifiStatus::Connected(url)
}
