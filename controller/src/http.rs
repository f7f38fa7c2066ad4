use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use tracing::info;

use feeder_common::{FeedTime, WifiStatus};

use crate::clock;
use crate::gate::{GateActuator, GateDrive};
use crate::link::SensorLink;
use crate::state::ControllerState;
use crate::store::ConfigStore;

/// Everything the web UI can ask for. Unknown paths and requests with
/// malformed parameters degrade to `Status`, which renders the page
/// without touching any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    AddFeed(FeedTime),
    DeleteFeed(usize),
    OpenNow,
    CloseNow,
    RetareNow,
    ResetTime,
    Status,
}

/// Parses the request line of a plaintext HTTP request into a route.
pub fn parse_request(raw: &str) -> Route {
    let Some(line) = raw.lines().next() else {
        return Route::Status;
    };
    let Some(target) = line.split_whitespace().nth(1) else {
        return Route::Status;
    };

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };
    let params: HashMap<&str, &str> = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect();

    match path {
        "/addFeed" => parse_add_feed(&params).unwrap_or(Route::Status),
        "/deleteFeed" => params
            .get("idx")
            .and_then(|raw| raw.parse::<usize>().ok())
            .map(Route::DeleteFeed)
            .unwrap_or(Route::Status),
        "/openNow" => Route::OpenNow,
        "/closeNow" => Route::CloseNow,
        "/retareNow" => Route::RetareNow,
        "/resetTime" => Route::ResetTime,
        _ => Route::Status,
    }
}

fn parse_add_feed(params: &HashMap<&str, &str>) -> Option<Route> {
    let hour = params.get("hour")?.parse::<u8>().ok()?;
    let minute = params.get("minute")?.parse::<u8>().ok()?;
    FeedTime::new(hour, minute).ok().map(Route::AddFeed)
}

/// Dispatches one request and renders the response. A sticky wifi error
/// pre-empts everything, controls included; otherwise every request gets
/// the status page back, mutating or not.
pub fn handle_request<D: GateDrive>(
    raw: &str,
    state: &mut ControllerState,
    gate: &mut GateActuator<D>,
    link: &mut SensorLink,
    store: &ConfigStore,
    now: &DateTime<FixedOffset>,
) -> String {
    if let WifiStatus::Error { timeout_secs } = &state.wifi {
        return render_wifi_error(*timeout_secs);
    }

    match parse_request(raw) {
        Route::AddFeed(time) => {
            if state.schedule.add(time) {
                info!("added feed time {time}");
            }
            // Re-adding an existing time still re-arms its slot for today.
            state.ledger.forget(time);
            store.save(state.schedule.times());
        }
        Route::DeleteFeed(idx) => {
            if let Some(removed) = state.schedule.remove(idx) {
                info!("deleted feed time {removed}");
                state.ledger.forget(removed);
                store.save(state.schedule.times());
            }
        }
        Route::OpenNow => {
            gate.force_open();
            gate.play_open_animation();
        }
        Route::CloseNow => {
            gate.force_close();
            gate.play_close_animation();
        }
        Route::RetareNow => link.send_tare_line(),
        Route::ResetTime => {
            info!("clearing all feed times");
            state.schedule.clear();
            state.ledger.clear();
            store.save(&[]);
        }
        Route::Status => {}
    }

    render_status(state, now)
}

fn render_status(state: &ControllerState, now: &DateTime<FixedOffset>) -> String {
    let items: String = state
        .schedule
        .iter()
        .enumerate()
        .map(|(idx, time)| {
            format!("<li>{time} <a href=\"/deleteFeed?idx={idx}\">Delete</a></li>")
        })
        .collect();
    let link_html = state
        .wifi
        .dashboard_url()
        .map(|url| format!("<p><a href=\"{url}\">Dashboard</a></p>"))
        .unwrap_or_default();

    format!(
        "HTTP/1.0 200 OK\r\nContent-Type: text/html\r\n\r\n\
<html>\n\
<head><title>SNACKZILLA</title></head>\n\
<body>\n\
  <h1>SNACKZILLA</h1>\n\
  <p><strong>Time:</strong> {time}</p>\n\
  <p><strong>Weight:</strong> {weight:.2} g</p>\n\
  {link_html}\n\
  <h2>Feed Times</h2><ul>{items}</ul>\n\
  <h3>Add Feed Time</h3>\n\
  <form action=\"/addFeed\">\n\
    <input name=\"hour\" type=\"number\" min=\"0\" max=\"23\"> :\n\
    <input name=\"minute\" type=\"number\" min=\"0\" max=\"59\">\n\
    <input type=\"submit\" value=\"Add\">\n\
  </form>\n\
  <h3>Manual Control</h3>\n\
  <button onclick=\"location.href='/openNow'\">Open</button>\n\
  <button onclick=\"location.href='/closeNow'\">Close</button>\n\
  <button onclick=\"location.href='/retareNow'\">Tare</button>\n\
  <button onclick=\"location.href='/resetTime'\">Reset</button>\n\
</body>\n\
</html>",
        time = clock::clock_stamp(now),
        weight = state.weight_g,
    )
}

fn render_wifi_error(timeout_secs: u64) -> String {
    format!(
        "HTTP/1.0 200 OK\r\nContent-Type: text/html\r\n\r\n\
<html><body><h1>Wi-Fi Error</h1><p>Timeout {timeout_secs}s</p></body></html>"
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use feeder_common::{FeedSchedule, FeederSettings};

    use crate::gate::testing::RecordingDrive;

    use super::*;

    fn time(hour: u8, minute: u8) -> FeedTime {
        FeedTime::new(hour, minute).unwrap()
    }

    #[test]
    fn parses_every_route() {
        assert_eq!(
            parse_request("GET /addFeed?hour=9&minute=5 HTTP/1.1\r\n"),
            Route::AddFeed(time(9, 5))
        );
        assert_eq!(
            parse_request("GET /deleteFeed?idx=2 HTTP/1.1\r\n"),
            Route::DeleteFeed(2)
        );
        assert_eq!(parse_request("GET /openNow HTTP/1.1\r\n"), Route::OpenNow);
        assert_eq!(parse_request("GET /closeNow HTTP/1.1\r\n"), Route::CloseNow);
        assert_eq!(
            parse_request("GET /retareNow HTTP/1.1\r\n"),
            Route::RetareNow
        );
        assert_eq!(
            parse_request("GET /resetTime HTTP/1.1\r\n"),
            Route::ResetTime
        );
        assert_eq!(parse_request("GET / HTTP/1.1\r\n"), Route::Status);
    }

    #[test]
    fn malformed_params_degrade_to_status() {
        for raw in [
            "GET /addFeed HTTP/1.1\r\n",
            "GET /addFeed?hour=24&minute=0 HTTP/1.1\r\n",
            "GET /addFeed?hour=x&minute=5 HTTP/1.1\r\n",
            "GET /addFeed?minute=5 HTTP/1.1\r\n",
            "GET /deleteFeed?idx=-1 HTTP/1.1\r\n",
            "GET /deleteFeed?idx=two HTTP/1.1\r\n",
            "GET /unknown HTTP/1.1\r\n",
            "",
            "\r\n",
        ] {
            assert_eq!(parse_request(raw), Route::Status, "for {raw:?}");
        }
    }

    struct Harness {
        state: ControllerState,
        gate: GateActuator<RecordingDrive>,
        link: SensorLink,
        store: ConfigStore,
        now: DateTime<FixedOffset>,
    }

    impl Harness {
        fn new(name: &str) -> Self {
            let dir =
                std::env::temp_dir().join(format!("feeder-http-{}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            let store = ConfigStore::new(dir.join(format!("{name}.json")));
            store.save(&[]);

            Self {
                state: ControllerState::new(FeedSchedule::new()),
                gate: GateActuator::new(RecordingDrive::default()),
                link: SensorLink::new(&FeederSettings::default()),
                store,
                now: FixedOffset::west_opt(7 * 3600)
                    .unwrap()
                    .with_ymd_and_hms(2026, 8, 5, 14, 30, 45)
                    .unwrap(),
            }
        }

        fn request(&mut self, line: &str) -> String {
            handle_request(
                line,
                &mut self.state,
                &mut self.gate,
                &mut self.link,
                &self.store,
                &self.now,
            )
        }

        fn gate_actuations(&self) -> usize {
            self.gate.drive_ref().gate_duties.len()
        }
    }

    #[test]
    fn add_then_delete_persists_each_step() {
        let mut h = Harness::new("add-delete");

        h.request("GET /addFeed?hour=9&minute=5 HTTP/1.1\r\n");
        assert_eq!(h.state.schedule.times(), &[time(9, 5)]);
        assert_eq!(h.store.load(), vec![time(9, 5)]);

        h.state.ledger.record(time(9, 5), 5);
        h.request("GET /deleteFeed?idx=0 HTTP/1.1\r\n");
        assert!(h.state.schedule.is_empty());
        assert_eq!(h.state.ledger.last_day(time(9, 5)), None);
        assert!(h.store.load().is_empty());
    }

    #[test]
    fn re_adding_a_time_rearms_its_ledger_slot() {
        let mut h = Harness::new("re-add");

        h.request("GET /addFeed?hour=7&minute=0 HTTP/1.1\r\n");
        h.state.ledger.record(time(7, 0), 5);

        h.request("GET /addFeed?hour=7&minute=0 HTTP/1.1\r\n");
        assert_eq!(h.state.schedule.len(), 1);
        assert_eq!(h.state.ledger.last_day(time(7, 0)), None);
    }

    #[test]
    fn delete_out_of_range_is_a_noop() {
        let mut h = Harness::new("delete-oob");
        h.request("GET /addFeed?hour=7&minute=0 HTTP/1.1\r\n");

        h.request("GET /deleteFeed?idx=5 HTTP/1.1\r\n");
        assert_eq!(h.state.schedule.len(), 1);
    }

    #[test]
    fn manual_controls_always_actuate() {
        let mut h = Harness::new("manual");

        h.request("GET /openNow HTTP/1.1\r\n");
        h.request("GET /openNow HTTP/1.1\r\n");
        assert!(h.gate.is_open());
        assert_eq!(h.gate_actuations(), 2);

        h.request("GET /closeNow HTTP/1.1\r\n");
        assert!(!h.gate.is_open());
    }

    #[test]
    fn reset_clears_schedule_and_ledger() {
        let mut h = Harness::new("reset");
        h.request("GET /addFeed?hour=7&minute=0 HTTP/1.1\r\n");
        h.state.ledger.record(time(7, 0), 5);

        h.request("GET /resetTime HTTP/1.1\r\n");
        assert!(h.state.schedule.is_empty());
        assert_eq!(h.state.ledger.last_day(time(7, 0)), None);
        assert!(h.store.load().is_empty());
    }

    #[test]
    fn status_page_embeds_time_weight_and_items() {
        let mut h = Harness::new("status");
        h.state.wifi = WifiStatus::Connected("http://10.0.0.2".to_string());
        h.state.weight_g = 3.456;
        h.request("GET /addFeed?hour=7&minute=0 HTTP/1.1\r\n");

        let page = h.request("GET / HTTP/1.1\r\n");
        assert!(page.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(page.contains("14:30:45"));
        assert!(page.contains("3.46 g"));
        assert!(page.contains("<a href=\"http://10.0.0.2\">Dashboard</a>"));
        assert!(page.contains("<li>07:00 <a href=\"/deleteFeed?idx=0\">Delete</a></li>"));
    }

    #[test]
    fn connecting_hides_the_dashboard_link() {
        let mut h = Harness::new("no-link");
        let page = h.request("GET / HTTP/1.1\r\n");
        assert!(!page.contains("Dashboard"));
    }

    #[test]
    fn wifi_error_preempts_all_controls() {
        let mut h = Harness::new("wifi-error");
        h.state.wifi = WifiStatus::Error { timeout_secs: 30 };

        let page = h.request("GET /openNow HTTP/1.1\r\n");
        assert!(page.contains("Wi-Fi Error"));
        assert!(page.contains("Timeout 30s"));
        assert!(!h.gate.is_open());
        assert_eq!(h.gate_actuations(), 0);
    }
}
