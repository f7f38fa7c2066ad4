use std::io::{self, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use feeder_common::{FeederSettings, TARE_COMMAND};

use crate::ema::EmaFilter;

const RECONNECT_DELAY: Duration = Duration::from_secs(2);
const SAMPLE_INTERVAL: Duration = Duration::from_millis(200);
const EMA_ALPHA: f32 = 0.2;

/// Thin driver loop: dial the controller, push one smoothed reading per
/// sample interval, re-zero on TARE, and redial at a fixed interval when
/// anything goes wrong. The controller never dials us.
pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = FeederSettings::from_env();
    let host =
        std::env::var("FEEDER_CONTROLLER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let addr = format!("{host}:{}", settings.sensor_port);
    info!("load cell node pushing to {addr}");

    let mut filter = EmaFilter::new(EMA_ALPHA);
    let mut tick: u64 = 0;

    loop {
        let mut stream = match TcpStream::connect(&addr) {
            Ok(stream) => {
                info!("connected to controller");
                stream
            }
            Err(err) => {
                warn!("connect to {addr} failed: {err}; retrying");
                thread::sleep(RECONNECT_DELAY);
                continue;
            }
        };

        if let Err(err) = drive_link(&mut stream, &mut filter, &mut tick) {
            warn!("link dropped: {err}; reconnecting");
        }
        thread::sleep(RECONNECT_DELAY);
    }
}

fn drive_link(
    stream: &mut TcpStream,
    filter: &mut EmaFilter,
    tick: &mut u64,
) -> io::Result<()> {
    // Short read timeout so the TARE check never stalls the sample loop.
    stream.set_read_timeout(Some(Duration::from_millis(1)))?;

    loop {
        *tick = tick.wrapping_add(1);

        // Hardware integration point:
        // replace the simulated sample with the HX711 driver on the ESP target.
        let raw = 400.0 + ((*tick % 8) as f32) * 0.8;
        let weight = filter.update(raw);

        stream.write_all(format!("{weight:.2}\n").as_bytes())?;

        let mut buf = [0u8; 16];
        match stream.read(&mut buf) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::ConnectionAborted,
                    "controller closed the link",
                ))
            }
            Ok(n) => {
                if buf[..n]
                    .windows(TARE_COMMAND.len())
                    .any(|window| window == TARE_COMMAND)
                {
                    info!("tare command received; re-zeroing");
                    filter.tare();
                }
            }
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(err) => return Err(err),
        }

        thread::sleep(SAMPLE_INTERVAL);
    }
}
