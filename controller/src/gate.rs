use std::time::Duration;

use tracing::{debug, info};

const GATE_OPEN_DUTY: u32 = 40;
const GATE_CLOSED_DUTY: u32 = 115;

// Ear servo duty for a given angle: 40 + angle / 180 * 75.
const EAR_RAISED_DUTY: u32 = 77;
const EAR_LOWERED_DUTY: u32 = 40;
const EAR_NEUTRAL_DUTY: u32 = 0;

const WIGGLE_HOLD: Duration = Duration::from_millis(500);

/// Servo seam. The actuator only ever talks to hardware through this,
/// which keeps actuation counts observable in tests.
pub trait GateDrive {
    fn set_gate_duty(&mut self, duty: u32);
    /// Both ear servos move together.
    fn set_ear_duty(&mut self, duty: u32);
    fn delay(&mut self, duration: Duration);
}

/// Hardware integration point: replace with the PWM pin drivers on the
/// ESP target. On the host it logs duty changes and really sleeps.
#[derive(Debug, Default)]
pub struct LoggingGateDrive;

impl GateDrive for LoggingGateDrive {
    fn set_gate_duty(&mut self, duty: u32) {
        debug!("gate servo duty -> {duty}");
    }

    fn set_ear_duty(&mut self, duty: u32) {
        debug!("ear servo duty -> {duty}");
    }

    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Owns the gate's opened/closed flag. All state changes go through these
/// methods so the flag and the servo position never drift apart silently.
#[derive(Debug)]
pub struct GateActuator<D> {
    drive: D,
    opened: bool,
}

impl<D: GateDrive> GateActuator<D> {
    pub fn new(drive: D) -> Self {
        Self {
            drive,
            opened: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Idempotent: actuates only on the closed -> open edge, so multiple
    /// triggers in the same minute cost one servo write.
    pub fn open(&mut self) -> bool {
        if self.opened {
            return false;
        }
        info!("opening gate");
        self.drive.set_gate_duty(GATE_OPEN_DUTY);
        self.opened = true;
        true
    }

    /// Idempotent inverse of [`open`](Self::open).
    pub fn close(&mut self) -> bool {
        if !self.opened {
            return false;
        }
        info!("closing gate");
        self.drive.set_gate_duty(GATE_CLOSED_DUTY);
        self.opened = false;
        true
    }

    /// Manual override: always drives the servo, even if the flag already
    /// agrees, so the user gets visible feedback despite any state drift.
    pub fn force_open(&mut self) {
        info!("force-opening gate");
        self.drive.set_gate_duty(GATE_OPEN_DUTY);
        self.opened = true;
    }

    pub fn force_close(&mut self) {
        info!("force-closing gate");
        self.drive.set_gate_duty(GATE_CLOSED_DUTY);
        self.opened = false;
    }

    /// Blocking on purpose: two half-second ear wiggles. Runs only on
    /// trigger edges, never per tick.
    pub fn play_open_animation(&mut self) {
        for _ in 0..2 {
            self.drive.set_ear_duty(EAR_RAISED_DUTY);
            self.drive.delay(WIGGLE_HOLD);
            self.drive.set_ear_duty(EAR_LOWERED_DUTY);
            self.drive.delay(WIGGLE_HOLD);
        }
    }

    /// Single neutral-position pulse; returns immediately.
    pub fn play_close_animation(&mut self) {
        self.drive.set_ear_duty(EAR_NEUTRAL_DUTY);
    }
}

#[cfg(test)]
impl<D> GateActuator<D> {
    pub(crate) fn drive_ref(&self) -> &D {
        &self.drive
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use super::GateDrive;

    /// Records every servo write and skips the real sleeps.
    #[derive(Debug, Default)]
    pub struct RecordingDrive {
        pub gate_duties: Vec<u32>,
        pub ear_duties: Vec<u32>,
    }

    impl GateDrive for RecordingDrive {
        fn set_gate_duty(&mut self, duty: u32) {
            self.gate_duties.push(duty);
        }

        fn set_ear_duty(&mut self, duty: u32) {
            self.ear_duties.push(duty);
        }

        fn delay(&mut self, _duration: Duration) {}
    }
}
