//! Gravity source driven by the test instead of an accelerometer.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use camera_capture_core::models::error::DriverError;
use camera_capture_core::models::orientation::Gravity;
use camera_capture_core::traits::motion_provider::{GravityCallback, MotionProvider};

struct MotionState {
    available: bool,
    fail_start: bool,
    interval: Option<Duration>,
    callback: Option<GravityCallback>,
    starts: u32,
    stops: u32,
}

/// `MotionProvider` whose samples come from a `MotionFeed`.
pub struct SimulatedMotion {
    state: Arc<Mutex<MotionState>>,
}

/// Test-side handle of a `SimulatedMotion`.
#[derive(Clone)]
pub struct MotionFeed {
    state: Arc<Mutex<MotionState>>,
}

impl SimulatedMotion {
    pub fn new() -> (Self, MotionFeed) {
        let state = Arc::new(Mutex::new(MotionState {
            available: true,
            fail_start: false,
            interval: None,
            callback: None,
            starts: 0,
            stops: 0,
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            MotionFeed { state },
        )
    }

    /// Device without motion hardware.
    pub fn unavailable() -> (Self, MotionFeed) {
        let (motion, feed) = Self::new();
        feed.set_available(false);
        (motion, feed)
    }
}

impl MotionProvider for SimulatedMotion {
    fn is_available(&self) -> bool {
        self.state.lock().available
    }

    fn start(&mut self, interval: Duration, callback: GravityCallback) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.fail_start {
            return Err(DriverError::Hardware("motion updates refused".into()));
        }
        state.interval = Some(interval);
        state.callback = Some(callback);
        state.starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        if state.callback.take().is_some() {
            state.stops += 1;
        }
    }
}

impl MotionFeed {
    /// Deliver one sample. Returns false when nobody is listening.
    pub fn feed(&self, gravity: Gravity) -> bool {
        let callback = self.state.lock().callback.clone();
        match callback {
            Some(callback) => {
                callback(gravity);
                true
            }
            None => false,
        }
    }

    pub fn set_available(&self, available: bool) {
        self.state.lock().available = available;
    }

    pub fn fail_start(&self, fail: bool) {
        self.state.lock().fail_start = fail;
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().callback.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.state.lock().interval
    }

    pub fn starts(&self) -> u32 {
        self.state.lock().starts
    }

    pub fn stops(&self) -> u32 {
        self.state.lock().stops
    }
}

/// Gravity samples that resolve to each upright orientation.
pub mod gravity {
    use camera_capture_core::models::orientation::Gravity;

    pub const PORTRAIT: Gravity = Gravity { x: 0.0, y: -1.0, z: 0.0 };
    pub const PORTRAIT_UPSIDE_DOWN: Gravity = Gravity { x: 0.0, y: 1.0, z: 0.0 };
    pub const LANDSCAPE_LEFT: Gravity = Gravity { x: -1.0, y: 0.0, z: 0.0 };
    pub const LANDSCAPE_RIGHT: Gravity = Gravity { x: 1.0, y: 0.0, z: 0.0 };
}
