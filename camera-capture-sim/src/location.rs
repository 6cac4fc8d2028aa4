use chrono::Utc;
use parking_lot::Mutex;

use camera_capture_core::models::capture_result::Location;
use camera_capture_core::traits::location_provider::LocationProvider;

/// Location source fed with a list of fixes; reports the most accurate.
#[derive(Default)]
pub struct FixedLocation {
    fixes: Mutex<Vec<Location>>,
}

impl FixedLocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix stamped now.
    pub fn fix(latitude: f64, longitude: f64, horizontal_accuracy: f64) -> Location {
        Location {
            latitude,
            longitude,
            altitude: 0.0,
            horizontal_accuracy,
            timestamp: Utc::now(),
        }
    }

    pub fn push(&self, fix: Location) {
        self.fixes.lock().push(fix);
    }

    pub fn clear(&self) {
        self.fixes.lock().clear();
    }
}

impl LocationProvider for FixedLocation {
    fn latest_location(&self) -> Option<Location> {
        Location::most_accurate(self.fixes.lock().iter().copied())
    }
}
