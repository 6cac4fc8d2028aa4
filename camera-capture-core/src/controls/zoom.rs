use crate::models::error::DriverError;
use crate::traits::capture_device::{CaptureDevice, DeviceConfigurationLock};

/// Pinch-zoom bookkeeping.
///
/// Invariant: `1.0 <= current_scale <= max_scale` after every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomController {
    current_scale: f64,
    begin_scale: f64,
    max_scale: f64,
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoomController {
    pub fn new() -> Self {
        Self {
            current_scale: 1.0,
            begin_scale: 1.0,
            max_scale: 1.0,
        }
    }

    pub fn current_scale(&self) -> f64 {
        self.current_scale
    }

    pub fn begin_scale(&self) -> f64 {
        self.begin_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Snapshot the current scale at the start of a pinch.
    pub fn begin(&mut self) {
        self.begin_scale = self.current_scale;
    }

    /// Replace the device-reported maximum. Called whenever the device or the
    /// output mode changes; the gesture baseline resets to 1.0.
    pub fn set_max_scale(&mut self, max_scale: f64) {
        self.max_scale = if max_scale.is_finite() && max_scale >= 1.0 {
            max_scale
        } else {
            1.0
        };
        self.begin_scale = 1.0;
        self.current_scale = self.current_scale.clamp(1.0, self.max_scale);
    }

    /// Scale that `update` would apply for `gesture_scale`.
    pub fn target_scale(&self, gesture_scale: f64) -> f64 {
        let raw = self.begin_scale * gesture_scale;
        if raw.is_nan() {
            1.0
        } else {
            raw.clamp(1.0, self.max_scale)
        }
    }

    /// Apply `begin_scale * gesture_scale`, clamped, in one locked write.
    ///
    /// On lock failure nothing changes and the error is returned for the
    /// caller to log.
    pub fn update(&mut self, device: &dyn CaptureDevice, gesture_scale: f64) -> Result<f64, DriverError> {
        let target = self.target_scale(gesture_scale);
        {
            let locked = DeviceConfigurationLock::acquire(device)?;
            locked.set_zoom_factor(target);
        }
        self.current_scale = target;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_unity() {
        let zoom = ZoomController::new();
        assert_eq!(zoom.current_scale(), 1.0);
        assert_eq!(zoom.max_scale(), 1.0);
    }

    #[test]
    fn target_is_clamped_for_adversarial_scales() {
        let mut zoom = ZoomController::new();
        zoom.set_max_scale(6.0);

        for scale in [0.0, -3.0, 1e300, f64::INFINITY, f64::NEG_INFINITY, f64::NAN, 2.5] {
            let target = zoom.target_scale(scale);
            assert!((1.0..=6.0).contains(&target), "scale {} gave {}", scale, target);
        }
        assert_eq!(zoom.target_scale(2.5), 2.5);
        assert_eq!(zoom.target_scale(100.0), 6.0);
    }

    #[test]
    fn begin_snapshots_current_scale() {
        let mut zoom = ZoomController::new();
        zoom.set_max_scale(10.0);
        zoom.current_scale = 2.0;
        zoom.begin();

        assert_eq!(zoom.begin_scale(), 2.0);
        assert_eq!(zoom.target_scale(1.5), 3.0);
    }

    #[test]
    fn shrinking_max_pulls_current_down() {
        let mut zoom = ZoomController::new();
        zoom.set_max_scale(8.0);
        zoom.current_scale = 7.0;

        zoom.set_max_scale(3.0);
        assert_eq!(zoom.current_scale(), 3.0);
        assert_eq!(zoom.begin_scale(), 1.0);
    }

    #[test]
    fn invalid_max_falls_back_to_unity() {
        let mut zoom = ZoomController::new();
        zoom.set_max_scale(0.5);
        assert_eq!(zoom.max_scale(), 1.0);
        zoom.set_max_scale(f64::NAN);
        assert_eq!(zoom.max_scale(), 1.0);
    }
}
