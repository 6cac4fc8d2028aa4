use std::time::Duration;

use crate::models::device::{Capability, ExposureMode, FocusMode, Point, Rect};
use crate::models::error::DriverError;
use crate::processing::exposure_curve::{
    exposure_duration_for_value, exposure_value_for_distance, NEUTRAL_EXPOSURE,
};
use crate::traits::capture_device::{CaptureDevice, DeviceConfigurationLock};

/// Phase of a continuous gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// Region of the host view that shows the preview, used to normalize tap
/// positions into device point-of-interest space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PreviewGeometry {
    pub region: Rect,
}

impl PreviewGeometry {
    pub fn new(region: Rect) -> Self {
        Self { region }
    }

    /// Normalize a view-space point to `[0, 1] x [0, 1]` relative to the
    /// preview region. None until the host has reported a region.
    pub fn point_of_interest(&self, view_point: Point) -> Option<Point> {
        if self.region.is_empty() {
            return None;
        }
        let x = (view_point.x - self.region.x) / self.region.width;
        let y = (view_point.y - self.region.y) / self.region.height;
        if x.is_nan() || y.is_nan() {
            return None;
        }
        Some(Point::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)))
    }

    /// Whether every touch lands on the preview. False until the host has
    /// reported a region.
    pub fn contains_all(&self, touches: &[Point]) -> bool {
        !self.region.is_empty() && touches.iter().all(|touch| self.region.contains(*touch))
    }
}

/// Tap-to-focus and pan-to-expose.
///
/// `translation_accumulator` persists across pan gestures and only absorbs a
/// gesture's delta when it ends; frames in between read
/// `accumulator + delta` without committing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureController {
    exposure_value: f64,
    translation_accumulator: f64,
    last_focus_point: Option<Point>,
}

impl Default for ExposureController {
    fn default() -> Self {
        Self::new()
    }
}

impl ExposureController {
    pub fn new() -> Self {
        Self {
            exposure_value: NEUTRAL_EXPOSURE,
            translation_accumulator: 0.0,
            last_focus_point: None,
        }
    }

    pub fn exposure_value(&self) -> f64 {
        self.exposure_value
    }

    pub fn translation_accumulator(&self) -> f64 {
        self.translation_accumulator
    }

    /// View-space point of the last tap-to-focus.
    pub fn last_focus_point(&self) -> Option<Point> {
        self.last_focus_point
    }

    /// Advance the drag bookkeeping and return the live exposure value.
    pub fn track_drag(&mut self, delta: f64, phase: GesturePhase) -> f64 {
        let delta = if delta.is_finite() { delta } else { 0.0 };
        let distance = self.translation_accumulator + delta;
        if phase == GesturePhase::Ended {
            self.translation_accumulator = distance;
        }
        self.exposure_value = exposure_value_for_distance(distance);
        self.exposure_value
    }

    /// Tap-to-focus.
    ///
    /// Always resets the exposure value to neutral and clears the
    /// accumulator, then in one locked step: continuous auto exposure, the
    /// points of interest the device supports, and the configured modes.
    pub fn focus(
        &mut self,
        device: &dyn CaptureDevice,
        view_point: Point,
        point_of_interest: Option<Point>,
        focus_mode: FocusMode,
        exposure_mode: ExposureMode,
    ) -> Result<(), DriverError> {
        self.exposure_value = NEUTRAL_EXPOSURE;
        self.translation_accumulator = 0.0;
        self.last_focus_point = Some(view_point);

        let locked = DeviceConfigurationLock::acquire(device)?;
        set_exposure_mode_if_supported(&*locked, ExposureMode::ContinuousAutoExposure);

        if let Some(point) = point_of_interest {
            if locked.supports(Capability::FocusPointOfInterest) {
                locked.set_focus_point_of_interest(point);
            }
            if locked.supports(Capability::ExposurePointOfInterest) {
                locked.set_exposure_point_of_interest(point);
            }
        }
        if locked.supports(Capability::Focus(focus_mode)) {
            locked.set_focus_mode(focus_mode);
        }
        set_exposure_mode_if_supported(&*locked, exposure_mode);
        Ok(())
    }

    /// Pan-to-expose.
    ///
    /// Forces custom exposure, then applies the duration for the live value.
    /// Returns the applied duration, or None when the device could not enter
    /// custom mode.
    pub fn drag(
        &mut self,
        device: &dyn CaptureDevice,
        delta: f64,
        phase: GesturePhase,
    ) -> Result<Option<Duration>, DriverError> {
        let value = self.track_drag(delta, phase);

        let locked = DeviceConfigurationLock::acquire(device)?;
        set_exposure_mode_if_supported(&*locked, ExposureMode::Custom);
        Ok(apply_exposure_duration(&*locked, value))
    }
}

fn set_exposure_mode_if_supported(device: &dyn CaptureDevice, mode: ExposureMode) {
    if device.exposure_mode() != mode && device.supports(Capability::Exposure(mode)) {
        device.set_exposure_mode(mode);
    }
}

/// Write the custom duration for `value`. Silently skipped unless the device
/// is already in custom exposure mode.
fn apply_exposure_duration(device: &dyn CaptureDevice, value: f64) -> Option<Duration> {
    if device.exposure_mode() != ExposureMode::Custom {
        return None;
    }
    let (min, max) = device.exposure_duration_range();
    let duration = exposure_duration_for_value(value, min, max);
    device.set_custom_exposure_duration(duration);
    Some(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn drag_commits_only_on_end() {
        let mut exposure = ExposureController::new();

        assert_relative_eq!(exposure.track_drag(-100.0, GesturePhase::Began), 0.625);
        assert_relative_eq!(exposure.track_drag(-200.0, GesturePhase::Changed), 0.75);
        assert_eq!(exposure.translation_accumulator(), 0.0);

        assert_relative_eq!(exposure.track_drag(-200.0, GesturePhase::Ended), 0.75);
        assert_eq!(exposure.translation_accumulator(), -200.0);
    }

    #[test]
    fn successive_gestures_do_not_drift() {
        let mut exposure = ExposureController::new();

        exposure.track_drag(-50.0, GesturePhase::Changed);
        exposure.track_drag(-120.0, GesturePhase::Ended);

        // second gesture starts from the committed -120, not from the
        // intermediate -50
        assert_relative_eq!(
            exposure.track_drag(0.0, GesturePhase::Began),
            exposure_value_for_distance(-120.0)
        );
        exposure.track_drag(80.0, GesturePhase::Changed);
        assert_relative_eq!(
            exposure.track_drag(40.0, GesturePhase::Ended),
            exposure_value_for_distance(-80.0)
        );
        assert_eq!(exposure.translation_accumulator(), -80.0);
    }

    #[test]
    fn cancelled_gesture_is_not_committed() {
        let mut exposure = ExposureController::new();
        exposure.track_drag(300.0, GesturePhase::Cancelled);
        assert_eq!(exposure.translation_accumulator(), 0.0);
        assert_relative_eq!(exposure.exposure_value(), 0.125);
    }

    #[test]
    fn non_finite_delta_is_ignored() {
        let mut exposure = ExposureController::new();
        assert_eq!(exposure.track_drag(f64::NAN, GesturePhase::Ended), 0.5);
        assert_eq!(exposure.translation_accumulator(), 0.0);
    }

    #[test]
    fn point_of_interest_is_normalized_to_region() {
        let geometry = PreviewGeometry::new(Rect::new(0.0, 100.0, 400.0, 800.0));

        let poi = geometry.point_of_interest(Point::new(100.0, 500.0)).unwrap();
        assert_relative_eq!(poi.x, 0.25);
        assert_relative_eq!(poi.y, 0.5);

        let outside = geometry.point_of_interest(Point::new(-50.0, 2000.0)).unwrap();
        assert_eq!(outside, Point::new(0.0, 1.0));
    }

    #[test]
    fn point_of_interest_needs_a_region() {
        assert!(PreviewGeometry::default().point_of_interest(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn touches_must_all_land_on_the_preview() {
        let geometry = PreviewGeometry::new(Rect::new(0.0, 100.0, 400.0, 800.0));
        assert!(geometry.contains_all(&[Point::new(10.0, 120.0), Point::new(390.0, 880.0)]));
        assert!(!geometry.contains_all(&[Point::new(10.0, 120.0), Point::new(10.0, 50.0)]));
        assert!(!PreviewGeometry::default().contains_all(&[Point::new(1.0, 1.0)]));
    }
}
