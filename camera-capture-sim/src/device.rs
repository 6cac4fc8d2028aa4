//! Simulated camera device.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use camera_capture_core::models::device::{
    Capability, DevicePosition, ExposureMode, FocusMode, IlluminationMode, Point,
};
use camera_capture_core::models::error::DriverError;
use camera_capture_core::traits::capture_device::CaptureDevice;

/// Observable state of a `SimulatedDevice`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub locked: bool,
    /// Number of successful configuration locks taken so far.
    pub lock_count: u32,
    /// Setter calls made without holding the lock. Always ignored.
    pub unlocked_writes: u32,
    pub zoom_factor: f64,
    pub exposure_mode: ExposureMode,
    pub custom_exposure_duration: Option<Duration>,
    pub focus_mode: FocusMode,
    pub focus_point_of_interest: Option<Point>,
    pub exposure_point_of_interest: Option<Point>,
    pub flash_mode: IlluminationMode,
    pub torch_mode: IlluminationMode,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            locked: false,
            lock_count: 0,
            unlocked_writes: 0,
            zoom_factor: 1.0,
            exposure_mode: ExposureMode::ContinuousAutoExposure,
            custom_exposure_duration: None,
            focus_mode: FocusMode::ContinuousAutoFocus,
            focus_point_of_interest: None,
            exposure_point_of_interest: None,
            flash_mode: IlluminationMode::Off,
            torch_mode: IlluminationMode::Off,
        }
    }
}

/// In-memory camera with a configurable capability set.
///
/// Setters are honored only while the device is locked for configuration.
/// `set_busy(true)` makes every lock attempt fail with `DeviceBusy`.
pub struct SimulatedDevice {
    position: DevicePosition,
    capabilities: HashSet<Capability>,
    max_zoom: f64,
    exposure_range: (Duration, Duration),
    busy: AtomicBool,
    state: Mutex<DeviceState>,
}

impl SimulatedDevice {
    /// Device with no capabilities at all.
    pub fn bare(position: DevicePosition) -> Self {
        Self {
            position,
            capabilities: HashSet::new(),
            max_zoom: 1.0,
            exposure_range: (Duration::from_micros(100), Duration::from_millis(500)),
            busy: AtomicBool::new(false),
            state: Mutex::new(DeviceState::default()),
        }
    }

    /// Back camera with flash, torch, points of interest, every focus and
    /// exposure mode, and 8x zoom.
    pub fn back() -> Self {
        Self::bare(DevicePosition::Back)
            .with_full_controls()
            .with_illumination()
            .with_max_zoom(8.0)
    }

    /// Front camera: focus/exposure controls, no flash or torch, 4x zoom.
    pub fn front() -> Self {
        Self::bare(DevicePosition::Front)
            .with_full_controls()
            .with_max_zoom(4.0)
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn without_capability(mut self, capability: Capability) -> Self {
        self.capabilities.remove(&capability);
        self
    }

    pub fn with_max_zoom(mut self, max_zoom: f64) -> Self {
        self.max_zoom = max_zoom;
        if max_zoom > 1.0 {
            self.capabilities.insert(Capability::Zoom);
        }
        self
    }

    pub fn with_exposure_range(mut self, min: Duration, max: Duration) -> Self {
        self.exposure_range = (min, max);
        self
    }

    fn with_full_controls(mut self) -> Self {
        self.capabilities.extend([
            Capability::FocusPointOfInterest,
            Capability::ExposurePointOfInterest,
            Capability::Focus(FocusMode::Locked),
            Capability::Focus(FocusMode::AutoFocus),
            Capability::Focus(FocusMode::ContinuousAutoFocus),
            Capability::Exposure(ExposureMode::Locked),
            Capability::Exposure(ExposureMode::AutoExpose),
            Capability::Exposure(ExposureMode::ContinuousAutoExposure),
            Capability::Exposure(ExposureMode::Custom),
        ]);
        self
    }

    fn with_illumination(mut self) -> Self {
        for mode in IlluminationMode::ALL {
            self.capabilities.insert(Capability::Flash(mode));
            self.capabilities.insert(Capability::Torch(mode));
        }
        self
    }

    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    pub fn state(&self) -> DeviceState {
        self.state.lock().clone()
    }

    fn write(&self, apply: impl FnOnce(&mut DeviceState)) {
        let mut state = self.state.lock();
        if state.locked {
            apply(&mut state);
        } else {
            state.unlocked_writes += 1;
            log::warn!("{} camera written without configuration lock", self.position);
        }
    }
}

impl CaptureDevice for SimulatedDevice {
    fn position(&self) -> DevicePosition {
        self.position
    }

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn lock_for_configuration(&self) -> Result<(), DriverError> {
        if self.busy.load(Ordering::SeqCst) {
            return Err(DriverError::DeviceBusy);
        }
        let mut state = self.state.lock();
        if state.locked {
            return Err(DriverError::DeviceBusy);
        }
        state.locked = true;
        state.lock_count += 1;
        Ok(())
    }

    fn unlock_for_configuration(&self) {
        self.state.lock().locked = false;
    }

    fn max_zoom_factor(&self) -> f64 {
        self.max_zoom
    }

    fn zoom_factor(&self) -> f64 {
        self.state.lock().zoom_factor
    }

    fn set_zoom_factor(&self, factor: f64) {
        let factor = factor.clamp(1.0, self.max_zoom.max(1.0));
        self.write(|state| state.zoom_factor = factor);
    }

    fn exposure_duration_range(&self) -> (Duration, Duration) {
        self.exposure_range
    }

    fn exposure_mode(&self) -> ExposureMode {
        self.state.lock().exposure_mode
    }

    fn set_exposure_mode(&self, mode: ExposureMode) {
        if self.supports(Capability::Exposure(mode)) {
            self.write(|state| state.exposure_mode = mode);
        }
    }

    fn set_custom_exposure_duration(&self, duration: Duration) {
        self.write(|state| state.custom_exposure_duration = Some(duration));
    }

    fn set_focus_mode(&self, mode: FocusMode) {
        if self.supports(Capability::Focus(mode)) {
            self.write(|state| state.focus_mode = mode);
        }
    }

    fn set_focus_point_of_interest(&self, point: Point) {
        self.write(|state| state.focus_point_of_interest = Some(point));
    }

    fn set_exposure_point_of_interest(&self, point: Point) {
        self.write(|state| state.exposure_point_of_interest = Some(point));
    }

    fn set_flash_mode(&self, mode: IlluminationMode) {
        self.write(|state| state.flash_mode = mode);
    }

    fn set_torch_mode(&self, mode: IlluminationMode) {
        self.write(|state| state.torch_mode = mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_capture_core::traits::capture_device::DeviceConfigurationLock;

    #[test]
    fn writes_need_the_lock() {
        let device = SimulatedDevice::back();
        device.set_zoom_factor(3.0);
        assert_eq!(device.zoom_factor(), 1.0);
        assert_eq!(device.state().unlocked_writes, 1);

        {
            let locked = DeviceConfigurationLock::acquire(&device).unwrap();
            locked.set_zoom_factor(3.0);
        }
        assert_eq!(device.zoom_factor(), 3.0);
        assert!(!device.state().locked);
    }

    #[test]
    fn busy_device_refuses_lock() {
        let device = SimulatedDevice::front();
        device.set_busy(true);
        assert!(matches!(
            DeviceConfigurationLock::acquire(&device),
            Err(DriverError::DeviceBusy)
        ));
        device.set_busy(false);
        assert!(DeviceConfigurationLock::acquire(&device).is_ok());
    }

    #[test]
    fn front_camera_has_no_flash() {
        let device = SimulatedDevice::front();
        assert!(!device.supports(Capability::Flash(IlluminationMode::On)));
        assert!(device.supports(Capability::Zoom));
        assert!(SimulatedDevice::back().supports(Capability::Torch(IlluminationMode::Auto)));
    }
}
