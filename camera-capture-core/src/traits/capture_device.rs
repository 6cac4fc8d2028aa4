use std::ops::Deref;
use std::time::Duration;

use crate::models::device::{Capability, DevicePosition, ExposureMode, FocusMode, IlluminationMode, Point};
use crate::models::error::DriverError;

/// One physical camera.
///
/// Implementations use interior mutability: the device is shared between the
/// session worker and whatever thread the driver reports from. Setters are
/// only honored while the device is locked for configuration; use
/// `DeviceConfigurationLock` rather than calling lock/unlock directly.
pub trait CaptureDevice: Send + Sync {
    fn position(&self) -> DevicePosition;

    /// Whether the device offers `capability`.
    fn supports(&self, capability: Capability) -> bool;

    /// Take exclusive configuration access. Fails fast when busy.
    fn lock_for_configuration(&self) -> Result<(), DriverError>;

    fn unlock_for_configuration(&self);

    /// Largest zoom factor of the active format (>= 1.0).
    fn max_zoom_factor(&self) -> f64;

    fn zoom_factor(&self) -> f64;

    fn set_zoom_factor(&self, factor: f64);

    /// `(min, max)` exposure duration of the active format.
    fn exposure_duration_range(&self) -> (Duration, Duration);

    fn exposure_mode(&self) -> ExposureMode;

    fn set_exposure_mode(&self, mode: ExposureMode);

    /// Custom exposure duration; only meaningful in `ExposureMode::Custom`.
    fn set_custom_exposure_duration(&self, duration: Duration);

    fn set_focus_mode(&self, mode: FocusMode);

    fn set_focus_point_of_interest(&self, point: Point);

    fn set_exposure_point_of_interest(&self, point: Point);

    fn set_flash_mode(&self, mode: IlluminationMode);

    fn set_torch_mode(&self, mode: IlluminationMode);
}

/// Scoped configuration lock on a device, released on drop.
pub struct DeviceConfigurationLock<'a> {
    device: &'a dyn CaptureDevice,
}

impl<'a> DeviceConfigurationLock<'a> {
    pub fn acquire(device: &'a dyn CaptureDevice) -> Result<Self, DriverError> {
        device.lock_for_configuration()?;
        Ok(Self { device })
    }
}

impl<'a> Deref for DeviceConfigurationLock<'a> {
    type Target = dyn CaptureDevice + 'a;

    fn deref(&self) -> &Self::Target {
        self.device
    }
}

impl Drop for DeviceConfigurationLock<'_> {
    fn drop(&mut self) {
        self.device.unlock_for_configuration();
    }
}
