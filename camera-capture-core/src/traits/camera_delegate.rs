use crate::models::error::ConfigurationError;
use crate::models::orientation::{DeviceOrientation, VideoOrientation};
use crate::models::session::CaptureSession;

/// Event delegate for camera notifications.
///
/// Called from the session worker. Implementations should marshal to the UI
/// thread if needed and must not block on the camera.
pub trait CameraDelegate: Send + Sync {
    /// Called after every committed reconfiguration; hosts recompute preview
    /// geometry here.
    fn on_configuration_changed(&self, session: &CaptureSession);

    /// Called when the tracked orientation changes and connections were
    /// re-oriented.
    fn on_orientation_changed(&self, device: DeviceOrientation, capture: VideoOrientation);

    /// Called when a gesture could not reach the device. The gesture was
    /// abandoned and no caller completion exists to report it.
    fn on_error(&self, error: &ConfigurationError);
}
