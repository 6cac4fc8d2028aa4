use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::device::{ExposureMode, FocusMode, VideoStabilizationMode};

/// Behavior switches for a camera.
///
/// Every field has a default, so a JSON document only needs to name the
/// fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfiguration {
    /// Album that receives still images (None = library default).
    pub image_album_name: Option<String>,

    /// Album that receives recorded videos (None = library default).
    pub video_album_name: Option<String>,

    /// Forward errors to the `ErrorPresenter` (default: false).
    /// Errors are still returned and logged when this is off.
    pub show_errors_to_users: bool,

    /// Treat an undetermined camera permission as loadable, because the host
    /// will prompt for it (default: true).
    pub show_access_permission_popup_automatically: bool,

    /// Hand captures to the `MediaLibrary`, when one is attached (default: true).
    pub write_files_to_library: bool,

    /// Track device orientation while the session is configured (default: true).
    pub should_respond_to_orientation_changes: bool,

    /// Mirror front-camera captures (default: false).
    pub should_flip_front_camera_image: bool,

    /// Keep the preview in portrait regardless of rotation (default: false).
    pub should_keep_view_at_orientation_changes: bool,

    pub should_enable_tap_to_focus: bool,
    pub should_enable_pinch_to_zoom: bool,
    pub should_enable_exposure: bool,

    /// Run the shutter hook before delivering a picture (default: true).
    pub animate_shutter: bool,

    /// Attach the latest location to saves and recordings (default: false).
    pub should_use_location_services: bool,

    /// Focus mode applied on tap-to-focus.
    pub focus_mode: FocusMode,

    /// Exposure mode applied on tap-to-focus.
    pub exposure_mode: ExposureMode,

    /// Preferred stabilization on the movie connection.
    pub video_stabilization_mode: VideoStabilizationMode,

    /// Directory for in-flight recordings.
    pub temporary_directory: PathBuf,

    /// Gravity sampling rate for orientation tracking (default: 30 Hz).
    pub orientation_sample_rate_hz: f64,
}

impl CameraConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        self.orientation_sample_interval()?;
        if self.temporary_directory.as_os_str().is_empty() {
            return Err("temporary directory must not be empty".into());
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("failed to parse configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Time between gravity samples. Fails for rates whose period cannot be
    /// represented as a `Duration`.
    pub fn orientation_sample_interval(&self) -> Result<Duration, String> {
        let rate = self.orientation_sample_rate_hz;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(format!("orientation sample rate must be positive: {}", rate));
        }
        Duration::try_from_secs_f64(1.0 / rate)
            .map_err(|_| format!("orientation sample rate is too low: {}", rate))
    }
}

impl Default for CameraConfiguration {
    fn default() -> Self {
        Self {
            image_album_name: None,
            video_album_name: None,
            show_errors_to_users: false,
            show_access_permission_popup_automatically: true,
            write_files_to_library: true,
            should_respond_to_orientation_changes: true,
            should_flip_front_camera_image: false,
            should_keep_view_at_orientation_changes: false,
            should_enable_tap_to_focus: true,
            should_enable_pinch_to_zoom: true,
            should_enable_exposure: true,
            animate_shutter: true,
            should_use_location_services: false,
            focus_mode: FocusMode::ContinuousAutoFocus,
            exposure_mode: ExposureMode::ContinuousAutoExposure,
            video_stabilization_mode: VideoStabilizationMode::Auto,
            temporary_directory: std::env::temp_dir(),
            orientation_sample_rate_hz: 30.0,
        }
    }
}
