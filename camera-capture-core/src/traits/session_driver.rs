use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::models::capture_result::{CodeType, Location, MetadataObject};
use crate::models::device::{QualityPreset, VideoStabilizationMode};
use crate::models::error::DriverError;
use crate::models::orientation::VideoOrientation;
use crate::models::session::{SessionInput, SessionOutput};
use crate::traits::capture_device::CaptureDevice;

/// Completion for a still capture: encoded bytes, `None` when the hardware
/// delivered no sample, or a driver error.
pub type StillImageCallback =
    Box<dyn FnOnce(Result<Option<Vec<u8>>, DriverError>) + Send + 'static>;

/// Completion for a recording: the finished file, or a driver error.
pub type RecordingCallback = Box<dyn FnOnce(Result<PathBuf, DriverError>) + Send + 'static>;

/// Receives each batch of detected metadata objects.
pub type MetadataCallback = Arc<dyn Fn(Vec<MetadataObject>) + Send + Sync + 'static>;

/// Connection settings for one still capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StillCaptureRequest {
    pub orientation: VideoOrientation,
    pub mirrored: bool,
}

/// Settings for one recording.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingRequest {
    pub path: PathBuf,
    pub orientation: VideoOrientation,
    pub location: Option<Location>,
}

/// The hardware capture session.
///
/// Only the session worker ever holds the driver, so methods take `&mut self`.
/// Structural changes (inputs, outputs, preset) are made between
/// `begin_configuration` and `commit_configuration`; the driver applies them
/// as one step at commit. Callbacks may fire on any thread.
pub trait SessionDriver: Send {
    /// Cameras available to the session.
    fn video_devices(&self) -> Vec<Arc<dyn CaptureDevice>>;

    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    fn add_input(&mut self, input: SessionInput) -> Result<(), DriverError>;

    fn remove_input(&mut self, input: SessionInput);

    fn add_output(&mut self, output: SessionOutput) -> Result<(), DriverError>;

    fn remove_output(&mut self, output: SessionOutput);

    fn can_set_preset(&self, preset: QualityPreset) -> bool;

    fn set_preset(&mut self, preset: QualityPreset);

    fn start_running(&mut self);

    fn stop_running(&mut self);

    /// Whether `output` has an enabled video connection.
    fn has_video_connection(&self, output: SessionOutput) -> bool;

    fn connection_orientation(&self, output: SessionOutput) -> Option<VideoOrientation>;

    fn set_connection_orientation(&mut self, output: SessionOutput, orientation: VideoOrientation);

    /// Mirroring and stabilization for the movie connection.
    fn configure_video_connection(&mut self, mirrored: bool, stabilization: VideoStabilizationMode);

    fn capture_still_image(&mut self, request: StillCaptureRequest, completion: StillImageCallback);

    fn start_recording(
        &mut self,
        request: RecordingRequest,
        completion: RecordingCallback,
    ) -> Result<(), DriverError>;

    /// Finish the active recording; its completion fires afterwards.
    fn stop_recording(&mut self);

    fn is_recording(&self) -> bool;

    fn recorded_duration(&self) -> Duration;

    /// Code symbologies the metadata output can report.
    fn available_code_types(&self) -> Vec<CodeType>;

    /// Route metadata batches of `types` to `callback`; `None` detaches.
    fn set_metadata_callback(&mut self, types: &[CodeType], callback: Option<MetadataCallback>);
}
