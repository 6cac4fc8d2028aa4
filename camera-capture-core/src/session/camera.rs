use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};

use crate::capture::code_detection::CodeHandler;
use crate::capture::still::{CaptureCompletion, ShutterHook};
use crate::controls::exposure::GesturePhase;
use crate::controls::orientation_tracker::OrientationTracker;
use crate::models::capture_result::{CaptureResult, RecordingOutcome};
use crate::models::config::CameraConfiguration;
use crate::models::device::{
    DevicePosition, IlluminationMode, MediaType, OutputMode, Point, QualityPreset, Rect,
    VideoStabilizationMode,
};
use crate::models::error::{CaptureError, ConfigurationError, QueueError, SetupError};
use crate::models::orientation::{DeviceOrientation, ImageOrientation, InterfaceOrientation, VideoOrientation};
use crate::models::session::CaptureSession;
use crate::models::state::{AuthorizationStatus, CameraStatus};
use crate::processing::orientation_math::image_orientation_for;
use crate::session::orchestrator::SessionCore;
use crate::session::queue::SessionQueue;
use crate::traits::camera_delegate::CameraDelegate;
use crate::traits::error_presenter::ErrorPresenter;
use crate::traits::location_provider::LocationProvider;
use crate::traits::media_library::MediaLibrary;
use crate::traits::motion_provider::MotionProvider;
use crate::traits::permission_provider::PermissionProvider;
use crate::traits::session_driver::SessionDriver;

/// Name of the worker thread that owns the session.
pub const SESSION_THREAD_NAME: &str = "camera-session";

/// Camera session orchestrator.
///
/// Generic over the hardware backend via `SessionDriver`. All session state
/// lives on one worker thread; every method here either waits for a job on
/// that worker (`perform`) or queues one (`dispatch`).
///
/// ```text
/// [gestures / host] ──► Camera ──► SessionQueue ──► SessionCore ──► SessionDriver
///                                       ▲                 │
/// [MotionProvider] ─► OrientationTracker┘                 └──► completions, delegate
/// ```
pub struct Camera<D: SessionDriver + 'static> {
    queue: SessionQueue<SessionCore<D>>,
    tracker: OrientationTracker,
    config: RwLock<CameraConfiguration>,
    permissions: RwLock<Option<Arc<dyn PermissionProvider>>>,
}

impl<D: SessionDriver + 'static> Camera<D> {
    pub fn new(
        driver: D,
        motion: Box<dyn MotionProvider>,
        config: CameraConfiguration,
    ) -> Result<Self, SetupError> {
        config.validate().map_err(SetupError::InvalidConfiguration)?;
        let interval = config
            .orientation_sample_interval()
            .map_err(SetupError::InvalidConfiguration)?;

        let tracker = OrientationTracker::new(motion, interval);
        let orientation = tracker.handle();
        let core_config = config.clone();
        let queue = SessionQueue::spawn(SESSION_THREAD_NAME, move |handle| {
            SessionCore::new(driver, core_config, orientation, handle)
        })
        .map_err(|e| SetupError::Worker(e.to_string()))?;

        // Orientation samples arrive on the motion thread; hop onto the worker
        // before touching the session.
        let handle = queue.handle();
        tracker.add_listener(Arc::new(move |orientation: DeviceOrientation| {
            let routed = handle.dispatch(move |core: &mut SessionCore<D>| {
                core.orientation_changed(orientation)
            });
            if routed.is_err() {
                debug!("Orientation change after session shutdown ignored");
            }
        }));

        Ok(Self {
            queue,
            tracker,
            config: RwLock::new(config),
            permissions: RwLock::new(None),
        })
    }

    // --- Collaborators ---

    pub fn set_permission_provider(&self, provider: Arc<dyn PermissionProvider>) {
        *self.permissions.write() = Some(provider);
    }

    pub fn set_media_library(&self, library: Arc<dyn MediaLibrary>) -> Result<(), QueueError> {
        self.queue.perform(move |core| core.set_media_library(Some(library)))
    }

    pub fn set_location_provider(&self, location: Arc<dyn LocationProvider>) -> Result<(), QueueError> {
        self.queue.perform(move |core| core.set_location_provider(Some(location)))
    }

    pub fn set_error_presenter(&self, presenter: Arc<dyn ErrorPresenter>) -> Result<(), QueueError> {
        self.queue.perform(move |core| core.set_error_presenter(Some(presenter)))
    }

    pub fn set_delegate(&self, delegate: Arc<dyn CameraDelegate>) -> Result<(), QueueError> {
        self.queue.perform(move |core| core.set_delegate(Some(delegate)))
    }

    pub fn set_shutter_hook(&self, hook: ShutterHook) -> Result<(), QueueError> {
        self.queue.perform(move |core| core.set_shutter_hook(Some(hook)))
    }

    // --- Configuration ---

    pub fn configuration(&self) -> CameraConfiguration {
        self.config.read().clone()
    }

    /// Replace the configuration. Orientation tracking follows
    /// `should_respond_to_orientation_changes` for a configured session.
    pub fn set_configuration(&self, config: CameraConfiguration) -> Result<(), SetupError> {
        config.validate().map_err(SetupError::InvalidConfiguration)?;
        let respond = config.should_respond_to_orientation_changes;
        *self.config.write() = config.clone();
        let configured = self.queue.perform(move |core| {
            core.set_config(config);
            core.is_configured()
        })?;
        if configured {
            self.follow_orientation(respond);
        }
        Ok(())
    }

    pub fn set_video_stabilization_mode(&self, mode: VideoStabilizationMode) -> Result<(), QueueError> {
        self.config.write().video_stabilization_mode = mode;
        self.queue.perform(move |core| core.set_video_stabilization_mode(mode))
    }

    // --- Permissions ---

    /// Whether the camera can be loaded right now.
    pub fn current_camera_status(&self) -> Result<CameraStatus, QueueError> {
        if !self.queue.perform(|core| core.has_any_device())? {
            return Ok(CameraStatus::NoDeviceFound);
        }
        let Some(permissions) = self.permissions.read().clone() else {
            return Ok(CameraStatus::Ready);
        };
        Ok(match permissions.camera_status() {
            AuthorizationStatus::Authorized => CameraStatus::Ready,
            AuthorizationStatus::NotDetermined => CameraStatus::NotDetermined,
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => CameraStatus::AccessDenied,
        })
    }

    /// Ready, or undetermined while the host prompts for access itself.
    pub fn can_load_camera(&self) -> Result<bool, QueueError> {
        let status = self.current_camera_status()?;
        let prompt = self.config.read().show_access_permission_popup_automatically;
        Ok(status.is_ready() || (status == CameraStatus::NotDetermined && prompt))
    }

    /// Ask for camera access, then microphone access when the session
    /// records audio. `completion` receives the final grant once.
    pub fn request_permissions<F>(&self, completion: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let Some(permissions) = self.permissions.read().clone() else {
            completion(true);
            return;
        };
        let wants_microphone = self
            .session_snapshot()
            .is_some_and(|session| session.output_mode.uses_microphone());

        let provider = Arc::clone(&permissions);
        permissions.request_camera_access(Box::new(move |granted| {
            if !granted || !wants_microphone {
                completion(granted);
                return;
            }
            provider.request_microphone_access(Box::new(completion));
        }));
    }

    fn check_permissions(&self, output_mode: OutputMode) -> Result<(), SetupError> {
        let Some(permissions) = self.permissions.read().clone() else {
            return Ok(());
        };
        let prompt = self.config.read().show_access_permission_popup_automatically;
        match permissions.camera_status() {
            AuthorizationStatus::Authorized => {}
            AuthorizationStatus::NotDetermined if prompt => {}
            AuthorizationStatus::NotDetermined => {
                return Err(SetupError::PermissionUndetermined(MediaType::Video))
            }
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                return Err(SetupError::PermissionDenied(MediaType::Video))
            }
        }
        if output_mode.uses_microphone() && permissions.microphone_status().is_denied() {
            return Err(SetupError::PermissionDenied(MediaType::Audio));
        }
        Ok(())
    }

    // --- Session reconfiguration ---

    /// Set up the capture session, or reshape an existing one.
    pub fn configure(
        &self,
        device: DevicePosition,
        output_mode: OutputMode,
        quality: QualityPreset,
    ) -> Result<(), SetupError> {
        self.check_permissions(output_mode)?;
        self.queue
            .perform(move |core| core.configure(device, output_mode, quality))??;

        let respond = self.config.read().should_respond_to_orientation_changes;
        self.follow_orientation(respond);
        Ok(())
    }

    pub fn switch_device(&self, position: DevicePosition) -> Result<(), ConfigurationError> {
        self.queue.perform(move |core| core.switch_device(position))?
    }

    pub fn switch_output_mode(&self, mode: OutputMode) -> Result<(), ConfigurationError> {
        self.queue.perform(move |core| core.switch_output_mode(mode))?
    }

    pub fn switch_quality(&self, quality: QualityPreset) -> Result<(), ConfigurationError> {
        self.queue.perform(move |core| core.switch_quality(quality))?
    }

    fn follow_orientation(&self, respond: bool) {
        if respond {
            if self.tracker.start() {
                // Pick up whatever the tracker already knows.
                let _ = self.queue.dispatch(|core| {
                    core.refresh_orientation();
                });
            }
        } else {
            self.tracker.stop();
        }
    }

    // --- Orientation ---

    pub fn current_orientation(&self) -> DeviceOrientation {
        self.tracker.current()
    }

    pub fn is_tracking_orientation(&self) -> bool {
        self.tracker.is_tracking()
    }

    /// Re-derive connection orientation now, e.g. after the host view was
    /// covered and uncovered in a different orientation.
    pub fn reset_orientation(&self) -> Result<Option<VideoOrientation>, QueueError> {
        self.queue.perform(|core| core.refresh_orientation())
    }

    pub fn set_interface_orientation(&self, orientation: InterfaceOrientation) -> Result<(), QueueError> {
        self.queue
            .perform(move |core| core.set_interface_orientation(orientation))
    }

    pub fn preview_orientation(&self) -> Result<VideoOrientation, QueueError> {
        self.queue.perform(|core| core.preview_orientation())
    }

    /// Orientation tag for an image taken in the current device orientation.
    pub fn image_orientation_for(&self, mirrored: bool) -> ImageOrientation {
        image_orientation_for(self.tracker.current(), mirrored)
    }

    // --- Capture ---

    /// Take a picture and deliver the raw encoded bytes.
    pub fn capture_picture_data<F>(&self, completion: F)
    where
        F: FnOnce(CaptureResult) + Send + 'static,
    {
        self.capture(true, Box::new(completion));
    }

    /// Take a picture, tag it for display and store it in the media library
    /// when library writes are on.
    pub fn capture_picture<F>(&self, completion: F)
    where
        F: FnOnce(CaptureResult) + Send + 'static,
    {
        self.capture(false, Box::new(completion));
    }

    fn capture(&self, raw: bool, completion: CaptureCompletion) {
        // Shared so a dead worker can still answer the caller.
        let slot = Arc::new(Mutex::new(Some(completion)));
        let job_slot = Arc::clone(&slot);
        let queued = self.queue.dispatch(move |core| {
            if let Some(completion) = job_slot.lock().take() {
                core.capture_still(raw, completion);
            }
        });
        if let Err(e) = queued {
            if let Some(completion) = slot.lock().take() {
                completion(Err(CaptureError::Queue(e)));
            }
        }
    }

    /// Start recording. Returns the temporary file being written.
    pub fn start_recording(&self) -> Result<PathBuf, CaptureError> {
        self.queue.perform(|core| core.start_recording())?
    }

    /// Stop recording; `completion` receives the finished video once.
    pub fn stop_recording<F>(&self, completion: F)
    where
        F: FnOnce(RecordingOutcome) + Send + 'static,
    {
        let completion = Box::new(completion);
        if self
            .queue
            .dispatch(move |core| core.stop_recording(completion))
            .is_err()
        {
            warn!("Stop recording requested after session shutdown");
        }
    }

    pub fn is_recording(&self) -> bool {
        self.queue.perform(|core| core.is_recording()).unwrap_or(false)
    }

    pub fn recorded_duration(&self) -> Duration {
        self.queue
            .perform(|core| core.recorded_duration())
            .unwrap_or_default()
    }

    // --- Illumination ---

    pub fn illumination_mode(&self) -> Result<IlluminationMode, QueueError> {
        self.queue.perform(|core| core.illumination_mode())
    }

    pub fn set_illumination_mode(&self, mode: IlluminationMode) -> Result<IlluminationMode, QueueError> {
        self.queue.perform(move |core| core.set_illumination_mode(mode))
    }

    /// Advance Off → On → Auto → Off and apply. Returns the new mode.
    pub fn cycle_illumination_mode(&self) -> Result<IlluminationMode, QueueError> {
        self.queue.perform(|core| core.cycle_illumination_mode())
    }

    pub fn has_flash(&self) -> bool {
        self.queue.perform(|core| core.has_flash()).unwrap_or(false)
    }

    pub fn has_flash_for(&self, position: DevicePosition) -> bool {
        self.queue
            .perform(move |core| core.has_flash_for(position))
            .unwrap_or(false)
    }

    pub fn has_front_camera(&self) -> bool {
        self.queue
            .perform(|core| core.has_device(DevicePosition::Front))
            .unwrap_or(false)
    }

    // --- Gestures ---

    /// Region of the host view showing the preview, for tap normalization.
    pub fn set_preview_region(&self, region: Rect) -> Result<(), QueueError> {
        self.queue.perform(move |core| core.set_preview_region(region))
    }

    pub fn begin_zoom(&self) -> Result<(), QueueError> {
        self.queue.perform(|core| core.begin_zoom())
    }

    /// Pinch update with the gesture's cumulative scale.
    pub fn zoom(&self, gesture_scale: f64) -> Result<f64, QueueError> {
        self.queue.perform(move |core| core.zoom(gesture_scale))
    }

    /// Pinch update that only applies when every touch is on the preview
    /// region set with `set_preview_region`.
    pub fn zoom_with_touches(&self, gesture_scale: f64, touches: Vec<Point>) -> Result<f64, QueueError> {
        self.queue
            .perform(move |core| core.zoom_with_touches(gesture_scale, &touches))
    }

    pub fn on_focus_gesture(&self, view_point: Point) -> Result<bool, QueueError> {
        self.queue.perform(move |core| core.focus_at(view_point))
    }

    /// Pan update with the gesture's vertical translation since it began.
    pub fn on_exposure_gesture(&self, delta: f64, phase: GesturePhase) -> Result<Option<f64>, QueueError> {
        self.queue.perform(move |core| core.expose(delta, phase))
    }

    pub fn current_zoom(&self) -> Result<f64, QueueError> {
        self.queue.perform(|core| core.current_zoom())
    }

    pub fn max_zoom(&self) -> Result<f64, QueueError> {
        self.queue.perform(|core| core.max_zoom())
    }

    pub fn exposure_value(&self) -> Result<f64, QueueError> {
        self.queue.perform(|core| core.exposure_value())
    }

    pub fn last_focus_point(&self) -> Result<Option<Point>, QueueError> {
        self.queue.perform(|core| core.last_focus_point())
    }

    // --- Code detection ---

    /// Route decoded codes to `handler` until `stop_code_detection`.
    pub fn start_code_detection<F>(&self, handler: F) -> Result<(), ConfigurationError>
    where
        F: Fn(Result<String, CaptureError>) + Send + Sync + 'static,
    {
        let handler: CodeHandler = Arc::new(handler);
        self.queue
            .perform(move |core| core.start_code_detection(handler))?
    }

    pub fn stop_code_detection(&self) -> Result<(), QueueError> {
        self.queue.perform(|core| core.stop_code_detection())
    }

    pub fn is_detecting_codes(&self) -> bool {
        self.queue
            .perform(|core| core.is_detecting_codes())
            .unwrap_or(false)
    }

    // --- State ---

    pub fn is_configured(&self) -> bool {
        self.queue.perform(|core| core.is_configured()).unwrap_or(false)
    }

    /// Copy of the session shape as last committed.
    pub fn session_snapshot(&self) -> Option<CaptureSession> {
        self.queue
            .perform(|core| core.session().cloned())
            .ok()
            .flatten()
    }

    /// Stop tracking, detection, recording and the session itself. The
    /// camera can be configured again afterwards.
    pub fn shutdown(&self) -> Result<(), QueueError> {
        self.tracker.stop();
        self.queue.perform(|core| core.shutdown())?;
        info!("Camera shut down");
        Ok(())
    }
}

impl<D: SessionDriver + 'static> Drop for Camera<D> {
    fn drop(&mut self) {
        self.tracker.stop();
        if let Err(e) = self.queue.perform(|core| core.shutdown()) {
            debug!("Session already stopped: {}", e);
        }
    }
}
