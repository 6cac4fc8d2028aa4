use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::capture::code_detection::{requested_code_types, CodeDetector, CodeHandler};
use crate::capture::still::{CaptureCompletion, ImageDestination, ShutterHook, StillImagePipeline};
use crate::capture::video::{
    temporary_recording_path, RecordingCompletion, RecordingSlot, StopAction, VideoDestination,
};
use crate::controls::exposure::{ExposureController, GesturePhase, PreviewGeometry};
use crate::controls::illumination::IlluminationController;
use crate::controls::orientation_tracker::OrientationHandle;
use crate::controls::zoom::ZoomController;
use crate::models::capture_result::{Location, MetadataObject};
use crate::models::config::CameraConfiguration;
use crate::models::device::{
    Capability, DevicePosition, IlluminationMode, OutputMode, Point, QualityPreset, Rect,
    VideoStabilizationMode,
};
use crate::models::error::{CaptureError, ConfigurationError, DriverError, SetupError};
use crate::models::orientation::{DeviceOrientation, InterfaceOrientation, VideoOrientation};
use crate::models::session::{CaptureSession, SessionInput, SessionOutput};
use crate::processing::orientation_math::{resolve_capture_orientation, video_orientation_for};
use crate::session::queue::QueueHandle;
use crate::session::transaction::Transaction;
use crate::traits::camera_delegate::CameraDelegate;
use crate::traits::capture_device::CaptureDevice;
use crate::traits::error_presenter::ErrorPresenter;
use crate::traits::location_provider::LocationProvider;
use crate::traits::media_library::MediaLibrary;
use crate::traits::session_driver::{
    MetadataCallback, RecordingRequest, SessionDriver, StillCaptureRequest,
};

/// Optional host collaborators.
#[derive(Default)]
struct Collaborators {
    library: Option<Arc<dyn MediaLibrary>>,
    location: Option<Arc<dyn LocationProvider>>,
    presenter: Option<Arc<dyn ErrorPresenter>>,
    delegate: Option<Arc<dyn CameraDelegate>>,
    shutter: Option<ShutterHook>,
}

/// Everything the session worker owns.
///
/// Lives on the `camera-session` thread for its whole life; all access goes
/// through jobs on the `SessionQueue`. Methods therefore take `&mut self`
/// freely and never lock.
pub struct SessionCore<D: SessionDriver + 'static> {
    driver: D,
    config: CameraConfiguration,
    session: Option<CaptureSession>,
    orientation: OrientationHandle,
    interface_orientation: InterfaceOrientation,
    last_capture_orientation: Option<VideoOrientation>,
    zoom: ZoomController,
    exposure: ExposureController,
    illumination: IlluminationController,
    preview: PreviewGeometry,
    recording: RecordingSlot,
    codes: CodeDetector,
    collaborators: Collaborators,
    queue: QueueHandle<SessionCore<D>>,
}

impl<D: SessionDriver + 'static> SessionCore<D> {
    pub fn new(
        driver: D,
        config: CameraConfiguration,
        orientation: OrientationHandle,
        queue: QueueHandle<SessionCore<D>>,
    ) -> Self {
        Self {
            driver,
            config,
            session: None,
            orientation,
            interface_orientation: InterfaceOrientation::Unknown,
            last_capture_orientation: None,
            zoom: ZoomController::new(),
            exposure: ExposureController::new(),
            illumination: IlluminationController::default(),
            preview: PreviewGeometry::default(),
            recording: RecordingSlot::default(),
            codes: CodeDetector::default(),
            collaborators: Collaborators::default(),
            queue,
        }
    }

    // --- Collaborators and configuration ---

    pub fn set_media_library(&mut self, library: Option<Arc<dyn MediaLibrary>>) {
        self.collaborators.library = library;
    }

    pub fn set_location_provider(&mut self, location: Option<Arc<dyn LocationProvider>>) {
        self.collaborators.location = location;
    }

    pub fn set_error_presenter(&mut self, presenter: Option<Arc<dyn ErrorPresenter>>) {
        self.collaborators.presenter = presenter;
    }

    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn CameraDelegate>>) {
        self.collaborators.delegate = delegate;
    }

    pub fn set_shutter_hook(&mut self, hook: Option<ShutterHook>) {
        self.collaborators.shutter = hook;
    }

    pub fn config(&self) -> &CameraConfiguration {
        &self.config
    }

    /// Replace the configuration. Connection settings that depend on it are
    /// re-applied to a configured session.
    pub fn set_config(&mut self, config: CameraConfiguration) {
        self.config = config;
        if self.is_configured() {
            self.apply_video_connection();
            self.refresh_orientation();
        }
    }

    pub fn set_video_stabilization_mode(&mut self, mode: VideoStabilizationMode) {
        self.config.video_stabilization_mode = mode;
        self.apply_video_connection();
    }

    pub fn set_preview_region(&mut self, region: Rect) {
        self.preview = PreviewGeometry::new(region);
    }

    // --- Queries ---

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.is_configured)
    }

    fn devices(&self) -> Vec<Arc<dyn CaptureDevice>> {
        self.driver.video_devices()
    }

    fn device_at(&self, position: DevicePosition) -> Option<Arc<dyn CaptureDevice>> {
        self.devices()
            .into_iter()
            .find(|device| device.position() == position)
    }

    fn active_device(&self) -> Option<Arc<dyn CaptureDevice>> {
        self.device_at(self.session.as_ref()?.device)
    }

    pub fn has_any_device(&self) -> bool {
        !self.devices().is_empty()
    }

    pub fn has_device(&self, position: DevicePosition) -> bool {
        self.device_at(position).is_some()
    }

    pub fn has_flash_for(&self, position: DevicePosition) -> bool {
        self.device_at(position)
            .is_some_and(|device| device.supports(Capability::Flash(IlluminationMode::On)))
    }

    /// Flash availability of the active camera, or of the back camera before
    /// the session is configured.
    pub fn has_flash(&self) -> bool {
        let position = self
            .session
            .as_ref()
            .map_or(DevicePosition::Back, |session| session.device);
        self.has_flash_for(position)
    }

    pub fn current_zoom(&self) -> f64 {
        self.zoom.current_scale()
    }

    pub fn max_zoom(&self) -> f64 {
        self.zoom.max_scale()
    }

    pub fn exposure_value(&self) -> f64 {
        self.exposure.exposure_value()
    }

    pub fn last_focus_point(&self) -> Option<Point> {
        self.exposure.last_focus_point()
    }

    pub fn illumination_mode(&self) -> IlluminationMode {
        self.illumination.mode()
    }

    pub fn is_recording(&self) -> bool {
        self.driver.is_recording()
    }

    pub fn recorded_duration(&self) -> Duration {
        if self.driver.is_recording() {
            self.driver.recorded_duration()
        } else {
            Duration::ZERO
        }
    }

    pub fn is_detecting_codes(&self) -> bool {
        self.codes.is_active()
    }

    // --- Reconfiguration ---

    /// Build the session graph, or apply the differences when one exists.
    pub fn configure(
        &mut self,
        device: DevicePosition,
        output_mode: OutputMode,
        quality: QualityPreset,
    ) -> Result<(), SetupError> {
        if self.is_configured() {
            self.switch_device(device)?;
            self.switch_output_mode(output_mode)?;
            self.switch_quality(quality)?;
            return Ok(());
        }

        if !self.has_any_device() {
            return Err(SetupError::NoDeviceFound);
        }
        if !self.has_device(device) {
            return Err(ConfigurationError::DeviceUnavailable { position: device }.into());
        }

        let mut session = CaptureSession::new(device, output_mode, quality);
        {
            let mut tx = Transaction::begin(&mut self.driver, &mut session);
            tx.add_input(SessionInput::Camera(device))?;
            if output_mode.uses_microphone() {
                tx.add_input(SessionInput::Microphone)?;
            }
            tx.add_output(SessionOutput::for_mode(output_mode))?;
            tx.set_preset(quality.resolve(output_mode))?;
            tx.commit();
        }
        session.is_configured = true;
        self.driver.start_running();
        session.is_running = true;
        info!(
            "Session configured: {} camera, {} output, {} quality",
            device, output_mode, quality
        );
        self.session = Some(session);

        self.after_reconfiguration();
        Ok(())
    }

    /// Swap the camera input. The microphone stays attached.
    pub fn switch_device(&mut self, position: DevicePosition) -> Result<(), ConfigurationError> {
        let result = self.try_switch_device(position);
        self.finish_switch(result)
    }

    fn try_switch_device(&mut self, position: DevicePosition) -> Result<bool, ConfigurationError> {
        let available = self.has_device(position);
        let session = self
            .session
            .as_mut()
            .ok_or(ConfigurationError::NotConfigured { parameter: "device" })?;
        if session.device == position {
            return Ok(false);
        }
        if !available {
            return Err(ConfigurationError::DeviceUnavailable { position });
        }

        let mut tx = Transaction::begin(&mut self.driver, session);
        let cameras = tx.session().camera_inputs();
        for input in cameras {
            tx.remove_input(input);
        }
        tx.add_input(SessionInput::Camera(position))?;
        tx.set_device(position);
        tx.commit();
        info!("Switched to {} camera", position);
        Ok(true)
    }

    /// Swap the capture output (and microphone) for `mode`, re-applying the
    /// quality preset inside the same transaction.
    pub fn switch_output_mode(&mut self, mode: OutputMode) -> Result<(), ConfigurationError> {
        let recording = self.driver.is_recording();
        let previous = self.session.as_ref().map(|session| session.output_mode);
        let result = self.try_switch_output_mode(mode, recording);
        if matches!(result, Ok(true)) && previous.is_some_and(OutputMode::is_video) && !mode.is_video() {
            let devices = self.devices();
            self.illumination.extinguish_torch(&devices);
        }
        self.finish_switch(result)
    }

    fn try_switch_output_mode(&mut self, mode: OutputMode, recording: bool) -> Result<bool, ConfigurationError> {
        let session = self.session.as_mut().ok_or(ConfigurationError::NotConfigured {
            parameter: "output mode",
        })?;
        let previous = session.output_mode;
        if previous == mode {
            return Ok(false);
        }
        if recording {
            return Err(ConfigurationError::RecordingInProgress { mode });
        }

        let old_output = SessionOutput::for_mode(previous);
        let new_output = SessionOutput::for_mode(mode);
        let quality = session.quality;

        let mut tx = Transaction::begin(&mut self.driver, session);
        if old_output != new_output {
            tx.remove_output(old_output);
        }
        if !mode.uses_microphone() {
            tx.remove_input(SessionInput::Microphone);
        }
        tx.add_output(new_output)?;
        if mode.uses_microphone() {
            tx.add_input(SessionInput::Microphone)?;
        }
        tx.set_preset(quality.resolve(mode))?;
        tx.set_output_mode(mode);
        tx.commit();
        info!("Switched output mode {} -> {}", previous, mode);
        Ok(true)
    }

    /// Apply a new quality preset, resolved for the current output mode.
    pub fn switch_quality(&mut self, quality: QualityPreset) -> Result<(), ConfigurationError> {
        let result = self.try_switch_quality(quality);
        match result {
            Ok(true) => {
                self.notify_configuration_changed();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) => {
                self.report_configuration_error(&e);
                Err(e)
            }
        }
    }

    fn try_switch_quality(&mut self, quality: QualityPreset) -> Result<bool, ConfigurationError> {
        let session = self
            .session
            .as_mut()
            .ok_or(ConfigurationError::NotConfigured { parameter: "quality" })?;
        let resolved = quality.resolve(session.output_mode);
        if session.quality == quality && session.preset == Some(resolved) {
            return Ok(false);
        }

        let mut tx = Transaction::begin(&mut self.driver, session);
        tx.set_preset(resolved)?;
        tx.set_quality(quality);
        tx.commit();
        info!("Quality set to {} ({})", quality, resolved);
        Ok(true)
    }

    fn finish_switch(&mut self, result: Result<bool, ConfigurationError>) -> Result<(), ConfigurationError> {
        match result {
            Ok(true) => {
                self.after_reconfiguration();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) => {
                self.report_configuration_error(&e);
                Err(e)
            }
        }
    }

    /// Follow-up work after the device or output mode changed: zoom range,
    /// illumination, connection orientation and settings, delegate.
    fn after_reconfiguration(&mut self) {
        self.reset_zoom();
        if let Some(mode) = self.session.as_ref().map(|session| session.output_mode) {
            let devices = self.devices();
            self.illumination.apply(mode, &devices);
        }
        self.refresh_orientation();
        self.apply_video_connection();
        self.notify_configuration_changed();
    }

    fn reset_zoom(&mut self) {
        self.zoom = ZoomController::new();
        let Some(device) = self.active_device() else {
            return;
        };
        self.zoom.set_max_scale(device.max_zoom_factor());
        if let Err(e) = self.zoom.update(device.as_ref(), 1.0) {
            warn!("Could not reset zoom on {} camera: {}", device.position(), e);
        }
        debug!("Zoom range 1.0..={}", self.zoom.max_scale());
    }

    fn apply_video_connection(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if !session.has_output(SessionOutput::Movie) {
            return;
        }
        let mirrored = self.is_mirrored(session.device);
        let stabilization = self.config.video_stabilization_mode;
        self.driver.configure_video_connection(mirrored, stabilization);
    }

    fn is_mirrored(&self, device: DevicePosition) -> bool {
        device == DevicePosition::Front && self.config.should_flip_front_camera_image
    }

    fn notify_configuration_changed(&self) {
        if let (Some(delegate), Some(session)) = (&self.collaborators.delegate, &self.session) {
            delegate.on_configuration_changed(session);
        }
    }

    // --- Orientation ---

    /// Re-derive the capture orientation and push it to the active output's
    /// connection.
    pub fn refresh_orientation(&mut self) -> Option<VideoOrientation> {
        let output = SessionOutput::for_mode(self.session.as_ref()?.output_mode);
        let last_known = self
            .driver
            .connection_orientation(output)
            .or(self.last_capture_orientation);
        let capture = resolve_capture_orientation(
            self.orientation.current(),
            last_known,
            self.interface_orientation,
        );
        if self.driver.has_video_connection(output) {
            self.driver.set_connection_orientation(output, capture);
        }
        self.last_capture_orientation = Some(capture);
        Some(capture)
    }

    /// Tracker notification, already re-entered onto the worker.
    pub fn orientation_changed(&mut self, device: DeviceOrientation) {
        let Some(capture) = self.refresh_orientation() else {
            return;
        };
        debug!("Orientation {:?} -> capture {:?}", device, capture);
        if let Some(delegate) = &self.collaborators.delegate {
            delegate.on_orientation_changed(device, capture);
        }
    }

    pub fn set_interface_orientation(&mut self, orientation: InterfaceOrientation) {
        self.interface_orientation = orientation;
    }

    /// Orientation the preview should be drawn in.
    pub fn preview_orientation(&self) -> VideoOrientation {
        if self.config.should_keep_view_at_orientation_changes {
            return VideoOrientation::Portrait;
        }
        video_orientation_for(self.orientation.current())
            .or(self.last_capture_orientation)
            .unwrap_or_default()
    }

    // --- Illumination ---

    pub fn set_illumination_mode(&mut self, mode: IlluminationMode) -> IlluminationMode {
        self.illumination.set_mode(mode);
        self.apply_illumination();
        mode
    }

    pub fn cycle_illumination_mode(&mut self) -> IlluminationMode {
        let mode = self.illumination.cycle();
        self.apply_illumination();
        mode
    }

    fn apply_illumination(&self) {
        if let Some(session) = self.session.as_ref() {
            self.illumination.apply(session.output_mode, &self.devices());
        }
    }

    // --- Gestures ---

    pub fn begin_zoom(&mut self) {
        self.zoom.begin();
    }

    /// Pinch update. Returns the scale in effect afterwards.
    pub fn zoom(&mut self, gesture_scale: f64) -> f64 {
        if !self.config.should_enable_pinch_to_zoom {
            return self.zoom.current_scale();
        }
        let Some(device) = self.active_device() else {
            return self.zoom.current_scale();
        };
        if let Err(e) = self.zoom.update(device.as_ref(), gesture_scale) {
            self.report_gesture_failure("zoom", device.position(), e);
        }
        self.zoom.current_scale()
    }

    /// Pinch update carrying the touch positions. Ignored unless every touch
    /// is on the preview region.
    pub fn zoom_with_touches(&mut self, gesture_scale: f64, touches: &[Point]) -> f64 {
        if !self.preview.contains_all(touches) {
            debug!("Pinch outside the preview ignored");
            return self.zoom.current_scale();
        }
        self.zoom(gesture_scale)
    }

    /// Tap-to-focus at a view-space point. Returns whether it was handled.
    pub fn focus_at(&mut self, view_point: Point) -> bool {
        if !self.config.should_enable_tap_to_focus {
            return false;
        }
        let Some(device) = self.active_device() else {
            return false;
        };
        let point_of_interest = self.preview.point_of_interest(view_point);
        let focus_mode = self.config.focus_mode;
        let exposure_mode = self.config.exposure_mode;
        if let Err(e) = self.exposure.focus(
            device.as_ref(),
            view_point,
            point_of_interest,
            focus_mode,
            exposure_mode,
        ) {
            self.report_gesture_failure("focus", device.position(), e);
        }
        true
    }

    /// Pan-to-expose. Returns the live exposure value, or None when the
    /// gesture is disabled or nothing is configured.
    pub fn expose(&mut self, delta: f64, phase: GesturePhase) -> Option<f64> {
        if !self.config.should_enable_exposure {
            return None;
        }
        let device = self.active_device()?;
        match self.exposure.drag(device.as_ref(), delta, phase) {
            Ok(Some(duration)) => debug!("Exposure duration {:?}", duration),
            Ok(None) => debug!("{} camera not in custom exposure, duration skipped", device.position()),
            Err(e) => self.report_gesture_failure("exposure", device.position(), e),
        }
        Some(self.exposure.exposure_value())
    }

    fn report_gesture_failure(&self, gesture: &'static str, position: DevicePosition, e: DriverError) {
        warn!("Abandoned {} on {} camera: {}", gesture, position, e);
        if let Some(delegate) = &self.collaborators.delegate {
            delegate.on_error(&ConfigurationError::DeviceLocked {
                position,
                parameter: gesture,
            });
        }
    }

    // --- Still capture ---

    /// Issue a still capture. `raw` delivers encoded bytes only.
    pub fn capture_still(&mut self, raw: bool, completion: CaptureCompletion) {
        match self.prepare_still(raw) {
            Ok((request, pipeline)) => {
                self.driver.capture_still_image(
                    request,
                    Box::new(move |outcome| pipeline.complete(outcome, completion)),
                );
            }
            Err(e) => {
                self.report_capture_error(&e);
                completion(Err(e));
            }
        }
    }

    fn prepare_still(&mut self, raw: bool) -> Result<(StillCaptureRequest, StillImagePipeline), CaptureError> {
        let session = self
            .session
            .as_ref()
            .filter(|session| session.is_configured)
            .ok_or(CaptureError::NoActiveSession)?;
        if session.output_mode != OutputMode::StillImage {
            return Err(CaptureError::WrongOutputMode(session.output_mode));
        }
        if !self.driver.has_video_connection(SessionOutput::StillImage) {
            return Err(CaptureError::NoVideoConnection);
        }
        let device = session.device;
        let mirrored = self.is_mirrored(device);

        let orientation = self.refresh_orientation().unwrap_or_default();
        self.illumination
            .apply(OutputMode::StillImage, &self.devices());

        if !raw && self.config.animate_shutter {
            if let Some(shutter) = &self.collaborators.shutter {
                shutter();
            }
        }

        let destination = if raw { None } else { self.image_destination() };
        let pipeline = StillImagePipeline {
            device,
            device_orientation: self.orientation.current(),
            mirrored,
            location: self.current_location(),
            raw,
            destination,
        };
        Ok((StillCaptureRequest { orientation, mirrored }, pipeline))
    }

    fn image_destination(&self) -> Option<ImageDestination> {
        if !self.config.write_files_to_library {
            return None;
        }
        let library = self.collaborators.library.clone()?;
        Some(ImageDestination {
            library,
            album: self.config.image_album_name.clone(),
        })
    }

    fn video_destination(&self) -> Option<VideoDestination> {
        if !self.config.write_files_to_library {
            return None;
        }
        let library = self.collaborators.library.clone()?;
        Some(VideoDestination {
            library,
            album: self.config.video_album_name.clone(),
        })
    }

    fn current_location(&self) -> Option<Location> {
        if !self.config.should_use_location_services {
            return None;
        }
        self.collaborators.location.as_ref()?.latest_location()
    }

    // --- Recording ---

    /// Start writing a movie to a fresh temporary file.
    pub fn start_recording(&mut self) -> Result<PathBuf, CaptureError> {
        let result = self.try_start_recording();
        if let Err(e) = &result {
            self.report_capture_error(e);
        }
        result
    }

    fn try_start_recording(&mut self) -> Result<PathBuf, CaptureError> {
        let session = self
            .session
            .as_ref()
            .filter(|session| session.is_configured)
            .ok_or(CaptureError::NoActiveSession)?;
        let mode = session.output_mode;
        if !mode.is_video() {
            return Err(CaptureError::WrongOutputMode(mode));
        }
        if self.driver.is_recording() {
            if let Some(path) = self.recording.active_path() {
                debug!("Already recording to {}", path.display());
                return Ok(path.to_path_buf());
            }
        }
        if !self.driver.has_video_connection(SessionOutput::Movie) {
            return Err(CaptureError::NoVideoConnection);
        }

        let path = temporary_recording_path(&self.config.temporary_directory);
        let location = self.current_location();
        self.illumination.apply(mode, &self.devices());
        let orientation = self.refresh_orientation().unwrap_or_default();

        let queue = self.queue.clone();
        self.driver.start_recording(
            RecordingRequest {
                path: path.clone(),
                orientation,
                location,
            },
            Box::new(move |result| {
                let finished = queue.dispatch(move |core: &mut SessionCore<D>| core.recording_finished(result));
                if finished.is_err() {
                    warn!("Recording finished after the session worker stopped");
                }
            }),
        )?;
        self.recording.begin(path.clone(), location);
        Ok(path)
    }

    /// Stop the recording in progress. `completion` fires once the file is
    /// finished, or at once with a finished recording nobody collected.
    /// Without either it is never called.
    pub fn stop_recording(&mut self, completion: RecordingCompletion) {
        match self.recording.stop(completion, self.driver.is_recording()) {
            StopAction::StopHardware => self.driver.stop_recording(),
            StopAction::Delivered => debug!("Delivered parked recording"),
            StopAction::Nothing => debug!("Stop requested with nothing recording"),
        }
    }

    fn recording_finished(&mut self, result: Result<PathBuf, DriverError>) {
        let destination = self.video_destination();
        self.recording.finish(result, destination);
    }

    // --- Code detection ---

    /// Attach the metadata output and route decoded codes to `handler`.
    pub fn start_code_detection(&mut self, handler: CodeHandler) -> Result<(), ConfigurationError> {
        let session = self.session.as_mut().ok_or(ConfigurationError::NotConfigured {
            parameter: "code detection",
        })?;
        if !session.has_output(SessionOutput::Metadata) {
            let mut tx = Transaction::begin(&mut self.driver, session);
            tx.add_output(SessionOutput::Metadata)?;
            tx.commit();
        }

        let types = requested_code_types(&self.driver.available_code_types());
        let queue = self.queue.clone();
        let callback: MetadataCallback = Arc::new(move |objects: Vec<MetadataObject>| {
            let _ = queue.dispatch(move |core: &mut SessionCore<D>| core.deliver_codes(&objects));
        });
        self.driver.set_metadata_callback(&types, Some(callback));
        self.codes.start(handler);
        info!("Code detection started for {:?}", types);
        Ok(())
    }

    pub fn stop_code_detection(&mut self) {
        let was_active = self.codes.is_active();
        self.codes.stop();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.has_output(SessionOutput::Metadata) {
            return;
        }
        self.driver.set_metadata_callback(&[], None);
        let mut tx = Transaction::begin(&mut self.driver, session);
        tx.remove_output(SessionOutput::Metadata);
        tx.commit();
        if was_active {
            info!("Code detection stopped");
        }
    }

    fn deliver_codes(&mut self, objects: &[MetadataObject]) {
        self.codes.deliver(objects);
    }

    // --- Teardown ---

    /// Stop detection and recording, stop the session and forget it.
    pub fn shutdown(&mut self) {
        self.stop_code_detection();
        if self.driver.is_recording() {
            self.driver.stop_recording();
        }
        if let Some(mut session) = self.session.take() {
            if session.is_running {
                self.driver.stop_running();
                session.is_running = false;
            }
            let outputs: Vec<SessionOutput> = session.outputs.iter().copied().collect();
            let inputs: Vec<SessionInput> = session.inputs.iter().copied().collect();
            let mut tx = Transaction::begin(&mut self.driver, &mut session);
            for output in outputs {
                tx.remove_output(output);
            }
            for input in inputs {
                tx.remove_input(input);
            }
            tx.commit();
            info!("Capture session stopped and removed");
        }
        self.zoom = ZoomController::new();
        self.last_capture_orientation = None;
    }

    // --- Reporting ---

    fn present(&self, title: &str, message: &str) {
        if !self.config.show_errors_to_users {
            return;
        }
        if let Some(presenter) = &self.collaborators.presenter {
            presenter.show_error(title, message);
        }
    }

    fn report_configuration_error(&self, e: &ConfigurationError) {
        warn!("Reconfiguration of {} rejected: {}", e.parameter(), e);
        self.present("Camera configuration failed", &e.to_string());
    }

    fn report_capture_error(&self, e: &CaptureError) {
        match e {
            CaptureError::WrongOutputMode(OutputMode::StillImage) => {
                warn!("Capture rejected: {}", e);
                self.present("Capture session output still image", "I can only take pictures");
            }
            CaptureError::WrongOutputMode(_) => {
                warn!("Capture rejected: {}", e);
                self.present("Capture session output mode video", "I can only record videos");
            }
            CaptureError::NoActiveSession => {
                warn!("Capture rejected: {}", e);
                self.present("No capture session setup", "I can't take any picture");
            }
            _ => {
                error!("Capture failed: {}", e);
                self.present("Capture failed", &e.to_string());
            }
        }
    }
}
