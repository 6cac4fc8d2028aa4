//! Simulated capture session driver.
//!
//! `SimulatedSession` is handed to the camera, which moves it onto its worker
//! thread. `SimulatedSessionHandle` shares the same state and stays with the
//! test to inspect the graph and to fire hardware callbacks from outside.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::Mutex;

use camera_capture_core::models::capture_result::{CodeType, MetadataObject};
use camera_capture_core::models::device::{QualityPreset, VideoStabilizationMode};
use camera_capture_core::models::error::DriverError;
use camera_capture_core::models::orientation::VideoOrientation;
use camera_capture_core::models::session::{SessionInput, SessionOutput};
use camera_capture_core::traits::capture_device::CaptureDevice;
use camera_capture_core::traits::session_driver::{
    MetadataCallback, RecordingCallback, RecordingRequest, SessionDriver, StillCaptureRequest,
    StillImageCallback,
};

use crate::device::SimulatedDevice;

/// Inputs, outputs and preset as of one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSnapshot {
    pub inputs: BTreeSet<SessionInput>,
    pub outputs: BTreeSet<SessionOutput>,
    pub preset: Option<QualityPreset>,
}

/// What the still output answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum StillResponse {
    Bytes(Vec<u8>),
    NoSample,
    Fail(DriverError),
}

struct ActiveRecording {
    request: RecordingRequest,
    completion: RecordingCallback,
    started: Instant,
}

struct SessionState {
    devices: Vec<Arc<SimulatedDevice>>,
    in_configuration: bool,
    inputs: BTreeSet<SessionInput>,
    outputs: BTreeSet<SessionOutput>,
    preset: Option<QualityPreset>,
    unsupported_presets: HashSet<QualityPreset>,
    rejected_inputs: HashSet<SessionInput>,
    rejected_outputs: HashSet<SessionOutput>,
    disconnected_outputs: HashSet<SessionOutput>,
    running: bool,
    commits: Vec<GraphSnapshot>,
    changes_outside_configuration: u32,
    connection_orientations: HashMap<SessionOutput, VideoOrientation>,
    video_connection: Option<(bool, VideoStabilizationMode)>,
    still_response: StillResponse,
    still_requests: Vec<StillCaptureRequest>,
    recording: Option<ActiveRecording>,
    recording_requests: Vec<RecordingRequest>,
    recording_failure: Option<DriverError>,
    available_code_types: Vec<CodeType>,
    metadata: Option<(Vec<CodeType>, MetadataCallback)>,
}

impl SessionState {
    fn new(devices: Vec<Arc<SimulatedDevice>>) -> Self {
        Self {
            devices,
            in_configuration: false,
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            preset: None,
            unsupported_presets: HashSet::new(),
            rejected_inputs: HashSet::new(),
            rejected_outputs: HashSet::new(),
            disconnected_outputs: HashSet::new(),
            running: false,
            commits: Vec::new(),
            changes_outside_configuration: 0,
            connection_orientations: HashMap::new(),
            video_connection: None,
            still_response: StillResponse::Bytes(vec![0xff, 0xd8, 0xff, 0xe0]),
            still_requests: Vec::new(),
            recording: None,
            recording_requests: Vec::new(),
            recording_failure: None,
            available_code_types: vec![CodeType::Qr, CodeType::Ean13, CodeType::Other],
            metadata: None,
        }
    }

    fn structural_change(&mut self) {
        if !self.in_configuration {
            self.changes_outside_configuration += 1;
        }
    }
}

/// In-memory `SessionDriver`.
pub struct SimulatedSession {
    state: Arc<Mutex<SessionState>>,
}

/// Test-side view of a `SimulatedSession`.
#[derive(Clone)]
pub struct SimulatedSessionHandle {
    state: Arc<Mutex<SessionState>>,
}

impl SimulatedSession {
    pub fn new(devices: Vec<Arc<SimulatedDevice>>) -> (Self, SimulatedSessionHandle) {
        let state = Arc::new(Mutex::new(SessionState::new(devices)));
        (
            Self {
                state: Arc::clone(&state),
            },
            SimulatedSessionHandle { state },
        )
    }

    /// Back and front camera, as on a typical phone.
    pub fn with_default_devices() -> (
        Self,
        SimulatedSessionHandle,
        Arc<SimulatedDevice>,
        Arc<SimulatedDevice>,
    ) {
        let back = Arc::new(SimulatedDevice::back());
        let front = Arc::new(SimulatedDevice::front());
        let (session, handle) = Self::new(vec![Arc::clone(&back), Arc::clone(&front)]);
        (session, handle, back, front)
    }
}

impl SessionDriver for SimulatedSession {
    fn video_devices(&self) -> Vec<Arc<dyn CaptureDevice>> {
        self.state
            .lock()
            .devices
            .iter()
            .map(|device| Arc::clone(device) as Arc<dyn CaptureDevice>)
            .collect()
    }

    fn begin_configuration(&mut self) {
        self.state.lock().in_configuration = true;
    }

    fn commit_configuration(&mut self) {
        let mut state = self.state.lock();
        state.in_configuration = false;
        let snapshot = GraphSnapshot {
            inputs: state.inputs.clone(),
            outputs: state.outputs.clone(),
            preset: state.preset,
        };
        state.commits.push(snapshot);
    }

    fn add_input(&mut self, input: SessionInput) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.rejected_inputs.contains(&input) {
            return Err(DriverError::Unsupported(format!("cannot add {}", input)));
        }
        if let SessionInput::Camera(position) = input {
            if !state.devices.iter().any(|device| device.position() == position) {
                return Err(DriverError::Hardware(format!("no {} camera", position)));
            }
        }
        state.structural_change();
        state.inputs.insert(input);
        Ok(())
    }

    fn remove_input(&mut self, input: SessionInput) {
        let mut state = self.state.lock();
        state.structural_change();
        state.inputs.remove(&input);
    }

    fn add_output(&mut self, output: SessionOutput) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.rejected_outputs.contains(&output) {
            return Err(DriverError::Unsupported(format!("cannot add {}", output)));
        }
        state.structural_change();
        state.outputs.insert(output);
        Ok(())
    }

    fn remove_output(&mut self, output: SessionOutput) {
        let mut state = self.state.lock();
        state.structural_change();
        state.outputs.remove(&output);
        state.connection_orientations.remove(&output);
        if output == SessionOutput::Metadata {
            state.metadata = None;
        }
    }

    fn can_set_preset(&self, preset: QualityPreset) -> bool {
        !self.state.lock().unsupported_presets.contains(&preset)
    }

    fn set_preset(&mut self, preset: QualityPreset) {
        let mut state = self.state.lock();
        state.structural_change();
        state.preset = Some(preset);
    }

    fn start_running(&mut self) {
        self.state.lock().running = true;
    }

    fn stop_running(&mut self) {
        self.state.lock().running = false;
    }

    fn has_video_connection(&self, output: SessionOutput) -> bool {
        let state = self.state.lock();
        output != SessionOutput::Metadata
            && state.outputs.contains(&output)
            && state.inputs.iter().any(|input| matches!(input, SessionInput::Camera(_)))
            && !state.disconnected_outputs.contains(&output)
    }

    fn connection_orientation(&self, output: SessionOutput) -> Option<VideoOrientation> {
        self.state.lock().connection_orientations.get(&output).copied()
    }

    fn set_connection_orientation(&mut self, output: SessionOutput, orientation: VideoOrientation) {
        self.state
            .lock()
            .connection_orientations
            .insert(output, orientation);
    }

    fn configure_video_connection(&mut self, mirrored: bool, stabilization: VideoStabilizationMode) {
        self.state.lock().video_connection = Some((mirrored, stabilization));
    }

    fn capture_still_image(&mut self, request: StillCaptureRequest, completion: StillImageCallback) {
        let response = {
            let mut state = self.state.lock();
            state.still_requests.push(request);
            state.still_response.clone()
        };
        debug!("Simulated still capture {:?}", request);
        match response {
            StillResponse::Bytes(bytes) => completion(Ok(Some(bytes))),
            StillResponse::NoSample => completion(Ok(None)),
            StillResponse::Fail(e) => completion(Err(e)),
        }
    }

    fn start_recording(
        &mut self,
        request: RecordingRequest,
        completion: RecordingCallback,
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.recording.is_some() {
            return Err(DriverError::DeviceBusy);
        }
        state.recording_requests.push(request.clone());
        state.recording = Some(ActiveRecording {
            request,
            completion,
            started: Instant::now(),
        });
        Ok(())
    }

    fn stop_recording(&mut self) {
        finish_recording(&self.state);
    }

    fn is_recording(&self) -> bool {
        self.state.lock().recording.is_some()
    }

    fn recorded_duration(&self) -> Duration {
        self.state
            .lock()
            .recording
            .as_ref()
            .map(|recording| recording.started.elapsed())
            .unwrap_or_default()
    }

    fn available_code_types(&self) -> Vec<CodeType> {
        self.state.lock().available_code_types.clone()
    }

    fn set_metadata_callback(&mut self, types: &[CodeType], callback: Option<MetadataCallback>) {
        self.state.lock().metadata = callback.map(|callback| (types.to_vec(), callback));
    }
}

/// Complete the active recording, calling its completion outside the lock.
fn finish_recording(state: &Mutex<SessionState>) -> bool {
    let (recording, failure) = {
        let mut state = state.lock();
        (state.recording.take(), state.recording_failure.take())
    };
    let Some(recording) = recording else {
        return false;
    };
    let result = match failure {
        Some(e) => Err(e),
        None => Ok(recording.request.path.clone()),
    };
    (recording.completion)(result);
    true
}

impl SimulatedSessionHandle {
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn inputs(&self) -> BTreeSet<SessionInput> {
        self.state.lock().inputs.clone()
    }

    pub fn outputs(&self) -> BTreeSet<SessionOutput> {
        self.state.lock().outputs.clone()
    }

    pub fn preset(&self) -> Option<QualityPreset> {
        self.state.lock().preset
    }

    /// Every committed graph, oldest first.
    pub fn commits(&self) -> Vec<GraphSnapshot> {
        self.state.lock().commits.clone()
    }

    pub fn changes_outside_configuration(&self) -> u32 {
        self.state.lock().changes_outside_configuration
    }

    pub fn connection_orientation(&self, output: SessionOutput) -> Option<VideoOrientation> {
        self.state.lock().connection_orientations.get(&output).copied()
    }

    pub fn video_connection(&self) -> Option<(bool, VideoStabilizationMode)> {
        self.state.lock().video_connection
    }

    pub fn still_requests(&self) -> Vec<StillCaptureRequest> {
        self.state.lock().still_requests.clone()
    }

    pub fn recording_requests(&self) -> Vec<RecordingRequest> {
        self.state.lock().recording_requests.clone()
    }

    pub fn metadata_types(&self) -> Option<Vec<CodeType>> {
        self.state.lock().metadata.as_ref().map(|(types, _)| types.clone())
    }

    pub fn add_device(&self, device: Arc<SimulatedDevice>) {
        self.state.lock().devices.push(device);
    }

    pub fn set_preset_supported(&self, preset: QualityPreset, supported: bool) {
        let mut state = self.state.lock();
        if supported {
            state.unsupported_presets.remove(&preset);
        } else {
            state.unsupported_presets.insert(preset);
        }
    }

    pub fn reject_input(&self, input: SessionInput, reject: bool) {
        let mut state = self.state.lock();
        if reject {
            state.rejected_inputs.insert(input);
        } else {
            state.rejected_inputs.remove(&input);
        }
    }

    pub fn reject_output(&self, output: SessionOutput, reject: bool) {
        let mut state = self.state.lock();
        if reject {
            state.rejected_outputs.insert(output);
        } else {
            state.rejected_outputs.remove(&output);
        }
    }

    /// Disable the video connection of `output` without detaching it.
    pub fn disconnect(&self, output: SessionOutput, disconnected: bool) {
        let mut state = self.state.lock();
        if disconnected {
            state.disconnected_outputs.insert(output);
        } else {
            state.disconnected_outputs.remove(&output);
        }
    }

    pub fn set_still_response(&self, response: StillResponse) {
        self.state.lock().still_response = response;
    }

    /// Make the next finished recording fail with `error`.
    pub fn fail_next_recording(&self, error: DriverError) {
        self.state.lock().recording_failure = Some(error);
    }

    pub fn set_available_code_types(&self, types: Vec<CodeType>) {
        self.state.lock().available_code_types = types;
    }

    /// Stop the recording as if the hardware ended it (disk full, time
    /// limit). Returns whether anything was recording.
    pub fn finish_recording_unprompted(&self) -> bool {
        finish_recording(&self.state)
    }

    /// Deliver a detection batch from the metadata output. Returns whether a
    /// callback was attached.
    pub fn emit_codes(&self, objects: Vec<MetadataObject>) -> bool {
        let callback = self
            .state
            .lock()
            .metadata
            .as_ref()
            .map(|(_, callback)| Arc::clone(callback));
        match callback {
            Some(callback) => {
                callback(objects);
                true
            }
            None => false,
        }
    }
}
