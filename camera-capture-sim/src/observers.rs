//! Presenter and delegate that record what they are told.

use parking_lot::Mutex;

use camera_capture_core::models::error::ConfigurationError;
use camera_capture_core::models::orientation::{DeviceOrientation, VideoOrientation};
use camera_capture_core::models::session::CaptureSession;
use camera_capture_core::traits::camera_delegate::CameraDelegate;
use camera_capture_core::traits::error_presenter::ErrorPresenter;

/// Collects every `(title, message)` shown to the user.
#[derive(Default)]
pub struct RecordingPresenter {
    shown: Mutex<Vec<(String, String)>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().clone()
    }
}

impl ErrorPresenter for RecordingPresenter {
    fn show_error(&self, title: &str, message: &str) {
        self.shown.lock().push((title.to_owned(), message.to_owned()));
    }
}

/// Delegate event, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum DelegateEvent {
    ConfigurationChanged(CaptureSession),
    OrientationChanged(DeviceOrientation, VideoOrientation),
    Error(ConfigurationError),
}

#[derive(Default)]
pub struct RecordingDelegate {
    events: Mutex<Vec<DelegateEvent>>,
}

impl RecordingDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DelegateEvent> {
        self.events.lock().clone()
    }

    pub fn configurations(&self) -> Vec<CaptureSession> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                DelegateEvent::ConfigurationChanged(session) => Some(session.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn orientations(&self) -> Vec<(DeviceOrientation, VideoOrientation)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                DelegateEvent::OrientationChanged(device, capture) => Some((*device, *capture)),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<ConfigurationError> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                DelegateEvent::Error(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }
}

impl CameraDelegate for RecordingDelegate {
    fn on_configuration_changed(&self, session: &CaptureSession) {
        self.events
            .lock()
            .push(DelegateEvent::ConfigurationChanged(session.clone()));
    }

    fn on_orientation_changed(&self, device: DeviceOrientation, capture: VideoOrientation) {
        self.events
            .lock()
            .push(DelegateEvent::OrientationChanged(device, capture));
    }

    fn on_error(&self, error: &ConfigurationError) {
        self.events.lock().push(DelegateEvent::Error(error.clone()));
    }
}
