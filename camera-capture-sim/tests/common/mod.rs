#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use camera_capture_core::{Camera, CameraConfiguration};
use camera_capture_sim::{
    MotionFeed, RecordingDelegate, RecordingPresenter, SimulatedDevice, SimulatedMotion,
    SimulatedSession, SimulatedSessionHandle,
};

/// Upper bound for completions that hop through the session worker.
pub const WAIT: Duration = Duration::from_secs(2);

pub struct Rig {
    pub camera: Camera<SimulatedSession>,
    pub session: SimulatedSessionHandle,
    pub feed: MotionFeed,
    pub back: Arc<SimulatedDevice>,
    pub front: Arc<SimulatedDevice>,
    pub delegate: Arc<RecordingDelegate>,
    pub presenter: Arc<RecordingPresenter>,
}

pub fn config() -> CameraConfiguration {
    CameraConfiguration {
        temporary_directory: PathBuf::from("/tmp/camera-capture-tests"),
        ..Default::default()
    }
}

pub fn rig() -> Rig {
    rig_with(config())
}

pub fn rig_with(config: CameraConfiguration) -> Rig {
    let (driver, session, back, front) = SimulatedSession::with_default_devices();
    let (motion, feed) = SimulatedMotion::new();
    let camera = Camera::new(driver, Box::new(motion), config).unwrap();

    let delegate = Arc::new(RecordingDelegate::new());
    let presenter = Arc::new(RecordingPresenter::new());
    camera.set_delegate(delegate.clone()).unwrap();
    camera.set_error_presenter(presenter.clone()).unwrap();

    Rig {
        camera,
        session,
        feed,
        back,
        front,
        delegate,
        presenter,
    }
}

/// Camera over an arbitrary device list, without observers.
pub fn camera_with_devices(
    devices: Vec<Arc<SimulatedDevice>>,
) -> (Camera<SimulatedSession>, SimulatedSessionHandle) {
    let (driver, session) = SimulatedSession::new(devices);
    let (motion, _feed) = SimulatedMotion::new();
    let camera = Camera::new(driver, Box::new(motion), config()).unwrap();
    (camera, session)
}
