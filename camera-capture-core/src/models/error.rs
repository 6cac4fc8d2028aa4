use thiserror::Error;

use super::device::{DevicePosition, MediaType, OutputMode, QualityPreset};
use super::session::{SessionInput, SessionOutput};

/// Failure reported by a hardware collaborator (driver, device, sensor).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("device busy")]
    DeviceBusy,

    #[error("unsupported by hardware: {0}")]
    Unsupported(String),

    #[error("hardware error: {0}")]
    Hardware(String),
}

/// The session worker could not run a job.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("session worker is not running")]
    Closed,

    #[error("blocking call issued from the session worker")]
    Reentrant,
}

/// Setting a camera up failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SetupError {
    #[error("no capture device found")]
    NoDeviceFound,

    #[error("{0} access denied")]
    PermissionDenied(MediaType),

    #[error("{0} access not determined")]
    PermissionUndetermined(MediaType),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to start session worker: {0}")]
    Worker(String),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// A reconfiguration of a live session was rejected. Every variant names the
/// parameter that could not be applied; the session keeps its prior shape.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("preset {preset} not supported by the session")]
    PresetUnsupported { preset: QualityPreset },

    #[error("{position} camera not available")]
    DeviceUnavailable { position: DevicePosition },

    #[error("could not lock {position} camera to change {parameter}")]
    DeviceLocked {
        position: DevicePosition,
        parameter: &'static str,
    },

    #[error("session rejected input {input}")]
    InputRejected { input: SessionInput },

    #[error("session rejected output {output}")]
    OutputRejected { output: SessionOutput },

    #[error("cannot change {parameter} before the session is configured")]
    NotConfigured { parameter: &'static str },

    #[error("cannot switch to {mode} output while recording")]
    RecordingInProgress { mode: OutputMode },

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl ConfigurationError {
    /// Name of the parameter this error rejected.
    pub fn parameter(&self) -> &'static str {
        match self {
            Self::PresetUnsupported { .. } => "quality",
            Self::DeviceUnavailable { .. } => "device",
            Self::DeviceLocked { parameter, .. } => parameter,
            Self::InputRejected { .. } => "input",
            Self::OutputRejected { .. } => "output",
            Self::NotConfigured { parameter } => parameter,
            Self::RecordingInProgress { .. } => "output mode",
            Self::Queue(_) => "session",
        }
    }
}

/// Opaque failure surfaced by the media library collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("asset not saved: {0}")]
pub struct PersistenceError(pub String);

/// Still capture or recording failed. Delivered exactly once to the
/// caller's completion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CaptureError {
    #[error("no capture session is set up")]
    NoActiveSession,

    #[error("operation not available in {0} output mode")]
    WrongOutputMode(OutputMode),

    #[error("no video connection on the capture output")]
    NoVideoConnection,

    #[error("capture returned no sample buffer")]
    NoSampleBuffer,

    #[error("capture returned no image data")]
    NoImageData,

    #[error(transparent)]
    Hardware(#[from] DriverError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}
