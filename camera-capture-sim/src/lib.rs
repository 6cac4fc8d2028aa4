//! # camera-capture-sim
//!
//! In-memory simulated backend for camera-capture-kit.
//!
//! Provides:
//! - `SimulatedSession`: `SessionDriver` whose graph, stills, recordings and
//!   metadata batches are scripted through a `SimulatedSessionHandle`
//! - `SimulatedDevice`: `CaptureDevice` with a configurable capability set
//! - `SimulatedMotion`: `MotionProvider` fed gravity samples by a `MotionFeed`
//! - `InMemoryLibrary`, `FixedLocation`, `StaticPermissions`: host collaborators
//! - `RecordingPresenter`, `RecordingDelegate`: observers that log what they see
//!
//! ## Usage
//! ```ignore
//! use camera_capture_core::{Camera, CameraConfiguration, DevicePosition, OutputMode, QualityPreset};
//! use camera_capture_sim::{SimulatedMotion, SimulatedSession};
//!
//! let (driver, handle, _back, _front) = SimulatedSession::with_default_devices();
//! let (motion, feed) = SimulatedMotion::new();
//! let camera = Camera::new(driver, Box::new(motion), CameraConfiguration::default()).unwrap();
//! camera.configure(DevicePosition::Back, OutputMode::StillImage, QualityPreset::High).unwrap();
//! ```

pub mod device;
pub mod library;
pub mod location;
pub mod motion;
pub mod observers;
pub mod permissions;
pub mod session;

pub use device::{DeviceState, SimulatedDevice};
pub use library::{InMemoryLibrary, StoredAsset};
pub use location::FixedLocation;
pub use motion::{gravity, MotionFeed, SimulatedMotion};
pub use observers::{DelegateEvent, RecordingDelegate, RecordingPresenter};
pub use permissions::StaticPermissions;
pub use session::{GraphSnapshot, SimulatedSession, SimulatedSessionHandle, StillResponse};
