//! # camera-capture-core
//!
//! Platform-agnostic camera session core library.
//!
//! Provides the session reconfiguration state machine, orientation tracking,
//! focus/exposure, zoom and illumination control, and the capture result
//! pipeline. Hardware backends implement `SessionDriver`, `CaptureDevice`
//! and `MotionProvider` and plug into the generic `Camera`.
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── traits/       ← SessionDriver, CaptureDevice, MotionProvider, MediaLibrary, PermissionProvider, ...
//! ├── models/       ← CaptureSession, errors, CameraConfiguration, orientations, capture results
//! ├── processing/   ← orientation tables, exposure curve
//! ├── controls/     ← OrientationTracker, ExposureController, ZoomController, IlluminationController
//! ├── capture/      ← still image pipeline, recording slot, code detection
//! └── session/      ← Camera (facade), SessionCore (worker state), SessionQueue, Transaction
//! ```

pub mod capture;
pub mod controls;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use capture::code_detection::CodeHandler;
pub use capture::still::{CaptureCompletion, ShutterHook};
pub use capture::video::RecordingCompletion;
pub use controls::exposure::GesturePhase;
pub use controls::orientation_tracker::OrientationTracker;
pub use models::capture_result::{
    AssetKind, AssetRef, CaptureContent, CaptureMetadata, CaptureResult, CapturedImage, CodeType,
    Location, MetadataObject, RecordedVideo, RecordingOutcome,
};
pub use models::config::CameraConfiguration;
pub use models::device::{
    Capability, DevicePosition, ExposureMode, FocusMode, IlluminationMode, MediaType, OutputMode,
    Point, QualityPreset, Rect, VideoStabilizationMode,
};
pub use models::error::{
    CaptureError, ConfigurationError, DriverError, PersistenceError, QueueError, SetupError,
};
pub use models::orientation::{
    DeviceOrientation, Gravity, ImageOrientation, InterfaceOrientation, VideoOrientation,
};
pub use models::session::{CaptureSession, SessionInput, SessionOutput};
pub use models::state::{AuthorizationStatus, CameraStatus};
pub use session::camera::Camera;
pub use traits::camera_delegate::CameraDelegate;
pub use traits::capture_device::{CaptureDevice, DeviceConfigurationLock};
pub use traits::error_presenter::ErrorPresenter;
pub use traits::location_provider::LocationProvider;
pub use traits::media_library::MediaLibrary;
pub use traits::motion_provider::{GravityCallback, MotionProvider};
pub use traits::permission_provider::{PermissionCallback, PermissionProvider};
pub use traits::session_driver::{
    MetadataCallback, RecordingCallback, RecordingRequest, SessionDriver, StillCaptureRequest,
    StillImageCallback,
};
