pub mod camera_delegate;
pub mod capture_device;
pub mod error_presenter;
pub mod location_provider;
pub mod media_library;
pub mod motion_provider;
pub mod permission_provider;
pub mod session_driver;
