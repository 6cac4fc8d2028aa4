pub mod capture_result;
pub mod config;
pub mod device;
pub mod error;
pub mod orientation;
pub mod session;
pub mod state;
