pub mod exposure;
pub mod illumination;
pub mod orientation_tracker;
pub mod zoom;
