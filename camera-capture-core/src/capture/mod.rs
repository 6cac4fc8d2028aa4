pub mod code_detection;
pub mod still;
pub mod video;
