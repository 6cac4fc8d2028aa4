pub mod exposure_curve;
pub mod orientation_math;
