pub mod camera;
pub mod orchestrator;
pub mod queue;
pub mod transaction;
