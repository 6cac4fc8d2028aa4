use std::sync::Arc;
use std::time::Duration;

use crate::models::error::DriverError;
use crate::models::orientation::Gravity;

/// Callback invoked with each gravity sample.
///
/// Fires on the provider's own thread, never on the session worker.
pub type GravityCallback = Arc<dyn Fn(Gravity) + Send + Sync + 'static>;

/// Source of device-motion samples.
pub trait MotionProvider: Send + Sync {
    /// Whether device motion can be sampled at all.
    fn is_available(&self) -> bool;

    /// Start sampling every `interval`, delivering to `callback`.
    fn start(&mut self, interval: Duration, callback: GravityCallback) -> Result<(), DriverError>;

    /// Stop sampling. Must be safe to call when not started.
    fn stop(&mut self);
}
