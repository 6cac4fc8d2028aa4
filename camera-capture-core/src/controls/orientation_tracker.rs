use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};

use crate::models::orientation::{DeviceOrientation, Gravity};
use crate::processing::orientation_math::derive_orientation;
use crate::traits::motion_provider::{GravityCallback, MotionProvider};

/// Listener notified synchronously on every orientation change.
pub type OrientationListener = Arc<dyn Fn(DeviceOrientation) + Send + Sync + 'static>;

/// Shared orientation state: one writer (the tracker), many readers.
#[derive(Clone)]
pub struct OrientationHandle {
    inner: Arc<OrientationShared>,
}

struct OrientationShared {
    current: RwLock<DeviceOrientation>,
    listeners: RwLock<Vec<OrientationListener>>,
}

impl OrientationHandle {
    fn new(initial: DeviceOrientation) -> Self {
        Self {
            inner: Arc::new(OrientationShared {
                current: RwLock::new(initial),
                listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn current(&self) -> DeviceOrientation {
        *self.inner.current.read()
    }

    /// Apply one gravity sample. Returns the new orientation when it changed.
    fn apply_sample(&self, gravity: Gravity) -> Option<DeviceOrientation> {
        let derived = derive_orientation(gravity);
        {
            let mut current = self.inner.current.write();
            if *current == derived {
                return None;
            }
            *current = derived;
        }
        // Notify outside the state lock so listeners may read `current`.
        let listeners = self.inner.listeners.read().clone();
        for listener in &listeners {
            listener(derived);
        }
        Some(derived)
    }
}

/// Turns gravity samples into a discrete device orientation.
///
/// Sampling runs on the motion provider's thread. Every sample that changes
/// the derived value notifies all listeners; there is no debouncing.
pub struct OrientationTracker {
    provider: Mutex<Box<dyn MotionProvider>>,
    handle: OrientationHandle,
    tracking: AtomicBool,
    interval: Duration,
}

impl OrientationTracker {
    pub fn new(provider: Box<dyn MotionProvider>, interval: Duration) -> Self {
        Self {
            provider: Mutex::new(provider),
            handle: OrientationHandle::new(DeviceOrientation::Portrait),
            tracking: AtomicBool::new(false),
            interval,
        }
    }

    pub fn handle(&self) -> OrientationHandle {
        self.handle.clone()
    }

    pub fn current(&self) -> DeviceOrientation {
        self.handle.current()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.load(Ordering::SeqCst)
    }

    pub fn add_listener(&self, listener: OrientationListener) {
        self.handle.inner.listeners.write().push(listener);
    }

    /// Feed one sample directly, as the provider callback does.
    pub fn handle_sample(&self, gravity: Gravity) -> Option<DeviceOrientation> {
        self.handle.apply_sample(gravity)
    }

    /// Start sampling. Returns whether tracking is active afterwards; false
    /// when device motion is unavailable or the provider refused to start.
    pub fn start(&self) -> bool {
        if self.tracking.load(Ordering::SeqCst) {
            return true;
        }
        let mut provider = self.provider.lock();
        if !provider.is_available() {
            info!("Device motion unavailable, orientation tracking disabled");
            return false;
        }

        let handle = self.handle.clone();
        let callback: GravityCallback = Arc::new(move |gravity: Gravity| {
            if let Some(orientation) = handle.apply_sample(gravity) {
                debug!("Device orientation changed to {:?}", orientation);
            }
        });

        match provider.start(self.interval, callback) {
            Ok(()) => {
                self.tracking.store(true, Ordering::SeqCst);
                info!("Orientation tracking started ({:?} interval)", self.interval);
                true
            }
            Err(e) => {
                warn!("Failed to start device motion updates: {}", e);
                false
            }
        }
    }

    /// Stop sampling. Safe to call repeatedly or before `start`.
    pub fn stop(&self) {
        if !self.tracking.swap(false, Ordering::SeqCst) {
            return;
        }
        self.provider.lock().stop();
        info!("Orientation tracking stopped");
    }
}

impl Drop for OrientationTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
