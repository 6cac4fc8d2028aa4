use std::sync::Arc;

use log::{debug, warn};

use crate::models::device::{Capability, DevicePosition, IlluminationMode, OutputMode};
use crate::traits::capture_device::{CaptureDevice, DeviceConfigurationLock};

/// Flash/torch selection.
///
/// Still mode drives the flash of every device that supports the mode;
/// streaming modes drive the torch of back-facing devices only. Devices that
/// lack the mode, or are busy, are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IlluminationController {
    mode: IlluminationMode,
}

impl IlluminationController {
    pub fn new(mode: IlluminationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> IlluminationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: IlluminationMode) {
        self.mode = mode;
    }

    /// Advance to the next mode and return it.
    pub fn cycle(&mut self) -> IlluminationMode {
        self.mode = self.mode.next();
        self.mode
    }

    /// Push the current mode to hardware. Returns how many devices took it.
    pub fn apply(&self, output_mode: OutputMode, devices: &[Arc<dyn CaptureDevice>]) -> usize {
        if output_mode.is_video() {
            apply_torch(self.mode, devices)
        } else {
            apply_flash(self.mode, devices)
        }
    }

    /// Switch the torch off, used when leaving a streaming mode.
    pub fn extinguish_torch(&self, devices: &[Arc<dyn CaptureDevice>]) -> usize {
        apply_torch(IlluminationMode::Off, devices)
    }
}

fn apply_flash(mode: IlluminationMode, devices: &[Arc<dyn CaptureDevice>]) -> usize {
    apply_each(devices, Capability::Flash(mode), |device| device.set_flash_mode(mode), |_| true)
}

fn apply_torch(mode: IlluminationMode, devices: &[Arc<dyn CaptureDevice>]) -> usize {
    apply_each(
        devices,
        Capability::Torch(mode),
        |device| device.set_torch_mode(mode),
        |device| device.position() == DevicePosition::Back,
    )
}

fn apply_each(
    devices: &[Arc<dyn CaptureDevice>],
    capability: Capability,
    set: impl Fn(&dyn CaptureDevice),
    eligible: impl Fn(&dyn CaptureDevice) -> bool,
) -> usize {
    let mut applied = 0;
    for device in devices {
        let device = device.as_ref();
        if !eligible(device) || !device.supports(capability) {
            continue;
        }
        match DeviceConfigurationLock::acquire(device) {
            Ok(locked) => {
                set(&*locked);
                applied += 1;
            }
            Err(e) => warn!("Skipping {} camera for {:?}: {}", device.position(), capability, e),
        }
    }
    debug!("Applied {:?} to {} device(s)", capability, applied);
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_walks_all_modes() {
        let mut controller = IlluminationController::default();
        assert_eq!(controller.cycle(), IlluminationMode::On);
        assert_eq!(controller.cycle(), IlluminationMode::Auto);
        assert_eq!(controller.cycle(), IlluminationMode::Off);
    }

    #[test]
    fn triple_cycle_is_identity() {
        for mode in IlluminationMode::ALL {
            let mut controller = IlluminationController::new(mode);
            controller.cycle();
            controller.cycle();
            assert_eq!(controller.cycle(), mode);
        }
    }

    #[test]
    fn apply_without_devices_is_harmless() {
        let controller = IlluminationController::new(IlluminationMode::On);
        assert_eq!(controller.apply(OutputMode::StillImage, &[]), 0);
        assert_eq!(controller.apply(OutputMode::VideoOnly, &[]), 0);
    }
}
