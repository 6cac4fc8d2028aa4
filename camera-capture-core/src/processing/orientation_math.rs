//! Pure orientation math: gravity → device orientation, device → capture
//! connection orientation, and the image orientation tag for corrections.

use crate::models::orientation::{
    DeviceOrientation, Gravity, ImageOrientation, InterfaceOrientation, VideoOrientation,
};

/// Derive the device orientation from one gravity sample.
///
/// The axis with the larger magnitude picks the family; ties go to portrait.
/// Its sign picks the member. Never yields `FaceUp`/`FaceDown`/`Unknown`.
pub fn derive_orientation(gravity: Gravity) -> DeviceOrientation {
    let (x, y) = (gravity.x, gravity.y);
    if y.abs() >= x.abs() {
        if y >= 0.0 {
            DeviceOrientation::PortraitUpsideDown
        } else {
            DeviceOrientation::Portrait
        }
    } else if x >= 0.0 {
        DeviceOrientation::LandscapeRight
    } else {
        DeviceOrientation::LandscapeLeft
    }
}

/// Fixed device → capture table. Landscape sides swap because capture
/// orientation is defined relative to the sensor, not the screen.
///
/// Returns `None` for orientations without a capture direction.
pub fn video_orientation_for(device: DeviceOrientation) -> Option<VideoOrientation> {
    match device {
        DeviceOrientation::Portrait => Some(VideoOrientation::Portrait),
        DeviceOrientation::PortraitUpsideDown => Some(VideoOrientation::PortraitUpsideDown),
        DeviceOrientation::LandscapeLeft => Some(VideoOrientation::LandscapeRight),
        DeviceOrientation::LandscapeRight => Some(VideoOrientation::LandscapeLeft),
        DeviceOrientation::FaceUp | DeviceOrientation::FaceDown | DeviceOrientation::Unknown => None,
    }
}

/// Interface orientation maps to capture orientation without a swap.
pub fn video_orientation_for_interface(interface: InterfaceOrientation) -> Option<VideoOrientation> {
    match interface {
        InterfaceOrientation::Portrait => Some(VideoOrientation::Portrait),
        InterfaceOrientation::PortraitUpsideDown => Some(VideoOrientation::PortraitUpsideDown),
        InterfaceOrientation::LandscapeLeft => Some(VideoOrientation::LandscapeLeft),
        InterfaceOrientation::LandscapeRight => Some(VideoOrientation::LandscapeRight),
        InterfaceOrientation::Unknown => None,
    }
}

/// Capture orientation to apply for `device`.
///
/// A flat or unknown device keeps `last_known` so the preview does not
/// flicker back to portrait; without one it falls back to the interface
/// orientation, then to portrait. `last_known` carries no age, so a stale
/// value is kept indefinitely.
pub fn resolve_capture_orientation(
    device: DeviceOrientation,
    last_known: Option<VideoOrientation>,
    interface: InterfaceOrientation,
) -> VideoOrientation {
    video_orientation_for(device)
        .or(last_known)
        .or_else(|| video_orientation_for_interface(interface))
        .unwrap_or(VideoOrientation::Portrait)
}

/// Orientation tag that displays a sensor-native capture upright.
pub fn image_orientation_for(device: DeviceOrientation, mirrored: bool) -> ImageOrientation {
    match (device, mirrored) {
        (DeviceOrientation::LandscapeLeft, false) => ImageOrientation::Up,
        (DeviceOrientation::LandscapeLeft, true) => ImageOrientation::UpMirrored,
        (DeviceOrientation::LandscapeRight, false) => ImageOrientation::Down,
        (DeviceOrientation::LandscapeRight, true) => ImageOrientation::DownMirrored,
        (_, false) => ImageOrientation::Right,
        (_, true) => ImageOrientation::LeftMirrored,
    }
}
