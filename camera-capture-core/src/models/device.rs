use std::fmt;

use serde::{Deserialize, Serialize};

/// Which physical camera a session input points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    Front,
    Back,
}

impl fmt::Display for DevicePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Back => f.write_str("back"),
        }
    }
}

/// What the session produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    StillImage,
    VideoWithMic,
    VideoOnly,
}

impl OutputMode {
    /// Streaming modes drive the torch; still mode drives the flash.
    pub fn is_video(self) -> bool {
        matches!(self, Self::VideoOnly | Self::VideoWithMic)
    }

    pub fn uses_microphone(self) -> bool {
        matches!(self, Self::VideoWithMic)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StillImage => f.write_str("still image"),
            Self::VideoWithMic => f.write_str("video with mic"),
            Self::VideoOnly => f.write_str("video only"),
        }
    }
}

/// Named capture quality profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    Photo,
    High,
    Medium,
    Low,
    Vga640x480,
    Hd1280x720,
    Hd1920x1080,
    Hd4K3840x2160,
}

impl QualityPreset {
    /// Resolve the logical `High` alias to the concrete preset used by
    /// `mode`. Every other preset is already concrete.
    pub fn resolve(self, mode: OutputMode) -> QualityPreset {
        match (self, mode) {
            (Self::High, OutputMode::StillImage) => Self::Photo,
            (preset, _) => preset,
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Photo => "photo",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Vga640x480 => "640x480",
            Self::Hd1280x720 => "1280x720",
            Self::Hd1920x1080 => "1920x1080",
            Self::Hd4K3840x2160 => "3840x2160",
        };
        f.write_str(name)
    }
}

/// Media type a permission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Video,
    Audio,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("camera"),
            Self::Audio => f.write_str("microphone"),
        }
    }
}

/// Flash / torch setting, cycled Off → On → Auto → Off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IlluminationMode {
    #[default]
    Off,
    On,
    Auto,
}

impl IlluminationMode {
    pub const ALL: [IlluminationMode; 3] = [Self::Off, Self::On, Self::Auto];

    pub fn index(self) -> usize {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::Auto => 2,
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// `(current + 1) mod 3`
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusMode {
    Locked,
    AutoFocus,
    ContinuousAutoFocus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureMode {
    Locked,
    AutoExpose,
    ContinuousAutoExposure,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStabilizationMode {
    Off,
    Standard,
    Cinematic,
    Auto,
}

/// A feature a concrete device may or may not offer. Controllers query
/// `CaptureDevice::supports` instead of assuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Flash(IlluminationMode),
    Torch(IlluminationMode),
    FocusPointOfInterest,
    ExposurePointOfInterest,
    Focus(FocusMode),
    Exposure(ExposureMode),
    Zoom,
}

/// 2D point. View space uses pixels; device space is normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in view space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x <= self.x + self.width
            && point.y <= self.y + self.height
    }
}
