use std::collections::BTreeSet;
use std::fmt;

use super::device::{DevicePosition, OutputMode, QualityPreset};

/// An input attached to the capture session graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionInput {
    Camera(DevicePosition),
    Microphone,
}

impl fmt::Display for SessionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera(position) => write!(f, "{} camera", position),
            Self::Microphone => f.write_str("microphone"),
        }
    }
}

/// An output attached to the capture session graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionOutput {
    StillImage,
    Movie,
    Metadata,
}

impl SessionOutput {
    /// The capture output that serves `mode`.
    pub fn for_mode(mode: OutputMode) -> Self {
        if mode.is_video() {
            Self::Movie
        } else {
            Self::StillImage
        }
    }
}

impl fmt::Display for SessionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StillImage => f.write_str("still image output"),
            Self::Movie => f.write_str("movie output"),
            Self::Metadata => f.write_str("metadata output"),
        }
    }
}

/// Shape of the capture session as last committed.
///
/// Owned by the session worker; callers only ever see clones taken between
/// transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSession {
    pub device: DevicePosition,
    pub output_mode: OutputMode,
    /// Quality as requested, possibly the `High` alias.
    pub quality: QualityPreset,
    /// Concrete preset applied to the driver.
    pub preset: Option<QualityPreset>,
    pub inputs: BTreeSet<SessionInput>,
    pub outputs: BTreeSet<SessionOutput>,
    pub is_configured: bool,
    pub is_running: bool,
}

impl CaptureSession {
    pub fn new(device: DevicePosition, output_mode: OutputMode, quality: QualityPreset) -> Self {
        Self {
            device,
            output_mode,
            quality,
            preset: None,
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            is_configured: false,
            is_running: false,
        }
    }

    pub fn has_input(&self, input: SessionInput) -> bool {
        self.inputs.contains(&input)
    }

    pub fn has_output(&self, output: SessionOutput) -> bool {
        self.outputs.contains(&output)
    }

    /// Camera inputs currently attached, microphone excluded.
    pub fn camera_inputs(&self) -> Vec<SessionInput> {
        self.inputs
            .iter()
            .copied()
            .filter(|input| matches!(input, SessionInput::Camera(_)))
            .collect()
    }

    /// Exactly one of the still/movie outputs is attached and it matches the
    /// output mode; the microphone is attached iff the mode records audio.
    pub fn satisfies_output_invariant(&self) -> bool {
        let still = self.has_output(SessionOutput::StillImage);
        let movie = self.has_output(SessionOutput::Movie);
        let outputs_match = match self.output_mode {
            OutputMode::StillImage => still && !movie,
            OutputMode::VideoOnly | OutputMode::VideoWithMic => movie && !still,
        };
        let mic_matches =
            self.has_input(SessionInput::Microphone) == self.output_mode.uses_microphone();
        outputs_match && mic_matches
    }
}
