use log::{debug, error, warn};

use crate::models::device::{DevicePosition, OutputMode, QualityPreset};
use crate::models::error::ConfigurationError;
use crate::models::session::{CaptureSession, SessionInput, SessionOutput};
use crate::traits::session_driver::SessionDriver;

/// One recorded change, stored as the step that reverts it.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Undo {
    RemoveInput(SessionInput),
    AddInput(SessionInput),
    RemoveOutput(SessionOutput),
    AddOutput(SessionOutput),
    RestorePreset(Option<QualityPreset>),
    RestoreDevice(DevicePosition),
    RestoreOutputMode(OutputMode),
    RestoreQuality(QualityPreset),
}

/// A begin/commit bracket around structural session changes.
///
/// Every change is mirrored into the `CaptureSession` model and logged. A
/// transaction dropped without `commit` reverts its changes in reverse
/// order and then commits, so the driver never keeps a half-built graph.
pub struct Transaction<'a, D: SessionDriver + ?Sized> {
    driver: &'a mut D,
    session: &'a mut CaptureSession,
    undo: Vec<Undo>,
    committed: bool,
}

impl<'a, D: SessionDriver + ?Sized> Transaction<'a, D> {
    pub fn begin(driver: &'a mut D, session: &'a mut CaptureSession) -> Self {
        driver.begin_configuration();
        Self {
            driver,
            session,
            undo: Vec::new(),
            committed: false,
        }
    }

    pub fn session(&self) -> &CaptureSession {
        self.session
    }

    pub fn add_input(&mut self, input: SessionInput) -> Result<(), ConfigurationError> {
        if self.session.has_input(input) {
            return Ok(());
        }
        self.driver.add_input(input).map_err(|e| {
            warn!("Session rejected {}: {}", input, e);
            ConfigurationError::InputRejected { input }
        })?;
        self.session.inputs.insert(input);
        self.undo.push(Undo::RemoveInput(input));
        Ok(())
    }

    pub fn remove_input(&mut self, input: SessionInput) {
        if !self.session.inputs.remove(&input) {
            return;
        }
        self.driver.remove_input(input);
        self.undo.push(Undo::AddInput(input));
    }

    pub fn add_output(&mut self, output: SessionOutput) -> Result<(), ConfigurationError> {
        if self.session.has_output(output) {
            return Ok(());
        }
        self.driver.add_output(output).map_err(|e| {
            warn!("Session rejected {}: {}", output, e);
            ConfigurationError::OutputRejected { output }
        })?;
        self.session.outputs.insert(output);
        self.undo.push(Undo::RemoveOutput(output));
        Ok(())
    }

    pub fn remove_output(&mut self, output: SessionOutput) {
        if !self.session.outputs.remove(&output) {
            return;
        }
        self.driver.remove_output(output);
        self.undo.push(Undo::AddOutput(output));
    }

    /// Apply a concrete preset, or fail naming it when the driver refuses.
    pub fn set_preset(&mut self, preset: QualityPreset) -> Result<(), ConfigurationError> {
        if !self.driver.can_set_preset(preset) {
            return Err(ConfigurationError::PresetUnsupported { preset });
        }
        self.undo.push(Undo::RestorePreset(self.session.preset));
        self.driver.set_preset(preset);
        self.session.preset = Some(preset);
        Ok(())
    }

    pub fn set_device(&mut self, device: DevicePosition) {
        self.undo.push(Undo::RestoreDevice(self.session.device));
        self.session.device = device;
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.undo.push(Undo::RestoreOutputMode(self.session.output_mode));
        self.session.output_mode = mode;
    }

    pub fn set_quality(&mut self, quality: QualityPreset) {
        self.undo.push(Undo::RestoreQuality(self.session.quality));
        self.session.quality = quality;
    }

    pub fn commit(mut self) {
        self.committed = true;
        self.driver.commit_configuration();
        debug!("Committed {} session change(s)", self.undo.len());
    }

    fn rollback(&mut self) {
        let steps = self.undo.len();
        while let Some(step) = self.undo.pop() {
            match step {
                Undo::RemoveInput(input) => {
                    self.driver.remove_input(input);
                    self.session.inputs.remove(&input);
                }
                Undo::AddInput(input) => match self.driver.add_input(input) {
                    Ok(()) => {
                        self.session.inputs.insert(input);
                    }
                    Err(e) => error!("Could not restore {} during rollback: {}", input, e),
                },
                Undo::RemoveOutput(output) => {
                    self.driver.remove_output(output);
                    self.session.outputs.remove(&output);
                }
                Undo::AddOutput(output) => match self.driver.add_output(output) {
                    Ok(()) => {
                        self.session.outputs.insert(output);
                    }
                    Err(e) => error!("Could not restore {} during rollback: {}", output, e),
                },
                Undo::RestorePreset(preset) => {
                    if let Some(preset) = preset {
                        self.driver.set_preset(preset);
                    }
                    self.session.preset = preset;
                }
                Undo::RestoreDevice(device) => self.session.device = device,
                Undo::RestoreOutputMode(mode) => self.session.output_mode = mode,
                Undo::RestoreQuality(quality) => self.session.quality = quality,
            }
        }
        self.driver.commit_configuration();
        warn!("Rolled back {} session change(s)", steps);
    }
}

impl<D: SessionDriver + ?Sized> Drop for Transaction<'_, D> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}
