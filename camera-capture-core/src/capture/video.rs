use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{debug, info, warn};

use crate::models::capture_result::{Location, RecordedVideo, RecordingOutcome};
use crate::models::error::{CaptureError, DriverError};
use crate::traits::media_library::MediaLibrary;

/// Completion for a recording. Called exactly once.
pub type RecordingCompletion = Box<dyn FnOnce(RecordingOutcome) + Send + 'static>;

/// Fresh file path for an in-flight recording.
pub fn temporary_recording_path(directory: &Path) -> PathBuf {
    directory.join(format!("recording_{}.mp4", uuid::Uuid::new_v4()))
}

/// Where a finished video goes when library writes are on.
pub struct VideoDestination {
    pub library: Arc<dyn MediaLibrary>,
    pub album: Option<String>,
}

struct ActiveRecording {
    path: PathBuf,
    started: Instant,
    location: Option<Location>,
}

/// What `RecordingSlot::stop` asks the caller to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopAction {
    /// Stop the hardware; the completion fires when it finishes.
    StopHardware,
    /// A finished recording was already waiting and has been delivered.
    Delivered,
    /// Nothing was recording.
    Nothing,
}

/// Recording bookkeeping owned by the session worker.
///
/// A finished recording with nobody waiting (the hardware stopped on its own)
/// is parked until the next `stop` collects it.
#[derive(Default)]
pub struct RecordingSlot {
    active: Option<ActiveRecording>,
    pending: Option<RecordingOutcome>,
    completion: Option<RecordingCompletion>,
}

impl RecordingSlot {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|active| active.path.as_path())
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn begin(&mut self, path: PathBuf, location: Option<Location>) {
        if self.pending.take().is_some() {
            debug!("Discarding uncollected recording");
        }
        info!("Recording to {}", path.display());
        self.active = Some(ActiveRecording {
            path,
            started: Instant::now(),
            location,
        });
    }

    /// Register `completion` for the recording in progress, or hand it a
    /// parked result. `hardware_recording` is the driver's view.
    pub fn stop(&mut self, completion: RecordingCompletion, hardware_recording: bool) -> StopAction {
        if hardware_recording {
            self.completion = Some(completion);
            return StopAction::StopHardware;
        }
        match self.pending.take() {
            Some(outcome) => {
                completion(outcome);
                StopAction::Delivered
            }
            None => StopAction::Nothing,
        }
    }

    /// Record the hardware's answer and deliver it if someone is waiting.
    pub fn finish(&mut self, result: Result<PathBuf, DriverError>, destination: Option<VideoDestination>) {
        let active = self.active.take();
        let outcome = build_outcome(result, active, destination);
        if let Err(e) = &outcome {
            warn!("Recording failed: {}", e);
        }
        match self.completion.take() {
            Some(completion) => completion(outcome),
            None => self.pending = Some(outcome),
        }
    }
}

fn build_outcome(
    result: Result<PathBuf, DriverError>,
    active: Option<ActiveRecording>,
    destination: Option<VideoDestination>,
) -> RecordingOutcome {
    let file_path = result?;
    let (duration, location) = active
        .map(|active| (active.started.elapsed(), active.location))
        .unwrap_or_default();
    let finished_at = Utc::now();

    let asset = match destination {
        Some(destination) => {
            let asset = destination
                .library
                .save_video(
                    &file_path,
                    destination.album.as_deref(),
                    finished_at,
                    location.as_ref(),
                )
                .map_err(CaptureError::from)?;
            debug!("Saved video {} from {}", asset.id, file_path.display());
            Some(asset)
        }
        None => None,
    };

    Ok(RecordedVideo {
        file_path,
        duration,
        finished_at,
        location,
        asset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder() -> (RecordingCompletion, Arc<Mutex<Vec<RecordingOutcome>>>) {
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&outcomes);
        (Box::new(move |outcome| sink.lock().push(outcome)), outcomes)
    }

    #[test]
    fn temp_path_is_unique_mp4() {
        let dir = Path::new("/tmp/cam");
        let a = temporary_recording_path(dir);
        let b = temporary_recording_path(dir);
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(dir));
        let name = a.file_name().and_then(|n| n.to_str()).unwrap();
        assert!(name.starts_with("recording_") && name.ends_with(".mp4"));
    }

    #[test]
    fn stop_without_recording_is_noop() {
        let mut slot = RecordingSlot::default();
        let (completion, outcomes) = recorder();
        assert_eq!(slot.stop(completion, false), StopAction::Nothing);
        assert!(outcomes.lock().is_empty());
    }

    #[test]
    fn completion_fires_once_on_finish() {
        let mut slot = RecordingSlot::default();
        slot.begin(PathBuf::from("/tmp/a.mp4"), None);
        assert!(slot.is_active());

        let (completion, outcomes) = recorder();
        assert_eq!(slot.stop(completion, true), StopAction::StopHardware);
        assert!(outcomes.lock().is_empty());

        slot.finish(Ok(PathBuf::from("/tmp/a.mp4")), None);
        slot.finish(Ok(PathBuf::from("/tmp/stray.mp4")), None);

        let outcomes = outcomes.lock();
        assert_eq!(outcomes.len(), 1);
        let video = outcomes[0].as_ref().unwrap();
        assert_eq!(video.file_path, PathBuf::from("/tmp/a.mp4"));
        assert!(video.asset.is_none());
        assert!(!slot.is_active());
    }

    #[test]
    fn unsolicited_finish_is_parked() {
        let mut slot = RecordingSlot::default();
        slot.begin(PathBuf::from("/tmp/b.mp4"), None);
        slot.finish(Err(DriverError::Hardware("disk full".into())), None);
        assert!(slot.has_pending());

        let (completion, outcomes) = recorder();
        assert_eq!(slot.stop(completion, false), StopAction::Delivered);
        assert_eq!(
            *outcomes.lock(),
            vec![Err(CaptureError::Hardware(DriverError::Hardware("disk full".into())))]
        );
        assert!(!slot.has_pending());
    }
}
