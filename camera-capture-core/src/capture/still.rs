use std::sync::Arc;

use log::{debug, warn};

use crate::models::capture_result::{
    CaptureContent, CaptureMetadata, CaptureResult, CapturedImage, Location,
};
use crate::models::device::DevicePosition;
use crate::models::error::{CaptureError, DriverError};
use crate::models::orientation::DeviceOrientation;
use crate::processing::orientation_math::image_orientation_for;
use crate::traits::media_library::MediaLibrary;

/// Completion for a still capture. Called exactly once.
pub type CaptureCompletion = Box<dyn FnOnce(CaptureResult) + Send + 'static>;

/// Host hook run when a picture is taken (flash the preview, play a sound).
pub type ShutterHook = Arc<dyn Fn() + Send + Sync + 'static>;

/// Where a finished image goes when library writes are on.
pub struct ImageDestination {
    pub library: Arc<dyn MediaLibrary>,
    pub album: Option<String>,
}

/// How to turn the hardware's answer into a `CaptureResult`.
///
/// Built on the session worker when the capture is issued, then consumed in
/// the driver's completion context.
pub struct StillImagePipeline {
    pub device: DevicePosition,
    pub device_orientation: DeviceOrientation,
    pub mirrored: bool,
    pub location: Option<Location>,
    /// Raw captures skip tagging and persistence.
    pub raw: bool,
    pub destination: Option<ImageDestination>,
}

impl StillImagePipeline {
    pub fn finish(self, outcome: Result<Option<Vec<u8>>, DriverError>) -> CaptureResult {
        let data = match outcome {
            Ok(Some(data)) if data.is_empty() => return Err(CaptureError::NoImageData),
            Ok(Some(data)) => data,
            Ok(None) => return Err(CaptureError::NoSampleBuffer),
            Err(e) => return Err(CaptureError::Hardware(e)),
        };
        if self.raw {
            return Ok(CaptureContent::ImageData(data));
        }

        let orientation = image_orientation_for(self.device_orientation, self.mirrored);
        let metadata = CaptureMetadata::new(&data, self.device, orientation, self.location);
        let image = CapturedImage {
            data,
            orientation,
            metadata,
        };

        let Some(destination) = self.destination else {
            return Ok(CaptureContent::Image(image));
        };
        let asset = destination.library.save_image(
            &image,
            destination.album.as_deref(),
            image.metadata.captured_at,
            image.metadata.location.as_ref(),
        )?;
        debug!("Saved image {} ({} bytes)", asset.id, image.metadata.byte_len);
        Ok(CaptureContent::Asset(asset))
    }

    /// Finish and hand the result to `completion`.
    pub fn complete(self, outcome: Result<Option<Vec<u8>>, DriverError>, completion: CaptureCompletion) {
        let result = self.finish(outcome);
        if let Err(e) = &result {
            warn!("Still capture failed: {}", e);
        }
        completion(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::capture_result::{AssetKind, AssetRef};
    use crate::models::error::PersistenceError;
    use crate::models::orientation::ImageOrientation;
    use chrono::{DateTime, Utc};
    use parking_lot::Mutex;
    use std::path::Path;

    #[derive(Default)]
    struct Shelf {
        saved: Mutex<Vec<(ImageOrientation, Option<String>)>>,
        refuse: bool,
    }

    impl MediaLibrary for Shelf {
        fn save_image(
            &self,
            image: &CapturedImage,
            album: Option<&str>,
            _date: DateTime<Utc>,
            _location: Option<&Location>,
        ) -> Result<AssetRef, PersistenceError> {
            if self.refuse {
                return Err(PersistenceError("disk full".into()));
            }
            self.saved.lock().push((image.orientation, album.map(str::to_string)));
            Ok(AssetRef {
                id: "img-1".into(),
                kind: AssetKind::Image,
                album: album.map(str::to_string),
            })
        }

        fn save_video(
            &self,
            _file: &Path,
            _album: Option<&str>,
            _date: DateTime<Utc>,
            _location: Option<&Location>,
        ) -> Result<AssetRef, PersistenceError> {
            Err(PersistenceError("images only".into()))
        }
    }

    fn pipeline(raw: bool) -> StillImagePipeline {
        StillImagePipeline {
            device: DevicePosition::Front,
            device_orientation: DeviceOrientation::LandscapeLeft,
            mirrored: true,
            location: None,
            raw,
            destination: None,
        }
    }

    #[test]
    fn maps_hardware_failures() {
        assert_eq!(pipeline(true).finish(Ok(None)), Err(CaptureError::NoSampleBuffer));
        assert_eq!(pipeline(true).finish(Ok(Some(Vec::new()))), Err(CaptureError::NoImageData));
        assert_eq!(
            pipeline(false).finish(Err(DriverError::DeviceBusy)),
            Err(CaptureError::Hardware(DriverError::DeviceBusy))
        );
    }

    #[test]
    fn raw_capture_returns_bytes_untouched() {
        let result = pipeline(true).finish(Ok(Some(vec![0xff, 0xd8]))).unwrap();
        assert_eq!(result, CaptureContent::ImageData(vec![0xff, 0xd8]));
    }

    #[test]
    fn picture_is_tagged_for_display() {
        let content = pipeline(false).finish(Ok(Some(vec![1, 2, 3]))).unwrap();
        let CaptureContent::Image(image) = content else {
            panic!("expected an image");
        };
        assert_eq!(image.orientation, ImageOrientation::UpMirrored);
        assert!(image.metadata.mirrored);
        assert_eq!(image.metadata.device, DevicePosition::Front);
        assert_eq!(image.metadata.byte_len, 3);
    }

    #[test]
    fn library_receives_picture() {
        let shelf = Arc::new(Shelf::default());
        let mut pipeline = pipeline(false);
        pipeline.destination = Some(ImageDestination {
            library: shelf.clone(),
            album: Some("Trips".into()),
        });

        let content = pipeline.finish(Ok(Some(vec![9; 16]))).unwrap();
        assert_eq!(content.as_asset().map(|a| a.id.as_str()), Some("img-1"));
        assert_eq!(
            *shelf.saved.lock(),
            vec![(ImageOrientation::UpMirrored, Some("Trips".to_string()))]
        );
    }

    #[test]
    fn library_failure_reaches_completion_once() {
        let shelf = Arc::new(Shelf {
            refuse: true,
            ..Default::default()
        });
        let mut pipeline = pipeline(false);
        pipeline.destination = Some(ImageDestination {
            library: shelf,
            album: None,
        });

        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        pipeline.complete(Ok(Some(vec![1])), Box::new(move |result| sink.lock().push(result)));

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            Err(CaptureError::Persistence(PersistenceError("disk full".into())))
        );
    }
}
