//! In-memory media library.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::Mutex;

use camera_capture_core::models::capture_result::{AssetKind, AssetRef, CapturedImage, Location};
use camera_capture_core::models::error::PersistenceError;
use camera_capture_core::traits::media_library::MediaLibrary;

/// One stored asset.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAsset {
    pub asset: AssetRef,
    pub date: DateTime<Utc>,
    pub location: Option<Location>,
    /// Encoded bytes for images.
    pub data: Option<Vec<u8>>,
    /// Source file for videos.
    pub file: Option<PathBuf>,
}

#[derive(Default)]
struct LibraryState {
    assets: Vec<StoredAsset>,
    failure: Option<String>,
}

/// `MediaLibrary` that keeps everything in memory.
#[derive(Default)]
pub struct InMemoryLibrary {
    state: Mutex<LibraryState>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every save with `reason` until cleared with `None`.
    pub fn set_failure(&self, reason: Option<&str>) {
        self.state.lock().failure = reason.map(str::to_owned);
    }

    pub fn assets(&self) -> Vec<StoredAsset> {
        self.state.lock().assets.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn store(
        &self,
        kind: AssetKind,
        album: Option<&str>,
        date: DateTime<Utc>,
        location: Option<&Location>,
        data: Option<Vec<u8>>,
        file: Option<PathBuf>,
    ) -> Result<AssetRef, PersistenceError> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.failure {
            return Err(PersistenceError(reason.clone()));
        }
        let asset = AssetRef {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            album: album.map(str::to_owned),
        };
        debug!("Stored {:?} asset {}", kind, asset.id);
        state.assets.push(StoredAsset {
            asset: asset.clone(),
            date,
            location: location.copied(),
            data,
            file,
        });
        Ok(asset)
    }
}

impl MediaLibrary for InMemoryLibrary {
    fn save_image(
        &self,
        image: &CapturedImage,
        album: Option<&str>,
        date: DateTime<Utc>,
        location: Option<&Location>,
    ) -> Result<AssetRef, PersistenceError> {
        self.store(AssetKind::Image, album, date, location, Some(image.data.clone()), None)
    }

    fn save_video(
        &self,
        file: &Path,
        album: Option<&str>,
        date: DateTime<Utc>,
        location: Option<&Location>,
    ) -> Result<AssetRef, PersistenceError> {
        self.store(AssetKind::Video, album, date, location, None, Some(file.to_path_buf()))
    }
}
