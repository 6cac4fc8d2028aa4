use std::path::Path;

use chrono::{DateTime, Utc};

use crate::models::capture_result::{AssetRef, CapturedImage, Location};
use crate::models::error::PersistenceError;

/// Persistence collaborator that stores finished captures.
pub trait MediaLibrary: Send + Sync {
    fn save_image(
        &self,
        image: &CapturedImage,
        album: Option<&str>,
        date: DateTime<Utc>,
        location: Option<&Location>,
    ) -> Result<AssetRef, PersistenceError>;

    fn save_video(
        &self,
        file: &Path,
        album: Option<&str>,
        date: DateTime<Utc>,
        location: Option<&Location>,
    ) -> Result<AssetRef, PersistenceError>;
}
