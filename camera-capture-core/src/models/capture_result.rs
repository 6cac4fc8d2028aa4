use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::device::DevicePosition;
use super::error::CaptureError;
use super::orientation::ImageOrientation;

/// Outcome of one capture, handed to the caller's completion exactly once.
pub type CaptureResult = Result<CaptureContent, CaptureError>;

/// Outcome of one recording, handed to the caller's completion exactly once.
pub type RecordingOutcome = Result<RecordedVideo, CaptureError>;

/// What a successful capture produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureContent {
    /// Raw encoded bytes straight from the still output.
    ImageData(Vec<u8>),
    /// Bytes tagged with orientation correction and metadata.
    Image(CapturedImage),
    /// Reference to the asset the media library created.
    Asset(AssetRef),
}

impl CaptureContent {
    /// Encoded bytes, when the content still carries them.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::ImageData(data) => Some(data),
            Self::Image(image) => Some(&image.data),
            Self::Asset(_) => None,
        }
    }

    pub fn as_asset(&self) -> Option<&AssetRef> {
        match self {
            Self::Asset(asset) => Some(asset),
            _ => None,
        }
    }
}

/// Kind of asset stored by the media library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
}

/// Opaque handle to a persisted asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: String,
    pub kind: AssetKind,
    pub album: Option<String>,
}

/// Geographic fix from the location collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    /// Radius of uncertainty in meters; smaller is better.
    pub horizontal_accuracy: f64,
    pub timestamp: DateTime<Utc>,
}

impl Location {
    /// Pick the fix with the best (smallest) horizontal accuracy.
    pub fn most_accurate<I>(fixes: I) -> Option<Location>
    where
        I: IntoIterator<Item = Location>,
    {
        fixes
            .into_iter()
            .filter(|fix| fix.horizontal_accuracy.is_finite() && fix.horizontal_accuracy >= 0.0)
            .min_by(|a, b| a.horizontal_accuracy.total_cmp(&b.horizontal_accuracy))
    }
}

/// Metadata recorded alongside a still image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    pub id: String,
    pub captured_at: DateTime<Utc>,
    pub device: DevicePosition,
    pub orientation: ImageOrientation,
    pub mirrored: bool,
    pub location: Option<Location>,
    pub byte_len: usize,
    /// Hex SHA-256 of the encoded bytes.
    pub checksum: String,
}

impl CaptureMetadata {
    pub fn new(
        data: &[u8],
        device: DevicePosition,
        orientation: ImageOrientation,
        location: Option<Location>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            captured_at: Utc::now(),
            device,
            orientation,
            mirrored: orientation.is_mirrored(),
            location,
            byte_len: data.len(),
            checksum: sha256_hex(data),
        }
    }
}

/// Encoded still image plus the orientation it should be displayed with.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub data: Vec<u8>,
    pub orientation: ImageOrientation,
    pub metadata: CaptureMetadata,
}

/// A finished recording.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedVideo {
    pub file_path: PathBuf,
    pub duration: Duration,
    pub finished_at: DateTime<Utc>,
    pub location: Option<Location>,
    /// Set when the media library stored the file.
    pub asset: Option<AssetRef>,
}

/// Symbology of a detected machine-readable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeType {
    Qr,
    Ean8,
    Ean13,
    Pdf417,
    Other,
}

impl CodeType {
    /// Symbologies requested from the driver when detection starts.
    pub const DETECTED: [CodeType; 4] = [Self::Qr, Self::Ean8, Self::Ean13, Self::Pdf417];
}

/// One detected metadata object. `value` is None when the symbol could not
/// be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataObject {
    pub code_type: CodeType,
    pub value: Option<String>,
}

fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data).iter().map(|b| format!("{:02x}", b)).collect()
}
