use crate::models::capture_result::Location;

/// Best-effort location source.
pub trait LocationProvider: Send + Sync {
    /// Most recent fix, preferring the most accurate one. None when unknown.
    fn latest_location(&self) -> Option<Location>;
}
