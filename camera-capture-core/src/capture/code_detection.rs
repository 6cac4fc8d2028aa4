use std::sync::Arc;

use log::debug;

use crate::models::capture_result::{CodeType, MetadataObject};
use crate::models::error::CaptureError;

/// Receives the first decodable code of every detection batch.
///
/// Codes are not deduplicated: a symbol held in front of the camera is
/// reported once per batch for as long as it stays in view.
pub type CodeHandler = Arc<dyn Fn(Result<String, CaptureError>) + Send + Sync + 'static>;

/// Symbologies to request, in preference order, limited to what the
/// metadata output can report.
pub fn requested_code_types(available: &[CodeType]) -> Vec<CodeType> {
    CodeType::DETECTED
        .into_iter()
        .filter(|code_type| available.contains(code_type))
        .collect()
}

/// First object in the batch that decoded to text.
pub fn first_decoded(objects: &[MetadataObject]) -> Option<&str> {
    objects.iter().find_map(|object| object.value.as_deref())
}

/// Holds the handler while detection is active.
#[derive(Default)]
pub struct CodeDetector {
    handler: Option<CodeHandler>,
}

impl CodeDetector {
    pub fn is_active(&self) -> bool {
        self.handler.is_some()
    }

    pub fn start(&mut self, handler: CodeHandler) {
        self.handler = Some(handler);
    }

    pub fn stop(&mut self) {
        self.handler = None;
    }

    /// Forward one batch. Returns whether the handler was called.
    pub fn deliver(&self, objects: &[MetadataObject]) -> bool {
        let Some(handler) = self.handler.as_ref() else {
            return false;
        };
        let Some(value) = first_decoded(objects) else {
            debug!("Detection batch of {} object(s) had no decodable code", objects.len());
            return false;
        };
        handler(Ok(value.to_string()));
        true
    }
}
