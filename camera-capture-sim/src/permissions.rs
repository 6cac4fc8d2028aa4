use parking_lot::Mutex;

use camera_capture_core::models::device::MediaType;
use camera_capture_core::models::state::AuthorizationStatus;
use camera_capture_core::traits::permission_provider::{PermissionCallback, PermissionProvider};

struct PermissionState {
    camera: AuthorizationStatus,
    microphone: AuthorizationStatus,
    /// Answer given to an undetermined request.
    grant_on_request: bool,
    requests: Vec<MediaType>,
}

/// Permission subsystem with fixed answers.
///
/// A request for an undetermined permission resolves it to
/// `grant_on_request`; a decided permission answers with its current state.
pub struct StaticPermissions {
    state: Mutex<PermissionState>,
}

impl StaticPermissions {
    pub fn new(camera: AuthorizationStatus, microphone: AuthorizationStatus) -> Self {
        Self {
            state: Mutex::new(PermissionState {
                camera,
                microphone,
                grant_on_request: true,
                requests: Vec::new(),
            }),
        }
    }

    pub fn authorized() -> Self {
        Self::new(AuthorizationStatus::Authorized, AuthorizationStatus::Authorized)
    }

    pub fn undetermined() -> Self {
        Self::new(AuthorizationStatus::NotDetermined, AuthorizationStatus::NotDetermined)
    }

    pub fn grant_on_request(&self, grant: bool) {
        self.state.lock().grant_on_request = grant;
    }

    pub fn set_camera(&self, status: AuthorizationStatus) {
        self.state.lock().camera = status;
    }

    pub fn set_microphone(&self, status: AuthorizationStatus) {
        self.state.lock().microphone = status;
    }

    /// Media types requested so far, in order.
    pub fn requests(&self) -> Vec<MediaType> {
        self.state.lock().requests.clone()
    }

    fn request(&self, media: MediaType) -> bool {
        let mut state = self.state.lock();
        state.requests.push(media);
        let grant = state.grant_on_request;
        let status = match media {
            MediaType::Video => &mut state.camera,
            MediaType::Audio => &mut state.microphone,
        };
        if *status == AuthorizationStatus::NotDetermined {
            *status = if grant {
                AuthorizationStatus::Authorized
            } else {
                AuthorizationStatus::Denied
            };
        }
        status.is_authorized()
    }
}

impl PermissionProvider for StaticPermissions {
    fn camera_status(&self) -> AuthorizationStatus {
        self.state.lock().camera
    }

    fn microphone_status(&self) -> AuthorizationStatus {
        self.state.lock().microphone
    }

    fn request_camera_access(&self, completion: PermissionCallback) {
        let granted = self.request(MediaType::Video);
        completion(granted);
    }

    fn request_microphone_access(&self, completion: PermissionCallback) {
        let granted = self.request(MediaType::Audio);
        completion(granted);
    }
}
