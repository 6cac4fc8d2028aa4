use crate::models::state::AuthorizationStatus;

/// One-shot answer to a permission request.
pub type PermissionCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Platform permission subsystem.
pub trait PermissionProvider: Send + Sync {
    fn camera_status(&self) -> AuthorizationStatus;

    fn microphone_status(&self) -> AuthorizationStatus;

    /// Ask for camera access; `completion` fires once with the grant.
    fn request_camera_access(&self, completion: PermissionCallback);

    /// Ask for microphone access; `completion` fires once with the grant.
    fn request_microphone_access(&self, completion: PermissionCallback);
}
