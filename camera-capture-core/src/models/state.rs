/// Authorization state reported by the permission collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

impl AuthorizationStatus {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }

    pub fn is_denied(self) -> bool {
        matches!(self, Self::Denied | Self::Restricted)
    }
}

/// Whether the camera can be loaded right now.
///
/// ```text
/// no device           → NoDeviceFound
/// device, authorized  → Ready
/// device, undecided   → NotDetermined
/// device, refused     → AccessDenied
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraStatus {
    Ready,
    AccessDenied,
    NoDeviceFound,
    NotDetermined,
}

impl CameraStatus {
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}
