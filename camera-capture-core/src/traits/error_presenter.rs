/// User-facing error channel (alerts, toasts).
///
/// Only invoked when `CameraConfiguration::show_errors_to_users` is on.
pub trait ErrorPresenter: Send + Sync {
    fn show_error(&self, title: &str, message: &str);
}
