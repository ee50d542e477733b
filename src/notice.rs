//! The user-facing notice channel.

/// Shown once for every failed backend request, whatever went wrong.
///
/// The details go to the log, not to the user.
pub const GENERIC_ERROR_NOTICE: &str = "An error occurred. Check the console for details.";

/// Shown after the backend accepted a public token from the bank-link widget.
pub const EXCHANGE_SUCCESS_NOTICE: &str = "Public token exchanged successfully.";

/// Shows blocking, user-visible messages.
pub trait Notifier {
    /// Show `message` to the user.
    fn notify(&mut self, message: &str);
}
