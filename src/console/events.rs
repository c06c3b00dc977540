/// Notifications from the background refresh task to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    /// The call list was replaced; carries the new call count
    Refreshed { calls: usize },

    /// A refresh failed; the previous list is still shown
    RefreshFailed { message: String },

    /// The server rejected the credential, sign in again
    SessionExpired,
}
