use thiserror::Error;

/// Errors from the VeSync cloud API.
///
/// Any of these aborts the current poll cycle; the engine keeps its
/// last-known device registry and the next interval retries.
#[derive(Debug, Error)]
pub enum VesyncError {
    /// Transport-level failure reaching the cloud.
    #[error("vesync cloud unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),

    /// The cloud answered with a non-zero result code.
    #[error("vesync api error {code}: {msg}")]
    Api { code: i64, msg: String },

    /// A call that needs a session was made before `login`.
    #[error("not logged in to the vesync cloud")]
    NotLoggedIn,
}
