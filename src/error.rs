//! Failure taxonomy of a snap operation.
//!
//! None of these are fatal.  Every path that produces one leaves the
//! [`OverlayController`](crate::controller::OverlayController) back in
//! `Idle`; the daemon decides how loudly to report each kind.

use thiserror::Error;

/// Everything that can go wrong between a hotkey press and a resized window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapError {
    /// The window system has not granted us control over other windows.
    /// The user is prompted; pressing the hotkey again re-checks.
    #[error("window control permission not granted")]
    PermissionDenied,

    /// No focused window to act on.  Nothing to resize.
    #[error("no capturable frontmost window")]
    NoCapturableWindow,

    /// The hotkey could not be bound.  The overlay stays unreachable until
    /// a configuration reload registers a binding successfully.
    #[error("hotkey registration failed: {0}")]
    HotkeyRegistrationFailed(String),

    /// The captured window went away before the frame was applied.
    #[error("window handle no longer valid")]
    HandleInvalidated,

    /// The window system rejected the position or size write.  Not retried.
    #[error("window rejected part of the new frame")]
    PartialMutationFailure,
}

impl SnapError {
    /// Expected outcomes the user should not be bothered with.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::NoCapturableWindow | Self::HandleInvalidated)
    }
}
