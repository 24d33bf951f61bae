//! Applying a computed frame to a captured window.
//!
//! The write sequence is position, size, size.  Some windows constrain their
//! own size in response to a move (e.g. to stay on one display), so the size
//! is applied once more after the position has settled.  Only the first two
//! writes decide the outcome.
//!
//! Resizing is best-effort: nothing here retries or escalates.

use crate::error::SnapError;
use crate::traits::WindowManager;
use crate::transform::TargetFrame;
use log::{debug, warn};

/// Result of one [`WindowMutator::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Success,
    /// The position or the first size write was rejected.
    PartialFailure,
    /// The handle failed the liveness probe; nothing was written.
    HandleInvalid,
}

impl MutationOutcome {
    pub fn into_result(self) -> Result<(), SnapError> {
        match self {
            MutationOutcome::Success => Ok(()),
            MutationOutcome::PartialFailure => Err(SnapError::PartialMutationFailure),
            MutationOutcome::HandleInvalid => Err(SnapError::HandleInvalidated),
        }
    }
}

/// Applies frames through a borrowed [`WindowManager`].
pub struct WindowMutator<'a, W: WindowManager> {
    wm: &'a W,
}

impl<'a, W: WindowManager> WindowMutator<'a, W> {
    pub fn new(wm: &'a W) -> Self {
        Self { wm }
    }

    pub fn is_live(&self, window: &W::Handle) -> bool {
        self.wm.is_live(window)
    }

    /// Move and resize `window` to `frame`.
    pub fn apply(&self, window: &W::Handle, frame: &TargetFrame) -> MutationOutcome {
        if !self.is_live(window) {
            debug!("window {:?} is gone, skipping frame {}", window, frame);
            return MutationOutcome::HandleInvalid;
        }

        let position = self.wm.set_position(window, frame.origin);
        if let Err(e) = &position {
            warn!("set position of {:?} failed: {}", window, e);
        }
        let size = self.wm.set_size(window, frame.size);
        if let Err(e) = &size {
            warn!("set size of {:?} failed: {}", window, e);
        }
        if let Err(e) = self.wm.set_size(window, frame.size) {
            debug!("second size write on {:?} failed: {}", window, e);
        }

        if position.is_ok() && size.is_ok() {
            debug!("applied {} to {:?}", frame, window);
            MutationOutcome::Success
        } else {
            MutationOutcome::PartialFailure
        }
    }
}

//  Tests
