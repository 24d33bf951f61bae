//! The overlay state machine.
//!
//! ```text
//!            trigger (granted, window captured)
//!   Idle ─────────────────────────────────────▶ SelectionActive
//!    ▲  ◀───────────── cancel / trigger ──────────────┘  │
//!    │                                                   │ drag released
//!    │             settle delay elapsed                  ▼
//!    └──────────────────────────────────────────── Resolving
//! ```
//!
//! [`OverlayController`] owns its surface, window manager and permission
//! gate outright.  It is driven from a single owner thread: the daemon calls
//! [`handle_hotkey_trigger`](OverlayController::handle_hotkey_trigger), the
//! `on_drag_*` / [`on_cancel`](OverlayController::on_cancel) handlers and
//! [`tick`](OverlayController::tick).  Nothing here blocks or sleeps; the
//! settle delay is a deadline that `tick` compares against.
//!
//! The surface is shown only on the `Idle → SelectionActive` edge and every
//! edge out of `SelectionActive` hides it, so at most one overlay exists.
//!
//! A commit is irrevocable.  A trigger that arrives while `Resolving` puts
//! the controller back into `Idle` without opening a new overlay, but the
//! pending frame is still applied when its deadline passes.

use crate::config::ConfigSnapshot;
use crate::error::SnapError;
use crate::mutator::{MutationOutcome, WindowMutator};
use crate::selection::{GridCell, GridDimensions, GridRect, SelectionModel};
use crate::traits::{
    FrontmostWindow, OverlaySurface, PermissionGate, SelectionView, SurfaceRequest, WindowManager,
};
use crate::transform::{to_target_frame, ScreenGeometry, TargetFrame};
use log::{debug, info, warn};
use std::fmt;
use std::time::{Duration, Instant};

/// Externally visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Idle,
    SelectionActive,
    Resolving,
}

impl fmt::Display for OverlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayState::Idle => write!(f, "idle"),
            OverlayState::SelectionActive => write!(f, "selection-active"),
            OverlayState::Resolving => write!(f, "resolving"),
        }
    }
}

/// Everything captured at trigger time for one operation.
#[derive(Debug)]
struct Session<H> {
    handle: H,
    screen: ScreenGeometry,
    dimensions: GridDimensions,
    settle_delay: Duration,
    selection: SelectionModel,
}

/// A computed frame waiting for the settle delay.
#[derive(Debug)]
struct PendingCommit<H> {
    handle: H,
    frame: TargetFrame,
    due: Instant,
}

#[derive(Debug)]
enum Phase<H> {
    Idle,
    SelectionActive(Session<H>),
    Resolving(PendingCommit<H>),
}

/// Drives one snap operation at a time.
pub struct OverlayController<W: WindowManager, P: PermissionGate, S: OverlaySurface> {
    wm: W,
    gate: P,
    surface: S,
    phase: Phase<W::Handle>,
    /// Commits that left `Resolving` early through a trigger.
    detached: Vec<PendingCommit<W::Handle>>,
}

impl<W, P, S> OverlayController<W, P, S>
where
    W: WindowManager,
    P: PermissionGate,
    S: OverlaySurface,
{
    pub fn new(wm: W, gate: P, surface: S) -> Self {
        Self {
            wm,
            gate,
            surface,
            phase: Phase::Idle,
            detached: Vec::new(),
        }
    }

    pub fn state(&self) -> OverlayState {
        match self.phase {
            Phase::Idle => OverlayState::Idle,
            Phase::SelectionActive(_) => OverlayState::SelectionActive,
            Phase::Resolving(_) => OverlayState::Resolving,
        }
    }

    /// The live selection rectangle, while a drag is in progress.
    pub fn current_selection(&self) -> Option<GridRect> {
        match &self.phase {
            Phase::SelectionActive(session) => session.selection.current_rect(),
            _ => None,
        }
    }

    pub fn window_manager(&self) -> &W {
        &self.wm
    }

    pub fn permission_gate(&self) -> &P {
        &self.gate
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The hotkey fired.
    ///
    /// Acts as a toggle: an open selection is cancelled.  From `Idle` the
    /// permission gate and the frontmost window are checked and, if both
    /// are available, the overlay opens with `config`'s grid.
    pub fn handle_hotkey_trigger(&mut self, config: &ConfigSnapshot) -> Result<(), SnapError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::SelectionActive(_) => {
                self.surface.hide();
                info!("trigger while selecting: cancelled");
                return Ok(());
            }
            Phase::Resolving(commit) => {
                info!(
                    "trigger while resolving: back to idle, frame {} still due",
                    commit.frame
                );
                self.detached.push(commit);
                return Ok(());
            }
            Phase::Idle => {}
        }

        if !self.gate.is_granted() {
            info!("window control not permitted, prompting");
            self.gate.prompt_for_grant();
            return Err(SnapError::PermissionDenied);
        }

        let window = match self.wm.frontmost_window() {
            Ok(Some(window)) => window,
            Ok(None) => {
                debug!("no frontmost window");
                return Err(SnapError::NoCapturableWindow);
            }
            Err(e) => {
                warn!("failed to query frontmost window: {}", e);
                return Err(SnapError::NoCapturableWindow);
            }
        };

        self.open(window, config);
        Ok(())
    }

    fn open(&mut self, window: FrontmostWindow<W::Handle>, config: &ConfigSnapshot) {
        let FrontmostWindow {
            app_label,
            app_icon,
            handle,
            screen,
            display,
        } = window;

        info!(
            "selecting for {} ({:?}) on {}, grid {}",
            app_label,
            handle,
            display.as_deref().unwrap_or("primary display"),
            config.dimensions
        );

        self.surface.show(&SurfaceRequest {
            dimensions: config.dimensions,
            app_label,
            app_icon,
            display,
        });
        self.surface.render(&SelectionView {
            dimensions: config.dimensions,
            highlight: None,
        });

        self.phase = Phase::SelectionActive(Session {
            handle,
            screen,
            dimensions: config.dimensions,
            settle_delay: config.settle_delay,
            selection: SelectionModel::new(),
        });
    }

    /// Pointer pressed on `cell`.
    pub fn on_drag_start(&mut self, cell: GridCell) {
        let Phase::SelectionActive(session) = &mut self.phase else {
            debug!("drag start {} outside selection, ignored", cell);
            return;
        };
        let cell = session.dimensions.clamp_cell(cell);
        session.selection.begin(cell);
        debug!("drag start {}", cell);
        let view = SelectionView {
            dimensions: session.dimensions,
            highlight: session.selection.current_rect(),
        };
        self.surface.render(&view);
    }

    /// Pointer moved over `cell` while pressed.
    pub fn on_drag_update(&mut self, cell: GridCell) {
        let Phase::SelectionActive(session) = &mut self.phase else {
            return;
        };
        if !session.selection.is_dragging() {
            return;
        }
        let cell = session.dimensions.clamp_cell(cell);
        let before = session.selection.current_rect();
        session.selection.update(cell);
        let after = session.selection.current_rect();
        if before != after {
            debug!("drag update {}", cell);
            let view = SelectionView {
                dimensions: session.dimensions,
                highlight: after,
            };
            self.surface.render(&view);
        }
    }

    /// Pointer released over `cell`.  Commits the selection.
    pub fn on_drag_end(&mut self, cell: GridCell) {
        let Phase::SelectionActive(session) = &mut self.phase else {
            debug!("drag end {} outside selection, ignored", cell);
            return;
        };
        let cell = session.dimensions.clamp_cell(cell);
        let Some(rect) = session.selection.release(cell) else {
            debug!("drag end {} without a drag start, ignored", cell);
            return;
        };

        let Phase::SelectionActive(session) = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            return;
        };
        let frame = to_target_frame(rect, &session.screen, session.dimensions);
        self.surface.hide();
        info!("selected {} → frame {}", rect, frame);

        self.phase = Phase::Resolving(PendingCommit {
            handle: session.handle,
            frame,
            due: Instant::now() + session.settle_delay,
        });
    }

    /// Escape, a click outside the grid, or an external cancel.
    pub fn on_cancel(&mut self) {
        if let Phase::SelectionActive(_) = self.phase {
            self.phase = Phase::Idle;
            self.surface.hide();
            info!("selection cancelled");
        }
    }

    /// Earliest moment [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let resolving = match &self.phase {
            Phase::Resolving(commit) => Some(commit.due),
            _ => None,
        };
        self.detached
            .iter()
            .map(|c| c.due)
            .chain(resolving)
            .min()
    }

    /// Apply every commit whose settle delay has elapsed by `now`.
    ///
    /// Returns the outcomes in the order the frames were applied.
    pub fn tick(&mut self, now: Instant) -> Vec<MutationOutcome> {
        let mut due: Vec<PendingCommit<W::Handle>> = Vec::new();

        let mut i = 0;
        while i < self.detached.len() {
            if self.detached[i].due <= now {
                due.push(self.detached.remove(i));
            } else {
                i += 1;
            }
        }

        if matches!(&self.phase, Phase::Resolving(c) if c.due <= now) {
            if let Phase::Resolving(commit) = std::mem::replace(&mut self.phase, Phase::Idle) {
                due.push(commit);
                info!("settle delay elapsed, back to idle");
            }
        }

        due.sort_by_key(|c| c.due);
        due.iter().map(|commit| self.commit(commit)).collect()
    }

    fn commit(&self, commit: &PendingCommit<W::Handle>) -> MutationOutcome {
        let outcome = WindowMutator::new(&self.wm).apply(&commit.handle, &commit.frame);
        match outcome.into_result() {
            Ok(()) => info!("snapped {:?} to {}", commit.handle, commit.frame),
            Err(e) if e.is_silent() => debug!("{:?}: {}", commit.handle, e),
            Err(e) => warn!("{:?}: {}", commit.handle, e),
        }
        outcome
    }
}

//  Tests
