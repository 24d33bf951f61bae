//! Traits that decouple the snapping core from any specific window system,
//! drawing toolkit or transport.
//!
//! Every concrete backend (Hyprland, the GTK surface, the Unix-socket
//! listener, a test harness, …) implements one of these.  The
//! [`OverlayController`](crate::controller::OverlayController) and the
//! [`Daemon`](crate::daemon::Daemon) only depend on these abstractions.

use crate::command::Command;
use crate::geometry::{Point, Size};
use crate::hotkey::{HotkeyBinding, RegistrationId};
use crate::selection::{GridDimensions, GridRect};
use crate::transform::ScreenGeometry;
use std::fmt;
use std::sync::mpsc;

//  Window system

/// The focused window at trigger time, together with where it lives.
#[derive(Debug, Clone)]
pub struct FrontmostWindow<H> {
    /// Human-readable application name shown in the overlay header.
    pub app_label: String,
    /// Icon name for the overlay header, if the backend knows one.
    pub app_icon: Option<String>,
    /// Opaque reference used later to apply the frame.
    pub handle: H,
    /// Geometry of the display the window is on.
    pub screen: ScreenGeometry,
    /// Backend name of that display (used to place the overlay).
    pub display: Option<String>,
}

/// Abstraction over a window system that can report the focused window and
/// move/resize windows.
///
/// Handles are only valid for a while: the owning application may close the
/// window at any time, so [`is_live`](Self::is_live) must be probed right
/// before writing.
pub trait WindowManager {
    /// Opaque window reference.
    type Handle: Clone + fmt::Debug;
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Return the focused window, or `None` if there is nothing to capture.
    fn frontmost_window(&self) -> Result<Option<FrontmostWindow<Self::Handle>>, Self::Error>;

    /// Cheap liveness probe.
    fn is_live(&self, window: &Self::Handle) -> bool;

    /// Move the window's top-left corner to `origin` (top-left space).
    fn set_position(&self, window: &Self::Handle, origin: Point) -> Result<(), Self::Error>;

    /// Resize the window.
    fn set_size(&self, window: &Self::Handle, size: Size) -> Result<(), Self::Error>;
}

/// Whether we are allowed to control other applications' windows.
pub trait PermissionGate {
    fn is_granted(&self) -> bool;

    /// Ask the user to grant access.  Must not block.
    fn prompt_for_grant(&self);
}

//  Selection surface

/// What the surface needs in order to open.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceRequest {
    pub dimensions: GridDimensions,
    pub app_label: String,
    pub app_icon: Option<String>,
    /// Display to cover, if known.
    pub display: Option<String>,
}

/// A snapshot of the selection that the surface needs in order to redraw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionView {
    pub dimensions: GridDimensions,
    /// Normalized rectangle of the drag in progress.
    pub highlight: Option<GridRect>,
}

/// The on-screen grid the user drags across.
///
/// The surface only draws.  Pointer and key input flows back as
/// [`Command::DragStart`] / [`DragUpdate`](Command::DragUpdate) /
/// [`DragEnd`](Command::DragEnd) / [`Cancel`](Command::Cancel) on the
/// owner thread's command channel, so the surface never needs a reference
/// to its controller.
pub trait OverlaySurface {
    fn show(&mut self, request: &SurfaceRequest);

    fn render(&mut self, view: &SelectionView);

    /// Hide the surface.  Must be safe to call when already hidden.
    fn hide(&mut self);
}

//  Hotkeys

/// System-wide key binding service.
///
/// The backend only binds and unbinds.  Triggers arrive as
/// [`Command::Hotkey`] carrying the id the binding was registered with;
/// [`HotkeyRegistry`](crate::hotkey::HotkeyRegistry) decides whether that
/// id is still current.
pub trait HotkeyBackend {
    type Error: std::error::Error + Send + 'static;

    fn bind(&mut self, id: RegistrationId, binding: &HotkeyBinding) -> Result<(), Self::Error>;

    fn unbind(&mut self, id: RegistrationId, binding: &HotkeyBinding) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, an in-memory
/// channel, …) and forward parsed commands into the provided
/// [`mpsc::Sender`], which marshals them onto the owner thread.
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
