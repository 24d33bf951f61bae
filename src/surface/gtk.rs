//! GTK4 + layer-shell selection surface that runs on the **main thread**.
//!
//! # Widget tree
//!
//! ```text
//! window                       (layer-shell overlay, anchored to all edges)
//! └ .snap-backdrop             (dims the whole display, click = cancel)
//!     └ .snap-card             (centered)
//!         ├ .snap-header       (application icon + name)
//!         ├ .snap-grid         (DrawingArea, cairo-drawn cells + selection)
//!         └ .snap-hint         ("Drag to select · Esc to cancel")
//! ```
//!
//! Pointer input on the grid is hit-tested with
//! [`selection::hit_test`](crate::selection::hit_test) and sent back to the
//! daemon as [`Command`]s on the same channel the socket listener feeds, so
//! the surface holds no reference to its controller.

use crate::command::Command;
use crate::daemon::{report, Daemon};
use crate::geometry::{Point, Rect, Size};
use crate::selection::{cell_bounds, hit_test, rect_bounds, GridCell, GridDimensions, GridRect};
use crate::surface::grid_extent;
use crate::traits::{
    HotkeyBackend, OverlaySurface, PermissionGate, SelectionView, SurfaceRequest, WindowManager,
};
use gtk4::prelude::*;
use gtk4::{cairo, gdk, glib};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::f64::consts::PI;
use std::path::Path;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

const GRID_LIMIT: Size = Size::new(960.0, 640.0);
const CELL_GAP: f64 = 3.0;
const CELL_RADIUS: f64 = 6.0;
const POLL_INTERVAL: Duration = Duration::from_millis(16);

const DEFAULT_CSS: &str = r#"
window,
window.background {
    background-color: transparent;
    background: none;
}

.snap-backdrop {
    background-color: rgba(0, 0, 0, 0.45);
}

.snap-card {
    background-color: rgba(28, 28, 32, 0.92);
    border-radius: 18px;
    padding: 18px;
}

.snap-title {
    color: white;
    font-weight: bold;
}

.snap-hint {
    color: rgba(255, 255, 255, 0.6);
    font-size: smaller;
}
"#;

#[derive(Debug, Clone, Copy, Default)]
struct DrawState {
    dimensions: GridDimensions,
    highlight: Option<GridRect>,
}

/// Full-screen dimmed overlay with a draggable grid.
pub struct GtkSurface {
    window: gtk4::Window,
    icon: gtk4::Image,
    title: gtk4::Label,
    area: gtk4::DrawingArea,
    state: Rc<RefCell<DrawState>>,
}

impl GtkSurface {
    /// Build the (hidden) overlay window.  GTK must be initialised.
    ///
    /// Drag and cancel input is sent into `sink`.
    pub fn new(sink: mpsc::Sender<Command>) -> Self {
        let state = Rc::new(RefCell::new(DrawState::default()));

        let window = gtk4::Window::new();
        window.init_layer_shell();
        window.set_layer(Layer::Overlay);
        window.set_namespace("gridsnap");
        for edge in [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right] {
            window.set_anchor(edge, true);
        }
        window.set_exclusive_zone(-1);
        window.set_keyboard_mode(KeyboardMode::None);
        window.set_decorated(false);
        window.remove_css_class("background");

        let backdrop = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
        backdrop.add_css_class("snap-backdrop");
        backdrop.set_hexpand(true);
        backdrop.set_vexpand(true);

        let card = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
        card.add_css_class("snap-card");
        card.set_halign(gtk4::Align::Center);
        card.set_valign(gtk4::Align::Center);
        card.set_vexpand(true);

        let header = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
        header.add_css_class("snap-header");
        let icon = gtk4::Image::new();
        icon.set_pixel_size(24);
        let title = gtk4::Label::new(None);
        title.add_css_class("snap-title");
        header.append(&icon);
        header.append(&title);

        let area = gtk4::DrawingArea::new();
        area.add_css_class("snap-grid");
        let extent = grid_extent(GridDimensions::default(), GRID_LIMIT);
        area.set_content_width(extent.width.round() as i32);
        area.set_content_height(extent.height.round() as i32);

        let hint = gtk4::Label::new(Some("Drag to select · Esc to cancel"));
        hint.add_css_class("snap-hint");

        card.append(&header);
        card.append(&area);
        card.append(&hint);
        backdrop.append(&card);
        window.set_child(Some(&backdrop));

        {
            let state = state.clone();
            area.set_draw_func(move |_, cr, w, h| {
                let s = *state.borrow();
                draw_grid(cr, Size::new(w as f64, h as f64), s.dimensions, s.highlight);
            });
        }

        install_drag(&area, &state, &sink);
        install_cancel(&window, &backdrop, &card, &sink);

        // Map the surface once so the first show is immediate.
        window.present();
        window.set_visible(false);

        Self {
            window,
            icon,
            title,
            area,
            state,
        }
    }
}

fn cell_at(area: &gtk4::DrawingArea, state: &RefCell<DrawState>, x: f64, y: f64) -> GridCell {
    let bounds = Size::new(area.width() as f64, area.height() as f64);
    hit_test(Point::new(x, y), bounds, state.borrow().dimensions)
}

fn install_drag(
    area: &gtk4::DrawingArea,
    state: &Rc<RefCell<DrawState>>,
    sink: &mpsc::Sender<Command>,
) {
    let drag = gtk4::GestureDrag::new();
    drag.set_button(gdk::BUTTON_PRIMARY);

    {
        let (area_ref, state, sink) = (area.clone(), state.clone(), sink.clone());
        drag.connect_drag_begin(move |gesture, x, y| {
            gesture.set_state(gtk4::EventSequenceState::Claimed);
            let _ = sink.send(Command::DragStart(cell_at(&area_ref, &state, x, y)));
        });
    }
    {
        let (area_ref, state, sink) = (area.clone(), state.clone(), sink.clone());
        drag.connect_drag_update(move |gesture, dx, dy| {
            if let Some((x, y)) = gesture.start_point() {
                let cell = cell_at(&area_ref, &state, x + dx, y + dy);
                let _ = sink.send(Command::DragUpdate(cell));
            }
        });
    }
    {
        let (area_ref, state, sink) = (area.clone(), state.clone(), sink.clone());
        drag.connect_drag_end(move |gesture, dx, dy| {
            if let Some((x, y)) = gesture.start_point() {
                let cell = cell_at(&area_ref, &state, x + dx, y + dy);
                let _ = sink.send(Command::DragEnd(cell));
            }
        });
    }

    area.add_controller(drag);
}

/// Escape anywhere, or a press on the backdrop outside the card.
fn install_cancel(
    window: &gtk4::Window,
    backdrop: &gtk4::Box,
    card: &gtk4::Box,
    sink: &mpsc::Sender<Command>,
) {
    let keys = gtk4::EventControllerKey::new();
    {
        let sink = sink.clone();
        keys.connect_key_pressed(move |_, key, _, _| {
            if key == gdk::Key::Escape {
                let _ = sink.send(Command::Cancel);
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        });
    }
    window.add_controller(keys);

    let click = gtk4::GestureClick::new();
    {
        let sink = sink.clone();
        let backdrop_ref = backdrop.clone();
        let card: gtk4::Widget = card.clone().upcast();
        click.connect_pressed(move |_, _, x, y| {
            let inside = backdrop_ref
                .pick(x, y, gtk4::PickFlags::DEFAULT)
                .is_some_and(|w| w == card || w.is_ancestor(&card));
            if !inside {
                let _ = sink.send(Command::Cancel);
            }
        });
    }
    backdrop.add_controller(click);
}

fn monitor_named(name: &str) -> Option<gdk::Monitor> {
    let display = gdk::Display::default()?;
    let monitors = display.monitors();
    (0..monitors.n_items())
        .filter_map(|i| monitors.item(i).and_downcast::<gdk::Monitor>())
        .find(|m| m.connector().as_deref() == Some(name))
}

impl OverlaySurface for GtkSurface {
    fn show(&mut self, request: &SurfaceRequest) {
        *self.state.borrow_mut() = DrawState {
            dimensions: request.dimensions,
            highlight: None,
        };
        let extent = grid_extent(request.dimensions, GRID_LIMIT);
        self.area.set_content_width(extent.width.round() as i32);
        self.area.set_content_height(extent.height.round() as i32);
        self.title.set_label(&request.app_label);
        match &request.app_icon {
            Some(name) => {
                self.icon.set_icon_name(Some(name));
                self.icon.set_visible(true);
            }
            None => self.icon.set_visible(false),
        }
        match request.display.as_deref().map(|name| (name, monitor_named(name))) {
            Some((_, Some(monitor))) => self.window.set_monitor(&monitor),
            Some((name, None)) => warn!("no GDK monitor named {}, using default", name),
            None => {}
        }

        self.window.set_keyboard_mode(KeyboardMode::Exclusive);
        self.window.set_visible(true);
        self.window.present();
        self.area.queue_draw();
        debug!("overlay shown for {}", request.app_label);
    }

    fn render(&mut self, view: &SelectionView) {
        *self.state.borrow_mut() = DrawState {
            dimensions: view.dimensions,
            highlight: view.highlight,
        };
        self.area.queue_draw();
    }

    fn hide(&mut self) {
        self.window.set_keyboard_mode(KeyboardMode::None);
        self.window.set_visible(false);
        self.state.borrow_mut().highlight = None;
    }
}

//  Drawing

fn rounded_rect(cr: &cairo::Context, r: Rect, radius: f64) {
    let radius = radius.min(r.width / 2.0).min(r.height / 2.0).max(0.0);
    cr.new_sub_path();
    cr.arc(r.max_x() - radius, r.y + radius, radius, -PI / 2.0, 0.0);
    cr.arc(r.max_x() - radius, r.max_y() - radius, radius, 0.0, PI / 2.0);
    cr.arc(r.x + radius, r.max_y() - radius, radius, PI / 2.0, PI);
    cr.arc(r.x + radius, r.y + radius, radius, PI, 3.0 * PI / 2.0);
    cr.close_path();
}

fn draw_grid(
    cr: &cairo::Context,
    bounds: Size,
    dims: GridDimensions,
    highlight: Option<GridRect>,
) {
    cr.set_source_rgba(1.0, 1.0, 1.0, 0.08);
    for row in 0..dims.rows() {
        for column in 0..dims.columns() {
            let cell = cell_bounds(GridCell::new(row, column), bounds, dims);
            rounded_rect(cr, cell.inset(CELL_GAP, CELL_GAP), CELL_RADIUS);
        }
    }
    let _ = cr.fill();

    if let Some(rect) = highlight {
        let area = rect_bounds(rect, bounds, dims).inset(CELL_GAP, CELL_GAP);
        rounded_rect(cr, area, CELL_RADIUS);
        cr.set_source_rgba(0.36, 0.62, 1.0, 0.45);
        let _ = cr.fill_preserve();
        cr.set_source_rgba(0.36, 0.62, 1.0, 0.95);
        cr.set_line_width(2.0);
        let _ = cr.stroke();
    }
}

//  Main loop

/// Initialise GTK on the current thread and register the stylesheet.
///
/// `css_path` replaces the built-in style when the file exists.
pub fn init(css_path: Option<&Path>) -> Result<(), glib::BoolError> {
    gtk4::init()?;
    info!("GTK4 initialised on main thread");
    load_css(css_path);
    Ok(())
}

/// Run the GLib main loop, feeding `rx` into `daemon` every frame.
///
/// Returns once the daemon shut down (or every sender is gone) and no
/// commit is pending.
pub fn run_main_loop<W, P, B>(mut daemon: Daemon<W, P, GtkSurface, B>, rx: mpsc::Receiver<Command>)
where
    W: WindowManager + 'static,
    W::Handle: 'static,
    P: PermissionGate + 'static,
    B: HotkeyBackend + 'static,
{
    let main_loop = glib::MainLoop::new(None, false);
    let quit = main_loop.clone();
    let mut draining = false;

    glib::timeout_add_local(POLL_INTERVAL, move || {
        while !draining {
            match rx.try_recv() {
                Ok(cmd) => {
                    debug!("command: {}", cmd);
                    if let Err(e) = daemon.handle(cmd) {
                        report(&e);
                    }
                    draining = !daemon.is_running();
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => draining = true,
            }
        }

        daemon.tick(Instant::now());

        if draining && daemon.next_deadline().is_none() {
            info!("leaving GLib main loop");
            quit.quit();
            return glib::ControlFlow::Break;
        }
        glib::ControlFlow::Continue
    });

    info!("gridsnap running (GTK overlay)");
    main_loop.run();
}

fn load_css(css_path: Option<&Path>) {
    let provider = gtk4::CssProvider::new();

    let css = match css_path.filter(|p| p.exists()) {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(content) => {
                info!("user CSS: {}", p.display());
                content
            }
            Err(e) => {
                warn!("failed to read {}: {}; using built-in style", p.display(), e);
                DEFAULT_CSS.to_string()
            }
        },
        None => DEFAULT_CSS.to_string(),
    };

    #[allow(deprecated)]
    provider.load_from_data(&css);

    match gdk::Display::default() {
        Some(display) => gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        ),
        None => warn!("no GDK display, style not applied"),
    }
}
