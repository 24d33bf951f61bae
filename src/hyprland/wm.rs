//! [`WindowManager`] and [`PermissionGate`] backed by Hyprland IPC.

use super::socket::{Hyprctl, HyprlandWmError};
use crate::geometry::{self, Point, Rect, Size};
use crate::traits::{FrontmostWindow, PermissionGate, WindowManager};
use crate::transform::ScreenGeometry;
use log::{debug, error};
use serde::Deserialize;

/// Hyprland-backed window manager.
///
/// Windows are addressed by their hex address (`0x55d0…`).  Each method
/// opens its own short-lived IPC request.
#[derive(Debug, Clone, Default)]
pub struct HyprlandWm {
    ctl: Hyprctl,
}

impl HyprlandWm {
    pub fn new(ctl: Hyprctl) -> Self {
        Self { ctl }
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MonitorJson {
    pub id: i64,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    /// 0–7; odd values rotate by 90°.
    #[serde(default)]
    pub transform: u8,
    /// Space taken by bars and panels: left, top, right, bottom.
    #[serde(default)]
    pub reserved: [f64; 4],
}

fn unit_scale() -> f64 {
    1.0
}

/// Subset of the JSON object returned by `j/activewindow`.
#[derive(Debug, Deserialize)]
struct ActiveWindowJson {
    address: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    title: String,
    monitor: i64,
}

/// Subset of each entry of `j/clients`.
#[derive(Debug, Deserialize)]
struct ClientJson {
    address: String,
}

impl MonitorJson {
    /// Monitor bounds in layout (top-left, logical) coordinates.
    fn logical_frame(&self) -> Rect {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let (w, h) = if self.transform % 2 == 1 {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        Rect::new(
            self.x as f64,
            self.y as f64,
            w as f64 / scale,
            h as f64 / scale,
        )
    }

    /// Usable area in top-left space.
    fn visible_frame(&self) -> Rect {
        let [left, top, right, bottom] = self.reserved;
        let frame = self.logical_frame();
        Rect::new(
            frame.x + left,
            frame.y + top,
            (frame.width - left - right).max(0.0),
            (frame.height - top - bottom).max(0.0),
        )
    }
}

/// The monitor at the layout origin, else the first one.
pub(crate) fn primary_monitor(monitors: &[MonitorJson]) -> Option<&MonitorJson> {
    monitors
        .iter()
        .find(|m| m.x == 0 && m.y == 0)
        .or_else(|| monitors.first())
}

/// Geometry of `monitor` relative to the primary display.
pub(crate) fn screen_geometry(monitor: &MonitorJson, monitors: &[MonitorJson]) -> ScreenGeometry {
    let primary_height = primary_monitor(monitors)
        .map(|p| p.logical_frame().height)
        .unwrap_or_else(|| monitor.logical_frame().height);
    ScreenGeometry::new(
        geometry::to_bottom_left(monitor.visible_frame(), primary_height),
        primary_height,
    )
}

fn round(v: f64) -> i64 {
    v.round() as i64
}

impl WindowManager for HyprlandWm {
    type Handle = String;
    type Error = HyprlandWmError;

    fn frontmost_window(&self) -> Result<Option<FrontmostWindow<String>>, Self::Error> {
        let raw = self.ctl.request("j/activewindow")?;
        // Hyprland returns an empty object `{}` when no window is focused.
        if raw.trim().is_empty() || raw.trim() == "{}" {
            return Ok(None);
        }
        let window: ActiveWindowJson = serde_json::from_str(&raw)
            .map_err(|e| HyprlandWmError(format!("parse activewindow: {}", e)))?;

        let monitors: Vec<MonitorJson> = self.ctl.json("monitors")?;
        let monitor = monitors
            .iter()
            .find(|m| m.id == window.monitor)
            .ok_or_else(|| HyprlandWmError(format!("unknown monitor id: {}", window.monitor)))?;

        let app_label = if window.class.is_empty() {
            window.title.clone()
        } else {
            window.class.clone()
        };
        let app_icon = (!window.class.is_empty()).then(|| window.class.to_lowercase());

        Ok(Some(FrontmostWindow {
            app_label,
            app_icon,
            handle: window.address,
            screen: screen_geometry(monitor, &monitors),
            display: Some(monitor.name.clone()),
        }))
    }

    fn is_live(&self, window: &String) -> bool {
        match self.ctl.json::<Vec<ClientJson>>("clients") {
            Ok(clients) => clients.iter().any(|c| &c.address == window),
            Err(e) => {
                debug!("liveness probe for {} failed: {}", window, e);
                false
            }
        }
    }

    fn set_position(&self, window: &String, origin: Point) -> Result<(), Self::Error> {
        // Tiled windows ignore pixel moves.
        self.ctl.dispatch(&format!("setfloating address:{}", window))?;
        self.ctl.dispatch(&format!(
            "movewindowpixel exact {} {},address:{}",
            round(origin.x),
            round(origin.y),
            window
        ))
    }

    fn set_size(&self, window: &String, size: Size) -> Result<(), Self::Error> {
        self.ctl.dispatch(&format!(
            "resizewindowpixel exact {} {},address:{}",
            round(size.width),
            round(size.height),
            window
        ))
    }
}

/// Window control is possible exactly when the compositor's IPC socket is
/// reachable.  There is no grant dialog to open.
#[derive(Debug, Clone, Default)]
pub struct HyprlandAccess {
    ctl: Hyprctl,
}

impl HyprlandAccess {
    pub fn new(ctl: Hyprctl) -> Self {
        Self { ctl }
    }
}

impl PermissionGate for HyprlandAccess {
    fn is_granted(&self) -> bool {
        self.ctl.is_reachable()
    }

    fn prompt_for_grant(&self) {
        match self.ctl.socket_path() {
            Ok(path) => error!(
                "cannot reach the Hyprland socket at {}; is the compositor running?",
                path.display()
            ),
            Err(e) => error!("{}; gridsnap must run inside a Hyprland session", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::socket::fake;
    use super::*;

    const MONITORS: &str = r#"[
        {"id":0,"name":"DP-1","width":2560,"height":1440,"x":0,"y":0,
         "scale":1.0,"transform":0,"reserved":[0,30,0,0]},
        {"id":1,"name":"HDMI-A-1","width":3840,"height":2160,"x":2560,"y":-200,
         "scale":2.0,"transform":0,"reserved":[0,0,0,40]}
    ]"#;

    fn monitors() -> Vec<MonitorJson> {
        serde_json::from_str(MONITORS).unwrap()
    }

    #[test]
    fn visible_frame_subtracts_reserved_edges() {
        let mons = monitors();
        assert_eq!(mons[0].visible_frame(), Rect::new(0.0, 30.0, 2560.0, 1410.0));
        // 2× scaled: logical 1920×1080
        assert_eq!(
            mons[1].visible_frame(),
            Rect::new(2560.0, -200.0, 1920.0, 1040.0)
        );
    }

    #[test]
    fn rotated_monitor_swaps_axes() {
        let m: MonitorJson = serde_json::from_str(
            r#"{"id":0,"name":"eDP-1","width":1920,"height":1080,"x":0,"y":0,"transform":1}"#,
        )
        .unwrap();
        assert_eq!(m.logical_frame(), Rect::new(0.0, 0.0, 1080.0, 1920.0));
    }

    #[test]
    fn primary_is_monitor_at_origin() {
        let mut mons = monitors();
        assert_eq!(primary_monitor(&mons).unwrap().name, "DP-1");
        mons.reverse();
        assert_eq!(primary_monitor(&mons).unwrap().name, "DP-1");
        mons.retain(|m| m.name != "DP-1");
        assert_eq!(primary_monitor(&mons).unwrap().name, "HDMI-A-1");
    }

    #[test]
    fn screen_geometry_round_trips_to_layout_space() {
        let mons = monitors();
        for m in &mons {
            let screen = screen_geometry(m, &mons);
            assert_eq!(screen.primary_height, 1440.0);
            assert_eq!(screen.visible_top_left(), m.visible_frame());
        }
    }

    fn answer(req: &str) -> Option<String> {
        match req {
            "j/activewindow" => Some(
                r#"{"address":"0x5a1","class":"Alacritty","title":"~","monitor":1}"#.into(),
            ),
            "j/monitors" => Some(MONITORS.into()),
            "j/clients" => Some(r#"[{"address":"0x5a1"},{"address":"0x777"}]"#.into()),
            r if r.starts_with("/dispatch ") => Some("ok".into()),
            _ => None,
        }
    }

    #[test]
    fn frontmost_window_reads_active_window_and_monitor() {
        let hypr = fake::spawn(answer);
        let wm = HyprlandWm::new(hypr.ctl.clone());
        let window = wm.frontmost_window().unwrap().unwrap();

        assert_eq!(window.handle, "0x5a1");
        assert_eq!(window.app_label, "Alacritty");
        assert_eq!(window.app_icon.as_deref(), Some("alacritty"));
        assert_eq!(window.display.as_deref(), Some("HDMI-A-1"));
        assert_eq!(
            window.screen.visible_top_left(),
            Rect::new(2560.0, -200.0, 1920.0, 1040.0)
        );
    }

    #[test]
    fn empty_active_window_means_none() {
        let hypr = fake::spawn(|req| (req == "j/activewindow").then(|| "{}".into()));
        let wm = HyprlandWm::new(hypr.ctl.clone());
        assert!(wm.frontmost_window().unwrap().is_none());
    }

    #[test]
    fn liveness_checks_client_list() {
        let hypr = fake::spawn(answer);
        let wm = HyprlandWm::new(hypr.ctl.clone());
        assert!(wm.is_live(&"0x777".to_string()));
        assert!(!wm.is_live(&"0xdead".to_string()));
    }

    #[test]
    fn writes_use_exact_pixel_dispatches() {
        let hypr = fake::spawn(answer);
        let wm = HyprlandWm::new(hypr.ctl.clone());
        let handle = "0x5a1".to_string();
        wm.set_position(&handle, Point::new(200.4, 145.6)).unwrap();
        wm.set_size(&handle, Size::new(800.0, 360.0)).unwrap();

        assert_eq!(
            *hypr.received.lock().unwrap(),
            vec![
                "/dispatch setfloating address:0x5a1".to_string(),
                "/dispatch movewindowpixel exact 200 146,address:0x5a1".to_string(),
                "/dispatch resizewindowpixel exact 800 360,address:0x5a1".to_string(),
            ]
        );
    }

    #[test]
    fn access_follows_socket_reachability() {
        let hypr = fake::spawn(answer);
        assert!(HyprlandAccess::new(hypr.ctl.clone()).is_granted());
        let gone = HyprlandAccess::new(Hyprctl::with_socket("/nonexistent/.socket.sock"));
        assert!(!gone.is_granted());
        gone.prompt_for_grant();
    }
}
