//! Entry point for the **gridsnap** binary.
//!
//! Without arguments it runs the daemon: the socket listener on a background
//! thread, everything else on the main thread.  With the `surface-gtk`
//! feature the main thread runs the GLib main loop and shows the real
//! overlay; otherwise a blocking loop is used with the headless surface.
//!
//! The remaining subcommands are one-shot clients for a running daemon:
//!
//! ```text
//! gridsnap hotkey <id>    forward a compositor keybind trigger
//! gridsnap toggle         open or cancel the overlay
//! gridsnap cancel
//! gridsnap reload         re-read config.json
//! gridsnap quit
//! ```

use gridsnap::command::Command;
use gridsnap::config::Config;
use gridsnap::controller::OverlayController;
use gridsnap::daemon::Daemon;
use gridsnap::hotkey::RegistrationId;
use gridsnap::hyprland::{Hyprctl, HyprlandAccess, HyprlandKeys, HyprlandWm};
use gridsnap::ipc::{client, default_socket_path, listener::UnixSocketListener};
use gridsnap::traits::CommandSource;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

/// `$XDG_CONFIG_HOME/gridsnap`, or `~/.config/gridsnap`.
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("gridsnap")
}

fn load_config(path: &std::path::Path) -> Config {
    match Config::load(path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no usable config ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => return run_daemon(),
        ["hotkey", id] => match id.parse() {
            Ok(id) => Command::Hotkey(RegistrationId(id)),
            Err(_) => {
                error!("hotkey id must be a number, got {:?}", id);
                return ExitCode::FAILURE;
            }
        },
        ["toggle"] => Command::Toggle,
        ["cancel"] => Command::Cancel,
        ["reload"] => Command::ReloadConfig,
        ["quit"] => Command::Shutdown,
        _ => {
            eprintln!("usage: gridsnap [hotkey <id> | toggle | cancel | reload | quit]");
            return ExitCode::FAILURE;
        }
    };

    match client::send(&default_socket_path(), &cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_daemon() -> ExitCode {
    let config_path = config_dir().join("config.json");
    let config = load_config(&config_path);

    let ctl = Hyprctl::new();
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_listener(cmd_tx.clone());

    let wm = HyprlandWm::new(ctl.clone());
    let gate = HyprlandAccess::new(ctl.clone());
    let keys = HyprlandKeys::for_current_exe(ctl);

    start_event_loop(wm, gate, keys, config, config_path, cmd_tx, cmd_rx)
}

#[cfg(feature = "surface-gtk")]
fn start_event_loop(
    wm: HyprlandWm,
    gate: HyprlandAccess,
    keys: HyprlandKeys,
    config: Config,
    config_path: PathBuf,
    cmd_tx: mpsc::Sender<Command>,
    cmd_rx: mpsc::Receiver<Command>,
) -> ExitCode {
    use gridsnap::surface::gtk;

    if let Err(e) = gtk::init(Some(&config_dir().join("style.css"))) {
        error!("failed to initialise GTK4: {}", e);
        return ExitCode::FAILURE;
    }
    let surface = gtk::GtkSurface::new(cmd_tx);
    let controller = OverlayController::new(wm, gate, surface);
    let mut daemon = Daemon::new(controller, keys, config, Some(config_path));
    daemon.start();

    gtk::run_main_loop(daemon, cmd_rx);
    ExitCode::SUCCESS
}

#[cfg(not(feature = "surface-gtk"))]
fn start_event_loop(
    wm: HyprlandWm,
    gate: HyprlandAccess,
    keys: HyprlandKeys,
    config: Config,
    config_path: PathBuf,
    cmd_tx: mpsc::Sender<Command>,
    cmd_rx: mpsc::Receiver<Command>,
) -> ExitCode {
    use gridsnap::surface::LogSurface;

    // Only the listener feeds commands without a drawing surface.
    drop(cmd_tx);
    let controller = OverlayController::new(wm, gate, LogSurface::new());
    let mut daemon = Daemon::new(controller, keys, config, Some(config_path));
    daemon.start();

    gridsnap::daemon::run_blocking(daemon, cmd_rx);
    ExitCode::SUCCESS
}

fn spawn_listener(tx: mpsc::Sender<Command>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
