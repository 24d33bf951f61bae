//! Owner-thread dispatcher.
//!
//! [`Daemon`] is the single owner of all mutable state: the
//! [`OverlayController`], the [`HotkeyRegistry`] and the current [`Config`].
//! Every input reaches it as a [`Command`] through one `mpsc` channel, so
//! no state is shared between threads.

use crate::command::Command;
use crate::config::Config;
use crate::controller::{OverlayController, OverlayState};
use crate::error::SnapError;
use crate::hotkey::HotkeyRegistry;
use crate::mutator::MutationOutcome;
use crate::traits::{HotkeyBackend, OverlaySurface, PermissionGate, WindowManager};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

pub struct Daemon<W, P, S, B>
where
    W: WindowManager,
    P: PermissionGate,
    S: OverlaySurface,
    B: HotkeyBackend,
{
    controller: OverlayController<W, P, S>,
    hotkeys: HotkeyRegistry<B>,
    config: Config,
    config_path: Option<PathBuf>,
    running: bool,
}

impl<W, P, S, B> Daemon<W, P, S, B>
where
    W: WindowManager,
    P: PermissionGate,
    S: OverlaySurface,
    B: HotkeyBackend,
{
    /// `config_path` is re-read on [`Command::ReloadConfig`]; `None` makes
    /// reloads a no-op.
    pub fn new(
        controller: OverlayController<W, P, S>,
        hotkeys: B,
        config: Config,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            controller,
            hotkeys: HotkeyRegistry::new(hotkeys),
            config,
            config_path,
            running: true,
        }
    }

    /// Register the configured hotkey and check the permission gate once.
    ///
    /// A failed registration is logged and leaves the overlay reachable only
    /// through [`Command::Toggle`] until a reload succeeds.
    pub fn start(&mut self) {
        if let Err(e) = self.register_hotkey() {
            report(&e);
        }
        let gate = self.controller.permission_gate();
        if !gate.is_granted() {
            warn!("window control not permitted yet");
            gate.prompt_for_grant();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> OverlayState {
        self.controller.state()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn controller(&self) -> &OverlayController<W, P, S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut OverlayController<W, P, S> {
        &mut self.controller
    }

    pub fn hotkeys(&self) -> &HotkeyRegistry<B> {
        &self.hotkeys
    }

    /// Process one command.
    pub fn handle(&mut self, cmd: Command) -> Result<(), SnapError> {
        match cmd {
            Command::Hotkey(id) => {
                if !self.hotkeys.is_active(id) {
                    debug!("stale hotkey trigger {}, ignored", id);
                    return Ok(());
                }
                self.trigger()
            }
            Command::Toggle => self.trigger(),
            Command::DragStart(cell) => {
                self.controller.on_drag_start(cell);
                Ok(())
            }
            Command::DragUpdate(cell) => {
                self.controller.on_drag_update(cell);
                Ok(())
            }
            Command::DragEnd(cell) => {
                self.controller.on_drag_end(cell);
                Ok(())
            }
            Command::Cancel => {
                self.controller.on_cancel();
                Ok(())
            }
            Command::ReloadConfig => self.reload(),
            Command::Shutdown => {
                info!("shutting down");
                self.hotkeys.unregister();
                self.controller.on_cancel();
                self.running = false;
                Ok(())
            }
        }
    }

    /// Apply every commit that is due.
    pub fn tick(&mut self, now: Instant) -> Vec<MutationOutcome> {
        self.controller.tick(now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.controller.next_deadline()
    }

    fn trigger(&mut self) -> Result<(), SnapError> {
        let snapshot = self.config.snapshot();
        self.controller.handle_hotkey_trigger(&snapshot)
    }

    fn register_hotkey(&mut self) -> Result<(), SnapError> {
        let binding = self.config.hotkey.clone();
        self.hotkeys.register(&binding)?;
        Ok(())
    }

    /// Re-read the configuration file.
    ///
    /// A file that fails to load keeps the previous configuration.  The
    /// hotkey is re-registered when its binding changed or when no binding
    /// is live (a previous registration failed).
    fn reload(&mut self) -> Result<(), SnapError> {
        let Some(path) = &self.config_path else {
            debug!("no config path, reload ignored");
            return Ok(());
        };
        let config = match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; keeping previous configuration", e);
                return Ok(());
            }
        };

        let rebind = self.hotkeys.active_binding() != Some(&config.hotkey);
        info!(
            "reloaded config from {}: grid {}×{}, hotkey {}",
            path.display(),
            config.grid.rows,
            config.grid.columns,
            config.hotkey
        );
        self.config = config;

        if rebind {
            self.register_hotkey()?;
        }
        Ok(())
    }
}

/// Log a failed operation at the level its kind deserves.
pub fn report(err: &SnapError) {
    match err {
        e if e.is_silent() => debug!("{}", e),
        SnapError::PermissionDenied => warn!("{}", err),
        e => error!("{}", e),
    }
}

/// Run `daemon` on the current thread until it shuts down or every sender
/// of `rx` is gone.
///
/// Sleeps in [`recv_timeout`](mpsc::Receiver::recv_timeout) until the next
/// settle deadline, so pending commits fire without polling.
pub fn run_blocking<W, P, S, B>(mut daemon: Daemon<W, P, S, B>, rx: mpsc::Receiver<Command>)
where
    W: WindowManager,
    P: PermissionGate,
    S: OverlaySurface,
    B: HotkeyBackend,
{
    info!("gridsnap running");
    while daemon.is_running() {
        let received = match daemon.next_deadline() {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(timeout) {
                    Ok(cmd) => Some(cmd),
                    Err(mpsc::RecvTimeoutError::Timeout) => None,
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            },
        };

        if let Some(cmd) = received {
            debug!("command: {}", cmd);
            if let Err(e) = daemon.handle(cmd) {
                report(&e);
            }
        }
        daemon.tick(Instant::now());
    }

    // Commits are irrevocable; let every pending one land before exiting.
    while let Some(deadline) = daemon.next_deadline() {
        std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
        daemon.tick(Instant::now());
    }
    info!("gridsnap stopped");
}

//  Tests
