//! [`HotkeyBackend`] that installs keybinds through `keyword bind`.
//!
//! The compositor owns the grab.  When the key combination fires it runs
//! `gridsnap hotkey <id>`, which forwards `Command::Hotkey(id)` over the
//! daemon's socket; the id lets the daemon discard triggers from a binding
//! that has since been replaced.

use super::socket::{Hyprctl, HyprlandWmError};
use crate::hotkey::{HotkeyBinding, Modifier, RegistrationId};
use crate::traits::HotkeyBackend;

#[derive(Debug, Clone)]
pub struct HyprlandKeys {
    ctl: Hyprctl,
    /// Program the compositor runs on a trigger.
    exe: String,
}

impl HyprlandKeys {
    pub fn new(ctl: Hyprctl, exe: impl Into<String>) -> Self {
        Self {
            ctl,
            exe: exe.into(),
        }
    }

    /// Use the running executable as the trigger program.
    pub fn for_current_exe(ctl: Hyprctl) -> Self {
        let exe = std::env::current_exe()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "gridsnap".into());
        Self::new(ctl, exe)
    }
}

fn modifier_mask(modifiers: &[Modifier]) -> String {
    let mut sorted = modifiers.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
        .iter()
        .map(|m| match m {
            Modifier::Control => "CTRL",
            Modifier::Alt => "ALT",
            Modifier::Shift => "SHIFT",
            Modifier::Super => "SUPER",
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn bind_args(id: RegistrationId, binding: &HotkeyBinding, exe: &str) -> String {
    format!(
        "bind {},{},exec,{} hotkey {}",
        modifier_mask(&binding.modifiers),
        binding.key.trim(),
        exe,
        id.0
    )
}

fn unbind_args(binding: &HotkeyBinding) -> String {
    format!(
        "unbind {},{}",
        modifier_mask(&binding.modifiers),
        binding.key.trim()
    )
}

impl HotkeyBackend for HyprlandKeys {
    type Error = HyprlandWmError;

    fn bind(&mut self, id: RegistrationId, binding: &HotkeyBinding) -> Result<(), Self::Error> {
        self.ctl.keyword(&bind_args(id, binding, &self.exe))
    }

    fn unbind(&mut self, _id: RegistrationId, binding: &HotkeyBinding) -> Result<(), Self::Error> {
        self.ctl.keyword(&unbind_args(binding))
    }
}
