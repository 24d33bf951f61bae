//! Hotkey bindings and the registration table.
//!
//! A trigger is delivered asynchronously by whatever service owns the
//! system-wide binding and is marshaled onto the owner thread as
//! [`Command::Hotkey(id)`](crate::command::Command::Hotkey).  Between the OS
//! firing and the owner thread reading the command, the binding may have
//! been replaced (settings changed) or removed (shutdown).  Every
//! registration therefore gets a fresh [`RegistrationId`], and the owner
//! checks [`HotkeyRegistry::is_active`] before acting on a trigger.

use crate::traits::HotkeyBackend;
use log::{debug, info, warn};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifies one registration.  Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(pub u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Keyboard modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Control,
    Alt,
    Shift,
    Super,
}

impl Modifier {
    /// The glyph used in menu-style shortcut labels.
    pub fn symbol(&self) -> &'static str {
        match self {
            Modifier::Control => "⌃",
            Modifier::Alt => "⌥",
            Modifier::Shift => "⇧",
            Modifier::Super => "⌘",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Control => write!(f, "control"),
            Modifier::Alt => write!(f, "alt"),
            Modifier::Shift => write!(f, "shift"),
            Modifier::Super => write!(f, "super"),
        }
    }
}

/// Parse a modifier name (case-insensitive; accepts common aliases such as
/// "ctrl", "option", "cmd").
pub fn parse_modifier(s: &str) -> Option<Modifier> {
    match s.trim().to_lowercase().as_str() {
        "control" | "ctrl" => Some(Modifier::Control),
        "alt" | "option" | "opt" => Some(Modifier::Alt),
        "shift" => Some(Modifier::Shift),
        "super" | "cmd" | "command" | "meta" | "mod" => Some(Modifier::Super),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Modifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_modifier(&s).ok_or_else(|| DeError::custom(format!("invalid modifier: {:?}", s)))
    }
}

/// A key plus the modifiers that must be held with it.
///
/// `key` is the backend's key name (e.g. `"space"`, `"g"`, `"F5"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyBinding {
    pub key: String,
    pub modifiers: Vec<Modifier>,
}

impl Default for HotkeyBinding {
    fn default() -> Self {
        Self {
            key: "space".into(),
            modifiers: vec![Modifier::Control, Modifier::Alt],
        }
    }
}

impl HotkeyBinding {
    pub fn new(key: impl Into<String>, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        Self {
            key: key.into(),
            modifiers: modifiers.into_iter().collect(),
        }
    }

    /// Modifiers sorted in label order and without duplicates.
    pub fn normalized_modifiers(&self) -> Vec<Modifier> {
        let mut mods = self.modifiers.clone();
        mods.sort();
        mods.dedup();
        mods
    }

    /// A binding is usable when it names a key and at least one modifier.
    /// A bare key would swallow ordinary typing.
    pub fn is_valid(&self) -> bool {
        !self.key.trim().is_empty() && !self.modifiers.is_empty()
    }

    /// Compact label such as `⌃⌥Space`.
    pub fn display_name(&self) -> String {
        let mut label: String = self
            .normalized_modifiers()
            .iter()
            .map(Modifier::symbol)
            .collect();
        label.push_str(&key_label(&self.key));
        label
    }
}

impl fmt::Display for HotkeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

fn key_label(key: &str) -> String {
    let lower = key.trim().to_lowercase();
    let named = match lower.as_str() {
        "space" => "Space",
        "return" | "enter" => "Return",
        "tab" => "Tab",
        "backspace" | "delete" => "Delete",
        "escape" | "esc" => "Esc",
        "left" => "←",
        "right" => "→",
        "up" => "↑",
        "down" => "↓",
        "home" => "Home",
        "end" => "End",
        "prior" | "page_up" | "pageup" => "PgUp",
        "next" | "page_down" | "pagedown" => "PgDn",
        _ => "",
    };
    if !named.is_empty() {
        return named.to_string();
    }
    key.trim().to_uppercase()
}

//  Registration table

/// Errors from binding a hotkey.
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("hotkey {binding} has no modifier")]
    MissingModifier { binding: String },
    #[error("failed to register hotkey {binding}: {reason}")]
    RegistrationFailed { binding: String, reason: String },
}

impl From<HotkeyError> for crate::error::SnapError {
    fn from(e: HotkeyError) -> Self {
        crate::error::SnapError::HotkeyRegistrationFailed(e.to_string())
    }
}

/// Holds at most one live binding.
///
/// Registering replaces the previous binding; unregistering twice is a
/// no-op.  Triggers for anything but the current id are stale.
pub struct HotkeyRegistry<B: HotkeyBackend> {
    backend: B,
    active: Option<(RegistrationId, HotkeyBinding)>,
    next_id: u64,
}

impl<B: HotkeyBackend> HotkeyRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: None,
            next_id: 1,
        }
    }

    /// Bind `binding`, replacing any previous binding.
    ///
    /// On failure no binding is active.
    pub fn register(&mut self, binding: &HotkeyBinding) -> Result<RegistrationId, HotkeyError> {
        self.unregister();

        if !binding.is_valid() {
            return Err(HotkeyError::MissingModifier {
                binding: binding.display_name(),
            });
        }

        let id = RegistrationId(self.next_id);
        self.next_id += 1;

        self.backend
            .bind(id, binding)
            .map_err(|e| HotkeyError::RegistrationFailed {
                binding: binding.display_name(),
                reason: e.to_string(),
            })?;

        info!("hotkey {} registered as {}", binding, id);
        self.active = Some((id, binding.clone()));
        Ok(id)
    }

    /// Remove the live binding, if any.
    pub fn unregister(&mut self) {
        if let Some((id, binding)) = self.active.take() {
            match self.backend.unbind(id, &binding) {
                Ok(()) => debug!("hotkey {} ({}) unregistered", binding, id),
                Err(e) => warn!("failed to unbind hotkey {} ({}): {}", binding, id, e),
            }
        }
    }

    /// Whether `id` is the live registration.
    pub fn is_active(&self, id: RegistrationId) -> bool {
        matches!(self.active, Some((active, _)) if active == id)
    }

    pub fn active_id(&self) -> Option<RegistrationId> {
        self.active.as_ref().map(|(id, _)| *id)
    }

    pub fn active_binding(&self) -> Option<&HotkeyBinding> {
        self.active.as_ref().map(|(_, b)| b)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: HotkeyBackend> Drop for HotkeyRegistry<B> {
    fn drop(&mut self) {
        self.unregister();
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Records live bindings keyed by id, plus every call made.
    #[derive(Debug, Default)]
    struct BackendLog {
        live: HashMap<RegistrationId, HotkeyBinding>,
        binds: usize,
        unbinds: usize,
    }

    #[derive(Debug, Default, Clone)]
    struct MockBackend {
        log: Rc<RefCell<BackendLog>>,
        refuse_key: Option<String>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("key already grabbed")]
    struct Grabbed;

    impl HotkeyBackend for MockBackend {
        type Error = Grabbed;

        fn bind(&mut self, id: RegistrationId, binding: &HotkeyBinding) -> Result<(), Grabbed> {
            if self.refuse_key.as_deref() == Some(binding.key.as_str()) {
                return Err(Grabbed);
            }
            let mut log = self.log.borrow_mut();
            log.binds += 1;
            log.live.insert(id, binding.clone());
            Ok(())
        }

        fn unbind(&mut self, id: RegistrationId, _binding: &HotkeyBinding) -> Result<(), Grabbed> {
            let mut log = self.log.borrow_mut();
            log.unbinds += 1;
            log.live.remove(&id);
            Ok(())
        }
    }

    #[test]
    fn register_twice_leaves_one_live_binding() {
        let backend = MockBackend::default();
        let log = backend.log.clone();
        let mut reg = HotkeyRegistry::new(backend);

        let first = reg.register(&HotkeyBinding::default()).unwrap();
        let second = reg
            .register(&HotkeyBinding::new("g", [Modifier::Super]))
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(log.borrow().live.len(), 1);
        assert!(log.borrow().live.contains_key(&second));
        assert!(!reg.is_active(first));
        assert!(reg.is_active(second));
    }

    #[test]
    fn unregister_twice_is_noop() {
        let backend = MockBackend::default();
        let log = backend.log.clone();
        let mut reg = HotkeyRegistry::new(backend);

        let id = reg.register(&HotkeyBinding::default()).unwrap();
        reg.unregister();
        reg.unregister();

        assert!(!reg.is_active(id));
        assert_eq!(log.borrow().live.len(), 0);
        assert_eq!(log.borrow().unbinds, 1);
    }

    #[test]
    fn failed_registration_leaves_nothing_active() {
        let backend = MockBackend {
            refuse_key: Some("f5".into()),
            ..Default::default()
        };
        let log = backend.log.clone();
        let mut reg = HotkeyRegistry::new(backend);

        let old = reg.register(&HotkeyBinding::default()).unwrap();
        let err = reg
            .register(&HotkeyBinding::new("f5", [Modifier::Alt]))
            .unwrap_err();

        assert!(matches!(err, HotkeyError::RegistrationFailed { .. }));
        assert!(!reg.is_active(old));
        assert_eq!(reg.active_id(), None);
        assert!(log.borrow().live.is_empty());
    }

    #[test]
    fn modifierless_binding_is_refused() {
        let mut reg = HotkeyRegistry::new(MockBackend::default());
        let err = reg.register(&HotkeyBinding::new("a", [])).unwrap_err();
        assert!(matches!(err, HotkeyError::MissingModifier { .. }));
        assert_eq!(reg.backend().log.borrow().binds, 0);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut reg = HotkeyRegistry::new(MockBackend::default());
        let a = reg.register(&HotkeyBinding::default()).unwrap();
        reg.unregister();
        let b = reg.register(&HotkeyBinding::default()).unwrap();
        assert!(b > a);
        assert!(!reg.is_active(a));
    }

    #[test]
    fn drop_unbinds() {
        let backend = MockBackend::default();
        let log = backend.log.clone();
        {
            let mut reg = HotkeyRegistry::new(backend);
            reg.register(&HotkeyBinding::default()).unwrap();
        }
        assert!(log.borrow().live.is_empty());
    }

    #[test]
    fn display_name_orders_modifiers() {
        let b = HotkeyBinding::new(
            "space",
            [Modifier::Super, Modifier::Alt, Modifier::Control, Modifier::Alt],
        );
        assert_eq!(b.display_name(), "⌃⌥⌘Space");
        assert_eq!(HotkeyBinding::new("g", [Modifier::Shift]).display_name(), "⇧G");
        assert_eq!(HotkeyBinding::new("F5", [Modifier::Control]).display_name(), "⌃F5");
    }

    #[test]
    fn deserialize_modifier_aliases() {
        let b: HotkeyBinding =
            serde_json::from_str(r#"{"key":"g","modifiers":["Ctrl","option","CMD"]}"#).unwrap();
        assert_eq!(
            b.modifiers,
            vec![Modifier::Control, Modifier::Alt, Modifier::Super]
        );
        assert!(serde_json::from_str::<HotkeyBinding>(r#"{"modifiers":["hyper"]}"#).is_err());
    }
}
