use crate::commands::Notification;
use crate::error::{ClickerError, Result};
use crate::scheduler::SchedulerState;
use colored::Colorize;
use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Flips the `running` flag and produces the notification for the UI.
pub fn toggle_running(state: &mut SchedulerState) -> Notification {
    if !state.running {
        state.running = true;
        eprintln!("{}", "▶️  Auto-click START requested".green());
        Notification::BackgroundHotkeys { start: true }
    } else {
        state.running = false;
        eprintln!("{}", "⏸️  Auto-click STOP requested".yellow());
        Notification::BackgroundHotkeys { start: false }
    }
}

/// The OS-global start/stop key.
///
/// Registration is idempotent and the key is released on drop.
pub struct HotkeyBinding {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
    label: String,
    registered: bool,
}

impl HotkeyBinding {
    pub fn new(hotkey_str: &str) -> Result<Self> {
        let hotkey = parse_hotkey(hotkey_str)?;
        let manager = GlobalHotKeyManager::new().map_err(|e| {
            ClickerError::hotkey(format!("failed to create GlobalHotKeyManager: {}", e))
        })?;

        Ok(Self {
            manager,
            hotkey,
            label: hotkey_str.to_string(),
            registered: false,
        })
    }

    pub fn register(&mut self) -> Result<()> {
        if self.registered {
            debug!("Hotkey '{}' already registered", self.label);
            return Ok(());
        }

        self.manager.register(self.hotkey).map_err(|e| {
            ClickerError::hotkey(format!("failed to register hotkey '{}': {}", self.label, e))
        })?;
        self.registered = true;

        info!("Global hotkey '{}' registered", self.label);
        eprintln!(
            "🔥 Global start/stop hotkey '{}' registered",
            self.label.bold()
        );
        Ok(())
    }

    pub fn unregister(&mut self) {
        if !self.registered {
            return;
        }
        match self.manager.unregister(self.hotkey) {
            Ok(()) => info!("Global hotkey '{}' released", self.label),
            Err(e) => warn!("Failed to release hotkey '{}': {}", self.label, e),
        }
        self.registered = false;
    }

    /// Forwards presses of this key to `presses` until the receiver is dropped.
    pub fn spawn_listener(&self, presses: mpsc::Sender<()>) {
        let receiver = GlobalHotKeyEvent::receiver();
        let id = self.hotkey.id();

        tokio::task::spawn_blocking(move || loop {
            if let Ok(event) = receiver.try_recv() {
                if event.id == id && event.state == HotKeyState::Pressed {
                    // Dropped presses are fine: one toggle is already queued.
                    let _ = presses.try_send(());
                }
            }
            if presses.is_closed() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        });
    }
}

impl Drop for HotkeyBinding {
    fn drop(&mut self) {
        self.unregister();
    }
}

pub fn parse_hotkey(hotkey_str: &str) -> Result<HotKey> {
    let binding = hotkey_str.to_lowercase();
    let parts: Vec<&str> = binding.split('+').map(|s| s.trim()).collect();

    let mut modifiers = Modifiers::empty();
    let mut key_code = None;

    for part in &parts {
        match *part {
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "alt" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            "meta" | "cmd" | "super" => modifiers |= Modifiers::SUPER,
            "" => return Err(ClickerError::invalid_hotkey(hotkey_str, "empty key")),
            key => {
                if key_code.is_some() {
                    return Err(ClickerError::invalid_hotkey(hotkey_str, "multiple keys specified"));
                }
                key_code = Some(parse_key_code(hotkey_str, key)?);
            }
        }
    }

    let code = key_code.ok_or_else(|| ClickerError::invalid_hotkey(hotkey_str, "no key specified"))?;

    Ok(HotKey::new(Some(modifiers), code))
}

fn parse_key_code(hotkey_str: &str, key: &str) -> Result<Code> {
    let name = match key {
        k if k.len() == 1 && k.chars().all(|c| c.is_ascii_alphabetic()) => {
            format!("Key{}", k.to_uppercase())
        }
        k if k.len() == 1 && k.chars().all(|c| c.is_ascii_digit()) => format!("Digit{}", k),
        k if k.starts_with('f') && k[1..].parse::<u8>().is_ok_and(|n| (1..=24).contains(&n)) => {
            k.to_uppercase()
        }
        "space" => "Space".to_string(),
        "enter" | "return" => "Enter".to_string(),
        "tab" => "Tab".to_string(),
        "escape" | "esc" => "Escape".to_string(),
        "backspace" => "Backspace".to_string(),
        "delete" => "Delete".to_string(),
        "insert" => "Insert".to_string(),
        "home" => "Home".to_string(),
        "end" => "End".to_string(),
        "pageup" => "PageUp".to_string(),
        "pagedown" => "PageDown".to_string(),
        "pause" => "Pause".to_string(),
        "scrolllock" => "ScrollLock".to_string(),
        _ => return Err(ClickerError::invalid_hotkey(hotkey_str, format!("unsupported key '{}'", key))),
    };

    Code::from_str(&name)
        .map_err(|_| ClickerError::invalid_hotkey(hotkey_str, format!("unsupported key '{}'", key)))
}
