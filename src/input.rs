//! Synthetic mouse input.
//!
//! The scheduler only ever talks to an [`InputDriver`]; [`EnigoDriver`] is the
//! production backend that injects events at the current cursor position.

use crate::error::{ClickerError, Result};
use enigo::{Button, Direction, Enigo, Mouse, Settings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mouse button targeted by a click job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Middle => "middle",
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MouseButton {
    type Err = ClickerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "middle" => Ok(Self::Middle),
            other => Err(ClickerError::invalid_value(
                "mouseButtonInput",
                other,
                "expected left, right or middle",
            )),
        }
    }
}

/// A single synthetic input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Click(MouseButton),
    Press(MouseButton),
    Release(MouseButton),
}

/// Backend capable of emitting mouse events at the current cursor position.
///
/// Calls are fire-and-forget from the scheduler's point of view: errors are
/// reported so they can be logged, never retried.
pub trait InputDriver {
    fn send(&mut self, event: InputEvent) -> Result<()>;

    fn click(&mut self, button: MouseButton) -> Result<()> {
        self.send(InputEvent::Click(button))
    }

    fn press(&mut self, button: MouseButton) -> Result<()> {
        self.send(InputEvent::Press(button))
    }

    fn release(&mut self, button: MouseButton) -> Result<()> {
        self.send(InputEvent::Release(button))
    }
}

/// [`InputDriver`] backed by `enigo`.
pub struct EnigoDriver {
    enigo: Enigo,
}

impl EnigoDriver {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| ClickerError::input(format!("failed to connect to input backend: {e}")))?;
        Ok(Self { enigo })
    }
}

impl InputDriver for EnigoDriver {
    fn send(&mut self, event: InputEvent) -> Result<()> {
        let (button, direction) = match event {
            InputEvent::Click(b) => (b, Direction::Click),
            InputEvent::Press(b) => (b, Direction::Press),
            InputEvent::Release(b) => (b, Direction::Release),
        };

        self.enigo
            .button(to_enigo(button), direction)
            .map_err(|e| ClickerError::input(format!("{event:?} failed: {e}")))
    }
}

fn to_enigo(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}
