//! # Auto Clicker
//!
//! A hotkey-driven mouse auto-clicker with persistent click profiles.
//!
//! ## Features
//!
//! - Single, double and hold clicks with any of the three main buttons
//! - Loop forever or repeat a fixed number of times
//! - Global start/stop hotkey that works while the UI is unfocused
//! - Named profiles stored in SQLite
//! - Last-used options kept in a JSON settings document
//! - JSON-lines command interface for an external UI
//!
//! ## Example
//!
//! ```no_run
//! use auto_clicker::{ClickJob, ClickScheduler, ClickType, EnigoDriver, MouseButton, RepeatPolicy};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> auto_clicker::Result<()> {
//! let (mut scheduler, mut ticks) = ClickScheduler::new(EnigoDriver::new()?, Duration::from_millis(1));
//!
//! scheduler.start(ClickJob {
//!     button: MouseButton::Left,
//!     click_type: ClickType::Single,
//!     repeat: RepeatPolicy::Times(10),
//!     interval: Duration::from_millis(100),
//! })?;
//!
//! while let Some(tick) = ticks.recv().await {
//!     if scheduler.on_tick(tick).is_some() {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Protocol
//!
//! The `autoclick` binary reads one JSON request per line on stdin:
//!
//! ```json
//! {"seq": 1, "cmd": "profile-add", "title": "farm", "fields": [{"id": "repeatTimes", "value": "50"}]}
//! {"seq": 2, "cmd": "scheduler-start", "input": "left", "type": "double", "repeat": "loop", "interval": 250}
//! ```

pub mod app;
pub mod chrome;
pub mod commands;
pub mod config;
pub mod error;
pub mod hotkey;
pub mod input;
pub mod profile;
pub mod scheduler;
pub mod settings;
pub mod store;

pub use app::{App, Call};
pub use chrome::{NotifyChrome, WindowChrome};
pub use commands::{Envelope, Notification, Outbound, Request, Response};
pub use config::Config;
pub use error::{ClickerError, Result};
pub use hotkey::HotkeyBinding;
pub use input::{EnigoDriver, InputDriver, InputEvent, MouseButton};
pub use profile::{ClickOptions, ClickType, FieldUpdate, FieldValue, Profile, ProfileField, RepeatPolicy};
pub use scheduler::{ClickJob, ClickScheduler, SchedulerState};
pub use settings::SettingsFile;
pub use store::ProfileStore;
