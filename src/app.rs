//! The application loop.
//!
//! Commands, timer ticks and hotkey presses are all handled here, one at a
//! time, by a single task that owns the scheduler and both stores.

use crate::chrome::WindowChrome;
use crate::commands::{Notification, Request, Response};
use crate::config::Config;
use crate::error::Result;
use crate::hotkey::{toggle_running, HotkeyBinding};
use crate::input::InputDriver;
use crate::profile::normalize_updates;
use crate::scheduler::{ClickJob, ClickScheduler, Tick};
use crate::settings::SettingsFile;
use crate::store::ProfileStore;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// A request together with the channel its reply goes back on.
pub struct Call {
    pub request: Request,
    pub reply: oneshot::Sender<Result<Response>>,
}

impl Call {
    pub fn new(request: Request) -> (Self, oneshot::Receiver<Result<Response>>) {
        let (reply, rx) = oneshot::channel();
        (Self { request, reply }, rx)
    }
}

pub struct App<D, C> {
    scheduler: ClickScheduler<D>,
    ticks: mpsc::Receiver<Tick>,
    store: ProfileStore,
    settings: SettingsFile,
    chrome: C,
    hotkey: Option<HotkeyBinding>,
    presses: Option<mpsc::Receiver<()>>,
    notifications: mpsc::UnboundedSender<Notification>,
    standalone: bool,
    closing: bool,
}

impl<D: InputDriver, C: WindowChrome> App<D, C> {
    pub fn new(
        driver: D,
        chrome: C,
        store: ProfileStore,
        settings: SettingsFile,
        notifications: mpsc::UnboundedSender<Notification>,
        config: &Config,
    ) -> Self {
        let (scheduler, ticks) = ClickScheduler::new(driver, config.min_interval);
        Self {
            scheduler,
            ticks,
            store,
            settings,
            chrome,
            hotkey: None,
            presses: None,
            notifications,
            standalone: config.standalone,
            closing: false,
        }
    }

    /// Registers the global hotkey and starts listening for it.
    ///
    /// A binding the OS refuses is dropped with a warning; the app then only
    /// reacts to explicit commands.
    pub fn attach_hotkey(&mut self, mut binding: HotkeyBinding) {
        if let Err(e) = binding.register() {
            warn!("Global hotkey unavailable, use commands to start and stop: {}", e);
            return;
        }
        let (tx, rx) = mpsc::channel(1);
        binding.spawn_listener(tx);
        self.presses = Some(rx);
        self.hotkey = Some(binding);
    }

    pub fn scheduler(&self) -> &ClickScheduler<D> {
        &self.scheduler
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub async fn run(mut self, mut calls: mpsc::Receiver<Call>) {
        info!("Auto-clicker ready");
        loop {
            tokio::select! {
                Some(tick) = self.ticks.recv() => self.on_tick(tick),
                Some(()) = next_press(&mut self.presses) => self.on_hotkey(),
                call = calls.recv() => match call {
                    Some(Call { request, reply }) => {
                        let result = self.handle(request);
                        if reply.send(result).is_err() {
                            debug!("Caller went away before the reply");
                        }
                        if self.closing {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        self.shutdown();
    }

    /// Executes one command-surface request.
    pub fn handle(&mut self, request: Request) -> Result<Response> {
        debug!(?request, "Handling request");
        match request {
            Request::ProfileList => Ok(Response::Profiles(self.store.list()?)),
            Request::ProfileAdd { title, fields } => {
                if let Err(e) = self.store.insert(&title, &fields) {
                    error!("Failed to add profile '{}': {}", title, e);
                }
                Ok(Response::None)
            }
            Request::ProfileUpdate { id, title, fields } => {
                match self.store.update(id, &title, &fields) {
                    Ok(true) => {
                        if let Ok(updates) = normalize_updates(&fields) {
                            self.settings.save_fields(&updates);
                        }
                    }
                    Ok(false) => warn!(id, "No profile to update"),
                    Err(e) => error!("Failed to update profile {}: {}", id, e),
                }
                Ok(Response::None)
            }
            Request::ProfileDelete { id } => {
                let deleted = self.store.delete(id).unwrap_or_else(|e| {
                    error!("Failed to delete profile {}: {}", id, e);
                    false
                });
                Ok(Response::Deleted(deleted))
            }
            Request::SettingsGet => Ok(Response::Settings(self.settings.get())),
            Request::SettingsSave { field, value } => {
                self.settings.save_field(&field, &value);
                Ok(Response::None)
            }
            Request::SchedulerStart(params) => {
                match params.click_job() {
                    Some(job) => self.start(job),
                    None => debug!("Ignoring start request with missing or malformed parameters"),
                }
                Ok(Response::None)
            }
            Request::SchedulerStop => {
                self.scheduler.stop();
                self.scheduler.state_mut().running = false;
                Ok(Response::None)
            }
            Request::WindowMinimize => {
                self.chrome.minimize();
                Ok(Response::None)
            }
            Request::WindowClose => {
                self.chrome.close();
                self.closing = true;
                Ok(Response::None)
            }
            Request::AlwaysOnTop { enabled } => {
                self.chrome.set_always_on_top(enabled);
                Ok(Response::None)
            }
            Request::WindowFocus { focused } => {
                if !focused {
                    if let Some(binding) = self.hotkey.as_mut() {
                        if let Err(e) = binding.register() {
                            warn!("Failed to re-register hotkey: {}", e);
                        }
                    }
                }
                Ok(Response::None)
            }
        }
    }

    pub fn on_tick(&mut self, tick: Tick) {
        if let Some(note) = self.scheduler.on_tick(tick) {
            self.notify(note);
        }
    }

    pub fn on_hotkey(&mut self) {
        let note = toggle_running(self.scheduler.state_mut());
        self.notify(note);

        if !self.standalone {
            return;
        }
        match note {
            Notification::BackgroundHotkeys { start: true } => match self.settings.get() {
                Some(options) => self.start(options.click_job()),
                None => warn!("Cannot start from hotkey without readable settings"),
            },
            Notification::BackgroundHotkeys { start: false } => self.scheduler.stop(),
            _ => {}
        }
    }

    fn start(&mut self, job: ClickJob) {
        match self.scheduler.start(job) {
            Ok(Some(note)) => self.notify(note),
            Ok(None) => {}
            Err(e) => warn!("Ignoring start request: {}", e),
        }
    }

    fn notify(&self, note: Notification) {
        if self.notifications.send(note).is_err() {
            debug!(?note, "No UI listening for notification");
        }
    }

    /// Releases any held button and the global hotkey.
    pub fn shutdown(&mut self) {
        info!("Shutting down");
        self.scheduler.stop();
        if let Some(binding) = self.hotkey.as_mut() {
            binding.unregister();
        }
    }
}

async fn next_press(presses: &mut Option<mpsc::Receiver<()>>) -> Option<()> {
    match presses {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
