//! Window chrome hooks.
//!
//! The window itself lives outside this crate. [`NotifyChrome`] forwards the
//! requests to the UI as `frame` notifications.

use crate::commands::{FrameRequest, Notification};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub trait WindowChrome {
    fn minimize(&mut self);
    fn close(&mut self);
    fn set_always_on_top(&mut self, enabled: bool);
}

pub struct NotifyChrome {
    notifications: mpsc::UnboundedSender<Notification>,
}

impl NotifyChrome {
    pub fn new(notifications: mpsc::UnboundedSender<Notification>) -> Self {
        Self { notifications }
    }

    fn forward(&self, request: FrameRequest) {
        debug!(?request, "Forwarding frame request");
        if self.notifications.send(Notification::Frame(request)).is_err() {
            warn!("UI channel closed, dropping frame request {:?}", request);
        }
    }
}

impl WindowChrome for NotifyChrome {
    fn minimize(&mut self) {
        self.forward(FrameRequest::Minimize);
    }

    fn close(&mut self) {
        self.forward(FrameRequest::Exit);
    }

    fn set_always_on_top(&mut self, enabled: bool) {
        self.forward(FrameRequest::AlwaysOnTop(enabled));
    }
}
