//! Alert ports that record what they were asked to do.
//!
//! Used by tests and by dry runs that should not touch the desktop.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{
    models::Notification,
    ports::outbound::{Notifier, SoundPlayer},
    AlertError,
};

#[derive(Default)]
pub struct RecordingNotifier {
    deny: bool,
    fail: bool,
    permission_requests: Mutex<usize>,
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse notification permission.
    pub fn denying(mut self) -> Self {
        self.deny = true;
        self
    }

    /// Record every notification, then report it as failed.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn permission_requests(&self) -> usize {
        *self.permission_requests.lock().unwrap()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn request_permission(&self) -> bool {
        *self.permission_requests.lock().unwrap() += 1;
        !self.deny
    }

    async fn notify(&self, notification: &Notification) -> Result<(), AlertError> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            return Err(AlertError::unavailable("notification service unavailable"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSound {
    fail: bool,
    plays: Mutex<usize>,
}

impl RecordingSound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn plays(&self) -> usize {
        *self.plays.lock().unwrap()
    }
}

#[async_trait]
impl SoundPlayer for RecordingSound {
    async fn play(&self) -> Result<(), AlertError> {
        *self.plays.lock().unwrap() += 1;
        if self.fail {
            return Err(AlertError::unavailable("no audio device"));
        }
        Ok(())
    }
}
