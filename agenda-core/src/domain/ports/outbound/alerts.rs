use async_trait::async_trait;

use crate::domain::{models::Notification, AlertError};

/// Outbound port for platform notifications.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Ask the platform for permission to show notifications.
    ///
    /// Called once when the reminder scheduler starts. Returning `false`
    /// leaves reminders with the audible alert only.
    async fn request_permission(&self) -> bool {
        true
    }

    async fn notify(&self, notification: &Notification) -> Result<(), AlertError>;
}

/// Outbound port for the audible reminder cue.
#[async_trait]
pub trait SoundPlayer: Send + Sync + 'static {
    async fn play(&self) -> Result<(), AlertError>;
}
