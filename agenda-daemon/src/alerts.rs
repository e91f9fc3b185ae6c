//! Desktop adapters for reminder notifications and sounds.

use std::{io::Write, sync::Arc};

use agenda_core::domain::{
    models::Notification,
    ports::outbound::{Notifier, SoundPlayer},
    AlertError,
};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::{NotifierKind, ReminderSettings, SoundKind};

/// Build the notifier and sound player selected in the settings.
pub fn from_settings(settings: &ReminderSettings) -> (Arc<dyn Notifier>, Arc<dyn SoundPlayer>) {
    let notifier: Arc<dyn Notifier> = match settings.notifier {
        NotifierKind::Log => Arc::new(LogNotifier),
        NotifierKind::Command => Arc::new(CommandNotifier::new(&settings.notify_command)),
    };

    let sound: Arc<dyn SoundPlayer> = match settings.sound {
        SoundKind::Bell => Arc::new(TerminalBell),
        SoundKind::Command => Arc::new(CommandSound::new(
            &settings.sound_command,
            settings.sound_args.clone(),
        )),
        SoundKind::Silent => Arc::new(NoSound),
    };

    (notifier, sound)
}

/// Writes notifications to the log instead of the desktop.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), AlertError> {
        info!(
            title = %notification.title,
            body = %notification.body,
            "Notification"
        );
        Ok(())
    }
}

/// Shows notifications by running a `notify-send` compatible command.
pub struct CommandNotifier {
    program: String,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    /// Granted only when the command can be found on `PATH`.
    async fn request_permission(&self) -> bool {
        match which::which(&self.program) {
            Ok(path) => {
                info!(command = %path.display(), "Using notification command");
                true
            }
            Err(e) => {
                warn!(command = %self.program, error = %e, "Notification command not found");
                false
            }
        }
    }

    async fn notify(&self, notification: &Notification) -> Result<(), AlertError> {
        let mut command = Command::new(&self.program);
        if let Some(icon) = &notification.icon {
            command.arg("-i").arg(icon);
        }
        command.arg(&notification.title).arg(&notification.body);

        run(&self.program, command).await
    }
}

/// Rings the terminal bell.
pub struct TerminalBell;

#[async_trait]
impl SoundPlayer for TerminalBell {
    async fn play(&self) -> Result<(), AlertError> {
        ring_bell()?;
        Ok(())
    }
}

/// Plays a sound by running an audio player command.
pub struct CommandSound {
    program: String,
    args: Vec<String>,
}

impl CommandSound {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl SoundPlayer for CommandSound {
    async fn play(&self) -> Result<(), AlertError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        run(&self.program, command).await
    }
}

fn ring_bell() -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(b"\x07")?;
    stdout.flush()
}

pub struct NoSound;

#[async_trait]
impl SoundPlayer for NoSound {
    async fn play(&self) -> Result<(), AlertError> {
        Ok(())
    }
}

async fn run(program: &str, mut command: Command) -> Result<(), AlertError> {
    let status = command
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .status()
        .await
        .map_err(|e| AlertError::Command {
            command: program.to_string(),
            reason: e.to_string(),
        })?;

    if !status.success() {
        return Err(AlertError::Command {
            command: program.to_string(),
            reason: format!("exited with {status}"),
        });
    }

    Ok(())
}
