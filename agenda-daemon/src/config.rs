use std::{path::Path, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString};
use strum::{Display, EnumString};

const APP_DIR_NAME: &str = "agenda-pro";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub storage: StorageSettings,
    pub reminders: ReminderSettings,
    pub status: StatusSettings,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct StorageSettings {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// How often the documents are re-read from disk. Zero disables reloading.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub reload_interval_secs: u64,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotifierKind {
    Log,
    Command,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SoundKind {
    Bell,
    Command,
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    Silent,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct ReminderSettings {
    pub enabled: bool,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub icon: Option<String>,
    pub notifier: NotifierKind,
    pub notify_command: String,
    pub sound: SoundKind,
    pub sound_command: String,
    #[serde(default)]
    pub sound_args: Vec<String>,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct StatusSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub message_ttl_ms: i64,
}

impl StorageSettings {
    /// The configured data directory, or the platform data directory.
    pub fn data_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_dir()
                .context("Cannot determine data directory")?
                .join(APP_DIR_NAME)),
        }
    }

    pub fn reload_interval(&self) -> Option<Duration> {
        (self.reload_interval_secs > 0).then(|| Duration::from_secs(self.reload_interval_secs))
    }
}

impl StatusSettings {
    pub fn message_ttl(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.message_ttl_ms.max(0))
    }
}

pub fn read_config() -> anyhow::Result<Settings> {
    let base_path = std::env::current_dir().context("Failed to determine the current directory")?;

    let environment = Environment::from_str(
        std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .as_str(),
    )
    .context("Failed to parse APP_ENVIRONMENT")?;

    read_config_from(&base_path.join("config"), environment)
        .with_context(|| format!("Failed to load {environment} configuration"))
}

pub fn read_config_from(
    config_directory: &Path,
    environment: Environment,
) -> Result<Settings, config::ConfigError> {
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(
            config::File::from(config_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("AGENDA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(" ")
                .with_list_parse_key("reminders.sound_args"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}
