use chrono::NaiveDate;
use thiserror::Error;

use super::models::{AppointmentId, CalendarError, ClientId, PriceError};

/// User-correctable problems with client or appointment input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("client name is required")]
    EmptyClientName,
    #[error("a client named '{0}' already exists")]
    DuplicateClientName(String),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    InvalidDate(CalendarError),
    #[error(transparent)]
    InvalidTime(CalendarError),
    #[error("'{0}' is not a valid price")]
    InvalidPrice(String),
    #[error("price must not be negative, got '{0}'")]
    NegativePrice(String),
    #[error("date {date} is in the past (today is {today})")]
    PastDate { date: NaiveDate, today: NaiveDate },
    #[error("client {0} does not exist")]
    UnknownClient(ClientId),
}

impl From<PriceError> for ValidationError {
    fn from(err: PriceError) -> Self {
        match err {
            PriceError::NotANumber(raw) => Self::InvalidPrice(raw),
            PriceError::Negative(raw) => Self::NegativePrice(raw),
        }
    }
}

/// Errors returned by agenda operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgendaError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("client {0} not found")]
    ClientNotFound(ClientId),
    #[error("appointment {0} not found")]
    AppointmentNotFound(AppointmentId),
}

/// Errors from the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("document '{document}' is corrupt: {reason}")]
    Corrupt { document: String, reason: String },
}

impl StoreError {
    pub fn corrupt(document: impl Into<String>, reason: impl ToString) -> Self {
        Self::Corrupt {
            document: document.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors from notification or sound dispatch.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert command '{command}' failed: {reason}")]
    Command { command: String, reason: String },
    #[error("alert I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Unavailable(String),
}

impl AlertError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("reminder scheduler must be created inside a tokio runtime")]
    NoRuntime,
}
