mod agenda;
mod reminders;

pub use agenda::AgendaServiceImpl;
pub use reminders::{ReminderScheduler, UNKNOWN_CLIENT_LABEL};
