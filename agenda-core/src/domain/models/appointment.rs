use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::{AppointmentId, ClientId, Price, TimeOfDay};

/// Label shown in place of a client that no longer exists.
pub const REMOVED_CLIENT_LABEL: &str = "Removed client";

/// A scheduled service for a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: AppointmentId,
    pub client_id: ClientId,
    pub date: NaiveDate,
    pub time: Option<TimeOfDay>,
    pub service: String,
    pub price: Price,
}

impl Appointment {
    pub fn new(
        id: impl Into<AppointmentId>,
        client_id: impl Into<ClientId>,
        date: NaiveDate,
        service: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            client_id: client_id.into(),
            date,
            time: None,
            service: service.into(),
            price,
        }
    }

    pub fn with_time(mut self, time: TimeOfDay) -> Self {
        self.time = Some(time);
        self
    }

    /// Ordering key: by date, then by time, with a missing time first.
    pub fn sort_key(&self) -> (NaiveDate, Option<TimeOfDay>) {
        (self.date, self.time)
    }

    /// The moment this appointment starts.
    ///
    /// Appointments without a time start at the midnight that opens their date.
    pub fn starts_at(&self) -> NaiveDateTime {
        let time = self.time.map(NaiveTime::from).unwrap_or(NaiveTime::MIN);
        self.date.and_time(time)
    }
}

/// User input for creating or editing an appointment.
///
/// Fields hold raw text as typed. Validation happens in the service.
#[derive(Debug, Clone, Default)]
pub struct AppointmentForm {
    pub client_id: Option<ClientId>,
    pub date: String,
    pub time: String,
    pub service: String,
    pub price: String,
}

impl AppointmentForm {
    pub fn new(
        client_id: impl Into<ClientId>,
        date: impl Into<String>,
        service: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            date: date.into(),
            time: String::new(),
            service: service.into(),
            price: price.into(),
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }
}

/// An appointment prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentView<'a> {
    pub appointment: &'a Appointment,
    /// Client name, or [`REMOVED_CLIENT_LABEL`] when the reference dangles.
    pub client_label: &'a str,
    pub whatsapp_link: Option<String>,
    pub is_today: bool,
}
