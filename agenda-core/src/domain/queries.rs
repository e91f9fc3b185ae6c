//! Side-effect free views over the client and appointment collections.

use chrono::{NaiveDate, NaiveDateTime};

use super::{
    collation::compare_names,
    models::{
        Appointment, AppointmentView, Client, ClientId, Price, YearMonth, REMOVED_CLIENT_LABEL,
    },
};

pub fn find_client(clients: &[Client], id: ClientId) -> Option<&Client> {
    clients.iter().find(|c| c.id == id)
}

/// Clients sorted by name. Equal names keep their insertion order.
pub fn sorted_clients(clients: &[Client]) -> Vec<&Client> {
    let mut sorted: Vec<&Client> = clients.iter().collect();
    sorted.sort_by(|a, b| compare_names(&a.name, &b.name));
    sorted
}

/// Appointments ordered by `(date, time)`, restricted to clients whose name
/// contains `filter` (case-insensitively).
///
/// A blank filter matches everything, including appointments whose client
/// is gone. A non-blank filter never matches a missing client.
pub fn filtered_appointments<'a>(
    appointments: &'a [Appointment],
    clients: &[Client],
    filter: Option<&str>,
) -> Vec<&'a Appointment> {
    let needle = filter
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty());

    let mut rows: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| match &needle {
            None => true,
            Some(needle) => find_client(clients, a.client_id)
                .is_some_and(|c| c.name.to_lowercase().contains(needle.as_str())),
        })
        .collect();

    rows.sort_by_key(|a| a.sort_key());
    rows
}

pub fn appointment_views<'a>(
    appointments: &'a [Appointment],
    clients: &'a [Client],
    filter: Option<&str>,
    today: NaiveDate,
) -> Vec<AppointmentView<'a>> {
    filtered_appointments(appointments, clients, filter)
        .into_iter()
        .map(|appointment| {
            let client = find_client(clients, appointment.client_id);
            AppointmentView {
                appointment,
                client_label: client.map_or(REMOVED_CLIENT_LABEL, |c| c.name.as_str()),
                whatsapp_link: client.and_then(Client::whatsapp_link),
                is_today: appointment.date == today,
            }
        })
        .collect()
}

/// The appointment with the earliest start strictly after `now`.
pub fn next_upcoming(appointments: &[Appointment], now: NaiveDateTime) -> Option<&Appointment> {
    appointments
        .iter()
        .filter(|a| a.starts_at() > now)
        .min_by_key(|a| a.sort_key())
}

pub fn total(appointments: &[Appointment]) -> Price {
    appointments.iter().map(|a| a.price).sum()
}

pub fn daily_total(appointments: &[Appointment], date: NaiveDate) -> Price {
    appointments
        .iter()
        .filter(|a| a.date == date)
        .map(|a| a.price)
        .sum()
}

pub fn monthly_total(appointments: &[Appointment], month: YearMonth) -> Price {
    appointments
        .iter()
        .filter(|a| month.contains(a.date))
        .map(|a| a.price)
        .sum()
}
