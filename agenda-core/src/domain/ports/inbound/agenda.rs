use chrono::NaiveDate;

use crate::domain::{
    models::{
        Appointment, AppointmentForm, AppointmentId, AppointmentView, Client, ClientForm,
        ClientId, Price, StatusMessage, YearMonth,
    },
    AgendaError,
};

/// Inbound port for agenda operations.
///
/// This is the only mutation path for clients and appointments. Every
/// operation runs to completion synchronously, and a successful mutation is
/// persisted before the call returns.
pub trait AgendaService {
    // ========================================================================
    // Clients
    // ========================================================================

    /// Create a client, or update the one identified by `editing`.
    ///
    /// The name is trimmed and must be non-empty and unique
    /// (case-insensitively) among the other clients.
    fn upsert_client(
        &mut self,
        form: ClientForm,
        editing: Option<ClientId>,
    ) -> Result<Client, AgendaError>;

    /// Delete a client and every appointment that references it.
    ///
    /// Returns the number of appointments removed with the client.
    fn delete_client(&mut self, id: ClientId) -> Result<usize, AgendaError>;

    /// Clients ordered by name.
    fn list_clients(&self) -> Vec<&Client>;

    fn client(&self, id: ClientId) -> Option<&Client>;

    // ========================================================================
    // Appointments
    // ========================================================================

    /// Create an appointment, or update the one identified by `editing`.
    fn upsert_appointment(
        &mut self,
        form: AppointmentForm,
        editing: Option<AppointmentId>,
    ) -> Result<Appointment, AgendaError>;

    fn delete_appointment(&mut self, id: AppointmentId) -> Result<(), AgendaError>;

    /// Appointments ordered by date and time, optionally restricted to
    /// clients whose name contains `filter`.
    fn list_appointments(&self, filter: Option<&str>) -> Vec<&Appointment>;

    /// Same rows as [`AgendaService::list_appointments`], ready for display.
    fn appointment_views(&self, filter: Option<&str>) -> Vec<AppointmentView<'_>>;

    fn appointment(&self, id: AppointmentId) -> Option<&Appointment>;

    /// The earliest appointment that starts strictly after now.
    fn next_upcoming(&self) -> Option<&Appointment>;

    // ========================================================================
    // Financial summaries
    // ========================================================================

    /// Sum of every appointment price.
    fn total_receivable(&self) -> Price;

    fn daily_total(&self, date: NaiveDate) -> Price;

    fn monthly_total(&self, month: YearMonth) -> Price;

    // ========================================================================
    // Feedback
    // ========================================================================

    /// Outcome of the last operation, while it has not expired.
    fn status(&self) -> Option<&StatusMessage>;
}
