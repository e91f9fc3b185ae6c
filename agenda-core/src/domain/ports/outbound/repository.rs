use crate::domain::{
    models::{Appointment, Client},
    StoreError,
};

/// The two documents the agenda persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DocumentKey {
    Clients,
    Agenda,
}

/// Outbound port for durable agenda storage.
///
/// Loads are synchronous. Saves replace the whole collection.
pub trait AgendaRepository: Send + Sync + 'static {
    /// Load all clients. A document that was never saved yields an empty list.
    fn load_clients(&self) -> Result<Vec<Client>, StoreError>;

    /// Load all appointments. A document that was never saved yields an empty list.
    fn load_appointments(&self) -> Result<Vec<Appointment>, StoreError>;

    fn save_clients(&self, clients: &[Client]) -> Result<(), StoreError>;

    fn save_appointments(&self, appointments: &[Appointment]) -> Result<(), StoreError>;

    /// Save both collections as one unit.
    ///
    /// Implementations should either persist both documents or leave both
    /// untouched. The default saves them one after the other.
    fn save_all(&self, clients: &[Client], appointments: &[Appointment]) -> Result<(), StoreError> {
        self.save_clients(clients)?;
        self.save_appointments(appointments)
    }
}
