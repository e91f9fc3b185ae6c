//! In-memory agenda store for tests.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    RwLock,
};

use crate::domain::{
    models::{Appointment, Client},
    ports::outbound::AgendaRepository,
    StoreError,
};

#[derive(Default)]
pub struct MemoryStore {
    clients: RwLock<Vec<Client>>,
    appointments: RwLock<Vec<Appointment>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clients(self, clients: Vec<Client>) -> Self {
        *self.clients.write().unwrap() = clients;
        self
    }

    pub fn with_appointments(self, appointments: Vec<Appointment>) -> Self {
        *self.appointments.write().unwrap() = appointments;
        self
    }

    /// Make every subsequent save fail with an I/O error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful save calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn clients(&self) -> Vec<Client> {
        self.clients.read().unwrap().clone()
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.appointments.read().unwrap().clone()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        Ok(())
    }
}

impl AgendaRepository for MemoryStore {
    fn load_clients(&self) -> Result<Vec<Client>, StoreError> {
        Ok(self.clients())
    }

    fn load_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        Ok(self.appointments())
    }

    fn save_clients(&self, clients: &[Client]) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.clients.write().unwrap() = clients.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn save_appointments(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.appointments.write().unwrap() = appointments.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn save_all(&self, clients: &[Client], appointments: &[Appointment]) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.clients.write().unwrap() = clients.to_vec();
        *self.appointments.write().unwrap() = appointments.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
