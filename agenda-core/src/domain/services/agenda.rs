use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{debug, error, info, instrument};

use super::ReminderScheduler;
use crate::domain::{
    models::{
        default_status_ttl, parse_date, Appointment, AppointmentForm, AppointmentId,
        AppointmentView, Client, ClientForm, ClientId, IdAllocator, Price, StatusMessage,
        TimeOfDay, YearMonth,
    },
    ports::{
        inbound::AgendaService,
        outbound::{AgendaRepository, Clock},
    },
    queries, AgendaError, StoreError, ValidationError,
};

/// Owns the client and appointment collections and keeps the store and the
/// reminder scheduler in step with them.
pub struct AgendaServiceImpl<S, K> {
    repository: Arc<S>,
    clock: Arc<K>,
    clients: Vec<Client>,
    appointments: Vec<Appointment>,
    ids: IdAllocator,
    status: Option<StatusMessage>,
    status_ttl: Duration,
    reminders: Option<ReminderScheduler>,
}

/// Appointment fields that passed validation, waiting for an id.
struct ValidAppointment {
    client_id: ClientId,
    date: NaiveDate,
    time: Option<TimeOfDay>,
    service: String,
    price: Price,
}

impl ValidAppointment {
    fn into_appointment(self, id: AppointmentId) -> Appointment {
        Appointment {
            id,
            client_id: self.client_id,
            date: self.date,
            time: self.time,
            service: self.service,
            price: self.price,
        }
    }
}

impl<S: AgendaRepository, K: Clock> AgendaServiceImpl<S, K> {
    /// Load both collections from the store.
    ///
    /// Fails if either document is unreadable, so corrupt data is never
    /// overwritten by an empty collection.
    pub fn load(repository: Arc<S>, clock: Arc<K>) -> Result<Self, StoreError> {
        let clients = repository.load_clients()?;
        let appointments = repository.load_appointments()?;

        info!(
            clients = clients.len(),
            appointments = appointments.len(),
            "Agenda loaded"
        );

        let mut service = Self {
            repository,
            clock,
            clients,
            appointments,
            ids: IdAllocator::new(),
            status: None,
            status_ttl: default_status_ttl(),
            reminders: None,
        };
        service.seed_ids();
        Ok(service)
    }

    /// Attach a reminder scheduler and arm it for the loaded appointments.
    pub fn with_reminders(mut self, scheduler: ReminderScheduler) -> Self {
        self.reminders = Some(scheduler);
        self.refresh_reminders();
        self
    }

    pub fn with_status_ttl(mut self, ttl: Duration) -> Self {
        self.status_ttl = ttl;
        self
    }

    pub fn reminders(&self) -> Option<&ReminderScheduler> {
        self.reminders.as_ref()
    }

    /// Rebuild the armed reminders from the current collections.
    pub fn refresh_reminders(&mut self) {
        if let Some(scheduler) = self.reminders.as_mut() {
            scheduler.rebuild(&self.appointments, &self.clients, self.clock.now());
        }
    }

    /// Re-read both documents and adopt them if they changed on disk.
    ///
    /// Returns whether the in-memory collections were replaced.
    #[instrument(skip(self))]
    pub fn reload(&mut self) -> Result<bool, StoreError> {
        let clients = self.repository.load_clients()?;
        let appointments = self.repository.load_appointments()?;

        if clients == self.clients && appointments == self.appointments {
            return Ok(false);
        }

        info!(
            clients = clients.len(),
            appointments = appointments.len(),
            "Agenda changed on disk, reloading"
        );
        self.clients = clients;
        self.appointments = appointments;
        self.seed_ids();
        self.refresh_reminders();
        Ok(true)
    }

    /// Cancel every armed reminder.
    pub fn shutdown(&mut self) {
        if let Some(scheduler) = self.reminders.as_mut() {
            scheduler.cancel_all();
        }
        info!("Agenda shut down");
    }

    fn seed_ids(&mut self) {
        let client_ids = self.clients.iter().map(|c| c.id.as_i64());
        let appointment_ids = self.appointments.iter().map(|a| a.id.as_i64());
        for id in client_ids.chain(appointment_ids) {
            self.ids.observe(id);
        }
    }

    fn next_id(&mut self) -> i64 {
        self.ids.next(self.clock.now_millis())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    fn persist_clients(&self) {
        if let Err(e) = self.repository.save_clients(&self.clients) {
            error!(error = %e, "Failed to save clients");
        }
    }

    fn persist_appointments(&self) {
        if let Err(e) = self.repository.save_appointments(&self.appointments) {
            error!(error = %e, "Failed to save appointments");
        }
    }

    fn persist_all(&self) {
        if let Err(e) = self
            .repository
            .save_all(&self.clients, &self.appointments)
        {
            error!(error = %e, "Failed to save agenda");
        }
    }

    /// Record the outcome of an operation as the current status message.
    fn report<T>(
        &mut self,
        result: Result<T, AgendaError>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<T, AgendaError> {
        let now = self.clock.now();
        self.status = Some(match &result {
            Ok(value) => StatusMessage::success(success(value), now, self.status_ttl),
            Err(e) => {
                debug!(error = %e, "Operation rejected");
                StatusMessage::failure(e.to_string(), now, self.status_ttl)
            }
        });
        result
    }

    // ========================================================================
    // Clients
    // ========================================================================

    fn apply_client(
        &mut self,
        form: ClientForm,
        editing: Option<ClientId>,
    ) -> Result<Client, AgendaError> {
        if let Some(id) = editing {
            if queries::find_client(&self.clients, id).is_none() {
                return Err(AgendaError::ClientNotFound(id));
            }
        }

        let name = form.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyClientName.into());
        }

        let lowered = name.to_lowercase();
        let taken = self
            .clients
            .iter()
            .any(|c| Some(c.id) != editing && c.name.to_lowercase() == lowered);
        if taken {
            return Err(ValidationError::DuplicateClientName(name.to_string()).into());
        }

        let id = match editing {
            Some(id) => id,
            None => ClientId::new(self.next_id()),
        };
        let client = Client::new(id, name).with_phone(form.phone.trim());

        match self.clients.iter_mut().find(|c| c.id == id) {
            Some(existing) => *existing = client.clone(),
            None => self.clients.push(client.clone()),
        }

        self.persist_clients();
        self.refresh_reminders();
        Ok(client)
    }

    fn remove_client(&mut self, id: ClientId) -> Result<usize, AgendaError> {
        let position = self
            .clients
            .iter()
            .position(|c| c.id == id)
            .ok_or(AgendaError::ClientNotFound(id))?;

        self.clients.remove(position);
        let before = self.appointments.len();
        self.appointments.retain(|a| a.client_id != id);
        let cascaded = before - self.appointments.len();

        self.persist_all();
        self.refresh_reminders();
        Ok(cascaded)
    }

    // ========================================================================
    // Appointments
    // ========================================================================

    fn validate_appointment(
        &self,
        form: &AppointmentForm,
    ) -> Result<ValidAppointment, ValidationError> {
        let client_id = form.client_id.ok_or(ValidationError::MissingField("client"))?;
        let date = required(&form.date, "date")?;
        let service = required(&form.service, "service")?;
        let price = required(&form.price, "price")?;

        let date = parse_date(date).map_err(ValidationError::InvalidDate)?;
        let time = match form.time.trim() {
            "" => None,
            raw => Some(raw.parse::<TimeOfDay>().map_err(ValidationError::InvalidTime)?),
        };
        let price: Price = price.parse()?;

        let today = self.clock.today();
        if date < today {
            return Err(ValidationError::PastDate { date, today });
        }

        if queries::find_client(&self.clients, client_id).is_none() {
            return Err(ValidationError::UnknownClient(client_id));
        }

        Ok(ValidAppointment {
            client_id,
            date,
            time,
            service: service.to_string(),
            price,
        })
    }

    fn apply_appointment(
        &mut self,
        form: AppointmentForm,
        editing: Option<AppointmentId>,
    ) -> Result<Appointment, AgendaError> {
        if let Some(id) = editing {
            if !self.appointments.iter().any(|a| a.id == id) {
                return Err(AgendaError::AppointmentNotFound(id));
            }
        }

        let valid = self.validate_appointment(&form)?;
        let id = match editing {
            Some(id) => id,
            None => AppointmentId::new(self.next_id()),
        };
        let appointment = valid.into_appointment(id);

        match self.appointments.iter_mut().find(|a| a.id == id) {
            Some(existing) => *existing = appointment.clone(),
            None => self.appointments.push(appointment.clone()),
        }

        self.persist_appointments();
        self.refresh_reminders();
        Ok(appointment)
    }

    fn remove_appointment(&mut self, id: AppointmentId) -> Result<(), AgendaError> {
        let position = self
            .appointments
            .iter()
            .position(|a| a.id == id)
            .ok_or(AgendaError::AppointmentNotFound(id))?;

        self.appointments.remove(position);
        self.persist_appointments();
        self.refresh_reminders();
        Ok(())
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed)
}

impl<S: AgendaRepository, K: Clock> AgendaService for AgendaServiceImpl<S, K> {
    #[instrument(skip(self))]
    fn upsert_client(
        &mut self,
        form: ClientForm,
        editing: Option<ClientId>,
    ) -> Result<Client, AgendaError> {
        let result = self.apply_client(form, editing);
        self.report(result, |client| format!("Client '{}' saved", client.name))
    }

    #[instrument(skip(self))]
    fn delete_client(&mut self, id: ClientId) -> Result<usize, AgendaError> {
        let result = self.remove_client(id);
        self.report(result, |cascaded| match cascaded {
            0 => "Client deleted".to_string(),
            1 => "Client and 1 appointment deleted".to_string(),
            n => format!("Client and {n} appointments deleted"),
        })
    }

    fn list_clients(&self) -> Vec<&Client> {
        queries::sorted_clients(&self.clients)
    }

    fn client(&self, id: ClientId) -> Option<&Client> {
        queries::find_client(&self.clients, id)
    }

    #[instrument(skip(self))]
    fn upsert_appointment(
        &mut self,
        form: AppointmentForm,
        editing: Option<AppointmentId>,
    ) -> Result<Appointment, AgendaError> {
        let result = self.apply_appointment(form, editing);
        self.report(result, |_| "Appointment saved".to_string())
    }

    #[instrument(skip(self))]
    fn delete_appointment(&mut self, id: AppointmentId) -> Result<(), AgendaError> {
        let result = self.remove_appointment(id);
        self.report(result, |_| "Appointment deleted".to_string())
    }

    fn list_appointments(&self, filter: Option<&str>) -> Vec<&Appointment> {
        queries::filtered_appointments(&self.appointments, &self.clients, filter)
    }

    fn appointment_views(&self, filter: Option<&str>) -> Vec<AppointmentView<'_>> {
        queries::appointment_views(
            &self.appointments,
            &self.clients,
            filter,
            self.clock.today(),
        )
    }

    fn appointment(&self, id: AppointmentId) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    fn next_upcoming(&self) -> Option<&Appointment> {
        queries::next_upcoming(&self.appointments, self.clock.now())
    }

    fn total_receivable(&self) -> Price {
        queries::total(&self.appointments)
    }

    fn daily_total(&self, date: NaiveDate) -> Price {
        queries::daily_total(&self.appointments, date)
    }

    fn monthly_total(&self, month: YearMonth) -> Price {
        queries::monthly_total(&self.appointments, month)
    }

    fn status(&self) -> Option<&StatusMessage> {
        let now = self.clock.now();
        self.status.as_ref().filter(|s| !s.is_expired(now))
    }
}
