//! One-shot reminders for today's appointments.
//!
//! The scheduler is rebuilt from a snapshot of the collections after every
//! change. A rebuild aborts every timer that has not fired before arming new
//! ones, so an appointment fires at most once per rebuild. A reminder that
//! already fired is left to finish its dispatch.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use chrono::NaiveDateTime;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::domain::{
    models::{Appointment, AppointmentId, Client, Notification, ReminderState},
    ports::outbound::{Notifier, SoundPlayer},
    queries::find_client,
    SchedulerError,
};

/// Label used when a reminder's client no longer exists.
pub const UNKNOWN_CLIENT_LABEL: &str = "Client";

const NOTIFICATION_TITLE: &str = "Appointment reminder";

struct ArmedReminder {
    fire_at: NaiveDateTime,
    fired: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ArmedReminder {
    fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    sound: Arc<dyn SoundPlayer>,
    icon: Option<String>,
    notifications_allowed: bool,
    runtime: Handle,
    armed: HashMap<AppointmentId, ArmedReminder>,
}

impl ReminderScheduler {
    /// Create a scheduler bound to the current tokio runtime.
    ///
    /// Asks the notifier for permission exactly once. When it is denied,
    /// reminders only play the sound.
    pub async fn start(
        notifier: Arc<dyn Notifier>,
        sound: Arc<dyn SoundPlayer>,
    ) -> Result<Self, SchedulerError> {
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        let notifications_allowed = notifier.request_permission().await;
        if !notifications_allowed {
            warn!("Notification permission denied, reminders will only play a sound");
        }

        Ok(Self {
            notifier,
            sound,
            icon: None,
            notifications_allowed,
            runtime,
            armed: HashMap::new(),
        })
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn notifications_allowed(&self) -> bool {
        self.notifications_allowed
    }

    /// Cancel every armed reminder and arm one for each of today's timed
    /// appointments that has not started yet.
    ///
    /// Appointments whose time has already passed are skipped, with no
    /// catch-up.
    pub fn rebuild(&mut self, appointments: &[Appointment], clients: &[Client], now: NaiveDateTime) {
        let today = now.date();

        self.disarm();
        self.armed.retain(|id, reminder| {
            reminder.fire_at.date() == today && appointments.iter().any(|a| a.id == *id)
        });

        for appointment in appointments.iter().filter(|a| a.date == today) {
            let Some(time) = appointment.time else {
                continue;
            };

            let fire_at = today.and_time(time.into());
            let Ok(delay) = (fire_at - now).to_std() else {
                continue;
            };
            if delay.is_zero() {
                continue;
            }

            let client_label = find_client(clients, appointment.client_id)
                .map_or(UNKNOWN_CLIENT_LABEL, |c| c.name.as_str());
            let notification = Notification::new(
                NOTIFICATION_TITLE,
                &format!("{time} {client_label}: {}", appointment.service),
                self.icon.as_deref(),
            );

            let fired = Arc::new(AtomicBool::new(false));
            let handle = self.runtime.spawn(fire_after(
                delay,
                appointment.id,
                notification,
                Arc::clone(&fired),
                self.notifications_allowed.then(|| Arc::clone(&self.notifier)),
                Arc::clone(&self.sound),
            ));

            debug!(
                appointment = %appointment.id,
                %fire_at,
                delay_secs = delay.as_secs(),
                "Reminder armed"
            );
            self.armed.insert(
                appointment.id,
                ArmedReminder {
                    fire_at,
                    fired,
                    handle,
                },
            );
        }

        info!(armed = self.pending(), "Reminders rebuilt");
    }

    /// Abort every timer that has not fired yet and forget all reminders.
    ///
    /// Reminders already dispatching run to completion.
    pub fn cancel_all(&mut self) {
        self.disarm();
        self.armed.clear();
    }

    /// Abort pending timers, keeping the reminders that already fired.
    fn disarm(&mut self) {
        self.armed.retain(|id, reminder| {
            if reminder.has_fired() {
                return true;
            }
            reminder.handle.abort();
            debug!(appointment = %id, "Reminder cancelled");
            false
        });
    }

    pub fn state(&self, id: AppointmentId) -> ReminderState {
        match self.armed.get(&id) {
            None => ReminderState::Unarmed,
            Some(reminder) if reminder.has_fired() => ReminderState::Fired,
            Some(_) => ReminderState::Armed,
        }
    }

    /// When the reminder for `id` is due, if one is armed or has fired.
    pub fn fire_at(&self, id: AppointmentId) -> Option<NaiveDateTime> {
        self.armed.get(&id).map(|r| r.fire_at)
    }

    /// Number of reminders still waiting to fire.
    pub fn pending(&self) -> usize {
        self.armed.values().filter(|r| !r.has_fired()).count()
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn fire_after(
    delay: std::time::Duration,
    appointment: AppointmentId,
    notification: Notification,
    fired: Arc<AtomicBool>,
    notifier: Option<Arc<dyn Notifier>>,
    sound: Arc<dyn SoundPlayer>,
) {
    tokio::time::sleep(delay).await;
    fired.store(true, Ordering::SeqCst);

    info!(%appointment, body = %notification.body, "Reminder fired");

    let play = async {
        if let Err(e) = sound.play().await {
            warn!(%appointment, error = %e, "Failed to play reminder sound");
        }
    };
    let show = async {
        if let Some(notifier) = &notifier {
            if let Err(e) = notifier.notify(&notification).await {
                warn!(%appointment, error = %e, "Failed to show reminder notification");
            }
        }
    };
    tokio::join!(play, show);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::{
        adapters::outbound::{RecordingNotifier, RecordingSound},
        domain::models::{Price, TimeOfDay},
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn now() -> NaiveDateTime {
        today().and_hms_opt(14, 59, 58).unwrap()
    }

    fn appointment(id: i64, date: NaiveDate, time: Option<(u32, u32)>) -> Appointment {
        let mut appointment = Appointment::new(id, 1, date, "Corte", Price::ZERO);
        appointment.time = time.and_then(|(h, m)| TimeOfDay::new(h, m));
        appointment
    }

    fn clients() -> Vec<Client> {
        vec![Client::new(1, "Ana")]
    }

    async fn scheduler(
        notifier: &Arc<RecordingNotifier>,
        sound: &Arc<RecordingSound>,
    ) -> ReminderScheduler {
        ReminderScheduler::start(notifier.clone(), sound.clone())
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_when_the_time_arrives() {
        let notifier = Arc::new(RecordingNotifier::new());
        let sound = Arc::new(RecordingSound::new());
        let mut scheduler = scheduler(&notifier, &sound).await;

        let appointments = vec![appointment(1, today(), Some((15, 0)))];
        scheduler.rebuild(&appointments, &clients(), now());
        assert_eq!(scheduler.state(AppointmentId::new(1)), ReminderState::Armed);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(notifier.sent().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Appointment reminder");
        assert_eq!(sent[0].body, "15:00 Ana: Corte");
        assert_eq!(sound.plays(), 1);
        assert_eq!(scheduler.state(AppointmentId::new(1)), ReminderState::Fired);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn only_future_timed_appointments_for_today_are_armed() {
        let notifier = Arc::new(RecordingNotifier::new());
        let sound = Arc::new(RecordingSound::new());
        let mut scheduler = scheduler(&notifier, &sound).await;

        let tomorrow = today().succ_opt().unwrap();
        let appointments = vec![
            appointment(1, today(), Some((15, 0))),
            appointment(2, today(), Some((14, 0))),
            appointment(3, today(), None),
            appointment(4, tomorrow, Some((15, 0))),
        ];
        scheduler.rebuild(&appointments, &clients(), now());

        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.state(AppointmentId::new(1)), ReminderState::Armed);
        for id in [2, 3, 4] {
            assert_eq!(scheduler.state(AppointmentId::new(id)), ReminderState::Unarmed);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn appointment_due_exactly_now_is_not_armed() {
        let notifier = Arc::new(RecordingNotifier::new());
        let sound = Arc::new(RecordingSound::new());
        let mut scheduler = scheduler(&notifier, &sound).await;

        let appointments = vec![appointment(1, today(), Some((15, 0)))];
        let exactly = today().and_hms_opt(15, 0, 0).unwrap();
        scheduler.rebuild(&appointments, &clients(), exactly);

        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rebuild_replaces_the_previous_timer() {
        let notifier = Arc::new(RecordingNotifier::new());
        let sound = Arc::new(RecordingSound::new());
        let mut scheduler = scheduler(&notifier, &sound).await;

        scheduler.rebuild(&[appointment(1, today(), Some((15, 0)))], &clients(), now());
        scheduler.rebuild(&[appointment(1, today(), Some((15, 1)))], &clients(), now());
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(
            scheduler.fire_at(AppointmentId::new(1)),
            Some(today().and_hms_opt(15, 1, 0).unwrap())
        );

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(notifier.sent().is_empty());

        tokio::time::sleep(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(notifier.sent()[0].body, "15:01 Ana: Corte");
    }

    #[tokio::test(start_paused = true)]
    async fn removed_appointment_never_fires() {
        let notifier = Arc::new(RecordingNotifier::new());
        let sound = Arc::new(RecordingSound::new());
        let mut scheduler = scheduler(&notifier, &sound).await;

        scheduler.rebuild(&[appointment(1, today(), Some((15, 0)))], &clients(), now());
        scheduler.rebuild(&[], &clients(), now());
        assert_eq!(scheduler.state(AppointmentId::new(1)), ReminderState::Unarmed);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(notifier.sent().is_empty());
        assert_eq!(sound.plays(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_client_falls_back_to_generic_label() {
        let notifier = Arc::new(RecordingNotifier::new());
        let sound = Arc::new(RecordingSound::new());
        let mut scheduler = scheduler(&notifier, &sound).await;

        scheduler.rebuild(&[appointment(1, today(), Some((15, 0)))], &[], now());
        tokio::time::sleep(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;

        assert_eq!(notifier.sent()[0].body, "15:00 Client: Corte");
    }

    #[tokio::test(start_paused = true)]
    async fn denied_permission_only_plays_sound() {
        let notifier = Arc::new(RecordingNotifier::new().denying());
        let sound = Arc::new(RecordingSound::new());
        let mut scheduler = scheduler(&notifier, &sound).await;
        assert!(!scheduler.notifications_allowed());
        assert_eq!(notifier.permission_requests(), 1);

        scheduler.rebuild(&[appointment(1, today(), Some((15, 0)))], &clients(), now());
        scheduler.rebuild(&[appointment(1, today(), Some((15, 0)))], &clients(), now());
        tokio::time::sleep(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;

        assert_eq!(notifier.permission_requests(), 1);
        assert!(notifier.sent().is_empty());
        assert_eq!(sound.plays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sound_failure_does_not_block_notification() {
        let notifier = Arc::new(RecordingNotifier::new());
        let sound = Arc::new(RecordingSound::new().failing());
        let mut scheduler = scheduler(&notifier, &sound).await;

        scheduler.rebuild(&[appointment(1, today(), Some((15, 0)))], &clients(), now());
        tokio::time::sleep(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;

        assert_eq!(sound.plays(), 1);
        assert_eq!(notifier.sent().len(), 1);

        // Later rebuilds still work after a failed dispatch.
        let later = today().and_hms_opt(15, 0, 30).unwrap();
        scheduler.rebuild(&[appointment(2, today(), Some((15, 1)))], &clients(), later);
        assert_eq!(scheduler.pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn notification_failure_is_swallowed() {
        let notifier = Arc::new(RecordingNotifier::new().failing());
        let sound = Arc::new(RecordingSound::new());
        let mut scheduler = scheduler(&notifier, &sound).await;

        scheduler.rebuild(&[appointment(1, today(), Some((15, 0)))], &clients(), now());
        tokio::time::sleep(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;

        assert_eq!(scheduler.state(AppointmentId::new(1)), ReminderState::Fired);
    }

    /// A player that takes a while to finish, like an external audio command.
    #[derive(Default)]
    struct SlowSound {
        finished: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SoundPlayer for SlowSound {
        async fn play(&self) -> Result<(), crate::domain::AlertError> {
            tokio::time::sleep(Duration::from_secs(2)).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rebuild_during_dispatch_keeps_the_fired_reminder() {
        let notifier = Arc::new(RecordingNotifier::new());
        let sound = Arc::new(SlowSound::default());
        let mut scheduler = ReminderScheduler::start(notifier.clone(), sound.clone())
            .await
            .unwrap();

        let appointments = vec![appointment(1, today(), Some((15, 0)))];
        scheduler.rebuild(&appointments, &clients(), now());

        tokio::time::sleep(Duration::from_secs(3)).await;
        tokio::task::yield_now().await;

        // The sound is still playing, yet the notification is already out.
        assert_eq!(sound.finished.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(scheduler.state(AppointmentId::new(1)), ReminderState::Fired);

        let later = today().and_hms_opt(15, 0, 1).unwrap();
        scheduler.rebuild(&appointments, &clients(), later);
        assert_eq!(scheduler.state(AppointmentId::new(1)), ReminderState::Fired);
        assert_eq!(scheduler.pending(), 0);

        tokio::time::sleep(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;

        assert_eq!(sound.finished.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_lets_a_fired_reminder_finish() {
        let notifier = Arc::new(RecordingNotifier::new());
        let sound = Arc::new(SlowSound::default());
        let mut scheduler = ReminderScheduler::start(notifier.clone(), sound.clone())
            .await
            .unwrap();

        scheduler.rebuild(&[appointment(1, today(), Some((15, 0)))], &clients(), now());
        tokio::time::sleep(Duration::from_secs(3)).await;

        scheduler.cancel_all();
        assert_eq!(scheduler.state(AppointmentId::new(1)), ReminderState::Unarmed);

        tokio::time::sleep(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert_eq!(sound.finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_scheduler_cancels_timers() {
        let notifier = Arc::new(RecordingNotifier::new());
        let sound = Arc::new(RecordingSound::new());
        let mut scheduler = scheduler(&notifier, &sound).await;

        scheduler.rebuild(&[appointment(1, today(), Some((15, 0)))], &clients(), now());
        drop(scheduler);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(notifier.sent().is_empty());
    }
}
