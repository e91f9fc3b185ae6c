use std::{sync::Arc, time::Duration};

use agenda_core::{
    adapters::outbound::{JsonFileStore, SystemClock},
    domain::{
        models::YearMonth,
        ports::{inbound::AgendaService, outbound::Clock},
        services::{AgendaServiceImpl, ReminderScheduler},
    },
};
use anyhow::Context;
use chrono::{NaiveDateTime, NaiveTime};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{error, info};

mod alerts;
mod config;
mod telemetry;

type Agenda = AgendaServiceImpl<JsonFileStore, SystemClock>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let settings = config::read_config()?;

    let data_dir = settings.storage.data_dir()?;
    info!(data_dir = %data_dir.display(), "Opening agenda");

    let store = Arc::new(JsonFileStore::new(&data_dir));
    let clock = Arc::new(SystemClock);

    let mut agenda = AgendaServiceImpl::load(store, clock.clone())
        .with_context(|| format!("Failed to load agenda from {}", data_dir.display()))?
        .with_status_ttl(settings.status.message_ttl());

    if settings.reminders.enabled {
        let (notifier, sound) = alerts::from_settings(&settings.reminders);
        let mut scheduler = ReminderScheduler::start(notifier, sound)
            .await
            .context("Failed to start reminder scheduler")?;
        if let Some(icon) = &settings.reminders.icon {
            scheduler = scheduler.with_icon(icon);
        }
        agenda = agenda.with_reminders(scheduler);
    } else {
        info!("Reminders disabled");
    }

    log_summary(&agenda, clock.as_ref());

    let mut reload = settings.storage.reload_interval().map(|period| {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    });

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let rollover = until_next_day(clock.now());

        tokio::select! {
            _ = &mut shutdown => break,
            _ = next_tick(&mut reload) => {
                match agenda.reload() {
                    Ok(true) => log_summary(&agenda, clock.as_ref()),
                    Ok(false) => {}
                    Err(e) => error!(error = %e, "Failed to reload agenda"),
                }
            }
            _ = tokio::time::sleep(rollover) => {
                info!(today = %clock.today(), "Day changed, refreshing reminders");
                agenda.refresh_reminders();
                log_summary(&agenda, clock.as_ref());
            }
        }
    }

    agenda.shutdown();
    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where the platform has it.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Time left until just after the next local midnight.
fn until_next_day(now: NaiveDateTime) -> Duration {
    let slack = Duration::from_secs(1);
    now.date()
        .succ_opt()
        .map(|tomorrow| tomorrow.and_time(NaiveTime::MIN) - now)
        .and_then(|left| left.to_std().ok())
        .map_or(Duration::from_secs(24 * 60 * 60), |left| left + slack)
}

fn log_summary(agenda: &Agenda, clock: &SystemClock) {
    let today = clock.today();
    let todays = agenda
        .appointment_views(None)
        .iter()
        .filter(|view| view.is_today)
        .count();

    info!(
        clients = agenda.list_clients().len(),
        appointments = agenda.list_appointments(None).len(),
        today = todays,
        receivable = %agenda.total_receivable(),
        today_total = %agenda.daily_total(today),
        month_total = %agenda.monthly_total(YearMonth::of(today)),
        "Agenda summary"
    );

    match agenda.next_upcoming() {
        Some(next) => {
            let client = agenda
                .client(next.client_id)
                .map_or("unknown client", |c| c.name.as_str());
            info!(
                date = %next.date,
                time = %next.time.map(|t| t.to_string()).unwrap_or_default(),
                client,
                service = %next.service,
                "Next appointment"
            );
        }
        None => info!("No upcoming appointments"),
    }
}
