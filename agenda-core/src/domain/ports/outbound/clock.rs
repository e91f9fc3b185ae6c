use chrono::{NaiveDate, NaiveDateTime};

/// Outbound port for the local wall clock.
pub trait Clock: Send + Sync + 'static {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Current time as unix milliseconds, used for id allocation.
    ///
    /// The default reads `now()` as if it were UTC. Clocks backed by local
    /// wall time override it.
    fn now_millis(&self) -> i64 {
        self.now().and_utc().timestamp_millis()
    }
}
