use chrono::{Duration, NaiveDateTime};

/// How long a status message stays visible unless configured otherwise.
pub fn default_status_ttl() -> Duration {
    Duration::milliseconds(3_000)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Failure,
}

/// A short-lived message describing the outcome of the last operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub expires_at: NaiveDateTime,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>, now: NaiveDateTime, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
            expires_at: now + ttl,
        }
    }

    pub fn failure(text: impl Into<String>, now: NaiveDateTime, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Failure,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now >= self.expires_at
    }
}
