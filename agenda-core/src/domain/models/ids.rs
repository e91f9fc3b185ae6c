use serde::{Deserialize, Serialize};
use std::fmt;

/// A client identifier.
///
/// Wraps i64 so it stays compatible with the millisecond timestamps
/// used as ids in the persisted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(i64);

impl ClientId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ClientId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ClientId> for i64 {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

/// An appointment identifier, allocated the same way as [`ClientId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(i64);

impl AppointmentId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AppointmentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<AppointmentId> for i64 {
    fn from(id: AppointmentId) -> Self {
        id.0
    }
}

/// Hands out strictly increasing, time-based identifiers.
///
/// Each id is the current unix time in milliseconds, bumped past the last
/// id handed out (or seen in loaded data) so two allocations in the same
/// millisecond, or a clock that goes backwards, never produce a duplicate.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: i64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure every future id is greater than `id`.
    pub fn observe(&mut self, id: i64) {
        self.last = self.last.max(id);
    }

    pub fn next(&mut self, now_millis: i64) -> i64 {
        let id = now_millis.max(self.last + 1);
        self.last = id;
        id
    }
}
