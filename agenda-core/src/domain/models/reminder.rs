/// Lifecycle of a single appointment reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReminderState {
    Unarmed,
    Armed,
    Fired,
}

/// A desktop notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
}

impl Notification {
    pub fn new(title: &str, body: &str, icon: Option<&str>) -> Self {
        Notification {
            title: title.to_string(),
            body: body.to_string(),
            icon: icon.map(|s| s.to_string()),
        }
    }
}
