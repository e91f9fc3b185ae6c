use super::ClientId;

/// Country code prepended to every WhatsApp link.
const WHATSAPP_COUNTRY_CODE: &str = "55";

/// A person receiving services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub phone: Option<String>,
}

impl Client {
    pub fn new(id: impl Into<ClientId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        let phone = phone.into();
        self.phone = (!phone.is_empty()).then_some(phone);
        self
    }

    /// Deep link that opens a WhatsApp chat with this client.
    ///
    /// Non-digit characters are stripped from the phone. Returns `None` when
    /// no digits are left.
    pub fn whatsapp_link(&self) -> Option<String> {
        let digits: String = self
            .phone
            .as_deref()?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();

        if digits.is_empty() {
            return None;
        }

        Some(format!("https://wa.me/{WHATSAPP_COUNTRY_CODE}{digits}"))
    }
}

/// User input for creating or editing a client.
#[derive(Debug, Clone, Default)]
pub struct ClientForm {
    pub name: String,
    pub phone: String,
}

impl ClientForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: String::new(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }
}
