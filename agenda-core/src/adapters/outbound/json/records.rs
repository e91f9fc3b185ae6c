//! Wire format of the persisted `clients` and `agenda` documents.
//!
//! Field names match the documents written by earlier versions of the app,
//! so existing data keeps loading.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, NoneAsEmptyString};

use crate::domain::models::{Appointment, AppointmentId, Client, ClientId, Price, TimeOfDay};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "whatsapp", default)]
    pub phone: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: AppointmentId,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(rename = "horario", default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeOfDay>,
    #[serde(rename = "servico")]
    pub service: String,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(rename = "preco")]
    pub price: Price,
    #[serde(rename = "clienteId")]
    pub client_id: ClientId,
}

impl From<&Client> for ClientRecord {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id,
            name: client.name.clone(),
            phone: client.phone.clone().unwrap_or_default(),
        }
    }
}

impl From<ClientRecord> for Client {
    fn from(record: ClientRecord) -> Self {
        Client::new(record.id, record.name).with_phone(record.phone.trim())
    }
}

impl From<&Appointment> for AppointmentRecord {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            date: appointment.date,
            time: appointment.time,
            service: appointment.service.clone(),
            price: appointment.price,
            client_id: appointment.client_id,
        }
    }
}

impl From<AppointmentRecord> for Appointment {
    fn from(record: AppointmentRecord) -> Self {
        Appointment {
            id: record.id,
            client_id: record.client_id,
            date: record.date,
            time: record.time,
            service: record.service,
            price: record.price,
        }
    }
}
