//! Agenda store backed by one JSON file per document.

use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::{io::Write, os::unix::fs::OpenOptionsExt};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use super::records::{AppointmentRecord, ClientRecord};
use crate::domain::{
    models::{Appointment, Client},
    ports::outbound::{AgendaRepository, DocumentKey},
    StoreError,
};

/// Stores `clients.json` and `agenda.json` under a data directory.
///
/// Each save writes a temporary file and renames it over the document, so
/// a crash mid-write never leaves a truncated document behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, key: DocumentKey) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn staging_path(&self, key: DocumentKey) -> PathBuf {
        self.root.join(format!(".{key}.json.tmp"))
    }

    fn backup_path(&self, key: DocumentKey) -> PathBuf {
        self.root.join(format!(".{key}.json.bak"))
    }

    fn read_document<R: DeserializeOwned>(&self, key: DocumentKey) -> Result<Vec<R>, StoreError> {
        let path = self.document_path(key);
        if !path.exists() {
            debug!(document = %key, "Document not found, starting empty");
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(&path)?;
        if raw.trim().is_empty() || raw.trim() == "null" {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|e| StoreError::corrupt(key.as_ref(), e))
    }

    /// Write a document to its staging file and return the staging path.
    fn stage<R: Serialize>(&self, key: DocumentKey, records: &[R]) -> Result<PathBuf, StoreError> {
        let content = serde_json::to_string(records)?;
        let staging = self.staging_path(key);
        secure_write(&staging, &content)?;
        Ok(staging)
    }

    /// Stage every document first, then move them all into place.
    ///
    /// If any staging write fails, no document is touched. If a rename
    /// fails, documents already replaced are restored from their backups.
    fn commit(&self, staged: Vec<(DocumentKey, Result<PathBuf, StoreError>)>) -> Result<(), StoreError> {
        let mut ready = Vec::with_capacity(staged.len());
        let mut failure = None;

        for (key, result) in staged {
            match result {
                Ok(path) => ready.push((key, path)),
                Err(e) => failure = failure.or(Some(e)),
            }
        }

        if let Some(e) = failure {
            for (_, path) in ready {
                let _ = std::fs::remove_file(path);
            }
            return Err(e);
        }

        let result = self.replace_all(&ready);

        for (key, staging) in &ready {
            let _ = std::fs::remove_file(staging);
            let _ = std::fs::remove_file(self.backup_path(*key));
        }

        result
    }

    fn replace_all(&self, ready: &[(DocumentKey, PathBuf)]) -> Result<(), StoreError> {
        let mut backed_up = Vec::with_capacity(ready.len());
        for (key, _) in ready {
            let document = self.document_path(*key);
            if document.is_file() {
                std::fs::copy(&document, self.backup_path(*key))?;
                backed_up.push(*key);
            }
        }

        for (done, (key, staging)) in ready.iter().enumerate() {
            if let Err(e) = std::fs::rename(staging, self.document_path(*key)) {
                warn!(document = %key, error = %e, "Failed to replace document, rolling back");
                for (restored, _) in &ready[..done] {
                    self.restore(*restored, backed_up.contains(restored));
                }
                return Err(e.into());
            }
            debug!(document = %key, "Document saved");
        }

        Ok(())
    }

    /// Put a replaced document back the way it was before the commit.
    fn restore(&self, key: DocumentKey, had_backup: bool) {
        let document = self.document_path(key);
        let result = if had_backup {
            std::fs::rename(self.backup_path(key), &document)
        } else {
            std::fs::remove_file(&document)
        };

        if let Err(e) = result {
            error!(document = %key, error = %e, "Failed to restore document");
        }
    }
}

fn secure_write(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?
            .write_all(content.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content)?;
    }

    Ok(())
}

impl AgendaRepository for JsonFileStore {
    fn load_clients(&self) -> Result<Vec<Client>, StoreError> {
        let records: Vec<ClientRecord> = self.read_document(DocumentKey::Clients)?;
        Ok(records.into_iter().map(Client::from).collect())
    }

    fn load_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        let records: Vec<AppointmentRecord> = self.read_document(DocumentKey::Agenda)?;
        Ok(records.into_iter().map(Appointment::from).collect())
    }

    fn save_clients(&self, clients: &[Client]) -> Result<(), StoreError> {
        let records: Vec<ClientRecord> = clients.iter().map(ClientRecord::from).collect();
        let staged = self.stage(DocumentKey::Clients, &records);
        self.commit(vec![(DocumentKey::Clients, staged)])
    }

    fn save_appointments(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        let records: Vec<AppointmentRecord> =
            appointments.iter().map(AppointmentRecord::from).collect();
        let staged = self.stage(DocumentKey::Agenda, &records);
        self.commit(vec![(DocumentKey::Agenda, staged)])
    }

    fn save_all(&self, clients: &[Client], appointments: &[Appointment]) -> Result<(), StoreError> {
        let client_records: Vec<ClientRecord> = clients.iter().map(ClientRecord::from).collect();
        let appointment_records: Vec<AppointmentRecord> =
            appointments.iter().map(AppointmentRecord::from).collect();

        // Appointments go first so a partial write can only orphan them,
        // which reads already tolerate.
        self.commit(vec![
            (
                DocumentKey::Agenda,
                self.stage(DocumentKey::Agenda, &appointment_records),
            ),
            (
                DocumentKey::Clients,
                self.stage(DocumentKey::Clients, &client_records),
            ),
        ])
    }
}
