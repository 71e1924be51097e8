//! # Store de Usuarios en JSON
//! src/store/json.rs
//!
//! Permite que los usuarios sobrevivan a un reinicio. Mantiene una cache en
//! memoria y reescribe el archivo completo en cada alta (archivo temporal +
//! rename, atómico en Unix).

use super::{validate_username, CredentialStore, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

/// Registro persistido por usuario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub password: String,

    /// Segundos desde UNIX_EPOCH
    pub created_at: u64,
}

pub struct JsonFileStore {
    path: PathBuf,
    users: Mutex<HashMap<String, UserRecord>>,
}

impl JsonFileStore {
    /// Crea el store y carga los usuarios existentes
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let users = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }

    fn load_from_file(path: &Path) -> Result<HashMap<String, UserRecord>, StoreError> {
        let reader = BufReader::new(File::open(path)?);

        // Un archivo corrupto no se pisa: la próxima alta borraría a todos
        serde_json::from_reader(reader).map_err(|e| {
            error!(path = %path.display(), error = %e, "users file is not valid JSON");
            StoreError::Serialization(e)
        })
    }

    fn save_to_file(&self, users: &HashMap<String, UserRecord>) -> Result<(), StoreError> {
        let temp_path = self.path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&temp_path)?);

        serde_json::to_writer_pretty(&mut writer, users)?;
        writer.flush()?;

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    /// Número de usuarios en la cache
    pub fn count(&self) -> usize {
        self.users.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl CredentialStore for JsonFileStore {
    fn create_user(&self, username: &str, password: &str) -> Result<(), StoreError> {
        validate_username(username)?;

        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if users.contains_key(username) {
            return Err(StoreError::DuplicateUser(username.to_string()));
        }

        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        users.insert(
            username.to_string(),
            UserRecord {
                password: password.to_string(),
                created_at,
            },
        );

        // Si no se pudo persistir, el alta no cuenta
        if let Err(e) = self.save_to_file(&users) {
            users.remove(username);
            return Err(e);
        }
        Ok(())
    }

    fn verify_user(&self, username: &str, password: &str) -> Result<(), StoreError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        match users.get(username) {
            Some(record) if record.password == password => Ok(()),
            Some(_) => Err(StoreError::WrongPassword(username.to_string())),
            None => Err(StoreError::UnknownUser(username.to_string())),
        }
    }
}
