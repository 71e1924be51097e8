//! # Store de Credenciales
//! src/store/mod.rs
//!
//! Interfaz de persistencia de usuarios que consumen los handlers de
//! `/register` y `/login`. Para los handlers el resultado es binario: `Ok`
//! o cualquier `StoreError` (usuario duplicado, password incorrecta, error
//! de I/O), que se traduce en 400/401.
//!
//! Implementaciones:
//! - `MemoryStore`: HashMap en memoria (por defecto y en tests)
//! - `JsonFileStore`: cache en memoria respaldada por un archivo JSON

pub mod json;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use crate::config::Config;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user already exists: {0}")]
    DuplicateUser(String),

    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("wrong password for user: {0}")]
    WrongPassword(String),

    #[error("invalid username")]
    InvalidUsername,

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistencia de usuarios con comparación de credenciales en texto plano
pub trait CredentialStore: Send + Sync {
    /// Crea el usuario; falla si ya existe
    fn create_user(&self, username: &str, password: &str) -> Result<(), StoreError>;

    /// Verifica que el usuario exista y que la password coincida
    fn verify_user(&self, username: &str, password: &str) -> Result<(), StoreError>;
}

/// Abre el store indicado por la configuración
pub fn open(config: &Config) -> Result<Arc<dyn CredentialStore>, StoreError> {
    match &config.users_file {
        Some(path) => Ok(Arc::new(JsonFileStore::new(path)?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

pub(crate) fn validate_username(username: &str) -> Result<(), StoreError> {
    if username.trim().is_empty() {
        return Err(StoreError::InvalidUsername);
    }
    Ok(())
}
