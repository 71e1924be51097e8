//! Store en memoria: se pierde al reiniciar el proceso.

use super::{validate_username, CredentialStore, StoreError};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de usuarios registrados
    pub fn count(&self) -> usize {
        self.users.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl CredentialStore for MemoryStore {
    fn create_user(&self, username: &str, password: &str) -> Result<(), StoreError> {
        validate_username(username)?;

        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if users.contains_key(username) {
            return Err(StoreError::DuplicateUser(username.to_string()));
        }
        users.insert(username.to_string(), password.to_string());
        Ok(())
    }

    fn verify_user(&self, username: &str, password: &str) -> Result<(), StoreError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        match users.get(username) {
            Some(stored) if stored == password => Ok(()),
            Some(_) => Err(StoreError::WrongPassword(username.to_string())),
            None => Err(StoreError::UnknownUser(username.to_string())),
        }
    }
}
