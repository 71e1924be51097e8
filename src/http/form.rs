//! # Formularios `application/x-www-form-urlencoded`
//! src/http/form.rs
//!
//! `username=alice&password=p1` → `{"username": "alice", "password": "p1"}`
//!
//! Un par sin `=` o con percent-encoding inválido se reporta como error de
//! ese par y se sigue con el resto: los campos válidos se conservan.

use std::collections::HashMap;
use thiserror::Error;

/// Error local a un par `key=value`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Error parsing: {0}")]
    MissingSeparator(String),

    #[error("Invalid percent-encoding: {0}")]
    InvalidEncoding(String),
}

/// Resultado de decodificar un formulario: campos más errores por par
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    errors: Vec<FormError>,
}

impl FormData {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    pub fn into_fields(self) -> HashMap<String, String> {
        self.fields
    }

    pub fn errors(&self) -> &[FormError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Decodifica un body (o query string) form-encoded
pub fn parse(input: &str) -> FormData {
    let mut form = FormData::default();

    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }

        let Some((key, value)) = pair.split_once('=') else {
            form.errors.push(FormError::MissingSeparator(pair.to_string()));
            continue;
        };

        match (decode(key), decode(value)) {
            (Some(key), Some(value)) => {
                form.fields.insert(key, value);
            }
            _ => form.errors.push(FormError::InvalidEncoding(pair.to_string())),
        }
    }

    form
}

/// `+` es espacio; el resto es percent-encoding estándar
fn decode(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|s| s.into_owned())
}
