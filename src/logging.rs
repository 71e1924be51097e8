//! # Logging
//! src/logging.rs
//!
//! Instala el subscriber `fmt` de tracing. `RUST_LOG` tiene prioridad sobre
//! `--log-level`. Con `--log-file` se agrega al archivo; si no se puede abrir
//! se sigue por stderr.

use crate::config::Config;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Inicializa el logging global. Si ya había un subscriber no hace nada.
pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_target(false);

    let mut file_error = None;

    let installed = match config.log_file.as_deref() {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok(),
            Err(e) => {
                file_error = Some((path.to_string(), e));
                builder.with_writer(std::io::stderr).try_init().is_ok()
            }
        },
        None => builder.with_writer(std::io::stderr).try_init().is_ok(),
    };

    if let Some((path, error)) = file_error {
        if installed {
            warn!(path = %path, %error, "cannot open log file, logging to stderr");
        }
    }
}
