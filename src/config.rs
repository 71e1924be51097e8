//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y variables
//! de entorno. Cada campo tiene flag, variable y valor por defecto.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./reactor_server --port 8080 \
//!   --min-threads 4 \
//!   --max-threads 16 \
//!   --users-file ./data/users.json
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 POOL_MAX_THREADS=32 LOG_LEVEL=debug ./reactor_server
//! ```

use clap::Parser;
use tracing::info;

/// Backlog del socket de escucha
pub const LISTEN_BACKLOG: i32 = 5;

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "reactor_server")]
#[command(about = "Servidor HTTP con reactor de eventos y pool elástico de workers")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = puerto efímero)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    // === Pool ===

    /// Workers que siempre están vivos
    #[arg(long = "min-threads", default_value = "4", env = "POOL_MIN_THREADS")]
    pub min_threads: usize,

    /// Tope de workers bajo carga
    #[arg(long = "max-threads", default_value = "16", env = "POOL_MAX_THREADS")]
    pub max_threads: usize,

    /// Periodo del manager del pool en milisegundos
    #[arg(long = "manager-interval-ms", default_value = "5000", env = "POOL_MANAGER_INTERVAL_MS")]
    pub manager_interval_ms: u64,

    // === Reactor ===

    /// Eventos máximos por llamada a poll
    #[arg(long = "max-events", default_value = "1024", env = "REACTOR_MAX_EVENTS")]
    pub max_events: usize,

    // === Recursos ===

    /// Directorio con las páginas HTML
    #[arg(long = "static-dir", default_value = "./static", env = "STATIC_DIR")]
    pub static_dir: String,

    /// Archivo JSON de usuarios. Sin él, los usuarios viven solo en memoria.
    #[arg(long = "users-file", env = "USERS_FILE")]
    pub users_file: Option<String>,

    // === Logging ===

    /// Nivel de log (RUST_LOG tiene prioridad)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Archivo de log. Sin él, se escribe a stderr.
    #[arg(long = "log-file", env = "LOG_FILE")]
    pub log_file: Option<String>,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    ///
    /// # Ejemplo
    /// ```no_run
    /// use reactor_server::config::Config;
    ///
    /// let config = Config::new();
    /// println!("Server listening on {}", config.address());
    /// ```
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use reactor_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.min_threads == 0 {
            return Err("Min threads must be >= 1".to_string());
        }
        if self.max_threads < self.min_threads {
            return Err(format!(
                "Max threads ({}) must be >= min threads ({})",
                self.max_threads, self.min_threads
            ));
        }
        if self.manager_interval_ms == 0 {
            return Err("Manager interval must be > 0".to_string());
        }
        if self.max_events == 0 {
            return Err("Max events must be >= 1".to_string());
        }

        Ok(())
    }

    /// Registra un resumen de la configuración efectiva
    pub fn print_summary(&self) {
        info!(address = %self.address(), backlog = LISTEN_BACKLOG, "network");
        info!(
            min = self.min_threads,
            max = self.max_threads,
            interval_ms = self.manager_interval_ms,
            "worker pool"
        );
        info!(max_events = self.max_events, "reactor");
        info!(
            static_dir = %self.static_dir,
            users = self.users_file.as_deref().unwrap_or("<memory>"),
            "resources"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            min_threads: 4,
            max_threads: 16,
            manager_interval_ms: 5_000,
            max_events: 1024,
            static_dir: "./static".to_string(),
            users_file: None,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.min_threads, 4);
        assert_eq!(config.max_threads, 16);
        assert_eq!(config.manager_interval_ms, 5_000);
        assert!(config.users_file.is_none());
    }

    #[test]
    fn test_address() {
        let config = Config::default();
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_validate_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    // ==================== Pool Validation ====================

    #[test]
    fn test_validate_zero_min_threads() {
        let mut config = Config::default();
        config.min_threads = 0;
        let result = config.validate();
        assert!(result.unwrap_err().contains("Min threads"));
    }

    #[test]
    fn test_validate_max_below_min() {
        let mut config = Config::default();
        config.min_threads = 8;
        config.max_threads = 4;
        let result = config.validate();
        assert!(result.unwrap_err().contains("Max threads"));
    }

    #[test]
    fn test_validate_min_equals_max() {
        let mut config = Config::default();
        config.min_threads = 2;
        config.max_threads = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = Config::default();
        config.manager_interval_ms = 0;
        assert!(config.validate().unwrap_err().contains("Manager interval"));
    }

    // ==================== Reactor Validation ====================

    #[test]
    fn test_validate_zero_max_events() {
        let mut config = Config::default();
        config.max_events = 0;
        assert!(config.validate().unwrap_err().contains("Max events"));
    }

    // ==================== CLI ====================

    #[test]
    fn test_parse_cli_flags() {
        let config = Config::try_parse_from([
            "reactor_server",
            "-p",
            "9090",
            "--min-threads",
            "2",
            "--max-threads",
            "3",
            "--users-file",
            "/tmp/users.json",
        ])
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.min_threads, 2);
        assert_eq!(config.max_threads, 3);
        assert_eq!(config.users_file.as_deref(), Some("/tmp/users.json"));
    }

    #[test]
    fn test_parse_rejects_non_numeric_port() {
        assert!(Config::try_parse_from(["reactor_server", "--port", "abc"]).is_err());
    }

    // ==================== Print Summary ====================

    #[test]
    fn test_config_print_summary() {
        let mut config = Config::default();
        config.users_file = Some("users.json".to_string());
        // Should not panic
        config.print_summary();
    }
}
