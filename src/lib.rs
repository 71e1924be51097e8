//! # Reactor Server
//! src/lib.rs
//!
//! Servidor HTTP de un solo proceso: un reactor de eventos acepta y lee
//! conexiones sin bloquear, y un pool elástico de threads parsea, rutea y
//! responde cada request.
//!
//! ## Arquitectura
//!
//! - `config`: CLI y variables de entorno
//! - `logging`: subscriber de tracing
//! - `http`: parsing de requests, formularios y construcción de responses
//! - `router`: tabla `(método, path)` → handler
//! - `handlers`: páginas, registro y login
//! - `pool`: cola de tareas y pool de workers con manager
//! - `server`: reactor `mio` y atención de cada conexión
//! - `store`: usuarios en memoria o en archivo JSON
//! - `files`: páginas estáticas desde un directorio
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use reactor_server::config::Config;
//! use reactor_server::router::Router;
//! use reactor_server::server::Server;
//!
//! let config = Config::default();
//! let mut server = Server::bind(&config, Router::new()).expect("bind");
//! server.run().expect("server failed");
//! ```

pub mod config;
pub mod files;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod pool;
pub mod router;
pub mod server;
pub mod store;
