//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Un solo thread reactor espera readiness con `mio` (epoll con edge-trigger
//! en Linux) y nunca bloquea en trabajo de un request:
//!
//! 1. Evento en el listener → acepta hasta `WouldBlock` y registra cada conexión
//! 2. Evento en una conexión → drena los bytes disponibles a su buffer
//! 3. Request completo → saca la conexión de la tabla y la entrega al pool
//! 4. Un worker parsea, rutea, escribe la respuesta y cierra el socket
//!
//! Los errores de setup (bind, listen, poll) son fatales; los de una
//! conexión se quedan en esa conexión.

pub mod connection;
pub mod reactor;

pub use connection::{Connection, Readiness, MAX_REQUEST_BYTES};
pub use reactor::{Server, ServerHandle};

use crate::pool::PoolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("readiness poll failed: {0}")]
    Poll(#[source] std::io::Error),

    #[error("cannot register listener: {0}")]
    Register(#[source] std::io::Error),

    #[error(transparent)]
    Pool(#[from] PoolError),
}
