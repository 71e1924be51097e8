//! # Reactor Server - Entry Point
//! src/main.rs
//!
//! Arma las piezas (configuración, logging, store, archivos, router) y deja
//! al reactor corriendo en el thread principal.

use reactor_server::config::Config;
use reactor_server::files::{FileSource, StaticDir};
use reactor_server::handlers;
use reactor_server::logging;
use reactor_server::router::Router;
use reactor_server::server::Server;
use reactor_server::store;
use std::sync::Arc;
use tracing::{error, info};

fn main() {
    let config = Config::new();
    logging::init(&config);

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        std::process::exit(1);
    }
    config.print_summary();

    let users = match store::open(&config) {
        Ok(users) => users,
        Err(e) => {
            error!(error = %e, "cannot open user store");
            std::process::exit(1);
        }
    };
    let files: Arc<dyn FileSource> = Arc::new(StaticDir::new(&config.static_dir));

    let mut router = Router::new();
    handlers::install(&mut router, users, files);

    let mut server = match Server::bind(&config, router) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "server setup failed");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        error!(error = %e, "server failed");
        std::process::exit(1);
    }
    info!("bye");
}
