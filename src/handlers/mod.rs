//! # Handlers del Servidor
//!
//! Tabla de rutas fija:
//!
//! | Método | Path          | Handler                         |
//! |--------|---------------|---------------------------------|
//! | GET    | `/`           | saludo en texto plano           |
//! | GET    | `/index.html` | `index.html` del directorio     |
//! | GET    | `/login`      | `login.html` del directorio     |
//! | GET    | `/register`   | `register.html` del directorio  |
//! | POST   | `/register`   | alta en el store                |
//! | POST   | `/login`      | verificación en el store        |
//!
//! Las dependencias se inyectan al registrar: cada closure captura su propio
//! `Arc` del store o de la fuente de archivos.

pub mod auth;
pub mod pages;

use crate::files::FileSource;
use crate::http::Method;
use crate::router::Router;
use crate::store::CredentialStore;
use std::sync::Arc;

/// Registra todas las rutas del servidor
pub fn install(router: &mut Router, store: Arc<dyn CredentialStore>, files: Arc<dyn FileSource>) {
    router.register(Method::GET, "/", pages::greeting_handler);

    for page in pages::PAGES {
        let files = Arc::clone(&files);
        router.register(Method::GET, page.route, move |req| {
            pages::static_page_handler(req, files.as_ref(), page)
        });
    }

    let register_store = Arc::clone(&store);
    router.register(Method::POST, "/register", move |req| {
        auth::register_handler(req, register_store.as_ref())
    });

    router.register(Method::POST, "/login", move |req| {
        auth::login_handler(req, store.as_ref())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Request, StatusCode};
    use crate::store::MemoryStore;

    struct NoFiles;

    impl FileSource for NoFiles {
        fn read_file(&self, _path: &str) -> Option<Vec<u8>> {
            None
        }
    }

    fn router() -> Router {
        let mut router = Router::new();
        install(&mut router, Arc::new(MemoryStore::new()), Arc::new(NoFiles));
        router
    }

    #[test]
    fn test_install_registers_fixed_table() {
        assert_eq!(router().len(), 6);
    }

    #[test]
    fn test_register_then_login_flow() {
        let router = router();

        let register = Request::parse(
            b"POST /register HTTP/1.1\r\n\r\nusername=alice&password=p1",
        )
        .unwrap();
        let response = router.route(&register);
        assert_eq!(response.status(), StatusCode::Found);
        assert_eq!(response.header("Location"), Some("/login"));

        let login = Request::parse(b"POST /login HTTP/1.1\r\n\r\nusername=alice&password=p1").unwrap();
        assert_eq!(router.route(&login).status(), StatusCode::Found);
    }

    #[test]
    fn test_missing_route_is_404() {
        let request = Request::parse(b"GET /missing HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(router().route(&request).status(), StatusCode::NotFound);
    }
}
