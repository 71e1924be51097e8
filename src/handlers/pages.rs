//! # Páginas
//! src/handlers/pages.rs
//!
//! Saludo fijo y páginas HTML servidas desde el directorio estático. Si el
//! archivo no está, se responde con una pista en texto plano que explica
//! cómo usar el endpoint POST equivalente.

use crate::files::FileSource;
use crate::http::{Request, Response};
use tracing::warn;

/// Página estática servida por GET
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub route: &'static str,
    pub file: &'static str,
    pub fallback: &'static str,
}

pub const PAGES: [Page; 3] = [
    Page {
        route: "/index.html",
        file: "index.html",
        fallback: "Welcome! You are logged in.",
    },
    Page {
        route: "/login",
        file: "login.html",
        fallback: "POST username=<name>&password=<password> to /login",
    },
    Page {
        route: "/register",
        file: "register.html",
        fallback: "POST username=<name>&password=<password> to /register",
    },
];

/// Handler para GET /
pub fn greeting_handler(_req: &Request) -> Response {
    Response::text("Hello World!")
}

/// Sirve `page.file` o su pista en texto plano
pub fn static_page_handler(_req: &Request, files: &dyn FileSource, page: Page) -> Response {
    match files.read_file(page.file) {
        Some(bytes) => Response::html(bytes),
        None => {
            warn!(file = page.file, "static page missing, serving plaintext hint");
            Response::text(page.fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;
    use std::collections::HashMap;

    struct FakeFiles(HashMap<&'static str, &'static str>);

    impl FileSource for FakeFiles {
        fn read_file(&self, path: &str) -> Option<Vec<u8>> {
            self.0.get(path).map(|s| s.as_bytes().to_vec())
        }
    }

    fn get(path: &str) -> Request {
        Request::parse(format!("GET {} HTTP/1.1\r\n\r\n", path).as_bytes()).unwrap()
    }

    #[test]
    fn test_greeting() {
        let response = greeting_handler(&get("/"));
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"Hello World!");
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn test_static_page_served_as_html() {
        let files = FakeFiles(HashMap::from([("login.html", "<form></form>")]));
        let response = static_page_handler(&get("/login"), &files, PAGES[1]);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Content-Type"), Some("text/html"));
        assert_eq!(response.body(), b"<form></form>");
    }

    #[test]
    fn test_missing_page_falls_back_to_hint() {
        let files = FakeFiles(HashMap::new());
        let response = static_page_handler(&get("/register"), &files, PAGES[2]);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert!(String::from_utf8_lossy(response.body()).contains("/register"));
    }
}
