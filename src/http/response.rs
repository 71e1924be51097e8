//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas y serializarlas a bytes.
//!
//! ```text
//! HTTP/1.1 302 Found\r\n
//! Location: /login\r\n
//! Content-Length: 0\r\n
//! \r\n
//! ```
//!
//! `Content-Length` siempre se calcula en `to_bytes` a partir del body real;
//! si un handler lo fija a mano, ese valor se ignora.
//!
//! ```
//! use reactor_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("Hello");
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.ends_with(b"\r\n\r\nHello"));
//! ```

use super::StatusCode;
use std::collections::HashMap;

const CONTENT_LENGTH: &str = "Content-Length";

/// Respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// HashMap para evitar duplicados: la última escritura gana
    headers: HashMap<String, String>,

    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header (si ya existe, se sobrescribe)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Versión mutable de `with_header`
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el body desde un string
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self
    }

    /// Establece el body desde bytes (archivos estáticos, binarios)
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// 200 OK con `Content-Type: text/plain`
    pub fn text(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body(body)
    }

    /// 200 OK con `Content-Type: text/html`
    pub fn html(body: Vec<u8>) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "text/html")
            .with_body_bytes(body)
    }

    /// 302 Found hacia `location`
    pub fn redirect(location: &str) -> Self {
        Self::new(StatusCode::Found)
            .with_header("Location", location)
            .with_header("Content-Type", "text/html")
    }

    /// Respuesta de error con mensaje en texto plano
    ///
    /// # Ejemplo
    /// ```
    /// use reactor_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound, "Not Found");
    /// assert_eq!(response.body(), b"Not Found");
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain")
            .with_body(message)
    }

    /// Serializa la respuesta:
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - `Content-Length` derivado del body
    /// - Línea vacía y body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        result.extend_from_slice(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());

        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
                continue;
            }
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        result.extend_from_slice(format!("{}: {}\r\n", CONTENT_LENGTH, self.body.len()).as_bytes());

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Separa una respuesta serializada en (cabecera, body)
    fn split_wire(bytes: &[u8]) -> (String, Vec<u8>) {
        let pos = bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("missing blank line");
        let head = String::from_utf8(bytes[..pos].to_vec()).unwrap();
        (head, bytes[pos + 4..].to_vec())
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .find_map(|l| l.strip_prefix("Content-Length: "))
            .expect("missing Content-Length")
            .parse()
            .unwrap()
    }

    #[test]
    fn test_new_response() {
        let response = Response::new(StatusCode::Ok);
        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_header_last_write_wins() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_header("Content-Type", "text/html");

        assert_eq!(response.header("Content-Type"), Some("text/html"));
    }

    #[test]
    fn test_to_bytes_layout() {
        let response = Response::text("Test");
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(text.ends_with("\r\n\r\nTest"));
    }

    #[test]
    fn test_round_trip_recovers_body_and_length() {
        let body = vec![0x00, 0x0D, 0x0A, 0x0D, 0x0A, 0xFF, b'x'];
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "application/octet-stream")
            .with_body_bytes(body.clone());

        let (head, recovered) = split_wire(&response.to_bytes());
        assert_eq!(recovered, body);
        assert_eq!(content_length(&head), body.len());
    }

    #[test]
    fn test_manual_content_length_is_ignored() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Length", "999")
            .with_body("abc");

        let (head, body) = split_wire(&response.to_bytes());
        assert_eq!(content_length(&head), 3);
        assert_eq!(head.matches("Content-Length").count(), 1);
        assert_eq!(body, b"abc");
    }

    #[test]
    fn test_empty_body_has_zero_length() {
        let bytes = Response::new(StatusCode::NoContent).to_bytes();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.contains("Content-Length: 0\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_redirect() {
        let response = Response::redirect("/login");
        assert_eq!(response.status(), StatusCode::Found);
        assert_eq!(response.header("Location"), Some("/login"));
    }

    #[test]
    fn test_error_response_is_plain_text() {
        let response = Response::error(StatusCode::BadRequest, "Register Failed");

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert_eq!(response.body(), b"Register Failed");
    }

    #[test]
    fn test_unknown_status_line() {
        let text = String::from_utf8(Response::new(StatusCode::Other(299)).to_bytes()).unwrap();
        assert!(text.starts_with("HTTP/1.1 299 Unknown\r\n"));
    }
}
