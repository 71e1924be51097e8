//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser implementado como máquina de estados que consume el buffer línea
//! por línea (delimitadas por CRLF):
//!
//! ```text
//! REQUEST_LINE ──► HEADERS ──► BODY ──► FINISH
//! ```
//!
//! ## Ejemplo de request
//!
//! ```text
//! POST /login HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Type: application/x-www-form-urlencoded\r\n
//! Content-Length: 30\r\n
//! \r\n
//! username=alice&password=secret
//! ```
//!
//! El body se toma tal cual después de la línea vacía. Si el request trae
//! `Content-Length` y llegaron más bytes, se recorta a ese largo (no hay
//! pipelining, así que el resto se descarta).

use super::form::{self, FormData};
use std::collections::HashMap;
use thiserror::Error;

/// Métodos HTTP reconocidos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    OPTIONS,
    CONNECT,
    PATCH,
    TRACE,

    /// Cualquier token que no sea un método estándar
    UNKNOWN,
}

impl Method {
    /// Parsea el token del método. Nunca falla: lo desconocido es `UNKNOWN`.
    pub fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "OPTIONS" => Method::OPTIONS,
            "CONNECT" => Method::CONNECT,
            "PATCH" => Method::PATCH,
            "TRACE" => Method::TRACE,
            _ => Method::UNKNOWN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::CONNECT => "CONNECT",
            Method::PATCH => "PATCH",
            Method::TRACE => "TRACE",
            Method::UNKNOWN => "UNKNOWN",
        }
    }

    /// Métodos cuyo request lleva body
    pub fn has_body(&self) -> bool {
        matches!(self, Method::POST | Method::PUT | Method::PATCH)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estados del parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    RequestLine,
    Headers,
    Body,
    Finish,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty request")]
    EmptyRequest,

    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    /// Línea de header sin el separador `": "`
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Request head is not valid UTF-8")]
    InvalidEncoding,

    /// El parser no llegó a FINISH
    #[error("Incomplete HTTP request")]
    IncompleteRequest,
}

/// Request HTTP ya parseado; inmutable
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Path sin query string (ej: "/login")
    path: String,

    query_params: HashMap<String, String>,

    /// Headers tal como llegaron; la última escritura gana
    headers: HashMap<String, String>,

    version: String,

    body: Vec<u8>,
}

/// Parser incremental. Cada llamada a `parse` avanza la máquina de estados
/// sobre el buffer completo hasta FINISH o hasta el primer error.
#[derive(Debug)]
pub struct RequestParser {
    state: ParseState,
    method: Method,
    target: String,
    version: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::RequestLine,
            method: Method::UNKNOWN,
            target: String::new(),
            version: String::new(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Estado actual de la máquina
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Consume `buffer` desde el inicio
    pub fn parse(&mut self, buffer: &[u8]) -> Result<ParseState, ParseError> {
        if buffer.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyRequest);
        }

        let mut pos = 0;
        while self.state != ParseState::Finish {
            match self.state {
                ParseState::RequestLine => {
                    let (line, next) = next_line(buffer, pos);
                    self.parse_request_line(line)?;
                    pos = next;
                    self.state = ParseState::Headers;
                }
                ParseState::Headers => {
                    // Fin de input sin línea vacía: se acepta como fin de headers
                    if pos >= buffer.len() {
                        self.state = ParseState::Body;
                        continue;
                    }
                    let (line, next) = next_line(buffer, pos);
                    pos = next;
                    if line.is_empty() {
                        self.state = ParseState::Body;
                    } else {
                        self.parse_header(line)?;
                    }
                }
                ParseState::Body => {
                    if self.method.has_body() {
                        let available = &buffer[pos.min(buffer.len())..];
                        let take = self
                            .content_length()
                            .map_or(available.len(), |len| len.min(available.len()));
                        self.body = available[..take].to_vec();
                    }
                    self.state = ParseState::Finish;
                }
                ParseState::Finish => {}
            }
        }

        Ok(self.state)
    }

    /// Entrega el request si la máquina llegó a FINISH
    pub fn into_request(self) -> Result<Request, ParseError> {
        if self.state != ParseState::Finish {
            return Err(ParseError::IncompleteRequest);
        }

        let (path, query_params) = split_target(&self.target);
        Ok(Request {
            method: self.method,
            path,
            query_params,
            headers: self.headers,
            version: self.version,
            body: self.body,
        })
    }

    /// Formato: `METHOD /path?query HTTP/1.1`
    fn parse_request_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let version = parts[2];
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version.to_string()));
        }

        self.method = Method::from_token(parts[0]);
        self.target = parts[1].to_string();
        self.version = version.to_string();
        Ok(())
    }

    /// Formato: `Name: Value`, separando en el primer `": "`
    fn parse_header(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;

        match line.split_once(": ") {
            Some((name, value)) => {
                // Claves únicas sin distinguir mayúsculas; la última gana
                self.headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
                self.headers.insert(name.to_string(), value.trim().to_string());
                Ok(())
            }
            None => Err(ParseError::InvalidHeader(line.to_string())),
        }
    }

    fn content_length(&self) -> Option<usize> {
        content_length(
            self.headers
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }
}

impl Request {
    /// Parsea un request completo desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use reactor_server::http::{Method, Request};
    ///
    /// let raw = b"GET /login?next=%2Fhome HTTP/1.1\r\nHost: x\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::GET);
    /// assert_eq!(request.path(), "/login");
    /// assert_eq!(request.query_param("next"), Some("/home"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let mut parser = RequestParser::new();
        parser.parse(buffer)?;
        parser.into_request()
    }

    /// Indica si `buffer` ya contiene un request completo: headers terminados
    /// y, si hay `Content-Length`, todo el body recibido.
    pub fn is_complete(buffer: &[u8]) -> bool {
        let Some(head_end) = find_blank_line(buffer) else {
            return false;
        };

        let head = String::from_utf8_lossy(&buffer[..head_end]);
        let expected = content_length(
            head.split("\r\n")
                .skip(1)
                .filter_map(|line| line.split_once(": ")),
        )
        .unwrap_or(0);

        buffer.len() - (head_end + 4) >= expected
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Busca un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup_header(&self.headers, name)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decodifica el body como `application/x-www-form-urlencoded`.
    /// Solo los métodos con body producen campos.
    pub fn form(&self) -> FormData {
        if !self.method.has_body() {
            return FormData::default();
        }
        form::parse(&String::from_utf8_lossy(&self.body))
    }
}

/// `Content-Length` con las mismas reglas que el parser: separador `": "`,
/// nombre sin distinguir mayúsculas, la última aparición gana
fn content_length<'a>(headers: impl Iterator<Item = (&'a str, &'a str)>) -> Option<usize> {
    headers
        .filter(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
        .last()
        .and_then(|(_, value)| value.trim().parse().ok())
}

fn lookup_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Retorna la línea que empieza en `pos` (sin CRLF) y el índice siguiente
fn next_line(buffer: &[u8], pos: usize) -> (&[u8], usize) {
    let rest = &buffer[pos.min(buffer.len())..];
    match rest.windows(2).position(|w| w == b"\r\n") {
        Some(end) => (&rest[..end], pos + end + 2),
        None => (rest, buffer.len()),
    }
}

fn find_blank_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Separa "/fibonacci?num=10" en ("/fibonacci", {"num": "10"})
fn split_target(target: &str) -> (String, HashMap<String, String>) {
    match target.split_once('?') {
        Some((path, query)) => (path.to_string(), form::parse(query).into_fields()),
        None => (target.to_string(), HashMap::new()),
    }
}
