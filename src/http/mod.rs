//! # Módulo HTTP
//!
//! Subconjunto de HTTP/1.1 implementado desde cero:
//!
//! - Parsing de requests (máquina de estados REQUEST_LINE → HEADERS → BODY → FINISH)
//! - Decodificación de formularios x-www-form-urlencoded
//! - Construcción y serialización de responses
//! - Tabla de status codes
//!
//! No hay keep-alive, pipelining ni chunked encoding: una conexión lleva un
//! request y se cierra después de la respuesta.
//!
//! ### Formato de Request
//!
//! ```text
//! POST /login HTTP/1.1\r\n
//! Content-Type: application/x-www-form-urlencoded\r\n
//! \r\n
//! username=alice&password=p1
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 302 Found\r\n
//! Location: /index.html\r\n
//! Content-Length: 0\r\n
//! \r\n
//! ```

pub mod form;
pub mod request;
pub mod response;
pub mod status;

pub use form::{FormData, FormError};
pub use request::{Method, ParseError, ParseState, Request, RequestParser};
pub use response::Response;
pub use status::StatusCode;
