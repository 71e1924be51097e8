//! # Conexión de Cliente
//! src/server/connection.rs
//!
//! Una conexión aceptada junto con los bytes leídos hasta ahora. El reactor
//! la llena; cuando el request está completo se mueve entera a una tarea del
//! pool, que es la única dueña del socket desde ese momento. El socket se
//! cierra cuando la conexión se destruye.

use crate::http::{Request, StatusCode};
use crate::router::Router;
use mio::net::TcpStream;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr};
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Tamaño máximo de un request; por encima se responde 413
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

const READ_CHUNK: usize = 4096;

/// Cuánto puede esperar un worker a que el cliente acepte la respuesta
const WRITE_DEADLINE: Duration = Duration::from_secs(30);

/// Cuánto se descarta input pendiente antes de cerrar tras un 413
const LINGER_DEADLINE: Duration = Duration::from_secs(1);

/// Resultado de drenar el socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Faltan bytes; la conexión sigue registrada
    Pending,
    /// Request completo, o EOF con datos en el buffer
    Ready,
    /// El buffer pasó `MAX_REQUEST_BYTES`
    Overflow,
    /// EOF sin ningún byte: no hay nada que responder
    Hangup,
}

pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    buffer: Vec<u8>,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            buffer: Vec::new(),
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Lee hasta `WouldBlock`. Con edge-trigger no llega otro evento por
    /// los bytes que queden sin leer, así que hay que drenar todo.
    pub fn fill(&mut self) -> io::Result<Readiness> {
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    return Ok(if self.buffer.is_empty() {
                        Readiness::Hangup
                    } else {
                        Readiness::Ready
                    });
                }
                Ok(n) => {
                    self.buffer.extend_from_slice(&chunk[..n]);
                    if self.buffer.len() > MAX_REQUEST_BYTES {
                        return Ok(Readiness::Overflow);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(if Request::is_complete(&self.buffer) {
            Readiness::Ready
        } else {
            Readiness::Pending
        })
    }

    /// Atiende el request buffereado y cierra la conexión. Corre en un worker.
    pub fn serve(mut self, router: &Router) {
        let start = Instant::now();

        let overflow = self.buffer.len() > MAX_REQUEST_BYTES;

        let (response, line) = if overflow {
            warn!(peer = %self.peer, bytes = self.buffer.len(), "request too large, sending 413");
            (
                router.reject(StatusCode::PayloadTooLarge, "Payload Too Large"),
                None,
            )
        } else {
            match Request::parse(&self.buffer) {
                Ok(request) => {
                    let line = format!("{} {}", request.method(), request.path());
                    let response = panic::catch_unwind(AssertUnwindSafe(|| router.route(&request)))
                        .unwrap_or_else(|_| {
                            error!(peer = %self.peer, request = %line, "handler panicked, sending 500");
                            router.reject(StatusCode::InternalServerError, "Internal Server Error")
                        });
                    (response, Some(line))
                }
                Err(e) => {
                    warn!(peer = %self.peer, error = %e, "bad request, sending 400");
                    (
                        router.reject(StatusCode::BadRequest, &format!("Invalid request: {}", e)),
                        None,
                    )
                }
            }
        };

        match self.write_response(&response.to_bytes()) {
            Ok(()) => info!(
                peer = %self.peer,
                request = line.as_deref().unwrap_or("-"),
                status = response.status().as_u16(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "request served"
            ),
            Err(e) => warn!(peer = %self.peer, error = %e, "failed to write response"),
        }

        self.close(overflow);
    }

    /// Responde con un error sin parsear ni rutear y cierra la conexión
    pub fn reject(mut self, router: &Router, status: StatusCode, message: &str) {
        let response = router.reject(status, message);
        if let Err(e) = self.write_response(&response.to_bytes()) {
            warn!(peer = %self.peer, error = %e, "failed to write rejection");
        }
        self.close(false);
    }

    /// Cierra el lado de escritura. Con `discard_input` lee y descarta lo que
    /// el cliente siga mandando, hasta EOF o `LINGER_DEADLINE`, para que el
    /// cierre no sea un RST.
    fn close(mut self, discard_input: bool) {
        let _ = self.stream.shutdown(Shutdown::Write);

        if discard_input {
            let deadline = Instant::now() + LINGER_DEADLINE;
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                match self.stream.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                        if Instant::now() >= deadline {
                            break;
                        }
                        thread::sleep(Duration::from_millis(1));
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(_) => break,
                }
            }
        }

        debug!(peer = %self.peer, "connection closed");
    }

    /// El socket es no bloqueante: `WouldBlock` significa que el buffer de
    /// envío está lleno y se reintenta.
    fn write_response(&mut self, bytes: &[u8]) -> io::Result<()> {
        let deadline = Instant::now() + WRITE_DEADLINE;
        let mut written = 0;

        while written < bytes.len() {
            match self.stream.write(&bytes[written..]) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Err(io::ErrorKind::TimedOut.into());
                    }
                    thread::sleep(Duration::from_millis(1));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }

        self.stream.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, Response};
    use std::net::TcpListener as StdListener;

    /// Par (cliente std bloqueante, conexión mio del lado servidor)
    fn pair() -> (std::net::TcpStream, Connection) {
        let listener = StdListener::bind("127.0.0.1:0").unwrap();
        let client = std::net::TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (accepted, peer) = listener.accept().unwrap();
        accepted.set_nonblocking(true).unwrap();
        (client, Connection::new(TcpStream::from_std(accepted), peer))
    }

    fn fill_until_not_pending(conn: &mut Connection) -> Readiness {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let readiness = conn.fill().unwrap();
            if readiness != Readiness::Pending || Instant::now() >= deadline {
                return readiness;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn read_all(mut client: std::net::TcpStream) -> String {
        let mut out = String::new();
        client.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_fill_pending_until_headers_end() {
        let (mut client, mut conn) = pair();

        client.write_all(b"GET / HTTP/1.1\r\nHost: x\r\n").unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(conn.fill().unwrap(), Readiness::Pending);

        client.write_all(b"\r\n").unwrap();
        assert_eq!(fill_until_not_pending(&mut conn), Readiness::Ready);
    }

    #[test]
    fn test_fill_waits_for_content_length() {
        let (mut client, mut conn) = pair();

        client
            .write_all(b"POST /login HTTP/1.1\r\nContent-Length: 10\r\n\r\nuser")
            .unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(conn.fill().unwrap(), Readiness::Pending);

        client.write_all(b"name=a").unwrap();
        assert_eq!(fill_until_not_pending(&mut conn), Readiness::Ready);
    }

    #[test]
    fn test_fill_hangup_without_data() {
        let (client, mut conn) = pair();
        drop(client);

        assert_eq!(fill_until_not_pending(&mut conn), Readiness::Hangup);
    }

    #[test]
    fn test_fill_eof_with_partial_request_is_ready() {
        let (mut client, mut conn) = pair();
        client.write_all(b"GET / HTTP/1.1\r\n").unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        assert_eq!(fill_until_not_pending(&mut conn), Readiness::Ready);
    }

    #[test]
    fn test_serve_routes_and_closes() {
        let (mut client, mut conn) = pair();
        let mut router = Router::new();
        router.register(Method::GET, "/", |_req| Response::text("Hello World!"));

        client.write_all(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(fill_until_not_pending(&mut conn), Readiness::Ready);
        conn.serve(&router);

        let raw = read_all(client);
        assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(raw.contains("Connection: close\r\n"));
        assert!(raw.ends_with("\r\n\r\nHello World!"));
    }

    #[test]
    fn test_serve_malformed_request_is_400() {
        let (mut client, mut conn) = pair();

        client.write_all(b"NONSENSE\r\n\r\n").unwrap();
        fill_until_not_pending(&mut conn);
        conn.serve(&Router::new());

        let raw = read_all(client);
        assert!(raw.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(raw.contains("Invalid request"));
    }

    #[test]
    fn test_serve_oversized_request_is_413() {
        let (client, mut conn) = pair();
        conn.buffer = vec![b'a'; MAX_REQUEST_BYTES + 1];
        conn.serve(&Router::new());

        let raw = read_all(client);
        assert!(raw.starts_with("HTTP/1.1 413 Payload Too Large\r\n"));
    }

    #[test]
    fn test_reject_sends_503_and_closes() {
        let (mut client, mut conn) = pair();
        client.write_all(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        fill_until_not_pending(&mut conn);

        conn.reject(&Router::new(), StatusCode::ServiceUnavailable, "Service Unavailable");

        let raw = read_all(client);
        assert!(raw.starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
        assert!(raw.ends_with("Service Unavailable"));
    }

    #[test]
    fn test_panicking_handler_is_500() {
        let (mut client, mut conn) = pair();
        let mut router = Router::new();
        router.register(Method::GET, "/boom", |_req| panic!("handler bug"));

        client.write_all(b"GET /boom HTTP/1.1\r\n\r\n").unwrap();
        fill_until_not_pending(&mut conn);
        conn.serve(&router);

        let raw = read_all(client);
        assert!(raw.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn test_oversized_upload_still_receives_413() {
        let (client, mut conn) = pair();

        let uploader = thread::spawn(move || {
            let mut client = client;
            let mut raw = b"POST /register HTTP/1.1\r\nContent-Length: 2000000\r\n\r\n".to_vec();
            raw.resize(raw.len() + 2_000_000, b'a');
            // El servidor puede cerrar antes de recibir todo
            let _ = client.write_all(&raw);
            let _ = client.shutdown(Shutdown::Write);
            read_all(client)
        });

        assert_eq!(fill_until_not_pending(&mut conn), Readiness::Overflow);
        conn.serve(&Router::new());

        let raw = uploader.join().unwrap();
        assert!(raw.starts_with("HTTP/1.1 413 Payload Too Large\r\n"), "got: {:?}", &raw[..raw.len().min(64)]);
    }
}
