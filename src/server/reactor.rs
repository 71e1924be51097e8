//! # Reactor
//! src/server/reactor.rs
//!
//! Loop de eventos single-thread sobre `mio::Poll`. Tokens:
//!
//! - `0`: socket de escucha
//! - `1`: waker para el shutdown
//! - `2..`: conexiones, asignados en orden y nunca reutilizados
//!
//! Las conexiones se registran solo para lectura. Una vez entregada al pool,
//! la conexión deja de existir para el reactor.

use super::connection::{Connection, Readiness};
use super::ServerError;
use crate::config::{Config, LISTEN_BACKLOG};
use crate::http::StatusCode;
use crate::pool::{PoolConfig, PoolStats, ThreadPool};
use crate::router::Router;
use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token, Waker};
use socket2::{Domain, Protocol, Socket, Type};
use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const LISTENER: Token = Token(0);
const WAKER: Token = Token(1);
const FIRST_CONNECTION: usize = 2;

/// Permite detener un `Server` que corre en otro thread
#[derive(Clone)]
pub struct ServerHandle {
    shutdown: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl ServerHandle {
    /// Pide al reactor que salga del loop. `run` retorna después de drenar
    /// el pool.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Err(e) = self.waker.wake() {
            error!(error = %e, "failed to wake reactor");
        }
    }
}

/// Servidor: reactor + pool de workers + router compartido
pub struct Server {
    poll: Poll,
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Arc<Router>,
    pool: ThreadPool,
    connections: HashMap<Token, Connection>,
    next_token: usize,
    max_events: usize,
    shutdown: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl Server {
    /// Crea el socket de escucha, el poll y el pool. No acepta nada hasta `run`.
    pub fn bind(config: &Config, router: Router) -> Result<Self, ServerError> {
        let address = config.address();
        let bind_error = |source: io::Error| ServerError::Bind {
            address: address.clone(),
            source,
        };

        let addr = address
            .to_socket_addrs()
            .map_err(bind_error)?
            .next()
            .ok_or_else(|| bind_error(io::ErrorKind::AddrNotAvailable.into()))?;

        let mut listener = listen(addr).map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        let poll = Poll::new().map_err(ServerError::Poll)?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)
            .map_err(ServerError::Register)?;
        let waker = Waker::new(poll.registry(), WAKER).map_err(ServerError::Register)?;

        let pool = ThreadPool::new(PoolConfig::from_config(config))?;

        info!(address = %local_addr, routes = router.len(), "server bound");

        Ok(Self {
            poll,
            listener,
            local_addr,
            router: Arc::new(router),
            pool,
            connections: HashMap::new(),
            next_token: FIRST_CONNECTION,
            max_events: config.max_events,
            shutdown: Arc::new(AtomicBool::new(false)),
            waker: Arc::new(waker),
        })
    }

    /// Dirección real de escucha (útil con puerto 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shutdown: Arc::clone(&self.shutdown),
            waker: Arc::clone(&self.waker),
        }
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Corre el loop de eventos hasta que un `ServerHandle` pida shutdown
    pub fn run(&mut self) -> Result<(), ServerError> {
        let mut events = Events::with_capacity(self.max_events);
        info!(address = %self.local_addr, "server listening");

        while !self.shutdown.load(Ordering::SeqCst) {
            if let Err(e) = self.poll.poll(&mut events, None) {
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                error!(error = %e, "poll failed");
                return Err(ServerError::Poll(e));
            }

            for event in events.iter() {
                match event.token() {
                    LISTENER => self.accept_all(),
                    WAKER => debug!("reactor woken"),
                    token => self.read_connection(token),
                }
            }
        }

        info!(open = self.connections.len(), "reactor stopping");
        self.connections.clear();
        self.pool.shutdown();
        info!("server stopped");
        Ok(())
    }

    /// Acepta hasta `WouldBlock`: con edge-trigger no vuelve a llegar un
    /// evento por conexiones que ya estaban en la cola de accept.
    fn accept_all(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((mut stream, peer)) => {
                    let token = Token(self.next_token);
                    self.next_token += 1;

                    if let Err(e) = self
                        .poll
                        .registry()
                        .register(&mut stream, token, Interest::READABLE)
                    {
                        warn!(%peer, error = %e, "failed to register connection");
                        continue;
                    }

                    debug!(%peer, token = token.0, "connection accepted");
                    self.connections.insert(token, Connection::new(stream, peer));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_per_connection(&e) => {
                    debug!(error = %e, "connection failed before accept");
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    break;
                }
            }
        }
    }

    fn read_connection(&mut self, token: Token) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };

        match conn.fill() {
            Ok(Readiness::Pending) => {}
            Ok(Readiness::Hangup) => {
                debug!(peer = %conn.peer(), "peer closed without a request");
                self.close(token);
            }
            Ok(Readiness::Ready) | Ok(Readiness::Overflow) => self.dispatch(token),
            Err(e) => {
                warn!(peer = %conn.peer(), error = %e, "read failed");
                self.close(token);
            }
        }
    }

    /// Entrega la conexión al pool. Con el pool en shutdown se responde 503
    /// desde el reactor.
    fn dispatch(&mut self, token: Token) {
        let Some(conn) = self.take(token) else {
            return;
        };

        let peer = conn.peer();
        debug!(%peer, bytes = conn.buffered(), "dispatching request");

        if self.pool.is_shutting_down() {
            warn!(%peer, "pool is shutting down, sending 503");
            conn.reject(&self.router, StatusCode::ServiceUnavailable, "Service Unavailable");
            return;
        }

        let router = Arc::clone(&self.router);
        if let Err(e) = self.pool.submit(move || conn.serve(&router)) {
            warn!(%peer, error = %e, "connection dropped");
        }
    }

    fn close(&mut self, token: Token) {
        drop(self.take(token));
    }

    /// Saca la conexión de la tabla y del poll
    fn take(&mut self, token: Token) -> Option<Connection> {
        let mut conn = self.connections.remove(&token)?;
        if let Err(e) = self.poll.registry().deregister(conn.stream_mut()) {
            debug!(peer = %conn.peer(), error = %e, "deregister failed");
        }
        Some(conn)
    }
}

fn listen(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = listen_socket(addr)?;
    Ok(TcpListener::from_std(socket.into()))
}

/// Socket de escucha no bloqueante con `SO_REUSEADDR` y backlog fijo
fn listen_socket(addr: SocketAddr) -> io::Result<Socket> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

/// Errores de `accept` que afectan solo a la conexión en curso. Cualquier
/// otro (EMFILE, ENOBUFS) corta la ronda de accepts.
fn is_per_connection(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::PermissionDenied
    )
}
