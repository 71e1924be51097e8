//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea `(método, path)` a un handler.
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! La búsqueda es exacta sobre la clave compuesta: no hay comodines ni
//! prefijos. Si no hay handler, se responde 404 Not Found.
//!
//! La tabla se llena una sola vez al arrancar y después solo se lee, por eso
//! el router se comparte entre workers como `Arc<Router>` sin locks. Las
//! dependencias (store de usuarios, archivos estáticos) se capturan en los
//! closures de cada handler al registrarlos.

use crate::http::{Method, Request, Response, StatusCode};
use std::collections::HashMap;

/// Un handler recibe un Request y retorna una Response
pub type Handler = Box<dyn Fn(&Request) -> Response + Send + Sync>;

const SERVER_NAME: &str = "reactor-server";

/// Router que mapea `(método, path)` a handlers
pub struct Router {
    routes: HashMap<(Method, String), Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Registra una ruta. Registrar la misma clave dos veces reemplaza el handler.
    ///
    /// # Ejemplo
    /// ```
    /// use reactor_server::router::Router;
    /// use reactor_server::http::{Method, Response};
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/", |_req| Response::text("Hello World!"));
    /// ```
    pub fn register<F>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.routes
            .insert((method, path.to_string()), Box::new(handler));
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn route(&self, request: &Request) -> Response {
        let key = (request.method(), request.path().to_string());

        let mut response = match self.routes.get(&key) {
            Some(handler) => handler(request),
            None => Response::error(StatusCode::NotFound, "Not Found"),
        };

        self.add_common_headers(&mut response);
        response
    }

    /// Respuesta de error para requests que no llegaron a rutearse
    /// (parse fallido, request demasiado grande)
    pub fn reject(&self, status: StatusCode, message: &str) -> Response {
        let mut response = Response::error(status, message);
        self.add_common_headers(&mut response);
        response
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Headers comunes a todas las respuestas
    fn add_common_headers(&self, response: &mut Response) {
        response.add_header("Server", SERVER_NAME);
        response.add_header("Connection", "close");
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
