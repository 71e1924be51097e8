//! # Registro y Login
//! src/handlers/auth.rs
//!
//! Ambos handlers leen `username` y `password` del body form-encoded y
//! delegan en el `CredentialStore`. Cualquier falla del store se reporta al
//! cliente igual: 400 en registro, 401 en login.

use crate::http::{Request, Response, StatusCode};
use crate::store::CredentialStore;
use tracing::{info, warn};

const LOGIN_FAILED_PAGE: &str = "<html><body><h2>Login Failed</h2></body></html>";

/// Extrae (username, password) del formulario. Los campos ausentes quedan vacíos.
fn credentials(req: &Request) -> (String, String) {
    let form = req.form();
    for error in form.errors() {
        warn!(path = req.path(), %error, "malformed form pair");
    }

    (
        form.get("username").unwrap_or_default().to_string(),
        form.get("password").unwrap_or_default().to_string(),
    )
}

/// Handler para POST /register
///
/// 302 → `/login` si el alta fue exitosa, 400 en cualquier otro caso.
pub fn register_handler(req: &Request, store: &dyn CredentialStore) -> Response {
    let (username, password) = credentials(req);

    match store.create_user(&username, &password) {
        Ok(()) => {
            info!(user = %username, "user registered");
            Response::redirect("/login")
        }
        Err(e) => {
            warn!(user = %username, error = %e, "register failed");
            Response::error(StatusCode::BadRequest, "Register Failed")
        }
    }
}

/// Handler para POST /login
///
/// 302 → `/index.html` si las credenciales coinciden, 401 si no.
pub fn login_handler(req: &Request, store: &dyn CredentialStore) -> Response {
    let (username, password) = credentials(req);

    match store.verify_user(&username, &password) {
        Ok(()) => {
            info!(user = %username, "user logged in");
            Response::redirect("/index.html")
        }
        Err(e) => {
            warn!(user = %username, error = %e, "login failed");
            Response::new(StatusCode::Unauthorized)
                .with_header("Content-Type", "text/html")
                .with_body(LOGIN_FAILED_PAGE)
        }
    }
}
