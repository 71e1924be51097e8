//! # Archivos Estáticos
//! src/files/mod.rs
//!
//! Lectura de recursos por path relativo a un directorio raíz. Se rechazan
//! paths absolutos y componentes `..` para no salir de la raíz.

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Fuente de blobs por path
pub trait FileSource: Send + Sync {
    /// `None` si el archivo no existe o no se puede leer
    fn read_file(&self, path: &str) -> Option<Vec<u8>>;
}

/// Directorio en disco que sirve de raíz
#[derive(Debug, Clone)]
pub struct StaticDir {
    root: PathBuf,
}

impl StaticDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        safe.then(|| self.root.join(relative))
    }
}

impl FileSource for StaticDir {
    fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        let Some(full) = self.resolve(path) else {
            debug!(path, "refusing path outside static root");
            return None;
        };

        match fs::read(&full) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(path = %full.display(), error = %e, "static file not readable");
                None
            }
        }
    }
}
