//! # Cola de Tareas
//! src/pool/queue.rs
//!
//! Cola FIFO thread-safe de tareas diferidas. No bloquea: `pop` sobre una
//! cola vacía retorna `None` y la espera la hace el pool con su propia
//! condvar. Tampoco tiene límite de tamaño.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Unidad de trabajo: un closure que es dueño de su contexto
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Cola FIFO protegida por un mutex
#[derive(Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encola al final
    pub fn push(&self, task: Task) {
        self.lock().push_back(task);
    }

    /// Desencola la cabeza, sin bloquear
    pub fn pop(&self) -> Option<Task> {
        self.lock().pop_front()
    }

    /// Número de tareas pendientes
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
