//! # Workers y Manager del Pool
//! src/pool/workers.rs
//!
//! Estado compartido (un solo mutex):
//!
//! - `alive`: threads worker vivos (`min ≤ alive ≤ max` en régimen)
//! - `busy`: workers ejecutando una tarea (`busy ≤ alive`)
//! - `pending_exit`: workers que el manager pidió terminar
//! - `shutting_down`: pasa de false a true una sola vez
//!
//! Los contadores solo cambian dentro de la sección crítica; las tareas se
//! ejecutan fuera del lock.
//!
//! Política de shutdown: drenar y parar. Las tareas ya encoladas se ejecutan
//! antes de que los workers salgan, y `submit` falla desde el momento en que
//! empieza el shutdown.
//!
//! Un worker marcado para salir no toca la colección de handles: deja su id
//! en `exited` y el manager hace el `join` en su siguiente ciclo.

use super::{PoolConfig, PoolError, Task, TaskQueue};
use serde::Serialize;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, warn};

struct PoolState {
    alive: usize,
    busy: usize,
    pending_exit: usize,
    shutting_down: bool,

    /// Workers que ya terminaron y esperan su `join`
    exited: Vec<usize>,
}

struct Shared {
    config: PoolConfig,
    queue: TaskQueue,
    state: Mutex<PoolState>,

    /// Despierta workers: hay tarea, shutdown o salida pedida
    task_ready: Condvar,

    /// Despierta al manager antes de su intervalo (solo en shutdown)
    manager_wake: Condvar,

    handles: Mutex<HashMap<usize, JoinHandle<()>>>,
    next_id: AtomicUsize,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_handles(&self) -> MutexGuard<'_, HashMap<usize, JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self, state: &PoolState) -> PoolStats {
        PoolStats {
            alive: state.alive,
            busy: state.busy,
            pending_exit: state.pending_exit,
            queued: self.queue.len(),
            shutting_down: state.shutting_down,
            min_threads: self.config.min_threads,
            max_threads: self.config.max_threads,
        }
    }
}

/// Foto del estado del pool tomada bajo el lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub alive: usize,
    pub busy: usize,
    pub pending_exit: usize,
    pub queued: usize,
    pub shutting_down: bool,
    pub min_threads: usize,
    pub max_threads: usize,
}

/// Pool elástico de threads
pub struct ThreadPool {
    shared: Arc<Shared>,
    manager: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadPool {
    /// Crea el pool: lanza `min_threads` workers y el manager
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let (min, max) = (config.min_threads, config.max_threads);

        let shared = Arc::new(Shared {
            config,
            queue: TaskQueue::new(),
            state: Mutex::new(PoolState {
                alive: min,
                busy: 0,
                pending_exit: 0,
                shutting_down: false,
                exited: Vec::new(),
            }),
            task_ready: Condvar::new(),
            manager_wake: Condvar::new(),
            handles: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(0),
        });

        let pool = ThreadPool {
            shared,
            manager: Mutex::new(None),
        };

        for _ in 0..min {
            if let Err(e) = spawn_worker(&pool.shared) {
                pool.shutdown();
                return Err(e.into());
            }
        }

        let manager_shared = Arc::clone(&pool.shared);
        let manager = thread::Builder::new()
            .name("pool-manager".to_string())
            .spawn(move || manager_loop(manager_shared));

        match manager {
            Ok(handle) => {
                *pool.manager.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
            }
            Err(e) => {
                pool.shutdown();
                return Err(e.into());
            }
        }

        info!(min, max, "thread pool started");
        Ok(pool)
    }

    /// Encola una tarea y despierta a un worker. Nunca espera capacidad.
    pub fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let state = self.shared.lock_state();
            if state.shutting_down {
                return Err(PoolError::ShuttingDown);
            }
            self.shared.queue.push(Box::new(task));
        }

        self.shared.task_ready.notify_one();
        Ok(())
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.shared.lock_state();
        self.shared.snapshot(&state)
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shared.lock_state().shutting_down
    }

    /// Inicia el shutdown, espera que se drene la cola y hace `join` de
    /// todos los threads. Llamarlo más de una vez no tiene efecto.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.lock_state();
            if !state.shutting_down {
                state.shutting_down = true;
                info!(
                    queued = self.shared.queue.len(),
                    alive = state.alive,
                    "thread pool shutting down"
                );
            }
        }
        self.shared.task_ready.notify_all();
        self.shared.manager_wake.notify_all();

        let manager = self
            .manager
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = manager {
            if handle.join().is_err() {
                error!("pool manager panicked");
            }
        }

        // Con el manager detenido ya no aparecen handles nuevos
        let handles: Vec<_> = self
            .shared
            .lock_handles()
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        for handle in handles {
            if handle.join().is_err() {
                error!("worker thread panicked");
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Lanza un worker. El llamador ya sumó el thread a `alive`; si el spawn
/// falla se descuenta aquí.
fn spawn_worker(shared: &Arc<Shared>) -> std::io::Result<()> {
    let id = shared.next_id.fetch_add(1, Ordering::Relaxed);
    let worker_shared = Arc::clone(shared);

    let spawned = thread::Builder::new()
        .name(format!("worker-{}", id))
        .spawn(move || worker_loop(worker_shared, id));

    match spawned {
        Ok(handle) => {
            shared.lock_handles().insert(id, handle);
            Ok(())
        }
        Err(e) => {
            shared.lock_state().alive -= 1;
            Err(e)
        }
    }
}

fn worker_loop(shared: Arc<Shared>, id: usize) {
    debug!(worker = id, "worker started");

    loop {
        let task: Task = {
            let mut state = shared.lock_state();
            loop {
                if state.pending_exit > 0 && !state.shutting_down {
                    state.pending_exit -= 1;
                    if state.alive > shared.config.min_threads {
                        state.alive -= 1;
                        state.exited.push(id);
                        // Si quedó trabajo, otro worker despierta en nuestro lugar
                        if !shared.queue.is_empty() {
                            shared.task_ready.notify_one();
                        }
                        debug!(worker = id, alive = state.alive, "worker exiting");
                        return;
                    }
                }

                if let Some(task) = shared.queue.pop() {
                    state.busy += 1;
                    break task;
                }

                if state.shutting_down {
                    state.alive -= 1;
                    debug!(worker = id, "worker stopped");
                    return;
                }

                state = shared
                    .task_ready
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!(worker = id, "task panicked");
        }

        shared.lock_state().busy -= 1;
    }
}

fn manager_loop(shared: Arc<Shared>) {
    let config = &shared.config;
    debug!(interval_ms = config.manager_interval.as_millis() as u64, "pool manager started");

    loop {
        let (to_spawn, exited) = {
            let mut state = shared.lock_state();

            let deadline = Instant::now() + config.manager_interval;
            while !state.shutting_down {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                state = shared
                    .manager_wake
                    .wait_timeout(state, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
            if state.shutting_down {
                break;
            }

            let queued = shared.queue.len();
            let exited = std::mem::take(&mut state.exited);
            let mut to_spawn = 0;

            // Crecer tiene prioridad sobre encoger
            if queued > state.alive && state.alive < config.max_threads {
                to_spawn = (queued - state.alive).min(config.max_threads - state.alive);
                state.alive += to_spawn;
                state.pending_exit = 0;
            } else if state.busy * 2 < state.alive && state.alive > config.min_threads {
                let count = config.shrink_step.min(state.alive - config.min_threads);
                state.pending_exit = count;
                for _ in 0..count {
                    shared.task_ready.notify_one();
                }
            }

            if let Ok(stats) = serde_json::to_string(&shared.snapshot(&state)) {
                debug!(%stats, spawn = to_spawn, "pool manager tick");
            }
            (to_spawn, exited)
        };

        reap(&shared, exited);

        let mut spawned = 0;
        for _ in 0..to_spawn {
            match spawn_worker(&shared) {
                Ok(()) => spawned += 1,
                Err(e) => warn!(error = %e, "failed to grow pool"),
            }
        }
        if spawned > 0 {
            info!(spawned, "pool grew");
        }
    }

    debug!("pool manager stopped");
}

/// `join` de los workers que salieron por encogimiento
fn reap(shared: &Shared, exited: Vec<usize>) {
    if exited.is_empty() {
        return;
    }

    let handles: Vec<_> = {
        let mut map = shared.lock_handles();
        exited.iter().filter_map(|id| map.remove(id)).collect()
    };
    for handle in handles {
        if handle.join().is_err() {
            warn!("worker thread panicked before exit");
        }
    }
    info!(reaped = exited.len(), "pool shrank");
}
