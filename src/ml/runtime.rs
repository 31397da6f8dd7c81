// ============================================================
// Layer 5 — Numeric Runtime
// ============================================================
// Owns the worker pool that training spreads each iteration's
// batch across. Lifecycle:
//
//   init(workers) ──► running ──► shutdown() ──► shut down (final)
//
// Once shut down, every training or inference call and any second
// shutdown fails with ClassifierError::RuntimeShutdown.
//
// The process-wide instance lives behind `init` / `global` /
// `shutdown`; tests build private instances with `Runtime::new`.
//
// Why not rayon's global pool?
//   The global pool can be neither resized nor torn down. Training
//   needs a fixed worker count (16 unless configured), and a CLI run
//   needs to release those threads before it exits.
//
// Why a RwLock around the pool?
//   Every iteration and every inference takes a read lock to check
//   the pool is still there. Only `shutdown` takes the write lock,
//   once, to drop it.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::domain::error::{ClassifierError, Result};

/// Worker count used when the caller does not configure one.
pub const DEFAULT_WORKERS: usize = 16;

static GLOBAL: OnceLock<Arc<Runtime>> = OnceLock::new();

#[derive(Debug)]
pub struct Runtime {
    /// Threads in the pool; also the number of chunks a batch is cut into
    workers: usize,

    /// `None` after `shutdown`
    pool:    RwLock<Option<Arc<ThreadPool>>>,
}

impl Runtime {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(ClassifierError::InvalidArgument(
                "runtime needs at least one worker".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("nn-worker-{i}"))
            .build()?;

        tracing::debug!("Numeric runtime started with {} workers", workers);
        Ok(Self { workers, pool: RwLock::new(Some(Arc::new(pool))) })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The live worker pool, or `RuntimeShutdown`.
    pub fn pool(&self) -> Result<Arc<ThreadPool>> {
        self.pool.read().clone().ok_or(ClassifierError::RuntimeShutdown)
    }

    pub fn ensure_running(&self) -> Result<()> {
        if self.pool.read().is_some() {
            Ok(())
        } else {
            Err(ClassifierError::RuntimeShutdown)
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.pool.read().is_none()
    }

    /// Release the worker pool. Threads exit once in-flight work that
    /// still holds the pool finishes.
    pub fn shutdown(&self) -> Result<()> {
        match self.pool.write().take() {
            Some(_) => {
                tracing::info!("Numeric runtime shut down");
                Ok(())
            }
            None => Err(ClassifierError::RuntimeShutdown),
        }
    }
}

// ─── Process-wide instance ────────────────────────────────────────────────────

/// Initialise the process-wide runtime. Repeated calls return the
/// existing instance; calling after `shutdown` fails.
pub fn init(workers: usize) -> Result<Arc<Runtime>> {
    if let Some(runtime) = GLOBAL.get() {
        runtime.ensure_running()?;
        if runtime.workers() != workers {
            tracing::warn!(
                "Runtime already initialised with {} workers, ignoring request for {}",
                runtime.workers(),
                workers
            );
        }
        return Ok(Arc::clone(runtime));
    }

    let runtime = Arc::new(Runtime::new(workers)?);
    // A concurrent init may have won the race; use whichever instance landed.
    let runtime = GLOBAL.get_or_init(|| runtime);
    tracing::info!("Numeric runtime initialised ({} workers)", runtime.workers());
    Ok(Arc::clone(runtime))
}

/// The process-wide runtime, if `init` has been called.
pub fn global() -> Result<Arc<Runtime>> {
    let runtime = GLOBAL.get().ok_or(ClassifierError::RuntimeNotInitialized)?;
    runtime.ensure_running()?;
    Ok(Arc::clone(runtime))
}

/// Tear down the process-wide runtime. Only the first call succeeds.
pub fn shutdown() -> Result<()> {
    GLOBAL
        .get()
        .ok_or(ClassifierError::RuntimeNotInitialized)?
        .shutdown()
}
