//! The engine facade
//!
//! `Engine` wires the heap, evaluator, tier controller and worker pool
//! together behind one embeddable surface. Evaluation follows the
//! sentinel contract: failures record an error in the engine's slot
//! and surface as `undefined` rather than unwinding into the caller.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use async_runtime::{EvalHandle, EvalRunner, WorkerPool};
use core_types::{EngineError, EngineResult, ErrorKind, Value};
use interpreter::Evaluator;
use jit_compiler::{script_fingerprint, TierController};
use memory_manager::{CollectionOutcome, Heap, ValueCollection};
use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::error_slot::ErrorSlot;
use crate::stats::{EngineCounters, EngineStatsSnapshot};

const LIFECYCLE_CREATED: u8 = 0;
const LIFECYCLE_READY: u8 = 1;
const LIFECYCLE_FAILED: u8 = 2;
const LIFECYCLE_SHUT_DOWN: u8 = 3;

/// Everything built by `initialize`.
struct RuntimeCore {
    heap: Heap,
    evaluator: Evaluator,
    tier: TierController,
}

/// State shared between the facade and the worker threads.
struct EngineShared {
    lifecycle: AtomicU8,
    profiling: AtomicBool,
    errors: ErrorSlot,
    counters: EngineCounters,
    core: OnceLock<RuntimeCore>,
}

impl EngineShared {
    fn ready_core(&self) -> EngineResult<&RuntimeCore> {
        match self.lifecycle.load(Ordering::Acquire) {
            LIFECYCLE_READY => self
                .core
                .get()
                .ok_or_else(|| EngineError::internal_error("engine core missing")),
            LIFECYCLE_SHUT_DOWN => Err(EngineError::internal_error("engine is shut down")),
            LIFECYCLE_FAILED => Err(EngineError::internal_error("engine initialization failed")),
            _ => Err(EngineError::internal_error("engine is not initialized")),
        }
    }

    /// One evaluation attempt: counted, timed, tier-aware, and with
    /// every failure normalized into the error slot.
    fn try_evaluate_script(&self, source: &str) -> EngineResult<Value> {
        self.counters.record_evaluation();
        match self.run_tiered(source) {
            Ok(value) => Ok(value),
            Err(error) => {
                self.counters.record_failure();
                self.errors.record(error.clone());
                Err(error)
            }
        }
    }

    fn evaluate_script(&self, source: &str) -> Value {
        self.try_evaluate_script(source).unwrap_or(Value::Undefined)
    }

    fn run_tiered(&self, source: &str) -> EngineResult<Value> {
        let core = self.ready_core()?;
        let started = self.profiling.load(Ordering::Relaxed).then(Instant::now);

        let fingerprint = script_fingerprint(source);
        let result = match core.tier.executable(fingerprint, source) {
            Some(compiled) => core.evaluator.execute(compiled.program()),
            None => {
                let result = core.evaluator.evaluate(source);
                if result.is_ok() {
                    core.tier.record_execution(fingerprint, source);
                }
                result
            }
        };

        if let Some(started) = started {
            self.counters
                .add_evaluation_micros(started.elapsed().as_micros() as u64);
        }
        result
    }
}

/// An embeddable evaluation engine.
///
/// Construction is cheap and allocates nothing; [`Engine::initialize`]
/// builds the heap, evaluator, tier controller and worker pool. All
/// methods take `&self`, so an `Arc<Engine>` can be shared freely
/// across threads.
///
/// # Examples
///
/// ```
/// use engine::{Engine, EngineConfig};
///
/// let engine = Engine::new(EngineConfig::default());
/// assert!(engine.initialize());
/// assert_eq!(engine.evaluate("123 * 456").to_string(), "56088");
/// ```
pub struct Engine {
    config: EngineConfig,
    shared: Arc<EngineShared>,
    pool: Mutex<Option<WorkerPool>>,
}

impl Engine {
    /// Creates an engine with the given configuration, not yet
    /// initialized.
    pub fn new(config: EngineConfig) -> Self {
        let shared = Arc::new(EngineShared {
            lifecycle: AtomicU8::new(LIFECYCLE_CREATED),
            profiling: AtomicBool::new(config.profiling_enabled),
            errors: ErrorSlot::new(),
            counters: EngineCounters::default(),
            core: OnceLock::new(),
        });
        Self {
            config,
            shared,
            pool: Mutex::new(None),
        }
    }

    /// Builds the heap, evaluator, tier controller and worker pool.
    ///
    /// Returns `true` exactly once, on the call that brought the
    /// engine up. Later calls return `false`, as does any call after a
    /// failed attempt or a shutdown; a failed attempt leaves the
    /// engine permanently unusable.
    pub fn initialize(&self) -> bool {
        // The pool lock also serializes concurrent initialize calls.
        let mut pool = self.pool.lock();
        if self.shared.lifecycle.load(Ordering::Acquire) != LIFECYCLE_CREATED {
            return false;
        }

        let heap = Heap::with_memory_limit(self.config.memory_limit);
        let evaluator = Evaluator::new(heap.clone());
        let tier = TierController::with_threshold(self.config.jit_threshold);
        tier.set_enabled(self.config.jit_enabled);
        let core = RuntimeCore {
            heap,
            evaluator,
            tier,
        };
        if self.shared.core.set(core).is_err() {
            self.shared
                .lifecycle
                .store(LIFECYCLE_FAILED, Ordering::Release);
            return false;
        }

        let runner: EvalRunner = {
            let shared = Arc::clone(&self.shared);
            Arc::new(move |source: &str| shared.evaluate_script(source))
        };
        match WorkerPool::spawn(self.config.worker_threads.max(1), runner) {
            Ok(workers) => {
                *pool = Some(workers);
                self.shared
                    .lifecycle
                    .store(LIFECYCLE_READY, Ordering::Release);
                true
            }
            Err(error) => {
                self.shared
                    .lifecycle
                    .store(LIFECYCLE_FAILED, Ordering::Release);
                self.shared.errors.record(EngineError::internal_error(format!(
                    "worker pool startup failed: {}",
                    error
                )));
                false
            }
        }
    }

    /// Whether `initialize` succeeded and the engine has not shut down.
    pub fn is_initialized(&self) -> bool {
        self.shared.lifecycle.load(Ordering::Acquire) == LIFECYCLE_READY
    }

    /// Whether hot scripts are promoted to the compiled tier.
    pub fn is_jit_enabled(&self) -> bool {
        self.config.jit_enabled
    }

    /// Whether evaluation timings are being collected.
    pub fn is_profiling_enabled(&self) -> bool {
        self.shared.profiling.load(Ordering::Relaxed)
    }

    /// Turns evaluation timing collection on or off.
    pub fn enable_profiling(&self, enabled: bool) {
        self.shared.profiling.store(enabled, Ordering::Relaxed);
    }

    /// The configured heap budget in bytes.
    pub fn memory_limit(&self) -> usize {
        self.config.memory_limit
    }

    /// Bytes currently held by heap values; 0 before initialization.
    pub fn current_memory_usage(&self) -> usize {
        self.shared
            .core
            .get()
            .map(|core| core.heap.bytes_in_use())
            .unwrap_or(0)
    }

    /// Evaluates `source`, returning `undefined` on failure.
    ///
    /// The failure itself is available through [`Engine::last_error`]
    /// and the registered error handler.
    pub fn evaluate(&self, source: &str) -> Value {
        self.shared.evaluate_script(source)
    }

    /// Evaluates `source`, surfacing the failure instead of the
    /// sentinel. Side effects (stats, error slot, handler) are the
    /// same as [`Engine::evaluate`].
    pub fn try_evaluate(&self, source: &str) -> EngineResult<Value> {
        self.shared.try_evaluate_script(source)
    }

    /// Queues `source` for evaluation on the worker pool.
    ///
    /// The handle resolves to the same value a synchronous call would
    /// produce. Before initialization (or after shutdown) the attempt
    /// is refused like a failed evaluation and the handle resolves to
    /// `undefined`.
    pub fn evaluate_async(&self, source: &str) -> EvalHandle {
        let pool = self.pool.lock();
        match pool.as_ref() {
            Some(pool) if self.is_initialized() => pool.submit(source),
            // No pool to queue on: answer inline. Non-ready engines
            // refuse the attempt and the handle carries the sentinel.
            _ => EvalHandle::pre_resolved(self.shared.evaluate_script(source)),
        }
    }

    /// Evaluates every source concurrently and collects the results in
    /// input order.
    pub fn evaluate_all<S: AsRef<str>>(&self, sources: &[S]) -> Vec<Value> {
        let handles: Vec<EvalHandle> = sources
            .iter()
            .map(|source| self.evaluate_async(source.as_ref()))
            .collect();
        handles.into_iter().map(EvalHandle::wait).collect()
    }

    /// Registers the failure observer, replacing any previous one.
    ///
    /// The handler runs synchronously on the evaluating thread while
    /// the error slot is locked; it must not call back into this
    /// engine's error API.
    pub fn set_error_handler(&self, handler: impl Fn(ErrorKind, &str) + Send + Sync + 'static) {
        self.shared.errors.set_handler(Box::new(handler));
    }

    /// The most recent evaluation error; kind `None` if none occurred
    /// since the last [`Engine::clear_error`].
    pub fn last_error(&self) -> EngineError {
        self.shared.errors.current()
    }

    /// Message of the most recent evaluation error; empty when clear.
    pub fn last_error_message(&self) -> String {
        self.shared.errors.current_message()
    }

    /// Resets the error slot to kind `None`. Idempotent.
    pub fn clear_error(&self) {
        self.shared.errors.clear()
    }

    /// Runs a full collection pass; a no-op before initialization.
    pub fn collect_garbage(&self) -> CollectionOutcome {
        self.shared
            .core
            .get()
            .map(|core| core.heap.collect_garbage())
            .unwrap_or_default()
    }

    /// Factory for building values on this engine's heap; `None`
    /// before initialization.
    pub fn values(&self) -> Option<ValueCollection> {
        if !self.is_initialized() {
            return None;
        }
        self.shared
            .core
            .get()
            .map(|core| ValueCollection::new(core.heap.clone()))
    }

    /// Snapshot of engine, heap and tier counters.
    pub fn stats(&self) -> EngineStatsSnapshot {
        let (heap, tier) = match self.shared.core.get() {
            Some(core) => (core.heap.stats(), core.tier.stats()),
            None => Default::default(),
        };
        self.shared.counters.snapshot(heap, tier)
    }

    /// Multi-line textual rendering of [`Engine::stats`].
    pub fn stats_report(&self) -> String {
        self.stats().report()
    }

    /// Stops accepting work and joins the worker pool.
    ///
    /// Queued asynchronous evaluations finish first. After shutdown
    /// the engine refuses evaluation and cannot be re-initialized.
    /// Called automatically on drop; safe to call repeatedly.
    pub fn shutdown(&self) {
        let pool = self.pool.lock().take();
        if let Some(mut pool) = pool {
            // Still marked ready while draining, so queued jobs run
            // normally.
            pool.shutdown();
        }
        self.shared
            .lifecycle
            .store(LIFECYCLE_SHUT_DOWN, Ordering::Release);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
