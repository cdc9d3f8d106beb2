//! Engine configuration

use jit_compiler::DEFAULT_COMPILE_THRESHOLD;
use memory_manager::Heap;

/// Construction-time settings for an [`Engine`](crate::Engine).
///
/// All fields are plain data; the configuration only takes effect when
/// the engine initializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Heap budget in bytes; allocations beyond it fail after a
    /// collection attempt
    pub memory_limit: usize,
    /// Whether hot scripts are promoted to the compiled tier
    pub jit_enabled: bool,
    /// Executions of a script before promotion
    pub jit_threshold: u64,
    /// Whether evaluation timings are collected
    pub profiling_enabled: bool,
    /// Worker threads serving asynchronous evaluations; values below 1
    /// are treated as 1
    pub worker_threads: usize,
}

impl EngineConfig {
    /// The default configuration, identical to [`Default`].
    pub fn new() -> Self {
        Self {
            memory_limit: Heap::DEFAULT_MEMORY_LIMIT,
            jit_enabled: true,
            jit_threshold: DEFAULT_COMPILE_THRESHOLD,
            profiling_enabled: true,
            worker_threads: 4,
        }
    }

    /// Preset for throughput-sensitive embedders: scripts promote to
    /// the compiled tier sooner, more workers serve asynchronous
    /// evaluations, and timing collection is off.
    pub fn high_performance() -> Self {
        Self {
            jit_threshold: 100,
            worker_threads: 8,
            profiling_enabled: false,
            ..Self::new()
        }
    }

    /// Preset for memory-sensitive embedders: a 16 MiB heap, no
    /// compiled-program cache, and a single worker.
    pub fn memory_constrained() -> Self {
        Self {
            memory_limit: 16 * 1024 * 1024,
            jit_enabled: false,
            worker_threads: 1,
            ..Self::new()
        }
    }

    /// Sets the heap budget in bytes.
    pub fn with_memory_limit(mut self, memory_limit: usize) -> Self {
        self.memory_limit = memory_limit;
        self
    }

    /// Turns the compiled tier on or off.
    pub fn with_jit_enabled(mut self, jit_enabled: bool) -> Self {
        self.jit_enabled = jit_enabled;
        self
    }

    /// Sets the promotion threshold.
    pub fn with_jit_threshold(mut self, jit_threshold: u64) -> Self {
        self.jit_threshold = jit_threshold;
        self
    }

    /// Turns timing collection on or off.
    pub fn with_profiling_enabled(mut self, profiling_enabled: bool) -> Self {
        self.profiling_enabled = profiling_enabled;
        self
    }

    /// Sets the asynchronous worker count.
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
