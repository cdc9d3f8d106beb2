//! Engine statistics

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

use jit_compiler::TierStats;
use memory_manager::HeapStats;

/// Counters the engine bumps while evaluating. Atomic so concurrent
/// evaluations never lose an increment.
#[derive(Debug, Default)]
pub(crate) struct EngineCounters {
    scripts_evaluated: AtomicU64,
    failed_evaluations: AtomicU64,
    eval_time_micros: AtomicU64,
}

impl EngineCounters {
    pub(crate) fn record_evaluation(&self) {
        self.scripts_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed_evaluations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_evaluation_micros(&self, micros: u64) {
        self.eval_time_micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, heap: HeapStats, tier: TierStats) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            scripts_evaluated: self.scripts_evaluated.load(Ordering::Relaxed),
            failed_evaluations: self.failed_evaluations.load(Ordering::Relaxed),
            eval_time_micros: self.eval_time_micros.load(Ordering::Relaxed),
            heap,
            tier,
        }
    }
}

/// Point-in-time view of an engine's activity.
#[derive(Debug, Clone, Default)]
pub struct EngineStatsSnapshot {
    /// Evaluations attempted, successful or not
    pub scripts_evaluated: u64,
    /// Evaluations that ended in an error
    pub failed_evaluations: u64,
    /// Accumulated evaluation time in microseconds; only grows while
    /// profiling is enabled
    pub eval_time_micros: u64,
    /// Heap accounting at snapshot time
    pub heap: HeapStats,
    /// Compilation tier counters at snapshot time
    pub tier: TierStats,
}

impl EngineStatsSnapshot {
    /// Renders the snapshot as a multi-line, human-readable report.
    pub fn report(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "Engine");
        let _ = writeln!(report, "  scripts evaluated:  {}", self.scripts_evaluated);
        let _ = writeln!(report, "  failed evaluations: {}", self.failed_evaluations);
        let _ = writeln!(report, "  evaluation time:    {} us", self.eval_time_micros);
        let _ = writeln!(report, "Heap");
        let _ = writeln!(
            report,
            "  memory in use:      {} of {} bytes",
            self.heap.bytes_in_use, self.heap.memory_limit
        );
        let _ = writeln!(report, "  live cells:         {}", self.heap.live_cells);
        let _ = writeln!(
            report,
            "  collections:        {} ({} cells, {} bytes freed)",
            self.heap.collections, self.heap.cells_freed, self.heap.bytes_freed
        );
        let _ = writeln!(report, "Tier");
        let _ = writeln!(
            report,
            "  programs compiled:  {}",
            self.tier.programs_compiled
        );
        let _ = writeln!(report, "  cache hits:         {}", self.tier.cache_hits);
        let _ = writeln!(
            report,
            "  compile failures:   {}",
            self.tier.compile_failures
        );
        report
    }
}
