//! Execution tier selection
//!
//! Scripts start out interpreted. The controller counts successful
//! executions per source fingerprint and, once a script crosses the
//! invocation threshold, compiles it into a constant-folded program
//! that later evaluations reuse. Compilation failures are recorded and
//! the script simply stays on the interpreted tier.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use parser::parse;

use crate::compiled::CompiledProgram;
use crate::folding::fold_program;

/// Executions of a script before it is promoted to the compiled tier.
pub const DEFAULT_COMPILE_THRESHOLD: u64 = 1000;

/// Fingerprint used to recognize a script across evaluations.
///
/// The source is normalized by trimming surrounding whitespace, so
/// re-submissions that differ only in leading or trailing whitespace
/// share one execution profile.
pub fn script_fingerprint(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.trim().hash(&mut hasher);
    hasher.finish()
}

/// Counters describing tier activity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TierStats {
    /// Scripts promoted to the compiled tier
    pub programs_compiled: u64,
    /// Promotion attempts that failed to compile
    pub compile_failures: u64,
    /// Evaluations served from the compiled cache
    pub cache_hits: u64,
}

/// Per-script execution profile.
#[derive(Debug)]
struct ScriptProfile {
    /// Normalized source the fingerprint was first seen with
    source: String,
    invocations: u64,
    compiled: Option<Arc<CompiledProgram>>,
    compile_failed: bool,
}

impl ScriptProfile {
    fn for_source(source: &str) -> Self {
        Self {
            source: source.to_string(),
            invocations: 0,
            compiled: None,
            compile_failed: false,
        }
    }
}

/// Decides, per script, whether evaluation runs interpreted or from the
/// compiled cache.
///
/// The controller never changes what a script evaluates to: promotion
/// only swaps in a constant-folded form of the same program, and any
/// problem during promotion leaves the script interpreted.
#[derive(Debug)]
pub struct TierController {
    enabled: AtomicBool,
    threshold: u64,
    profiles: Mutex<HashMap<u64, ScriptProfile>>,
    programs_compiled: AtomicU64,
    compile_failures: AtomicU64,
    cache_hits: AtomicU64,
}

impl TierController {
    /// Create a controller with the default promotion threshold.
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_COMPILE_THRESHOLD)
    }

    /// Create a controller that promotes after `threshold` executions.
    pub fn with_threshold(threshold: u64) -> Self {
        Self {
            enabled: AtomicBool::new(true),
            threshold,
            profiles: Mutex::new(HashMap::new()),
            programs_compiled: AtomicU64::new(0),
            compile_failures: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    /// Whether promotion and the compiled cache are in use.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Turn the compiled tier on or off. Disabling keeps existing
    /// compiled programs cached but stops serving them.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// The promotion threshold this controller was built with.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Look up a compiled program for the script, if one exists.
    ///
    /// The stored source must match the normalized `source` exactly. A
    /// fingerprint collision therefore falls back to interpretation
    /// instead of running another script's program.
    pub fn executable(&self, fingerprint: u64, source: &str) -> Option<Arc<CompiledProgram>> {
        if !self.is_enabled() {
            return None;
        }
        let profiles = self.profiles.lock();
        let compiled = profiles.get(&fingerprint)?.compiled.as_ref()?;
        if compiled.source() != source.trim() {
            return None;
        }
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        Some(Arc::clone(compiled))
    }

    /// Record one successful interpreted execution of the script and
    /// promote it once it crosses the threshold.
    pub fn record_execution(&self, fingerprint: u64, source: &str) {
        if !self.is_enabled() {
            return;
        }
        let source = source.trim();
        let mut profiles = self.profiles.lock();
        let profile = profiles
            .entry(fingerprint)
            .or_insert_with(|| ScriptProfile::for_source(source));
        if profile.source != source {
            // Colliding script: leave the first owner's profile alone.
            return;
        }
        profile.invocations += 1;
        if profile.invocations < self.threshold || profile.compiled.is_some() || profile.compile_failed
        {
            return;
        }
        match parse(source) {
            Ok(program) => {
                let folded = fold_program(&program);
                profile.compiled = Some(Arc::new(CompiledProgram::new(
                    fingerprint,
                    source.to_string(),
                    folded,
                )));
                self.programs_compiled.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                profile.compile_failed = true;
                self.compile_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of scripts with an execution profile.
    pub fn profiled_scripts(&self) -> usize {
        self.profiles.lock().len()
    }

    /// Snapshot of the tier counters.
    pub fn stats(&self) -> TierStats {
        TierStats {
            programs_compiled: self.programs_compiled.load(Ordering::Relaxed),
            compile_failures: self.compile_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }
}

impl Default for TierController {
    fn default() -> Self {
        Self::new()
    }
}
