//! Compiled program artifacts

use parser::Program;

/// A script prepared for repeated execution.
///
/// Holds the constant-folded program together with the fingerprint and
/// normalized source text it was compiled from. The source is retained
/// so a fingerprint collision can never serve another script's program.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    fingerprint: u64,
    source: String,
    program: Program,
}

impl CompiledProgram {
    pub(crate) fn new(fingerprint: u64, source: String, program: Program) -> Self {
        Self {
            fingerprint,
            source,
            program,
        }
    }

    /// Fingerprint of the source this program was compiled from.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Normalized source text this program was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The executable form of the script.
    pub fn program(&self) -> &Program {
        &self.program
    }
}
