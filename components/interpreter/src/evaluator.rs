//! Evaluation driver: lexing, parsing and execution with phase tracking.

use core_types::{EngineResult, Value};
use memory_manager::Heap;
use parser::{Parser, Program};

use crate::dispatch;

/// Phases an evaluation passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalPhase {
    /// Tokenizing source text
    Lexing,
    /// Building the AST
    Parsing,
    /// Walking the AST
    Executing,
    /// Finished with a value
    Completed,
    /// Stopped by an error
    Failed,
}

/// Outcome of one evaluation run.
#[derive(Debug)]
pub struct Evaluation {
    /// Final value, or the error that stopped the run
    pub result: EngineResult<Value>,
    /// Terminal state: [`EvalPhase::Completed`] or [`EvalPhase::Failed`]
    pub phase: EvalPhase,
    /// For failed runs, the phase that raised the error
    pub failed_in: Option<EvalPhase>,
}

impl Evaluation {
    fn completed(value: Value) -> Self {
        Self {
            result: Ok(value),
            phase: EvalPhase::Completed,
            failed_in: None,
        }
    }

    fn failed(error: core_types::EngineError, failed_in: EvalPhase) -> Self {
        Self {
            result: Err(error),
            phase: EvalPhase::Failed,
            failed_in: Some(failed_in),
        }
    }

    /// Returns true if the run produced a value.
    pub fn is_completed(&self) -> bool {
        self.phase == EvalPhase::Completed
    }
}

/// Tree-walking evaluator bound to a heap.
///
/// Stateless between runs: every evaluation lexes, parses and executes its
/// source independently, allocating literals on the shared heap.
///
/// # Examples
///
/// ```
/// use interpreter::Evaluator;
/// use memory_manager::Heap;
///
/// let evaluator = Evaluator::new(Heap::new());
/// let value = evaluator.evaluate("123 * 456").unwrap();
/// assert_eq!(value.to_string(), "56088");
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    heap: Heap,
}

impl Evaluator {
    /// Creates an evaluator allocating on `heap`.
    pub fn new(heap: Heap) -> Self {
        Self { heap }
    }

    /// The heap this evaluator allocates on.
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Runs the full pipeline on `source`, reporting the phase reached.
    pub fn run(&self, source: &str) -> Evaluation {
        let tokens = match parser::tokenize(source) {
            Ok(tokens) => tokens,
            Err(error) => return Evaluation::failed(error, EvalPhase::Lexing),
        };
        let program = match Parser::new(tokens).parse_program() {
            Ok(program) => program,
            Err(error) => return Evaluation::failed(error, EvalPhase::Parsing),
        };
        match self.execute(&program) {
            Ok(value) => Evaluation::completed(value),
            Err(error) => Evaluation::failed(error, EvalPhase::Executing),
        }
    }

    /// Evaluates `source` to a value.
    pub fn evaluate(&self, source: &str) -> EngineResult<Value> {
        self.run(source).result
    }

    /// Executes an already parsed program.
    pub fn execute(&self, program: &Program) -> EngineResult<Value> {
        dispatch::execute_program(&self.heap, program)
    }
}
