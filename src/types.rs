/// Core domain types for jot units, parses, and interpreted runs.
use std::path::PathBuf;

/// Overall outcome of a classification or interpretation run.
/// A failure replaces the whole notebook view; per-unit problems never
/// appear here — they live on the unit's evaluation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// The run completed; individual units may still carry diagnostics.
    Ok,
    /// The run aborted before or during structural analysis.
    Failure {
        /// Human-readable description, including the causing error.
        message: String,
    },
}

impl ExecutionStatus {
    /// Build a failure status from a displayable cause.
    pub fn failure(message: impl Into<String>) -> Self {
        return ExecutionStatus::Failure { message: message.into() };
    }

    /// Whether the run completed.
    pub fn is_ok(&self) -> bool {
        return matches!(self, ExecutionStatus::Ok);
    }
}

/// One unit of a file together with its evaluation result.
/// Non-code units carry no result.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpretedUnit {
    /// The evaluation outcome, absent for comment and directive units.
    pub result: Option<crate::backend::EvalResult>,
    /// The classified unit this result belongs to.
    pub unit: Unit,
}

/// The final output of one interpretation run: one entry per unit, in file
/// order, plus the run-level status.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpreted {
    /// The raw lines of the interpreted file.
    pub lines: Vec<String>,
    /// Path of the interpreted file.
    pub path: PathBuf,
    /// Run-level status; on failure `units` is empty.
    pub status: ExecutionStatus,
    /// One interpreted unit per classified unit, in file order.
    pub units: Vec<InterpretedUnit>,
}

impl Interpreted {
    /// An aborted run: no units, no lines, only the failure status.
    pub fn failed(path: PathBuf, status: ExecutionStatus) -> Self {
        return Self { lines: Vec::new(), path, status, units: Vec::new() };
    }
}

/// The output of classifying one file: its units in file order.
#[derive(Debug, Clone)]
pub struct Parsing {
    /// The raw lines that were classified.
    pub lines: Vec<String>,
    /// Path of the classified file.
    pub path: PathBuf,
    /// Classification status; on failure `units` is empty.
    pub status: ExecutionStatus,
    /// The classified units, covering the file in order.
    pub units: Vec<Unit>,
}

/// Likely category of a snippet that failed syntactic analysis,
/// recovered heuristically so the snippet can still be wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbableCategory {
    /// Probably a bare value-producing expression.
    Expression,
    /// Probably a statement (assignments included).
    Statement,
    /// No usable guess; the unit is skipped with a warning.
    Unknown,
    /// Probably a variable declaration or mutation.
    VarDecl,
}

/// Syntactic category of a complete code snippet, as determined by the
/// pre-analysis oracle. Drives how the unit wrapper packages the snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxCategory {
    /// Could not be parsed; carries the heuristically recovered category.
    Erroneous(
        /// The recovered probable category.
        ProbableCategory,
    ),
    /// A bare value-producing expression such as `x + 1`.
    Expression,
    /// An `import` declaration.
    Import,
    /// A method declaration.
    Method,
    /// A plain statement: assignment, call, control flow.
    Statement,
    /// A class, interface, enum, record or annotation declaration.
    TypeDecl,
    /// A variable declaration, with or without initializer.
    VarDecl,
}

/// One classified slice of a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Pre-analysis of the snippet; present exactly for code units.
    pub analysis: Option<UnitAnalysis>,
    /// End line, exclusive.
    pub end: usize,
    /// What kind of slice this is.
    pub kind: UnitKind,
    /// Start line, 0-indexed, inclusive.
    pub start: usize,
}

/// Pre-analysis of a code unit: its accumulated source text and the
/// syntactic category the oracle assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitAnalysis {
    /// The oracle's syntactic category.
    pub category: SyntaxCategory,
    /// Whether the source is a complete snippet. A trailing incomplete
    /// snippet survives classification but fails the run at wrap time.
    pub complete: bool,
    /// The accumulated source text of the snippet.
    pub source: String,
}

/// Kind of a classified unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// An executable code snippet.
    Code,
    /// A run of blank lines and comments.
    Comment,
    /// A notebook directive. Recognized in the data model only; the
    /// classifier never produces one.
    Directive,
}
