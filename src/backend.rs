//! The execution backend contract: a stateful, REPL-like evaluator that
//! accepts one syntactically complete snippet at a time and reports
//! structured results. jot only ever talks to a backend through this
//! boundary; the production implementation lives in [`crate::process`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A stateful evaluator for one notebook file.
///
/// Submissions accumulate state (declarations, variable values) inside the
/// backend; declarations can later be dropped individually. One backend
/// instance serves exactly one watched file and is never shared.
pub trait Backend {
    /// Release the backend's resources. Must be called on every session
    /// exit path; calling it twice is tolerated.
    fn close(&mut self);

    /// Remove a previously accepted declaration from the backend's live
    /// state. Dropping an unknown or already-dropped handle is tolerated.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the backend cannot be reached.
    fn drop_declaration(&mut self, handle: &DeclHandle) -> Result<(), Error>;

    /// Execute one syntactically complete snippet and report its events,
    /// captured stdout/stderr, diagnostics and unresolved names.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the backend cannot be reached. A snippet
    /// that merely fails to compile or throws is a successful submission;
    /// the failure is data on the returned result.
    fn submit(&mut self, source: &str) -> Result<EvalResult, Error>;
}

/// Creates one backend per watched file.
pub trait BackendProvider {
    /// The backend type this provider creates.
    type Backend: Backend;

    /// Open a fresh backend for the given file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the backend cannot be started.
    fn open(&mut self, path: &Path) -> Result<Self::Backend, Error>;
}

/// Opaque identifier the backend assigned to an accepted declaration.
/// Used only to drop the declaration during stale-cache cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclHandle(
    /// The backend's identifier string.
    pub String,
);

/// One compiler diagnostic attached to an evaluation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The diagnostic message, e.g. `cannot find symbol: variable x`.
    pub message: String,
}

/// One evaluation event produced by a submission. A submission practically
/// produces one event per top-level snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalEvent {
    /// Compiler diagnostics for this event.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
    /// Runtime exception message, if the snippet ran and threw.
    #[serde(default)]
    pub exception: Option<String>,
    /// Handle for dropping the declaration this event created, if any.
    #[serde(default)]
    pub handle: Option<DeclHandle>,
    /// Name of the declaration this event created, if any.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the snippet was accepted or rejected at compile/bind time.
    pub status: EventStatus,
    /// Names the snippet could not resolve at binding time.
    #[serde(default)]
    pub unresolved: Vec<String>,
    /// Rendered value of the snippet, if it produced one.
    #[serde(default)]
    pub value: Option<String>,
}

/// The externally observable outcome of one submission. Immutable once
/// produced; cached verbatim between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalResult {
    /// Captured stderr since the previous submission.
    #[serde(default)]
    pub err: String,
    /// The ordered evaluation events.
    pub events: Vec<EvalEvent>,
    /// Captured stdout since the previous submission.
    #[serde(default)]
    pub out: String,
}

/// Compile/bind outcome of an evaluation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// The snippet was rejected: it failed to compile or bind.
    Rejected,
    /// The snippet was accepted and evaluated.
    Valid,
}
