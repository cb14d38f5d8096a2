//! Per-file incremental state, persisted across runs on the same file.

use std::collections::HashMap;

use crate::backend::EvalResult;
use crate::fingerprint::Fingerprint;

/// What jot remembers about one watched file between runs: evaluation
/// results keyed by structural fingerprint, and the fingerprint each member
/// name carried last run (used to rebuild members that have become forward
/// references). Created lazily per path; dropped on session shutdown.
#[derive(Debug, Default)]
pub struct FileState {
    /// The fingerprint each member name carried last run.
    /// Replaced wholesale every run, never merged.
    pub member_fingerprints: HashMap<String, Fingerprint>,
    /// Cached evaluation results by fingerprint.
    pub results: HashMap<Fingerprint, EvalResult>,
}

impl FileState {
    /// Fresh state for a file seen for the first time.
    pub fn new() -> Self {
        return Self::default();
    }
}
