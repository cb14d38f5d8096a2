//! jot — incremental Java notebooks.
//!
//! A `.jsh` file of interleaved prose comments and Java snippets is evaluated
//! by a stateful, REPL-like execution backend. On every change, only the
//! top-level declarations affected by the edit are re-submitted; everything
//! else is served from a per-file result cache keyed by structural
//! fingerprints.
//!
//! The pipeline: [`classify`] splits raw lines into units, [`wrap`] packages
//! the code units into one synthetic class, [`members`] extracts its parsed
//! members, [`graph`] records dependency edges between them, [`fingerprint`]
//! derives cache keys, and [`invalidate`] decides what must re-run.
//! [`interpreter`] orchestrates the whole run against a [`backend::Backend`].

pub mod analysis;
pub mod backend;
pub mod classify;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod graph;
pub mod interpreter;
pub mod invalidate;
pub mod members;
pub mod process;
pub mod render;
pub mod state;
pub mod types;
pub mod watch;
pub mod wrap;
