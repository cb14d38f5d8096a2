//! Interpreters: turn a classified file into evaluated units.
//!
//! [`GreedyInterpreter`] is the incremental engine: it fingerprints every
//! member of the wrapped file, re-submits only what the invalidation plan
//! marks, serves the rest from the per-file cache, and drops stale
//! declarations from the backend. [`SimpleInterpreter`] re-runs everything
//! and keeps no cache; it exists as the degenerate strategy for debugging
//! cache suspicions.
//!
//! Both own one backend and one state per watched file, keyed by path.
//! Runs for the same path are strictly sequential; different paths never
//! share a backend.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::backend::{Backend as _, BackendProvider, EvalResult};
use crate::error::Error;
use crate::fingerprint::fingerprint_member;
use crate::graph;
use crate::invalidate::{self, PlanMember};
use crate::members::ParsedUnit;
use crate::state::FileState;
use crate::types::{ExecutionStatus, Interpreted, InterpretedUnit, Parsing, UnitKind};
use crate::wrap::build_synthetic_class;

/// Turns one classified file into evaluated units.
pub trait Interpreter {
    /// Run one classified file to completion. Structural failures are
    /// reported through the returned status, never panicked or leaked.
    fn interpret(&mut self, parsing: &Parsing) -> Interpreted;

    /// Release every backend this interpreter opened.
    fn stop(&mut self);
}

/// One watched file's backend and incremental memory.
struct FileSession<B> {
    backend: B,
    state: FileState,
}

/// The incremental interpreter.
pub struct GreedyInterpreter<P: BackendProvider> {
    files: HashMap<PathBuf, FileSession<P::Backend>>,
    provider: P,
}

impl<P: BackendProvider> GreedyInterpreter<P> {
    /// Create an interpreter that opens backends through the provider.
    pub fn new(provider: P) -> Self {
        return Self { files: HashMap::new(), provider };
    }

    fn internal_interpret(&mut self, parsing: &Parsing) -> Result<Interpreted, Error> {
        let provider = &mut self.provider;
        let session = match self.files.entry(parsing.path.clone()) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => {
                tracing::info!("starting new backend for file: {}", parsing.path.display());
                e.insert(FileSession {
                    backend: provider.open(&parsing.path)?,
                    state: FileState::new(),
                })
            },
        };

        let synthetic = build_synthetic_class(parsing)?;
        let parsed = ParsedUnit::parse(synthetic)?;
        let members = parsed.members()?;
        let dep_graph = graph::build(&parsed, &members);

        let plan_members: Vec<PlanMember> = members
            .iter()
            .map(|m| {
                let deps = dep_graph.dependencies_of(&m.name);
                return PlanMember {
                    fingerprint: fingerprint_member(parsed.source(), m.node, &deps),
                    name: m.name.clone(),
                    unit: m.unit,
                };
            })
            .collect();
        let plan = invalidate::plan(&plan_members, &dep_graph, &session.state);

        // clean outdated declarations before any submission
        for fingerprint in &plan.stale {
            let Some(result) = session.state.results.remove(fingerprint) else {
                continue;
            };
            for event in &result.events {
                if let Some(handle) = &event.handle {
                    debug!("dropping outdated declaration: {}", handle.0);
                    session.backend.drop_declaration(handle)?;
                }
            }
        }
        session.state.member_fingerprints = plan.member_fingerprints;

        let mut interpreted_units = Vec::with_capacity(parsing.units.len());
        for (i, unit) in parsing.units.iter().enumerate() {
            if unit.kind != UnitKind::Code {
                interpreted_units.push(InterpretedUnit { result: None, unit: unit.clone() });
                continue;
            }
            let Some(analysis) = unit.analysis.as_ref() else {
                return Err(Error::WrapFailed {
                    end: unit.end,
                    path: parsing.path.clone(),
                    reason: "code unit without pre-analysis".to_string(),
                    start: unit.start + 1,
                });
            };
            let source = analysis.source.as_str();
            let result: EvalResult = match plan.unit_fingerprints.get(&i) {
                None => {
                    // imports and skipped snippets are not fingerprinted
                    // and always re-evaluated
                    debug!("evaluating: {}", source.trim());
                    session.backend.submit(source)?
                },
                Some(fingerprint) => {
                    let cached = if plan.rerun.contains(&i) {
                        None
                    } else {
                        session.state.results.get(fingerprint).cloned()
                    };
                    match cached {
                        Some(result) => {
                            debug!("using cache for: {}", source.trim());
                            result
                        },
                        None => {
                            debug!("evaluating: {}", source.trim());
                            let result = session.backend.submit(source)?;
                            session
                                .state
                                .results
                                .insert(fingerprint.clone(), result.clone());
                            result
                        },
                    }
                },
            };
            interpreted_units.push(InterpretedUnit { result: Some(result), unit: unit.clone() });
        }

        return Ok(Interpreted {
            lines: parsing.lines.clone(),
            path: parsing.path.clone(),
            status: ExecutionStatus::Ok,
            units: interpreted_units,
        });
    }
}

impl<P: BackendProvider> Interpreter for GreedyInterpreter<P> {
    fn interpret(&mut self, parsing: &Parsing) -> Interpreted {
        if !parsing.status.is_ok() {
            return Interpreted::failed(parsing.path.clone(), parsing.status.clone());
        }
        return match self.internal_interpret(parsing) {
            Ok(interpreted) => interpreted,
            Err(e) => {
                let message = format!(
                    "error during interpretation of file {}:\n{e}",
                    parsing.path.display()
                );
                tracing::error!("{message}");
                Interpreted::failed(parsing.path.clone(), ExecutionStatus::failure(message))
            },
        };
    }

    fn stop(&mut self) {
        for (_, mut session) in self.files.drain() {
            session.backend.close();
        }
    }
}

impl<P: BackendProvider> Drop for GreedyInterpreter<P> {
    /// Backends must not leak even when the caller forgets to stop.
    fn drop(&mut self) {
        self.stop();
    }
}

/// The cache-free interpreter: every code unit is re-submitted on every
/// run, in file order.
pub struct SimpleInterpreter<P: BackendProvider> {
    files: HashMap<PathBuf, P::Backend>,
    provider: P,
}

impl<P: BackendProvider> SimpleInterpreter<P> {
    /// Create an interpreter that opens backends through the provider.
    pub fn new(provider: P) -> Self {
        return Self { files: HashMap::new(), provider };
    }

    fn internal_interpret(&mut self, parsing: &Parsing) -> Result<Interpreted, Error> {
        let provider = &mut self.provider;
        let backend = match self.files.entry(parsing.path.clone()) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => {
                tracing::info!("starting new backend for file: {}", parsing.path.display());
                e.insert(provider.open(&parsing.path)?)
            },
        };

        let mut interpreted_units = Vec::with_capacity(parsing.units.len());
        for unit in &parsing.units {
            let result = match (&unit.kind, unit.analysis.as_ref()) {
                (UnitKind::Code, Some(analysis)) => Some(backend.submit(&analysis.source)?),
                _ => None,
            };
            interpreted_units.push(InterpretedUnit { result, unit: unit.clone() });
        }
        return Ok(Interpreted {
            lines: parsing.lines.clone(),
            path: parsing.path.clone(),
            status: ExecutionStatus::Ok,
            units: interpreted_units,
        });
    }
}

impl<P: BackendProvider> Interpreter for SimpleInterpreter<P> {
    fn interpret(&mut self, parsing: &Parsing) -> Interpreted {
        if !parsing.status.is_ok() {
            return Interpreted::failed(parsing.path.clone(), parsing.status.clone());
        }
        return match self.internal_interpret(parsing) {
            Ok(interpreted) => interpreted,
            Err(e) => {
                let message = format!(
                    "error during interpretation of file {}:\n{e}",
                    parsing.path.display()
                );
                tracing::error!("{message}");
                Interpreted::failed(parsing.path.clone(), ExecutionStatus::failure(message))
            },
        };
    }

    fn stop(&mut self) {
        for (_, mut backend) in self.files.drain() {
            backend.close();
        }
    }
}

impl<P: BackendProvider> Drop for SimpleInterpreter<P> {
    fn drop(&mut self) {
        self.stop();
    }
}
