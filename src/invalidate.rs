//! Invalidation planning: given this run's members, graph and fingerprints
//! plus the previous per-file state, decide which units must be
//! re-submitted to the backend and which cached fingerprints are stale.
//!
//! Pure with respect to the backend: planning never evaluates anything,
//! which keeps the rules testable in isolation.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::fingerprint::Fingerprint;
use crate::graph::DependencyGraph;
use crate::state::FileState;

/// One fingerprinted member, ready for planning.
pub struct PlanMember {
    /// The member's fingerprint this run.
    pub fingerprint: Fingerprint,
    /// Simple name of the member.
    pub name: String,
    /// Index of the unit the member was wrapped from.
    pub unit: usize,
}

/// The outcome of planning one run.
pub struct Plan {
    /// This run's `member name → fingerprint` map; replaces the previous
    /// one wholesale.
    pub member_fingerprints: HashMap<String, Fingerprint>,
    /// Unit indices that must be re-submitted to the backend.
    pub rerun: HashSet<usize>,
    /// Cached fingerprints whose backend declarations must be dropped and
    /// whose cache entries must be removed before submitting.
    pub stale: BTreeSet<Fingerprint>,
    /// This run's `unit index → fingerprint` association. Units absent
    /// here (imports, skipped snippets) are always re-submitted and never
    /// cached.
    pub unit_fingerprints: HashMap<usize, Fingerprint>,
}

/// Decide re-run necessity for every member, in file order.
pub fn plan(members: &[PlanMember], graph: &DependencyGraph, state: &FileState) -> Plan {
    let unit_of: HashMap<&str, usize> =
        members.iter().map(|m| return (m.name.as_str(), m.unit)).collect();

    let mut unit_fingerprints: HashMap<usize, Fingerprint> = HashMap::new();
    let mut member_fingerprints: HashMap<String, Fingerprint> = HashMap::new();
    let mut claimed: HashMap<Fingerprint, (usize, String)> = HashMap::new();
    let mut rerun: HashSet<usize> = HashSet::new();

    for member in members {
        unit_fingerprints.insert(member.unit, member.fingerprint.clone());
        member_fingerprints.insert(member.name.clone(), member.fingerprint.clone());

        match claimed.get(&member.fingerprint) {
            Some((other_unit, other_name)) if *other_unit != member.unit => {
                // duplicate structural fingerprints cannot be deduplicated
                // safely under mutable state: conservatively run both
                tracing::debug!(
                    "duplicate fingerprint between units {other_unit} and {}",
                    member.unit
                );
                mark_with_dependents(other_name, graph, &unit_of, &mut rerun);
                mark_with_dependents(&member.name, graph, &unit_of, &mut rerun);
            },
            Some(_) => {},
            None => {
                claimed.insert(
                    member.fingerprint.clone(),
                    (member.unit, member.name.clone()),
                );
            },
        }

        if !state.results.contains_key(&member.fingerprint) {
            mark_with_dependents(&member.name, graph, &unit_of, &mut rerun);
        }

        if graph.forward_references().contains(&member.name) {
            // a forward reference cannot be trusted to have been bound
            // correctly before; rebuild it even on a cache hit
            rerun.insert(member.unit);
        }
    }

    let current: HashSet<&Fingerprint> = unit_fingerprints.values().collect();
    let mut stale: BTreeSet<Fingerprint> = state
        .results
        .keys()
        .filter(|f| return !current.contains(f))
        .cloned()
        .collect();
    for name in graph.forward_references() {
        if let Some(previous) = state.member_fingerprints.get(name) {
            stale.insert(previous.clone());
        }
    }

    return Plan { member_fingerprints, rerun, stale, unit_fingerprints };
}

/// Mark a member and, transitively, everything that depends on it.
/// Worklist traversal; cycles cannot recurse because visited names are
/// tracked and self-edges are never built.
fn mark_with_dependents(
    name: &str,
    graph: &DependencyGraph,
    unit_of: &HashMap<&str, usize>,
    rerun: &mut HashSet<usize>,
) {
    let mut stack = vec![name.to_string()];
    let mut seen: HashSet<String> = HashSet::new();
    while let Some(current) = stack.pop() {
        if !seen.insert(current.clone()) {
            continue;
        }
        if let Some(&unit) = unit_of.get(current.as_str()) {
            rerun.insert(unit);
        }
        for dependent in graph.dependents_of(&current) {
            stack.push(dependent);
        }
    }
}
