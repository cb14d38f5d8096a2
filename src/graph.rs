//! Dependency graph builder.
//!
//! Members are processed in file order. Every simple name referenced by a
//! member body (field and call references, array and plain type references)
//! is resolved against the members already seen: an earlier member gets a
//! dependency→dependent edge, the member's own name is dropped, and
//! anything else lands in the forward-reference set. Resolution is purely
//! textual, so shadowing locals over-approximate edges; the engine only
//! ever re-runs too much because of it, never too little.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tree_sitter::Node;

use crate::members::{Member, ParsedUnit};
use crate::wrap::{SYNTHETIC_CLASS_NAME, SYNTHETIC_METHOD_PREFIX};

/// Parent kinds whose `name` field introduces a name rather than
/// referencing one.
const DECLARING_PARENTS: [&str; 12] = [
    "annotation_type_declaration",
    "catch_formal_parameter",
    "class_declaration",
    "constructor_declaration",
    "enhanced_for_statement",
    "enum_declaration",
    "formal_parameter",
    "interface_declaration",
    "method_declaration",
    "record_declaration",
    "type_parameter",
    "variable_declarator",
];

/// Directed graph over member simple names. An edge points from a
/// dependency to its dependent, so walking outgoing edges answers "what
/// must also re-run when this member re-runs".
pub struct DependencyGraph {
    forward: BTreeSet<String>,
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// An empty graph.
    pub fn new() -> Self {
        return Self {
            forward: BTreeSet::new(),
            graph: DiGraph::new(),
            index: HashMap::new(),
        };
    }

    /// Record an edge from a dependency to its dependent.
    /// Both names must already be members; repeated edges collapse.
    pub fn add_dependency(&mut self, dependency: &str, dependent: &str) {
        let (Some(&dep), Some(&user)) =
            (self.index.get(dependency), self.index.get(dependent))
        else {
            return;
        };
        self.graph.update_edge(dep, user, ());
    }

    /// Record a name referenced before any declaration of it was seen.
    pub fn add_forward_reference(&mut self, name: &str) {
        self.forward.insert(name.to_string());
    }

    /// Add a member node. Re-adding a name keeps the existing node
    /// (duplicate simple names are a known edge case; last declaration
    /// wins in the name-keyed maps downstream).
    pub fn add_member(&mut self, name: &str) {
        if self.index.contains_key(name) {
            return;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
    }

    /// Whether the name is a member node.
    pub fn contains(&self, name: &str) -> bool {
        return self.index.contains_key(name);
    }

    /// The names this member directly references (its resolved
    /// dependencies), sorted for deterministic fingerprinting.
    pub fn dependencies_of(&self, name: &str) -> BTreeSet<String> {
        let Some(&idx) = self.index.get(name) else {
            return BTreeSet::new();
        };
        return self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| return self.graph[n].clone())
            .collect();
    }

    /// The members that directly reference this one.
    pub fn dependents_of(&self, name: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        return self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| return self.graph[n].clone())
            .collect();
    }

    /// Names referenced before their declaration in file order.
    pub fn forward_references(&self) -> &BTreeSet<String> {
        return &self.forward;
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        return Self::new();
    }
}

/// Build the dependency graph for the parsed members, in file order.
pub fn build(parsed: &ParsedUnit, members: &[Member<'_>]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for member in members {
        graph.add_member(&member.name);
        let mut refs: BTreeSet<String> = BTreeSet::new();
        collect_references(member.node, parsed.source(), &member.name, &mut refs);
        for name in refs {
            if graph.contains(&name) {
                graph.add_dependency(&name, &member.name);
            } else {
                graph.add_forward_reference(&name);
            }
        }
    }
    return graph;
}

/// Collect referenced simple names from a member subtree: identifiers and
/// type identifiers that are not in declaring position, not the member's
/// own name (recursion adds no edge), and not synthetic.
fn collect_references(node: Node<'_>, source: &str, own_name: &str, out: &mut BTreeSet<String>) {
    if node.kind() == "identifier" || node.kind() == "type_identifier" {
        if is_declared_name(node) {
            return;
        }
        let text = node.utf8_text(source.as_bytes()).unwrap_or("");
        if text.is_empty()
            || text == own_name
            || text == SYNTHETIC_CLASS_NAME
            || text.starts_with(SYNTHETIC_METHOD_PREFIX)
        {
            return;
        }
        out.insert(text.to_string());
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_references(child, source, own_name, out);
    }
}

/// Whether this identifier is the `name` field of a declaring parent.
fn is_declared_name(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    if !DECLARING_PARENTS.contains(&parent.kind()) {
        return false;
    }
    return parent.child_by_field_name("name") == Some(node);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::{DependencyGraph, build};
    use crate::analysis::JavaAnalyzer;
    use crate::classify::parse_lines;
    use crate::members::ParsedUnit;
    use crate::wrap::{SYNTHETIC_METHOD_PREFIX, build_synthetic_class};

    fn graph_for(src: &str) -> DependencyGraph {
        let mut analyzer = JavaAnalyzer::new().unwrap();
        let lines: Vec<String> = src.lines().map(String::from).collect();
        let parsing = parse_lines(&mut analyzer, Path::new("test.jsh"), &lines);
        let parsed = ParsedUnit::parse(build_synthetic_class(&parsing).unwrap()).unwrap();
        let members = parsed.members().unwrap();
        return build(&parsed, &members);
    }

    #[test]
    fn later_references_become_edges() {
        let g = graph_for("int x = 4;\nint z = x + 5;\nint y = z + 3;\n");
        assert_eq!(g.dependencies_of("z"), ["x".to_string()].into());
        assert_eq!(g.dependencies_of("y"), ["z".to_string()].into());
        assert_eq!(g.dependents_of("x"), vec!["z".to_string()]);
        assert!(!g.forward_references().contains("x"));
    }

    #[test]
    fn earlier_references_become_forward_references() {
        let g = graph_for("int z = x + 5;\nint x = 4;\nint y = z + 3;\n");
        assert!(g.dependencies_of("z").is_empty());
        assert!(g.forward_references().contains("x"));
        assert_eq!(g.dependencies_of("y"), ["z".to_string()].into());
    }

    #[test]
    fn recursive_member_has_no_self_edge() {
        let src = "static int recursive(int n) {\nif (n == 1) {\n  return 1;\n  } else {\n    return n * recursive(n-1);\n  }\n}\nrecursive(4);\n";
        let g = graph_for(src);
        assert!(!g.dependencies_of("recursive").contains("recursive"));
        assert!(!g.dependents_of("recursive").contains(&"recursive".to_string()));
        let call = format!("{SYNTHETIC_METHOD_PREFIX}1");
        assert_eq!(g.dependencies_of(&call), ["recursive".to_string()].into());
    }

    #[test]
    fn call_sites_depend_on_their_method() {
        let g = graph_for("static int simple(int n) {\n return n*2;\n}\nsimple(2);\n");
        let call = format!("{SYNTHETIC_METHOD_PREFIX}1");
        assert_eq!(g.dependencies_of(&call), ["simple".to_string()].into());
        assert_eq!(g.dependents_of("simple"), vec![call]);
    }

    #[test]
    fn wrapped_statements_reference_the_variables_they_touch() {
        let g = graph_for("int lol = 7;\nSystem.out.println(lol);\n");
        let call = format!("{SYNTHETIC_METHOD_PREFIX}1");
        assert!(g.dependencies_of(&call).contains("lol"));
    }
}
