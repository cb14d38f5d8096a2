//! Structural fingerprints for members.
//!
//! The canonical body of a member is its leaf-token sequence with all
//! comments stripped and synthetic wrapper-method names collapsed to one
//! canonical token, joined with single spaces. The fingerprint hashes the
//! canonical body together with the member's sorted direct-dependency
//! names: equality across runs means "same source, same direct dependency
//! set". It deliberately does not capture value changes of a dependency
//! whose name set is unchanged.

use std::collections::BTreeSet;

use sha2::{Digest as _, Sha256};
use tree_sitter::Node;

use crate::wrap::SYNTHETIC_METHOD_PREFIX;

/// A member's cache key — 64 hex chars, always lowercase.
/// Newtype prevents mixing with arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(
    /// The hex-encoded SHA-256 digest string.
    pub String,
);

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", self.0);
    }
}

/// Fingerprint one member subtree against its direct dependency set.
pub fn fingerprint_member(
    source: &str,
    member: Node<'_>,
    dependencies: &BTreeSet<String>,
) -> Fingerprint {
    let canonical = canonical_body(source, member);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hasher.update([0_u8]);
    for dependency in dependencies {
        hasher.update(dependency.as_bytes());
        hasher.update(b",");
    }
    let digest = hasher.finalize();
    return Fingerprint(format!("{digest:x}"));
}

/// Walk leaf tokens, skip comments, normalize synthetic method names,
/// join with single spaces.
fn canonical_body(source: &str, member: Node<'_>) -> String {
    let mut tokens = Vec::new();
    collect_canonical_leaf_tokens(member, source, &mut tokens);
    return tokens.join(" ");
}

/// Recursively collect non-comment leaf token text. Synthetic method name
/// identifiers lose their unit-index suffix so byte-identical wrapped
/// snippets from different units fingerprint equally.
fn collect_canonical_leaf_tokens<'a>(node: Node<'a>, source: &'a str, out: &mut Vec<&'a str>) {
    if node.child_count() == 0 {
        let kind = node.kind();
        if kind.contains("comment") {
            return;
        }
        let text = node.utf8_text(source.as_bytes()).unwrap_or("").trim();
        if text.is_empty() {
            return;
        }
        if kind == "identifier" && text.starts_with(SYNTHETIC_METHOD_PREFIX) {
            out.push(SYNTHETIC_METHOD_PREFIX);
        } else {
            out.push(text);
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_canonical_leaf_tokens(child, source, out);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;
    use std::path::Path;

    use super::{Fingerprint, fingerprint_member};
    use crate::analysis::JavaAnalyzer;
    use crate::classify::parse_lines;
    use crate::graph;
    use crate::members::ParsedUnit;

    /// Fingerprint every member of a source, keyed by member name,
    /// using the dependency sets the graph builder resolves.
    fn fingerprints_for(src: &str) -> Vec<(String, Fingerprint)> {
        let mut analyzer = JavaAnalyzer::new().unwrap();
        let lines: Vec<String> = src.lines().map(String::from).collect();
        let parsing = parse_lines(&mut analyzer, Path::new("test.jsh"), &lines);
        let parsed =
            ParsedUnit::parse(crate::wrap::build_synthetic_class(&parsing).unwrap()).unwrap();
        let members = parsed.members().unwrap();
        let g = graph::build(&parsed, &members);
        return members
            .iter()
            .map(|m| {
                let deps = g.dependencies_of(&m.name);
                return (m.name.clone(), fingerprint_member(parsed.source(), m.node, &deps));
            })
            .collect();
    }

    fn find(fps: &[(String, Fingerprint)], name: &str) -> Fingerprint {
        return fps.iter().find(|(n, _)| return n == name).unwrap().1.clone();
    }

    #[test]
    fn comments_do_not_change_the_fingerprint() {
        let a = fingerprints_for("int z = 5;\n");
        let b = fingerprints_for("int z = 5; // five\n");
        assert_eq!(find(&a, "z"), find(&b, "z"));
    }

    #[test]
    fn body_edits_change_the_fingerprint() {
        let a = fingerprints_for("int z = 5;\n");
        let b = fingerprints_for("int z = 667;\n");
        assert_ne!(find(&a, "z"), find(&b, "z"));
    }

    #[test]
    fn dependency_set_changes_the_fingerprint() {
        // same body for z, but x moves from forward reference to dependency
        let a = fingerprints_for("int z = x + 5;\nint x = 4;\n");
        let b = fingerprints_for("int x = 4;\nint z = x + 5;\n");
        assert_ne!(find(&a, "z"), find(&b, "z"));
        assert_eq!(find(&a, "x"), find(&b, "x"));
    }

    #[test]
    fn identical_wrapped_snippets_fingerprint_equally() {
        let fps =
            fingerprints_for("int lol = 7;\nSystem.out.println(lol);\nSystem.out.println(lol);\n");
        assert_eq!(fps.len(), 3);
        assert_eq!(fps[1].1, fps[2].1);
    }

    #[test]
    fn explicit_dependency_sets_distinguish() {
        let mut analyzer = JavaAnalyzer::new().unwrap();
        let lines: Vec<String> = "int z = 5;\n".lines().map(String::from).collect();
        let parsing = parse_lines(&mut analyzer, Path::new("test.jsh"), &lines);
        let parsed =
            ParsedUnit::parse(crate::wrap::build_synthetic_class(&parsing).unwrap()).unwrap();
        let members = parsed.members().unwrap();
        let none = BTreeSet::new();
        let some: BTreeSet<String> = ["x".to_string()].into();
        let a = fingerprint_member(parsed.source(), members[0].node, &none);
        let b = fingerprint_member(parsed.source(), members[0].node, &some);
        assert_ne!(a, b);
    }
}
