//! Structural parsing of the synthetic class into its top-level members.
//!
//! Each member carries its simple name, its subtree in the parsed unit, and
//! the originating unit index recovered from the marker comment the wrapper
//! placed in front of it.

use tree_sitter::{Node, Parser, Tree};

use crate::error::Error;
use crate::wrap::SYNTHETIC_CLASS_NAME;

/// Node kinds accepted as class-body members.
const MEMBER_KINDS: [&str; 8] = [
    "annotation_type_declaration",
    "class_declaration",
    "constructor_declaration",
    "enum_declaration",
    "field_declaration",
    "interface_declaration",
    "method_declaration",
    "record_declaration",
];

/// One top-level member of the synthetic class.
pub struct Member<'t> {
    /// Simple name of the member.
    pub name: String,
    /// The member's subtree in the parsed unit.
    pub node: Node<'t>,
    /// Index of the unit this member was wrapped from.
    pub unit: usize,
}

/// A parsed synthetic compilation unit. Owns the source text and the tree
/// so member nodes can borrow from it.
pub struct ParsedUnit {
    source: String,
    tree: Tree,
}

impl ParsedUnit {
    /// Parse a synthetic class source.
    ///
    /// Erroneous subtrees inside member bodies are tolerated (recovered
    /// snippets still flow to the backend, which reports its own
    /// diagnostics); only a missing wrapper class is fatal.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if the parser cannot run or the
    /// synthetic wrapper class cannot be found.
    pub fn parse(source: String) -> Result<Self, Error> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| {
                return Error::ParseFailed { reason: format!("java grammar: {e}") };
            })?;
        let tree = parser.parse(&source, None).ok_or_else(|| {
            return Error::ParseFailed { reason: "tree-sitter returned no tree".to_string() };
        })?;
        return Ok(Self { source, tree });
    }

    /// Extract the members of the synthetic class body, in source order.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if the wrapper class or a member's
    /// marker comment is missing.
    pub fn members(&self) -> Result<Vec<Member<'_>>, Error> {
        let body = self.wrapper_class_body()?;
        let mut members = Vec::new();
        let mut pending_unit: Option<usize> = None;

        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            if child.kind() == "line_comment" {
                if let Some(idx) = marker_index(self.text(child)) {
                    pending_unit = Some(idx);
                }
                continue;
            }
            if !MEMBER_KINDS.contains(&child.kind()) {
                continue;
            }
            let Some(name) = member_name(child, &self.source) else {
                continue;
            };
            let unit = pending_unit.take().ok_or_else(|| {
                return Error::ParseFailed {
                    reason: format!("member `{name}` has no unit marker"),
                };
            })?;
            members.push(Member { name, node: child, unit });
        }
        return Ok(members);
    }

    /// The synthetic source this unit was parsed from.
    pub fn source(&self) -> &str {
        return &self.source;
    }

    /// Source text of a node.
    pub fn text(&self, node: Node<'_>) -> &str {
        return node.utf8_text(self.source.as_bytes()).unwrap_or("");
    }

    /// Locate the synthetic wrapper class body, skipping hoisted imports.
    fn wrapper_class_body(&self) -> Result<Node<'_>, Error> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() != "class_declaration" {
                continue;
            }
            let is_wrapper = child
                .child_by_field_name("name")
                .is_some_and(|n| return self.text(n) == SYNTHETIC_CLASS_NAME);
            if !is_wrapper {
                continue;
            }
            if let Some(body) = child.child_by_field_name("body") {
                return Ok(body);
            }
        }
        return Err(Error::ParseFailed {
            reason: "synthetic wrapper class not found".to_string(),
        });
    }
}

/// Parse a marker comment (`//<index>`) into the unit index.
fn marker_index(text: &str) -> Option<usize> {
    return text.strip_prefix("//")?.trim().parse().ok();
}

/// Simple name of a member node. Fields name their declarator; everything
/// else has a direct `name` field.
fn member_name(node: Node<'_>, source: &str) -> Option<String> {
    let name_node = if node.kind() == "field_declaration" {
        node.child_by_field_name("declarator")?.child_by_field_name("name")?
    } else {
        node.child_by_field_name("name")?
    };
    let name = name_node.utf8_text(source.as_bytes()).ok()?;
    return Some(name.to_string());
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::ParsedUnit;
    use crate::analysis::JavaAnalyzer;
    use crate::classify::parse_lines;
    use crate::wrap::{SYNTHETIC_METHOD_PREFIX, build_synthetic_class};

    fn parsed(src: &str) -> ParsedUnit {
        let mut analyzer = JavaAnalyzer::new().unwrap();
        let lines: Vec<String> = src.lines().map(String::from).collect();
        let parsing = parse_lines(&mut analyzer, Path::new("test.jsh"), &lines);
        return ParsedUnit::parse(build_synthetic_class(&parsing).unwrap()).unwrap();
    }

    #[test]
    fn extracts_fields_methods_and_wrapped_statements() {
        let unit = parsed("int z = 5;\nstatic int simple(int n) {\n return n*2;\n}\nsimple(2);\n");
        let members = unit.members().unwrap();
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].name, "z");
        assert_eq!(members[0].unit, 0);
        assert_eq!(members[1].name, "simple");
        assert_eq!(members[1].unit, 1);
        assert_eq!(members[2].name, format!("{SYNTHETIC_METHOD_PREFIX}2"));
        assert_eq!(members[2].unit, 2);
    }

    #[test]
    fn hoisted_imports_are_not_members() {
        let unit = parsed("import java.util.List;\nint z = 5;\n");
        let members = unit.members().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "z");
        assert_eq!(members[0].unit, 1);
    }

    #[test]
    fn member_unit_indices_skip_comment_units() {
        let unit = parsed("// prose\nint z = 5;\n");
        let members = unit.members().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].unit, 1);
    }
}
