//! Pre-analysis oracle for Java snippets: completeness of accumulated text
//! and syntactic categorization of complete snippets.
//!
//! The completeness check is a character scan (delimiter depth outside
//! string, character and comment contexts); categorization parses the
//! snippet with tree-sitter-java, first at program level, then wrapped in a
//! class body for member-only declarations such as bare methods.

use tree_sitter::{Node, Parser, Tree};

use crate::error::Error;
use crate::types::{ProbableCategory, SyntaxCategory};
use crate::wrap::SYNTHETIC_CLASS_NAME;

/// Completeness of an accumulated snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    /// Balanced and terminated; ready to be cut into a unit.
    Complete,
    /// Nothing but whitespace and closed comments.
    Empty,
    /// Needs more lines.
    Incomplete,
}

/// The jot stand-in for a REPL's source analysis: completeness checks for
/// the classifier and syntactic categories for the unit wrapper.
pub struct JavaAnalyzer {
    parser: Parser,
}

impl JavaAnalyzer {
    /// Create an analyzer with the Java grammar loaded.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if the grammar cannot be loaded.
    pub fn new() -> Result<Self, Error> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| {
                return Error::ParseFailed { reason: format!("java grammar: {e}") };
            })?;
        return Ok(Self { parser });
    }

    /// Categorize one complete snippet.
    ///
    /// Tries a program-level parse first (covers imports, type and variable
    /// declarations, statements, expressions), then a class-body parse for
    /// member-only declarations. Unparseable snippets recover a probable
    /// category from text heuristics.
    pub fn categorize(&mut self, source: &str) -> SyntaxCategory {
        if let Some(category) = self.categorize_program(source) {
            return category;
        }
        if let Some(category) = self.categorize_class_member(source) {
            return category;
        }
        return SyntaxCategory::Erroneous(probable_category(source));
    }

    /// Completeness of accumulated snippet text. Pure text scan; never
    /// consults the grammar.
    pub fn completeness(&self, text: &str) -> Completeness {
        return scan_completeness(text);
    }

    /// Try to categorize a snippet as a class-body member (method, field,
    /// nested type). Returns `None` if the wrapped parse has errors.
    fn categorize_class_member(&mut self, source: &str) -> Option<SyntaxCategory> {
        let wrapped = format!("class {SYNTHETIC_CLASS_NAME} {{\n{source}\n}}");
        let tree = self.parser.parse(&wrapped, None)?;
        let root = tree.root_node();
        if root.has_error() {
            return None;
        }
        let class = first_named_non_comment(root)?;
        let body = class.child_by_field_name("body")?;
        let member = first_named_non_comment(body)?;
        return match member.kind() {
            "method_declaration" | "constructor_declaration" => Some(SyntaxCategory::Method),
            "field_declaration" => Some(SyntaxCategory::VarDecl),
            "class_declaration" | "interface_declaration" | "enum_declaration"
            | "record_declaration" | "annotation_type_declaration" => {
                Some(SyntaxCategory::TypeDecl)
            },
            _ => None,
        };
    }

    /// Try to categorize a snippet parsed at program level.
    /// Returns `None` if the parse has errors.
    fn categorize_program(&mut self, source: &str) -> Option<SyntaxCategory> {
        let tree: Tree = self.parser.parse(source, None)?;
        let root = tree.root_node();
        if root.has_error() {
            return None;
        }
        let first = first_named_non_comment(root)?;
        return match first.kind() {
            "import_declaration" => Some(SyntaxCategory::Import),
            "class_declaration" | "interface_declaration" | "enum_declaration"
            | "record_declaration" | "annotation_type_declaration" => {
                Some(SyntaxCategory::TypeDecl)
            },
            "local_variable_declaration" => Some(SyntaxCategory::VarDecl),
            "expression_statement" => Some(categorize_expression_statement(first)),
            "if_statement" | "while_statement" | "for_statement" | "enhanced_for_statement"
            | "do_statement" | "block" | "try_statement" | "try_with_resources_statement"
            | "switch_expression" | "labeled_statement" | "synchronized_statement"
            | "throw_statement" | "assert_statement" | "yield_statement" => {
                Some(SyntaxCategory::Statement)
            },
            _ => None,
        };
    }
}

/// Statements keep their side effects in place; everything else is treated
/// as a value-producing expression and captured into a temporary.
fn categorize_expression_statement(node: Node<'_>) -> SyntaxCategory {
    let Some(inner) = first_named_non_comment(node) else {
        return SyntaxCategory::Statement;
    };
    return match inner.kind() {
        "assignment_expression" | "update_expression" | "method_invocation" => {
            SyntaxCategory::Statement
        },
        _ => SyntaxCategory::Expression,
    };
}

/// First named child that is not a comment.
fn first_named_non_comment(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| return !c.kind().contains("comment"));
    return found;
}

/// Recover a probable category for an unparseable snippet.
/// An assignment operator suggests a variable mutation or declaration;
/// otherwise anything non-empty is treated as a bare expression.
fn probable_category(source: &str) -> ProbableCategory {
    if source.trim().is_empty() {
        return ProbableCategory::Unknown;
    }
    if crate::wrap::has_assignment_operator(source) {
        return ProbableCategory::VarDecl;
    }
    if source.trim_end().ends_with(';') {
        return ProbableCategory::Statement;
    }
    return ProbableCategory::Expression;
}

/// Lexical context of the completeness scan.
#[derive(PartialEq, Eq, Clone, Copy)]
enum ScanState {
    BlockComment,
    CharLiteral,
    LineComment,
    Plain,
    StringLiteral,
}

/// Scan accumulated text: track delimiter depth outside literals and
/// comments, remember the last code character, and report completeness.
fn scan_completeness(text: &str) -> Completeness {
    let chars: Vec<char> = text.chars().collect();
    let mut state = ScanState::Plain;
    let mut depth: i64 = 0;
    let mut has_code = false;
    let mut last_code: Option<char> = None;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match state {
            ScanState::Plain => {
                if c == '/' && chars.get(i + 1) == Some(&'/') {
                    state = ScanState::LineComment;
                    i += 2;
                    continue;
                }
                if c == '/' && chars.get(i + 1) == Some(&'*') {
                    state = ScanState::BlockComment;
                    i += 2;
                    continue;
                }
                match c {
                    '"' => state = ScanState::StringLiteral,
                    '\'' => state = ScanState::CharLiteral,
                    '(' | '{' | '[' => depth += 1,
                    ')' | '}' | ']' => depth -= 1,
                    _ => {},
                }
                if !c.is_whitespace() {
                    has_code = true;
                    last_code = Some(c);
                }
            },
            ScanState::LineComment => {
                if c == '\n' {
                    state = ScanState::Plain;
                }
            },
            ScanState::BlockComment => {
                if c == '*' && chars.get(i + 1) == Some(&'/') {
                    state = ScanState::Plain;
                    i += 2;
                    continue;
                }
            },
            ScanState::StringLiteral => {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == '"' {
                    state = ScanState::Plain;
                    last_code = Some('"');
                }
            },
            ScanState::CharLiteral => {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == '\'' {
                    state = ScanState::Plain;
                    last_code = Some('\'');
                }
            },
        }
        i += 1;
    }

    if state == ScanState::BlockComment {
        return Completeness::Incomplete;
    }
    if !has_code {
        return Completeness::Empty;
    }
    if state == ScanState::StringLiteral || state == ScanState::CharLiteral || depth != 0 {
        return Completeness::Incomplete;
    }
    return match last_code {
        Some(';' | '}') => Completeness::Complete,
        _ => Completeness::Incomplete,
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{Completeness, JavaAnalyzer, scan_completeness};
    use crate::types::{ProbableCategory, SyntaxCategory};

    #[test]
    fn blank_and_comment_lines_are_empty() {
        assert_eq!(scan_completeness(""), Completeness::Empty);
        assert_eq!(scan_completeness("   \n"), Completeness::Empty);
        assert_eq!(scan_completeness("// a note\n"), Completeness::Empty);
        assert_eq!(scan_completeness("/* a\n b */\n"), Completeness::Empty);
    }

    #[test]
    fn open_block_comment_is_incomplete() {
        assert_eq!(scan_completeness("/* still going\n"), Completeness::Incomplete);
    }

    #[test]
    fn terminated_statement_is_complete() {
        assert_eq!(scan_completeness("int z = 5;\n"), Completeness::Complete);
        assert_eq!(scan_completeness("int z = 5; // five\n"), Completeness::Complete);
    }

    #[test]
    fn open_method_body_is_incomplete() {
        assert_eq!(
            scan_completeness("static int simple(int n) {\n return n*2;\n"),
            Completeness::Incomplete
        );
        assert_eq!(
            scan_completeness("static int simple(int n) {\n return n*2;\n}\n"),
            Completeness::Complete
        );
    }

    #[test]
    fn delimiters_inside_strings_do_not_count() {
        assert_eq!(
            scan_completeness("println(\"a { smile (\");\n"),
            Completeness::Complete
        );
    }

    #[test]
    fn categorizes_import() {
        let mut a = JavaAnalyzer::new().unwrap();
        assert_eq!(a.categorize("import java.util.List;\n"), SyntaxCategory::Import);
    }

    #[test]
    fn categorizes_variable_declaration() {
        let mut a = JavaAnalyzer::new().unwrap();
        assert_eq!(a.categorize("int z = 5;\n"), SyntaxCategory::VarDecl);
        assert_eq!(a.categorize("String z = \"lol\";\n"), SyntaxCategory::VarDecl);
    }

    #[test]
    fn categorizes_method_declaration() {
        let mut a = JavaAnalyzer::new().unwrap();
        let src = "static int simple(int n) {\n return n*2;\n}\n";
        assert_eq!(a.categorize(src), SyntaxCategory::Method);
    }

    #[test]
    fn categorizes_calls_and_assignments_as_statements() {
        let mut a = JavaAnalyzer::new().unwrap();
        assert_eq!(a.categorize("simple(2);\n"), SyntaxCategory::Statement);
        assert_eq!(a.categorize("lol = 11;\n"), SyntaxCategory::Statement);
        assert_eq!(
            a.categorize("System.out.println(lol);\n"),
            SyntaxCategory::Statement
        );
    }

    #[test]
    fn categorizes_bare_expression() {
        let mut a = JavaAnalyzer::new().unwrap();
        assert_eq!(a.categorize("lol;\n"), SyntaxCategory::Expression);
    }

    #[test]
    fn unparseable_snippet_recovers_probable_category() {
        let mut a = JavaAnalyzer::new().unwrap();
        let got = a.categorize("int z = = 5;\n");
        assert_eq!(got, SyntaxCategory::Erroneous(ProbableCategory::VarDecl));
    }

    #[test]
    fn categorizes_type_declaration() {
        let mut a = JavaAnalyzer::new().unwrap();
        assert_eq!(a.categorize("class Point { int x; }\n"), SyntaxCategory::TypeDecl);
    }
}
