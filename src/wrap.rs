//! Unit wrapper: packages the code units of one file into a single
//! syntactically analyzable Java class.
//!
//! Every member is preceded by a single-line marker comment holding the
//! originating unit index, which is how parsed members are mapped back to
//! units later. Imports are hoisted in front of the class and are never
//! fingerprinted. Bare expressions and statements are wrapped into synthetic
//! zero-argument methods so they participate in the dependency graph.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::Error;
use crate::types::{Parsing, ProbableCategory, SyntaxCategory, UnitKind};

/// Name of the synthetic wrapper class. Deliberately noisy so it cannot
/// collide with a user-defined type.
pub const SYNTHETIC_CLASS_NAME: &str = "Jx9fe3d5Synth";

/// Prefix of synthetic wrapper-method names; the unit index is appended to
/// keep each wrapped snippet a distinct member.
pub const SYNTHETIC_METHOD_PREFIX: &str = "jx75c1cSynth";

/// Whether the text contains an assignment operator (`=` that is not part
/// of a comparison). Used to recover a wrapping for erroneous snippets.
pub fn has_assignment_operator(source: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // hardcoded pattern, valid by construction
        return Regex::new(r"[^=!<>]=[^=]").unwrap();
    });
    return re.is_match(source);
}

/// Build the synthetic class source for one classified file.
///
/// # Errors
///
/// Returns `Error::WrapFailed` for a code unit without a complete source —
/// a structural failure that aborts the whole run.
pub fn build_synthetic_class(parsing: &Parsing) -> Result<String, Error> {
    let mut source = format!("class {SYNTHETIC_CLASS_NAME} {{ \n");

    for (i, unit) in parsing.units.iter().enumerate() {
        if unit.kind != UnitKind::Code {
            continue;
        }
        let Some(analysis) = unit.analysis.as_ref() else {
            return Err(wrap_failed(parsing, unit, "code unit without pre-analysis"));
        };
        if !analysis.complete {
            return Err(wrap_failed(parsing, unit, "source is not a complete snippet"));
        }
        let snippet = analysis.source.as_str();
        match analysis.category {
            SyntaxCategory::Import => {
                // hoist in front of everything accumulated so far
                source = format!("{}{snippet}{source}", id_comment(i));
            },
            SyntaxCategory::Method | SyntaxCategory::TypeDecl | SyntaxCategory::VarDecl => {
                source.push_str(&id_comment(i));
                source.push_str(snippet);
            },
            SyntaxCategory::Expression => {
                source.push_str(&method_variable_wrap(i, snippet));
            },
            SyntaxCategory::Statement => {
                source.push_str(&method_wrap(i, snippet));
            },
            SyntaxCategory::Erroneous(probable) => match probable {
                ProbableCategory::Expression => {
                    source.push_str(&method_variable_wrap(i, snippet));
                },
                ProbableCategory::Statement => {
                    source.push_str(&method_wrap(i, snippet));
                },
                ProbableCategory::VarDecl => {
                    // fragile: an assignment makes this a statement-like
                    // mutation, otherwise treat it as a bare value
                    if has_assignment_operator(snippet) {
                        source.push_str(&method_wrap(i, snippet));
                    } else {
                        source.push_str(&method_variable_wrap(i, snippet));
                    }
                },
                ProbableCategory::Unknown => {
                    tracing::warn!(
                        "skipping unmanaged snippet in lines [{}, {}]",
                        unit.start + 1,
                        unit.end
                    );
                },
            },
        }
        source.push('\n');
    }

    source.push('}');
    return Ok(source);
}

/// Marker comment carrying the originating unit index.
fn id_comment(i: usize) -> String {
    return format!("//{i}\n");
}

fn method_prefix(i: usize) -> String {
    return format!("public Object {SYNTHETIC_METHOD_PREFIX}{i}(){{");
}

/// Wrap a statement into a synthetic method body.
fn method_wrap(i: usize, snippet: &str) -> String {
    return format!("{}{}{snippet}}}", id_comment(i), method_prefix(i));
}

/// Wrap a bare expression into a synthetic method capturing its value.
fn method_variable_wrap(i: usize, snippet: &str) -> String {
    return format!("{}{}var $reserved$ = {snippet}}}", id_comment(i), method_prefix(i));
}

fn wrap_failed(parsing: &Parsing, unit: &crate::types::Unit, reason: &str) -> Error {
    return Error::WrapFailed {
        end: unit.end,
        path: parsing.path.clone(),
        reason: reason.to_string(),
        start: unit.start + 1, // index from 1 for humans
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::{SYNTHETIC_METHOD_PREFIX, build_synthetic_class, has_assignment_operator};
    use crate::analysis::JavaAnalyzer;
    use crate::classify::parse_lines;
    use crate::error::Error;
    use crate::types::Parsing;

    fn parse(src: &str) -> Parsing {
        let mut analyzer = JavaAnalyzer::new().unwrap();
        let lines: Vec<String> = src.lines().map(String::from).collect();
        return parse_lines(&mut analyzer, Path::new("test.jsh"), &lines);
    }

    #[test]
    fn declarations_are_emitted_verbatim_with_markers() {
        let source = build_synthetic_class(&parse("int z = 5;\n")).unwrap();
        assert!(source.contains("//0\nint z = 5;"));
        assert!(source.starts_with("class "));
        assert!(source.ends_with('}'));
    }

    #[test]
    fn statements_are_wrapped_into_synthetic_methods() {
        let source = build_synthetic_class(&parse("int a = 1;\nsimple(2);\n")).unwrap();
        assert!(source.contains(&format!("public Object {SYNTHETIC_METHOD_PREFIX}1(){{simple(2);")));
        assert!(source.contains("//1\n"));
    }

    #[test]
    fn expressions_capture_their_value() {
        let source = build_synthetic_class(&parse("int a = 1;\na;\n")).unwrap();
        assert!(source.contains("var $reserved$ = a;"));
    }

    #[test]
    fn imports_are_hoisted_in_front() {
        let source = build_synthetic_class(&parse("int a = 1;\nimport java.util.List;\n")).unwrap();
        let import_pos = source.find("import java.util.List;").unwrap();
        let class_pos = source.find("class ").unwrap();
        assert!(import_pos < class_pos);
    }

    #[test]
    fn incomplete_trailing_code_fails_the_wrap() {
        let err = build_synthetic_class(&parse("int a = 1;\nint b =\n")).unwrap_err();
        assert!(matches!(err, Error::WrapFailed { start: 2, .. }));
    }

    #[test]
    fn comment_units_do_not_appear() {
        let source = build_synthetic_class(&parse("// prose\nint a = 1;\n")).unwrap();
        assert!(!source.contains("prose"));
        assert!(source.contains("//1\nint a = 1;"));
    }

    #[test]
    fn assignment_operator_probe() {
        assert!(has_assignment_operator("lol = 11;"));
        assert!(!has_assignment_operator("a == b"));
        assert!(!has_assignment_operator("a != b"));
        assert!(!has_assignment_operator("a <= b"));
    }
}
