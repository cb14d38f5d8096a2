//! Snippet classifier: accumulates raw lines and cuts them into units.
//!
//! Lines are appended one at a time; after each line the completeness
//! oracle decides whether the accumulated text is empty (blank/comment),
//! complete (flush a code unit) or still growing. Runs of blank and comment
//! lines become comment units; a multi-line `/* ... */` block flushes as one
//! comment unit when it closes.

use std::path::Path;

use crate::analysis::{Completeness, JavaAnalyzer};
use crate::error::Error;
use crate::types::{ExecutionStatus, Parsing, Unit, UnitAnalysis, UnitKind};

/// Classify a file from disk. I/O and classification failures become a
/// failure status on the returned parsing; they never panic the caller.
pub fn parse_file(analyzer: &mut JavaAnalyzer, path: &Path) -> Parsing {
    let lines = match read_lines(path) {
        Ok(lines) => lines,
        Err(e) => {
            let message = format!("error during static parsing of file {}: {e}", path.display());
            tracing::error!("{message}");
            return Parsing {
                lines: Vec::new(),
                path: path.to_path_buf(),
                status: ExecutionStatus::failure(message),
                units: Vec::new(),
            };
        },
    };
    return parse_lines(analyzer, path, &lines);
}

/// Classify already-read lines.
pub fn parse_lines(analyzer: &mut JavaAnalyzer, path: &Path, lines: &[String]) -> Parsing {
    let units = classify_lines(analyzer, lines);
    return Parsing {
        lines: lines.to_vec(),
        path: path.to_path_buf(),
        status: ExecutionStatus::Ok,
        units,
    };
}

/// The accumulation loop. `usize::MAX` marks "no run in progress" for the
/// comment and code start indices.
fn classify_lines(analyzer: &mut JavaAnalyzer, lines: &[String]) -> Vec<Unit> {
    if lines.is_empty() {
        return Vec::new();
    }

    let mut units: Vec<Unit> = Vec::new();
    let mut current = String::new();
    let mut comment_start = usize::MAX;
    let mut code_start = usize::MAX;
    let mut in_multiline_comment = false;

    for (line_idx, line) in lines.iter().enumerate() {
        current.push_str(line);
        current.push('\n');
        match analyzer.completeness(&current) {
            Completeness::Empty => {
                comment_start = comment_start.min(line_idx);
                if in_multiline_comment {
                    units.push(comment_unit(comment_start, line_idx + 1));
                    comment_start = usize::MAX;
                    in_multiline_comment = false;
                }
                current.clear();
            },
            Completeness::Complete => {
                code_start = code_start.min(line_idx);
                if comment_start < code_start {
                    units.push(comment_unit(comment_start, code_start));
                    comment_start = usize::MAX;
                    in_multiline_comment = false;
                }
                units.push(code_unit(analyzer, code_start, line_idx + 1, &current, true));
                code_start = usize::MAX;
                current.clear();
            },
            Completeness::Incomplete => {
                if code_start == usize::MAX && !in_multiline_comment {
                    // first line of something new
                    if line.trim_start().starts_with("/*") {
                        in_multiline_comment = true;
                        comment_start = comment_start.min(line_idx);
                    } else {
                        code_start = line_idx;
                    }
                }
            },
        }
    }

    // flush whatever is still accumulating at end of file
    let line_count = lines.len();
    let need_flush = units.last().is_none_or(|u| return u.end != line_count);
    if need_flush {
        if code_start != usize::MAX {
            // assume it is incomplete code; the wrapper turns this into a
            // run-level failure
            units.push(code_unit(analyzer, code_start, line_count, &current, false));
        } else if comment_start != usize::MAX {
            units.push(comment_unit(comment_start, line_count));
        }
    }

    return units;
}

fn code_unit(
    analyzer: &mut JavaAnalyzer,
    start: usize,
    end: usize,
    source: &str,
    complete: bool,
) -> Unit {
    let category = analyzer.categorize(source);
    return Unit {
        analysis: Some(UnitAnalysis { category, complete, source: source.to_string() }),
        end,
        kind: UnitKind::Code,
        start,
    };
}

fn comment_unit(start: usize, end: usize) -> Unit {
    return Unit { analysis: None, end, kind: UnitKind::Comment, start };
}

/// Read a file into lines.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read.
fn read_lines(path: &Path) -> Result<Vec<String>, Error> {
    let content = std::fs::read_to_string(path)?;
    return Ok(content.lines().map(String::from).collect());
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::parse_lines;
    use crate::analysis::JavaAnalyzer;
    use crate::types::{SyntaxCategory, UnitKind};

    fn classify(src: &str) -> Vec<crate::types::Unit> {
        let mut analyzer = JavaAnalyzer::new().unwrap();
        let lines: Vec<String> = src.lines().map(String::from).collect();
        return parse_lines(&mut analyzer, Path::new("test.jsh"), &lines).units;
    }

    #[test]
    fn single_statement_is_one_code_unit() {
        let units = classify("int z = 5;\n");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::Code);
        assert_eq!((units[0].start, units[0].end), (0, 1));
        let analysis = units[0].analysis.as_ref().unwrap();
        assert!(analysis.complete);
        assert_eq!(analysis.category, SyntaxCategory::VarDecl);
    }

    #[test]
    fn method_accumulates_until_braces_close() {
        let units = classify("static int simple(int n) {\n return n*2;\n}\nsimple(2);\n");
        assert_eq!(units.len(), 2);
        assert_eq!((units[0].start, units[0].end), (0, 3));
        assert_eq!((units[1].start, units[1].end), (3, 4));
        assert_eq!(
            units[0].analysis.as_ref().unwrap().category,
            SyntaxCategory::Method
        );
    }

    #[test]
    fn comment_runs_become_comment_units() {
        let units = classify("// prose\n// more prose\nint z = 5;\n");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].kind, UnitKind::Comment);
        assert_eq!((units[0].start, units[0].end), (0, 2));
        assert_eq!(units[1].kind, UnitKind::Code);
    }

    #[test]
    fn multiline_comment_flushes_as_one_unit() {
        let units = classify("/* a\n b\n*/\nint z = 5;\n");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].kind, UnitKind::Comment);
        assert_eq!((units[0].start, units[0].end), (0, 3));
    }

    #[test]
    fn trailing_incomplete_code_is_flagged() {
        let units = classify("int z = 5;\nint y =\n");
        assert_eq!(units.len(), 2);
        let analysis = units[1].analysis.as_ref().unwrap();
        assert!(!analysis.complete);
    }

    #[test]
    fn trailing_comment_is_flushed() {
        let units = classify("int z = 5;\n// the end\n");
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].kind, UnitKind::Comment);
        assert_eq!((units[1].start, units[1].end), (1, 2));
    }

    #[test]
    fn empty_input_yields_no_units() {
        assert!(classify("").is_empty());
    }

    #[test]
    fn seven_statements_are_seven_units() {
        let src = "int lol = 7;\nSystem.out.println(lol);\nlol = 11;\nSystem.out.println(lol);\nlol = 5;\nSystem.out.println(\"Response: \" + lol);\nlol;\n";
        let units = classify(src);
        assert_eq!(units.len(), 7);
        assert!(units.iter().all(|u| return u.kind == UnitKind::Code));
    }
}
