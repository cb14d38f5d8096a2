//! Static HTML rendering of an interpreted notebook.
//!
//! Comment units become prose (markdown), code units become source blocks
//! followed by their evaluation output. A run-level failure replaces the
//! whole page body with one error block; per-unit problems render inline at
//! the unit's position.

use std::fmt::Write as _;

use crate::backend::{EvalResult, EventStatus};
use crate::types::{Interpreted, UnitKind};

/// Minimal page styling; values and diagnostics must be tellable apart
/// without a stylesheet dependency.
const STYLE: &str = "\
body { max-width: 46rem; margin: 2rem auto; padding: 0 1rem; font-family: sans-serif; }
pre { background: #f6f6f6; padding: .6rem; overflow-x: auto; }
pre.value { background: #eef6ee; }
pre.stdout { background: #eef2f6; }
pre.stderr, pre.diagnostic, pre.exception { background: #f6eeee; }
pre.error { background: #f6dede; }
";

/// Render a full interpreted run as a standalone HTML page.
pub fn render_html(interpreted: &Interpreted) -> String {
    let title = interpreted
        .path
        .file_name()
        .map_or_else(|| return "notebook".to_string(), |n| return n.to_string_lossy().to_string());

    let mut page = String::new();
    let _ = write!(
        page,
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n",
        escape(&title)
    );

    match &interpreted.status {
        crate::types::ExecutionStatus::Failure { message } => {
            let _ = write!(page, "<pre class=\"error\">{}</pre>\n", escape(message));
        },
        crate::types::ExecutionStatus::Ok => {
            for unit in &interpreted.units {
                render_unit(&mut page, interpreted, unit);
            }
        },
    }

    page.push_str("</body>\n</html>\n");
    return page;
}

fn render_unit(
    page: &mut String,
    interpreted: &Interpreted,
    unit: &crate::types::InterpretedUnit,
) {
    match unit.unit.kind {
        UnitKind::Comment => {
            let lines = unit_lines(interpreted, &unit.unit);
            let prose = comment_prose(&lines);
            if !prose.trim().is_empty() {
                pulldown_cmark::html::push_html(page, pulldown_cmark::Parser::new(&prose));
            }
        },
        UnitKind::Code => {
            let source = unit
                .unit
                .analysis
                .as_ref()
                .map_or_else(String::new, |a| return a.source.trim_end().to_string());
            let _ = write!(
                page,
                "<pre><code class=\"language-java\">{}</code></pre>\n",
                escape(&source)
            );
            if let Some(result) = &unit.result {
                render_result(page, result);
            }
        },
        UnitKind::Directive => {},
    }
}

fn render_result(page: &mut String, result: &EvalResult) {
    for event in &result.events {
        for diagnostic in &event.diagnostics {
            let _ = write!(
                page,
                "<pre class=\"diagnostic\">{}</pre>\n",
                escape(&diagnostic.message)
            );
        }
        if !event.unresolved.is_empty() {
            let _ = write!(
                page,
                "<pre class=\"diagnostic\">unresolved dependencies: {}</pre>\n",
                escape(&event.unresolved.join(", "))
            );
        }
        if let Some(exception) = &event.exception {
            let _ = write!(page, "<pre class=\"exception\">{}</pre>\n", escape(exception));
        }
        if event.status == EventStatus::Valid
            && let Some(value) = &event.value
        {
            let _ = write!(page, "<pre class=\"value\">{}</pre>\n", escape(value));
        }
    }
    if !result.out.is_empty() {
        let _ = write!(page, "<pre class=\"stdout\">{}</pre>\n", escape(&result.out));
    }
    if !result.err.is_empty() {
        let _ = write!(page, "<pre class=\"stderr\">{}</pre>\n", escape(&result.err));
    }
}

/// The raw lines a unit spans.
fn unit_lines(interpreted: &Interpreted, unit: &crate::types::Unit) -> Vec<String> {
    return interpreted
        .lines
        .iter()
        .skip(unit.start)
        .take(unit.end.saturating_sub(unit.start))
        .cloned()
        .collect();
}

/// Strip comment markers from a run of comment lines, leaving markdown
/// prose.
fn comment_prose(lines: &[String]) -> String {
    let mut prose = String::new();
    for line in lines {
        let trimmed = line.trim_start();
        let stripped = trimmed
            .strip_prefix("//")
            .or_else(|| return trimmed.strip_prefix("/*"))
            .or_else(|| return trimmed.strip_prefix("*/"))
            .or_else(|| return trimmed.strip_prefix('*'))
            .unwrap_or(trimmed);
        let stripped = stripped.strip_suffix("*/").unwrap_or(stripped);
        prose.push_str(stripped.strip_prefix(' ').unwrap_or(stripped));
        prose.push('\n');
    }
    return prose;
}

/// Escape text for HTML element content.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    return out;
}
