//! File watcher: renders on startup, then re-renders notebooks as their
//! source files change.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};
use walkdir::WalkDir;

use crate::analysis::JavaAnalyzer;
use crate::classify;
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::render;

/// Debounce delay between filesystem events and re-render.
const DEBOUNCE_MS: u64 = 100;

/// Notebook file extension.
const NOTEBOOK_EXT: &str = "jsh";

/// Render one notebook file and write its page.
///
/// # Errors
///
/// Returns `Error::Io` if the page cannot be written. Interpretation
/// failures do not error: they render as an error page.
pub fn render_file<I: Interpreter>(
    analyzer: &mut JavaAnalyzer,
    interpreter: &mut I,
    path: &Path,
    out_dir: Option<&Path>,
) -> Result<PathBuf, Error> {
    let parsing = classify::parse_file(analyzer, path);
    let interpreted = interpreter.interpret(&parsing);
    let html = render::render_html(&interpreted);
    let out_path = page_path(path, out_dir);
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&out_path, html)?;
    return Ok(out_path);
}

/// Entry point for the watch command.
///
/// Renders every notebook under `root` once, then watches and re-renders on
/// changes until the channel closes.
///
/// # Errors
///
/// Returns errors from the initial scan or watcher setup.
pub fn run<I: Interpreter>(
    analyzer: &mut JavaAnalyzer,
    interpreter: &mut I,
    root: &Path,
    out_dir: Option<&Path>,
) -> Result<(), Error> {
    let notebooks = collect_notebooks(root);
    if notebooks.is_empty() {
        eprintln!("watch: no .{NOTEBOOK_EXT} files under {}", root.display());
    }
    for path in &notebooks {
        render_once(analyzer, interpreter, path, out_dir);
    }

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;
    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| {
            return Error::Io(std::io::Error::other(format!("watcher setup failed: {e}")));
        })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", root.display());

    while let Ok(first) = rx.recv() {
        let mut changed: BTreeSet<PathBuf> = BTreeSet::new();
        changed.extend(first);
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while let Ok(more) = rx.recv_timeout(debounce) {
            changed.extend(more);
        }
        for path in changed {
            eprintln!("watch: change detected in {}", path.display());
            render_once(analyzer, interpreter, &path, out_dir);
        }
    }

    return Ok(());
}

/// All notebook files under a path; a notebook path itself passes through.
fn collect_notebooks(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    return WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return is_notebook(e.path()))
        .map(|e| return e.path().to_path_buf())
        .collect();
}

/// Create a filesystem watcher that forwards changed notebook paths.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<Vec<PathBuf>>,
) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
        {
            let notebooks: Vec<PathBuf> =
                event.paths.into_iter().filter(|p| return is_notebook(p)).collect();
            if !notebooks.is_empty() {
                let _ = tx.send(notebooks);
            }
        }
    })
    .map_err(|e| {
        return Error::Io(std::io::Error::other(format!("watcher setup failed: {e}")));
    });
}

fn is_notebook(path: &Path) -> bool {
    return path.extension().is_some_and(|ext| return ext == NOTEBOOK_EXT);
}

/// Where the rendered page for a notebook goes.
fn page_path(path: &Path, out_dir: Option<&Path>) -> PathBuf {
    let page = path.with_extension("html");
    return match out_dir {
        None => page,
        Some(dir) => {
            let name = page.file_name().map_or_else(
                || return PathBuf::from("notebook.html"),
                PathBuf::from,
            );
            dir.join(name)
        },
    };
}

/// Render one file and report; a failed write must not kill the loop.
fn render_once<I: Interpreter>(
    analyzer: &mut JavaAnalyzer,
    interpreter: &mut I,
    path: &Path,
    out_dir: Option<&Path>,
) {
    match render_file(analyzer, interpreter, path, out_dir) {
        Ok(out_path) => eprintln!("rendered {} -> {}", path.display(), out_path.display()),
        Err(e) => eprintln!("error: {e}"),
    };
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{is_notebook, page_path};

    #[test]
    fn notebook_extension_filter() {
        assert!(is_notebook(Path::new("a/b/notes.jsh")));
        assert!(!is_notebook(Path::new("a/b/notes.java")));
        assert!(!is_notebook(Path::new("a/b/jsh")));
    }

    #[test]
    fn pages_land_next_to_the_source_by_default() {
        assert_eq!(page_path(Path::new("a/n.jsh"), None), PathBuf::from("a/n.html"));
    }

    #[test]
    fn pages_land_in_the_out_dir_when_set() {
        assert_eq!(
            page_path(Path::new("a/n.jsh"), Some(Path::new("pages"))),
            PathBuf::from("pages/n.html")
        );
    }
}
