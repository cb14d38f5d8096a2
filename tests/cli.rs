#![allow(clippy::unwrap_used)]

use std::process::Command;

#[test]
fn render_writes_a_page() {
    let dir = tempfile::tempdir().unwrap();
    let notebook = dir.path().join("notes.jsh");
    std::fs::write(&notebook, "// # Notes\n// just prose, no code\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_jot"))
        .arg("render")
        .arg(&notebook)
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let page = dir.path().join("notes.html");
    assert!(page.exists(), "no page written");
}

#[test]
fn render_honors_the_out_dir() {
    let dir = tempfile::tempdir().unwrap();
    let notebook = dir.path().join("notes.jsh");
    std::fs::write(&notebook, "// prose only\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_jot"))
        .arg("render")
        .arg(&notebook)
        .arg("--out")
        .arg(dir.path().join("pages"))
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dir.path().join("pages/notes.html").exists());
}
