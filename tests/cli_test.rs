//! End-to-end tests running the spacey-mjs binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn spacey_mjs(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_spacey-mjs"))
        .arg("--cwd")
        .arg(cwd)
        .arg("--no-color")
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("SPACEY_MJS_ROOT")
        .env_remove("SPACEY_MJS_OUTPUT")
        .output()
        .unwrap()
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_no_files_found() {
    let dir = tempfile::tempdir().unwrap();
    let output = spacey_mjs(dir.path(), &["missing/*.js"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: No files found."));
}

#[test]
fn test_no_must_find_files() {
    let dir = tempfile::tempdir().unwrap();
    let output = spacey_mjs(dir.path(), &["--no-must-find-files", "missing/*.js"]);
    assert!(output.status.success());
}

#[test]
fn test_dry_run_reports_progress() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lib/index.js", "export * from './a.js';\n");
    write(dir.path(), "lib/a.js", "export const a = 1;\n");

    let output = spacey_mjs(dir.path(), &["--dry-run", "--root", "lib", "-o", "out", "lib"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lib/index.js -> out/index.mjs Updated"), "{stdout}");
    assert!(stdout.contains("lib/a.js -> out/a.mjs Generated"), "{stdout}");
    assert!(stdout.trim_end().ends_with("done."));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_cjs_conversion() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lib/index.js", "const a = require('./a.js');\n");
    write(dir.path(), "lib/a.js", "module.exports = 1;\n");

    let output = spacey_mjs(dir.path(), &["--cjs", "--root", "lib", "-o", "out/cjs", "lib"]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("out/cjs/index.cjs")).unwrap(),
        "const a = require('./a.cjs');\n"
    );
}

#[test]
fn test_outside_root_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "shared.js", "export {};\n");
    write(dir.path(), "lib/index.js", "import '../x';\nexport * from '../shared.js';\n");

    let output = spacey_mjs(dir.path(), &["--root", "lib", "lib"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(
            "Error: Import of a file outside of the root. Import: (../shared.js) Source: (index.js)"
        ),
        "{stderr}"
    );

    let output = spacey_mjs(dir.path(), &["--root", "lib", "--no-enforce-root", "lib"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Warning: Import of a file outside"));
}
