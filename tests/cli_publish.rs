use std::process::Command;

use tempfile::tempdir;

#[test]
fn test_publish_fails_fast_on_missing_build_dir() {
    let dir = tempdir().unwrap();
    let bin = env!("CARGO_BIN_EXE_updraft");

    // The build-dir check runs before any config or network access, so
    // this must fail immediately even with no AWS credentials around.
    let output = Command::new(bin)
        .current_dir(dir.path())
        .args(["publish", "--build-dir", "./missing"])
        .output()
        .unwrap();

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("build directory not found"),
        "stderr should name the missing build directory; got:\n{}",
        stderr
    );
}

#[test]
fn test_publish_rejects_file_as_build_dir() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("build"), "not a directory").unwrap();
    let bin = env!("CARGO_BIN_EXE_updraft");

    let output = Command::new(bin)
        .current_dir(dir.path())
        .args(["publish", "--build-dir", "./build"])
        .output()
        .unwrap();

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not a directory"),
        "stderr should reject the non-directory; got:\n{}",
        stderr
    );
}

#[test]
fn test_help_lists_publish_command() {
    let bin = env!("CARGO_BIN_EXE_updraft");

    let output = Command::new(bin).arg("--help").output().unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("publish"),
        "help output should list the publish command; got:\n{}",
        stdout
    );
}
