//! Integration tests for jbscript CLI commands
//!
//! Tests the CLI commands: check, run, sysvar, functions

use std::io::Write;
use std::process::Command;

use jbscript::ast::{BinaryOp, Expr};

/// Helper to run jbscript and capture output
fn run_jbscript(args: &[&str], envs: &[(&str, &str)]) -> (String, String, i32) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = Command::new(env!("CARGO_BIN_EXE_jbscript"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("JBSCRIPT_STRICT")
        .env_remove("JBSCRIPT_LOG")
        .env("NO_COLOR", "1")
        .envs(envs.iter().copied())
        .output()
        .expect("Failed to execute jbscript");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Writes a script AST to a temporary JSON file
fn ast_file(script: &Expr) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create AST file");
    let json = serde_json::to_string(script).expect("AST should serialize");
    file.write_all(json.as_bytes()).expect("Failed to write AST file");
    file
}

fn clean_script() -> Expr {
    Expr::block(vec![
        Expr::assign(Expr::ident("x"), Expr::number(2.0)),
        Expr::binary(BinaryOp::Mul, Expr::ident("x"), Expr::number(21.0)),
    ])
}

fn warning_script() -> Expr {
    Expr::call("Floor", vec![Expr::string("2.5")])
}

// ============================================================================
// jbscript check tests
// ============================================================================

#[test]
fn test_check_clean_script() {
    let file = ast_file(&clean_script());
    let (stdout, _, code) = run_jbscript(&["check", file.path().to_str().unwrap()], &[]);
    assert_eq!(code, 0, "check should succeed for a clean script");
    assert!(stdout.contains("No errors found"));
    assert!(stdout.contains("number"));
}

#[test]
fn test_check_reports_errors() {
    let file = ast_file(&Expr::ident("ghost"));
    let (stdout, stderr, code) = run_jbscript(&["check", file.path().to_str().unwrap()], &[]);
    assert_eq!(code, 1);
    assert!(stdout.contains("Local variable 'ghost' hasn't been initialized"));
    assert!(stderr.contains("1 error(s)"));
}

#[test]
fn test_check_json_output() {
    let file = ast_file(&Expr::call("Frobnicate", vec![]));
    let (stdout, _, code) = run_jbscript(&["check", "--json", file.path().to_str().unwrap()], &[]);
    assert_eq!(code, 1);

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("check --json should output valid JSON");
    assert_eq!(json["type"], "error");
    assert_eq!(json["diagnostics"][0]["severity"], "error");
    assert_eq!(json["diagnostics"][0]["message"], "Unknown function 'Frobnicate'");
}

#[test]
fn test_check_strict_mode() {
    let file = ast_file(&warning_script());
    let path = file.path().to_str().unwrap();

    let (_, _, code) = run_jbscript(&["check", path], &[]);
    assert_eq!(code, 0, "warnings alone should pass");

    let (_, stderr, code) = run_jbscript(&["check", "--strict", path], &[]);
    assert_eq!(code, 1);
    assert!(stderr.contains("strict mode"));

    let (_, _, code) = run_jbscript(&["check", path], &[("JBSCRIPT_STRICT", "1")]);
    assert_eq!(code, 1, "JBSCRIPT_STRICT should enable strict mode");
}

#[test]
fn test_check_strict_from_config_file() {
    let file = ast_file(&warning_script());
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[analyzer]\nstrict = true").unwrap();
    let (_, _, code) = run_jbscript(
        &[
            "check",
            "--config",
            config.path().to_str().unwrap(),
            file.path().to_str().unwrap(),
        ],
        &[],
    );
    assert_eq!(code, 1);
}

#[test]
fn test_check_invalid_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{\"kind\": \"nope\"}}").unwrap();
    let (_, stderr, code) = run_jbscript(&["check", file.path().to_str().unwrap()], &[]);
    assert_eq!(code, 1);
    assert!(stderr.contains("parsing AST"));
}

#[test]
fn test_check_nonexistent_file() {
    let (_, _, code) = run_jbscript(&["check", "does-not-exist.json"], &[]);
    assert_ne!(code, 0, "check should fail for nonexistent file");
}

// ============================================================================
// jbscript run tests
// ============================================================================

#[test]
fn test_run_prints_result() {
    let file = ast_file(&clean_script());
    let (stdout, _, code) = run_jbscript(&["run", file.path().to_str().unwrap()], &[]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "42");
}

#[test]
fn test_run_with_globals() {
    let script = Expr::binary(BinaryOp::Add, Expr::string("hello "), Expr::global("$customer"));
    let file = ast_file(&script);
    let (stdout, _, code) = run_jbscript(
        &["run", file.path().to_str().unwrap(), "--global", "customer=acme"],
        &[],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "hello acme");
}

#[test]
fn test_run_reports_faults() {
    let file = ast_file(&Expr::binary(BinaryOp::Div, Expr::number(1.0), Expr::number(0.0)));
    let (_, stderr, code) = run_jbscript(&["run", file.path().to_str().unwrap()], &[]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Division by zero"));
}

// ============================================================================
// jbscript sysvar / functions tests
// ============================================================================

#[test]
fn test_sysvar_lookup() {
    let (stdout, _, code) = run_jbscript(&["sysvar", "$jitterbit.scripting.while.max_iterations"], &[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Settings"));
    assert!(stdout.contains("50000"));

    let (stdout, _, code) = run_jbscript(&["sysvar", "$jitterbit.api.request.headers.x_forwarded_for"], &[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("$jitterbit.api.request.headers.x_forwarded_for"));

    let (_, stderr, code) = run_jbscript(&["sysvar", "$jitterbit.no.such.variable"], &[]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown system variable"));
}

#[test]
fn test_functions_listing() {
    let (stdout, _, code) = run_jbscript(&["functions"], &[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Round(f: number, [num: number = 0]) -> number"));
    assert_eq!(stdout.lines().filter(|l| l.starts_with("SortArray(")).count(), 2);
}
