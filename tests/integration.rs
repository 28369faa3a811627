use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_docdrift")))
}

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Run on `bundle`, return the parsed report.
fn report(bundle: &Path, out: &Path) -> serde_json::Value {
    cmd().arg(bundle).arg(out).assert().success();
    serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap()
}

fn conflicts_of<'a>(report: &'a serde_json::Value, kind: &str) -> Vec<&'a serde_json::Value> {
    report["conflicts"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["type"] == kind)
        .collect()
}

// -- conflicts --

#[test]
fn documented_name_differs_from_implemented() {
    let dir = TempDir::new().unwrap();
    let skill = dir.path().join("config-skill");
    write(&skill, "SKILL.md", b"# Config\n\nCall `parseConfig()` to load settings.\n");
    write(&skill, "scripts/config.py", b"def loadConfig(path):\n    return path\n");
    let out = dir.path().join("report.json");

    let r = report(&skill, &out);
    assert_eq!(r["skill_name"], "config-skill");
    assert_eq!(r["statistics"]["total_conflicts"], 2);

    let missing = conflicts_of(&r, "missing_implementation");
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0]["severity"], "high");
    assert!(missing[0]["message"].as_str().unwrap().contains("parseConfig"));

    let undocumented = conflicts_of(&r, "undocumented_function");
    assert_eq!(undocumented.len(), 1);
    assert_eq!(undocumented[0]["severity"], "medium");
    assert!(undocumented[0]["message"].as_str().unwrap().contains("loadConfig"));
}

#[test]
fn legacy_version_reported() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "SKILL.md", b"# Setup\n\nThis requires version 1.2.0 of the toolkit.\n");
    let out = dir.path().join("report.json");

    let r = report(dir.path(), &out);
    let versions = conflicts_of(&r, "version_mismatch");
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0]["severity"], "medium");
    assert!(versions[0]["message"].as_str().unwrap().contains("1.2.0"));
    assert_eq!(
        r["recommendations"],
        serde_json::json!(["Update documentation to reference current versions"])
    );
}

#[test]
fn broken_sample_anchored_to_hash() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "SKILL.md",
        b"# Example\n\n```python\nresult = compute((1, 2)\n```\n",
    );
    let out = dir.path().join("report.json");

    let r = report(dir.path(), &out);
    let errors = conflicts_of(&r, "syntax_error");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["severity"], "high");
    let anchor = errors[0]["anchor"].as_str().unwrap();
    assert_eq!(anchor.len(), 64);
    assert!(anchor.chars().all(|c| c.is_ascii_hexdigit()));
}

// -- baselines --

#[test]
fn empty_bundle_is_clean() {
    let dir = TempDir::new().unwrap();
    let skill = dir.path().join("empty");
    fs::create_dir(&skill).unwrap();
    let out = dir.path().join("report.json");

    cmd()
        .arg(&skill)
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("No conflicts found in skill 'empty'"));

    let r: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(r["conflicts"], serde_json::json!([]));
    assert_eq!(r["statistics"]["total_conflicts"], 0);
    assert_eq!(r["statistics"]["code_metrics"]["files_analyzed"], 0);
    assert_eq!(
        r["recommendations"],
        serde_json::json!(["No conflicts detected - skill is well-maintained"])
    );
}

#[test]
fn prose_without_symbols_is_clean() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "SKILL.md", b"# Notes\n\nNothing callable here.\n\n- one\n- two\n");
    write(dir.path(), "scripts/data.json", b"{\"a\": 1}\n");
    let out = dir.path().join("report.json");

    let r = report(dir.path(), &out);
    assert_eq!(r["statistics"]["total_conflicts"], 0);
    assert_eq!(r["statistics"]["documentation_metrics"]["lists"], 1);
    assert_eq!(
        r["summary"],
        "Found 0 conflicts. High severity: 0. Medium severity: 0. Low severity: 0"
    );
}

#[test]
fn repeated_runs_are_identical() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "SKILL.md",
        b"# Tool\n\nUse `alpha()`, `beta()` and `gamma()`.\n\n```python\nimport yaml\n```\n",
    );
    write(dir.path(), "scripts/a.py", b"def gamma():\n    pass\n\ndef delta():\n    pass\n");
    write(dir.path(), "scripts/b.js", b"function epsilon() {}\n");
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    let mut a = report(dir.path(), &first);
    let mut b = report(dir.path(), &second);
    a.as_object_mut().unwrap().remove("analysis_date");
    b.as_object_mut().unwrap().remove("analysis_date");
    assert_eq!(a, b);
    assert_eq!(a["statistics"]["total_conflicts"], 5);
}

// -- loading --

#[test]
fn undecodable_script_is_skipped_with_warning() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "SKILL.md", b"# Tool\n\nRun `main()`.\n");
    write(dir.path(), "scripts/main.py", b"def main():\n    pass\n");
    write(dir.path(), "scripts/blob.py", &[0xff, 0xfe, 0xfd]);
    let out = dir.path().join("report.json");

    let r = report(dir.path(), &out);
    let warnings = r["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0]
        .as_str()
        .unwrap()
        .starts_with("skipping scripts/blob.py: "));
    assert_eq!(r["statistics"]["total_conflicts"], 0);
    assert_eq!(r["statistics"]["code_metrics"]["files_analyzed"], 1);
}

#[test]
fn references_are_classified() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "references/api.md", b"# REST API\n");
    write(dir.path(), "references/walkthrough.md", b"A tutorial.\n");
    let out = dir.path().join("report.json");

    let r = report(dir.path(), &out);
    let refs = &r["statistics"]["reference_metrics"];
    assert_eq!(refs["files_analyzed"], 2);
    assert_eq!(refs["by_type"]["api_reference"], 1);
    assert_eq!(refs["by_type"]["guide"], 1);
}

#[test]
fn missing_bundle_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .arg(dir.path().join("does-not-exist"))
        .arg(dir.path().join("report.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: bundle not found"));
    assert!(!dir.path().join("report.json").exists());
}

// -- cli --

#[test]
fn top_limits_printed_conflicts() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "SKILL.md", b"`a()` `b()` `c()`\n");
    let out = dir.path().join("report.json");

    cmd()
        .arg(dir.path())
        .arg(&out)
        .args(["--top", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 conflicts"))
        .stdout(predicate::str::contains("[HIGH] Function 'a' referenced"))
        .stdout(predicate::str::contains("Function 'b'").not())
        .stdout(predicate::str::contains("... and 2 more"));
}

#[test]
fn custom_layout_and_plain_mode() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "manual.txt",
        b"WIDGET USER MANUAL\n\n1. Getting Started\nCall render() to draw.\n",
    );
    write(dir.path(), "src/widget.js", b"function render() {}\n");
    let out = dir.path().join("out/report.json");

    cmd()
        .arg(dir.path())
        .arg(&out)
        .args(["--doc-file", "manual.txt", "--scripts-dir", "src"])
        .assert()
        .success();

    let r: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(r["statistics"]["total_conflicts"], 0);
    assert_eq!(r["statistics"]["code_metrics"]["languages"]["javascript"], 1);
    assert!(r["statistics"]["documentation_metrics"]["sections"].as_u64().unwrap() >= 1);
}
