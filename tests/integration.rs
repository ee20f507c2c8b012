use assert_cmd::Command;
use predicates::prelude::*;

fn dockfix() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("dockfix")
}

#[test]
fn lint_clean_dockerfile_passes() {
    dockfix()
        .args(["lint", "tests/fixtures/clean.dockerfile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASSED"))
        .stdout(predicate::str::contains("Good practices"));
}

#[test]
fn lint_dirty_dockerfile_fails() {
    dockfix()
        .args(["lint", "tests/fixtures/dirty.dockerfile"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED"))
        .stdout(predicate::str::contains("sec/root-user"))
        .stdout(predicate::str::contains("base/latest-tag"));
}

#[test]
fn lint_dirty_json_format() {
    let output = dockfix()
        .args(["lint", "tests/fixtures/dirty.dockerfile", "--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("JSON output should be valid");
    assert!(!parsed["passed"].as_bool().unwrap());
    assert_eq!(parsed["summary"]["high"], 5);
    assert_eq!(parsed["summary"]["medium"], 7);
    assert_eq!(parsed["summary"]["low"], 3);
}

#[test]
fn lint_dirty_sarif_format() {
    dockfix()
        .args(["lint", "tests/fixtures/dirty.dockerfile", "--format", "sarif"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"version\": \"2.1.0\""))
        .stdout(predicate::str::contains("dockfix"));
}

#[test]
fn lint_dirty_csv_format() {
    dockfix()
        .args(["lint", "tests/fixtures/dirty.dockerfile", "--format", "csv"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with(
            "Severity,Line,Rule ID,Rule Title,Description,Suggestion,Line Content\n",
        ));
}

#[test]
fn lint_nonexistent_path_exits_2() {
    dockfix()
        .args(["lint", "tests/fixtures/does-not-exist"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn lint_directory_shows_hint_and_exits_2() {
    dockfix()
        .args(["lint", "tests/fixtures"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("is a directory, not a Dockerfile"))
        .stderr(predicate::str::contains("lint-all"));
}

#[test]
fn lint_malformed_continuation_exits_2() {
    dockfix()
        .args(["lint", "tests/fixtures/malformed.dockerfile"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("line continuation"));
}

#[test]
fn lint_output_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let output_file = dir.path().join("report.json");

    dockfix()
        .args([
            "lint",
            "tests/fixtures/dirty.dockerfile",
            "--format",
            "json",
            "--output",
            output_file.to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Output written to"));

    let content = std::fs::read_to_string(&output_file).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&content).expect("Output file should contain valid JSON");
    assert!(!parsed["passed"].as_bool().unwrap());
}

#[test]
fn strict_mode_promotes_medium_findings() {
    // Only medium findings: update-alone plus a pair of RUNs.
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Dockerfile");
    std::fs::write(
        &file,
        "FROM ubuntu:24.04\n\
         RUN apt-get update\n\
         RUN apt-get install -y --no-install-recommends git && rm -rf /var/lib/apt/lists/*\n\
         USER 10001\n\
         CMD [\"./app\"]\n",
    )
    .unwrap();

    dockfix()
        .args(["lint", file.to_str().unwrap()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("WARNING"));

    dockfix()
        .args(["lint", file.to_str().unwrap(), "--strict"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED"));
}

// ── fix ──────────────────────────────────────────────────────────────────────

#[test]
fn fix_dirty_writes_rewritten_dockerfile_to_stdout() {
    dockfix()
        .args(["fix", "tests/fixtures/dirty.dockerfile"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("USER 10001"))
        .stdout(predicate::str::contains("--no-install-recommends"))
        .stdout(predicate::str::contains("WORKDIR /app"))
        .stderr(predicate::str::contains("Applied fixes"))
        .stderr(predicate::str::contains("FIXED"))
        .stderr(predicate::str::contains("Needs attention"));
}

#[test]
fn fix_merges_consecutive_runs() {
    dockfix()
        .args(["fix", "tests/fixtures/dirty.dockerfile"])
        .assert()
        .stdout(predicate::str::contains(
            "RUN apt-get update && apt-get install --no-install-recommends -y vim curl",
        ));
}

#[test]
fn fix_output_flag_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("Dockerfile.fixed");

    dockfix()
        .args([
            "fix",
            "tests/fixtures/dirty.dockerfile",
            "--output",
            out.to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Rewritten Dockerfile written to"));

    let content = std::fs::read_to_string(&out).unwrap();
    assert!(content.contains("USER 10001"));
    assert!(!content.contains("USER root"));
}

#[test]
fn fix_clean_dockerfile_is_identity() {
    let text = std::fs::read_to_string("tests/fixtures/clean.dockerfile").unwrap();
    dockfix()
        .args(["fix", "tests/fixtures/clean.dockerfile"])
        .assert()
        .success()
        .stdout(text)
        .stderr(predicate::str::contains("none"));
}

// ── lint-all ─────────────────────────────────────────────────────────────────

#[test]
fn lint_all_mixed_directory_exits_1_with_summary() {
    let dir = tempfile::tempdir().unwrap();
    for (name, fixture) in [
        ("good.dockerfile", "tests/fixtures/clean.dockerfile"),
        ("bad.dockerfile", "tests/fixtures/dirty.dockerfile"),
    ] {
        std::fs::copy(fixture, dir.path().join(name)).unwrap();
    }

    dockfix()
        .args(["lint-all", dir.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Collection Summary"))
        .stdout(predicate::str::contains("(2 Dockerfiles)"))
        .stdout(predicate::str::contains("Total:"));
}

#[test]
fn lint_all_exits_0_when_all_pass() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["alpha.dockerfile", "beta.dockerfile"] {
        std::fs::copy("tests/fixtures/clean.dockerfile", dir.path().join(name)).unwrap();
    }

    dockfix()
        .args(["lint-all", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 passed"));
}

#[test]
fn lint_all_discovers_dockerfile_name_variants() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("services/api");
    std::fs::create_dir_all(&nested).unwrap();
    let clean = std::fs::read_to_string("tests/fixtures/clean.dockerfile").unwrap();

    std::fs::write(dir.path().join("Dockerfile"), &clean).unwrap();
    std::fs::write(dir.path().join("Dockerfile.prod"), &clean).unwrap();
    std::fs::write(nested.join("api.dockerfile"), &clean).unwrap();
    // Not a Dockerfile; must be ignored by discovery.
    std::fs::write(dir.path().join("README.md"), "# readme\n").unwrap();

    dockfix()
        .args(["lint-all", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("(3 Dockerfiles)"));
}

#[test]
fn lint_all_empty_dir_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    dockfix()
        .args(["lint-all", dir.path().to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no Dockerfiles found"));
}

#[test]
fn lint_all_nonexistent_path_exits_2() {
    dockfix()
        .args(["lint-all", "tests/fixtures/does-not-exist"])
        .assert()
        .code(2);
}

// ── list-rules & explain ─────────────────────────────────────────────────────

#[test]
fn list_rules_shows_builtin_catalogue() {
    dockfix()
        .args(["list-rules"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sec/root-user"))
        .stdout(predicate::str::contains("build/consecutive-runs"))
        .stdout(predicate::str::contains("maint/add-instead-of-copy"))
        .stdout(predicate::str::contains("Total: 19 rules"));
}

#[test]
fn list_rules_with_custom_catalogue() {
    dockfix()
        .args(["list-rules", "--rules", "tests/fixtures/tiny-rules.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom/no-maintainer"))
        .stdout(predicate::str::contains("Total: 1 rules"));
}

#[test]
fn explain_known_rule() {
    dockfix()
        .args(["explain", "sec/root-user"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sec/root-user"))
        .stdout(predicate::str::contains("Suggestion"))
        .stdout(predicate::str::contains("Mechanical fix"));
}

#[test]
fn explain_unknown_rule_exits_2() {
    dockfix()
        .args(["explain", "nonexistent/rule"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown rule"));
}

// ── custom catalogues ────────────────────────────────────────────────────────

#[test]
fn custom_catalogue_drives_the_lint() {
    dockfix()
        .args([
            "lint",
            "tests/fixtures/maintainer.dockerfile",
            "--rules",
            "tests/fixtures/tiny-rules.json",
        ])
        .assert()
        // A single low finding still passes.
        .success()
        .stdout(predicate::str::contains("MAINTAINER is deprecated"));
}

#[test]
fn broken_catalogue_exits_2() {
    dockfix()
        .args([
            "lint",
            "tests/fixtures/clean.dockerfile",
            "--rules",
            "tests/fixtures/bad-rules.json",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not compile"));
}

#[test]
fn degenerate_rule_warns_but_does_not_fail() {
    let output = dockfix()
        .args([
            "lint",
            "tests/fixtures/clean.dockerfile",
            "--rules",
            "tests/fixtures/degenerate-rules.json",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["warnings"][0]["rule_id"], "custom/empty-match");
}

// ── configuration ────────────────────────────────────────────────────────────

#[test]
fn config_file_is_auto_detected_in_the_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Dockerfile"),
        "FROM ubuntu:latest\nUSER 10001\nCMD [\"./app\"]\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("dockfix.toml"),
        "[categories]\nbase_image = false\n",
    )
    .unwrap();

    // The latest-tag high finding is the only issue; disabling its
    // category makes the file pass.
    dockfix()
        .args(["lint", "Dockerfile"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("PASSED"));
}

#[test]
fn config_file_strict_setting_applies() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Dockerfile"),
        "FROM ubuntu:24.04\n\
         RUN apt-get update\n\
         RUN apt-get install -y --no-install-recommends git && rm -rf /var/lib/apt/lists/*\n\
         USER 10001\n\
         CMD [\"./app\"]\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("custom.toml"), "[strict]\nenabled = true\n").unwrap();

    dockfix()
        .args(["lint", "Dockerfile", "--config", "custom.toml"])
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED"));
}

#[test]
fn missing_explicit_config_exits_2() {
    dockfix()
        .args([
            "lint",
            "tests/fixtures/clean.dockerfile",
            "--config",
            "tests/fixtures/no-such-config.toml",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Config file not found"));
}
