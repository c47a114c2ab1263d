//! Integration tests for the rollaudit CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const RULES_CSV: &str = "\
Item_Name,Standard_Spec,Logic_Prompt,Unit_Rule_Local,Unit_Rule_Agg,Unit_Rule_Freight,Category_Override
軸頸研磨,150±0.02,四支一組,1SET=4,,,
本體銲補,≥ 310,,,,,nan
動平衡,,,豁免,豁免,,exempt
";

const JOURNAL_DOC: &str = r#"{
    "job_no": "W1234567AB",
    "dimension_data": [
        {"page": 3, "item_title": "軸頸研磨 (1SET)", "item_pc_target": 1,
         "std_spec": "150±0.02", "ds": "J1:150.01|J2:150.00|J3:149.99|J4:150.02"}
    ]
}"#;

const MIXED_DOC: &str = r#"{
    "job_no": "W1234567AB",
    "dimension_data": [
        {"page": 1, "item_title": "本體再生車修", "std_spec": "300±0.1mm", "ds": "R1:300.05|R2:300.15"},
        {"page": 2, "item_title": "本體再生車修", "std_spec": "300±0.1mm", "ds": "R3:300.50"}
    ],
    "pages": [
        {"real_page": 1, "header_text": "工令編號:W1234567AB"},
        {"real_page": 2, "header_text": "工令編號:W9876543ZZ"}
    ]
}"#;

/// Helper to get a rollaudit command isolated from the user's config
fn rollaudit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rollaudit").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env_remove("ROLLAUDIT_RULES")
        .env_remove("ROLLAUDIT_FORMAT")
        .env_remove("ROLLAUDIT_CONFIG")
        .env_remove("ROLLAUDIT_LOG");
    cmd
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn audit_json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = rollaudit(dir)
        .arg("audit")
        .args(args)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    rollaudit(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("audit"))
        .stdout(predicate::str::contains("classify"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    rollaudit(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rollaudit"));
}

// ============================================================================
// Spec and Classify Tests
// ============================================================================

#[test]
fn test_spec_plus_minus() {
    let tmp = TempDir::new().unwrap();
    rollaudit(&tmp)
        .args(["spec", "300±0.1mm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[299.9, 300.1]"));
}

#[test]
fn test_spec_json() {
    let tmp = TempDir::new().unwrap();
    let output = rollaudit(&tmp)
        .args(["spec", "135~129", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["intervals"][0]["min"], 129.0);
    assert_eq!(parsed["intervals"][0]["max"], 135.0);
}

#[test]
fn test_classify_keywords() {
    let tmp = TempDir::new().unwrap();
    let output = rollaudit(&tmp)
        .args(["classify", "本體銲補", "軸頸未再生", "動平衡", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["category"], "min_limit");
    assert_eq!(rows[0]["stage"], "welded");
    assert_eq!(rows[1]["category"], "max_limit");
    assert_eq!(rows[1]["track"], "journal");
    assert_eq!(rows[2]["category"], "exempt");
}

#[test]
fn test_classify_requires_title() {
    let tmp = TempDir::new().unwrap();
    rollaudit(&tmp).arg("classify").assert().failure();
}

// ============================================================================
// Rules Tests
// ============================================================================

#[test]
fn test_rules_list() {
    let tmp = TempDir::new().unwrap();
    let rules = write_file(&tmp, "rules.csv", RULES_CSV);
    rollaudit(&tmp)
        .args(["rules", "list", "--rules"])
        .arg(&rules)
        .assert()
        .success()
        .stdout(predicate::str::contains("軸頸研磨"))
        .stdout(predicate::str::contains("3 rule(s)"));
}

#[test]
fn test_rules_match_strips_suffix() {
    let tmp = TempDir::new().unwrap();
    let rules = write_file(&tmp, "rules.csv", RULES_CSV);
    rollaudit(&tmp)
        .args(["rules", "match", "軸頸研磨 (2SET)", "--rules"])
        .arg(&rules)
        .assert()
        .success()
        .stdout(predicate::str::contains("suffix stripped"))
        .stdout(predicate::str::contains("四支一組"));
}

#[test]
fn test_rules_match_none() {
    let tmp = TempDir::new().unwrap();
    let rules = write_file(&tmp, "rules.csv", RULES_CSV);
    rollaudit(&tmp)
        .args(["rules", "match", "運費", "--rules"])
        .arg(&rules)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No rule matches"));
}

#[test]
fn test_rules_hits_in_document_text() {
    let tmp = TempDir::new().unwrap();
    let rules = write_file(&tmp, "rules.csv", RULES_CSV);
    let doc = write_file(
        &tmp,
        "doc.json",
        r#"{"pages": [{"real_page": 1, "full_text": "工令編號:W1234567AB 軸頸研磨 完成"}]}"#,
    );

    let output = rollaudit(&tmp)
        .args(["rules", "hits"])
        .arg(&doc)
        .arg("--rules")
        .arg(&rules)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let hits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["rule"]["item_name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"軸頸研磨"));
    assert!(!names.contains(&"動平衡"));
}

#[test]
fn test_rules_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    rollaudit(&tmp)
        .args(["rules", "list", "--rules", "nope.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// Audit Tests
// ============================================================================

#[test]
fn test_audit_passes_with_rule_ratio() {
    let tmp = TempDir::new().unwrap();
    let rules = write_file(&tmp, "rules.csv", RULES_CSV);
    let doc = write_file(&tmp, "doc.json", JOURNAL_DOC);
    rollaudit(&tmp)
        .arg("audit")
        .arg(&doc)
        .arg("--rules")
        .arg(&rules)
        .arg("--fail-on-error")
        .assert()
        .success()
        .stdout(predicate::str::contains("PASSED"));
}

#[test]
fn test_audit_without_rules_counts_rows() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(&tmp, "doc.json", JOURNAL_DOC);
    let report = audit_json(&tmp, &[doc.to_str().unwrap()]);
    let issues = report["consolidated"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["kind"], "local-quantity-mismatch");
    assert_eq!(issues[0]["reason"], "title 1 != counted 4 (rule: none)");
    assert_eq!(report["summary"]["passed"], false);
}

#[test]
fn test_audit_fail_on_error() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(&tmp, "doc.json", JOURNAL_DOC);
    rollaudit(&tmp)
        .arg("audit")
        .arg(&doc)
        .arg("--fail-on-error")
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAILED"))
        .stderr(predicate::str::contains("audit found 1 error(s)"));
}

#[test]
fn test_audit_mixed_job_numbers_and_consolidation() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(&tmp, "doc.json", MIXED_DOC);
    let report = audit_json(&tmp, &[doc.to_str().unwrap()]);

    let consolidated = report["consolidated"].as_array().unwrap();
    let mixed = consolidated
        .iter()
        .find(|i| i["kind"] == "mixed-job-number")
        .unwrap();
    assert_eq!(mixed["severity"], "severe");
    assert_eq!(mixed["pages"], serde_json::json!(["1", "2"]));
    assert_eq!(mixed["evidence"].as_array().unwrap().len(), 2);

    let interval = consolidated
        .iter()
        .find(|i| i["reason"] == "not within interval")
        .unwrap();
    assert_eq!(interval["pages"], serde_json::json!(["1", "2"]));
    assert_eq!(interval["evidence"].as_array().unwrap().len(), 2);

    assert_eq!(report["summary"]["raw_issues"], 3);
    assert_eq!(report["summary"]["consolidated_issues"], 2);
}

#[test]
fn test_audit_markdown_raw() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(&tmp, "doc.json", MIXED_DOC);
    rollaudit(&tmp)
        .arg("audit")
        .arg(&doc)
        .args(["--raw", "--format", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Audit Report"))
        .stdout(predicate::str::contains("## Issues (raw)"))
        .stdout(predicate::str::contains("mixed-job-number"));
}

#[test]
fn test_audit_writes_output_file() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(&tmp, "doc.json", MIXED_DOC);
    let out = tmp.path().join("report.md");
    rollaudit(&tmp)
        .arg("audit")
        .arg(&doc)
        .args(["--format", "md", "-o"])
        .arg(&out)
        .assert()
        .success();
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("W1234567AB"));
}

#[test]
fn test_audit_page_export_replaces_pages() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(&tmp, "doc.json", MIXED_DOC);
    let pages = write_file(
        &tmp,
        "pages.json",
        r#"[
            {"header_text": "工令編號:W1234567AB", "full_text": "頁次 1/2"},
            {"header_text": "工令編號:W1234567AB", "full_text": "頁次 2/2"}
        ]"#,
    );
    let report = audit_json(
        &tmp,
        &[doc.to_str().unwrap(), "--pages", pages.to_str().unwrap()],
    );
    let consolidated = report["consolidated"].as_array().unwrap();
    assert!(consolidated.iter().all(|i| i["engine"] != "header"));
    assert_eq!(report["header"]["job_no"], "W1234567AB");
}

#[test]
fn test_audit_missing_document() {
    let tmp = TempDir::new().unwrap();
    rollaudit(&tmp)
        .args(["audit", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_audit_invalid_json() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(&tmp, "doc.json", "{\"dimension_data\": [}");
    rollaudit(&tmp)
        .arg("audit")
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid input document"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_show_defaults() {
    let tmp = TempDir::new().unwrap();
    let output = rollaudit(&tmp)
        .args(["config", "show", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["rule_similarity_threshold"], 90);
    assert_eq!(config["job_number_length"], 10);
}

#[test]
fn test_project_config_supplies_rules() {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp, "rules.csv", RULES_CSV);
    write_file(&tmp, ".rollaudit.yaml", "rules: rules.csv\nun_regen_floor: 150\n");
    let doc = write_file(&tmp, "doc.json", JOURNAL_DOC);

    let report = audit_json(&tmp, &[doc.to_str().unwrap()]);
    assert_eq!(report["summary"]["passed"], true);

    let output = rollaudit(&tmp)
        .args(["config", "show", "--format", "json"])
        .output()
        .unwrap();
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["un_regen_floor"], 150.0);
}

#[test]
fn test_explicit_config_flag() {
    let tmp = TempDir::new().unwrap();
    let cfg = write_file(&tmp, "custom.yaml", "default_format: json\n");
    rollaudit(&tmp)
        .args(["spec", "300±0.1", "--config"])
        .arg(&cfg)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"trusted\""));
}

#[test]
fn test_config_path() {
    let tmp = TempDir::new().unwrap();
    rollaudit(&tmp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project:"))
        .stdout(predicate::str::contains(".rollaudit.yaml"));
}
