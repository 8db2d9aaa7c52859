//! Integration tests for the scaf CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a scaf command isolated from the user's global config
fn scaf(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scaf").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".xdg"))
        .env("SCAF_OPERATOR", "tester")
        .env_remove("SCAF_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

/// Project seeded with the standard catalogue
fn setup_seeded_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    scaf(&tmp).arg("init").assert().success();
    tmp
}

/// Project with two parts: 200 uprights and 2 platforms
fn setup_small_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    scaf(&tmp).args(["init", "--empty"]).assert().success();
    add_part(&tmp, &["--name", "Poteau 2m", "--qty", "200", "--height", "2", "--weight", "19.5"]);
    add_part(
        &tmp,
        &["--name", "Plancher alu", "--qty", "2", "--length", "2.07", "--width", "0.73", "--weight", "21"],
    );
    tmp
}

fn add_part(tmp: &TempDir, args: &[&str]) -> String {
    let output = scaf(tmp)
        .args(["part", "add", "-q"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn parts_json(tmp: &TempDir) -> serde_json::Value {
    let output = scaf(tmp)
        .args(["part", "list", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn quantity_of(parts: &serde_json::Value, id: u64) -> u64 {
    parts
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == id)
        .map(|p| p["quantity"].as_u64().unwrap())
        .unwrap()
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();
    scaf(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized scaf project"));

    assert!(tmp.path().join(".scaf/config.yaml").exists());
    assert!(tmp.path().join("inventory/parts.yaml").exists());
    assert!(tmp.path().join("inventory/withdrawals.yaml").exists());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_seeded_project();
    scaf(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_empty_has_no_parts() {
    let tmp = TempDir::new().unwrap();
    scaf(&tmp).args(["init", "--empty"]).assert().success();
    scaf(&tmp)
        .args(["part", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();
    scaf(&tmp).args(["part", "list"]).assert().failure();
}

// ============================================================================
// Parts
// ============================================================================

#[test]
fn test_seeded_part_list() {
    let tmp = setup_seeded_project();
    scaf(&tmp)
        .args(["part", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Poteau 2m"))
        .stdout(predicate::str::contains("part(s) found."));
}

#[test]
fn test_part_list_filter_by_category() {
    let tmp = setup_seeded_project();
    scaf(&tmp)
        .args(["part", "list", "--category", "platform", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());

    let output = scaf(&tmp)
        .args(["part", "list", "--category", "upright", "-f", "json"])
        .output()
        .unwrap();
    let parts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    for part in parts.as_array().unwrap() {
        assert!(part["name"].as_str().unwrap().starts_with("Poteau"));
    }
}

#[test]
fn test_part_list_quantity_range() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["part", "list", "--min-qty", "10", "--count"])
        .assert()
        .success()
        .stdout("1\n");
    scaf(&tmp)
        .args(["part", "list", "--max-qty", "2", "-f", "id"])
        .assert()
        .success()
        .stdout("2\n");
    scaf(&tmp)
        .args(["part", "list", "--min-qty", "3", "--max-qty", "100", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_part_add_then_restock() {
    let tmp = setup_small_project();
    let id = add_part(&tmp, &["--name", "Poteau 2m", "--qty", "10", "--height", "2"]);
    assert_eq!(id, "1");

    let parts = parts_json(&tmp);
    assert_eq!(parts.as_array().unwrap().len(), 2);
    assert_eq!(quantity_of(&parts, 1), 210);
}

#[test]
fn test_part_add_rejects_empty_name() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["part", "add", "--name", "  ", "--qty", "3"])
        .assert()
        .failure();
}

#[test]
fn test_part_adjust_and_set_qty() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["part", "adjust", "1", "-50"])
        .assert()
        .success();
    assert_eq!(quantity_of(&parts_json(&tmp), 1), 150);

    scaf(&tmp)
        .args(["part", "set-qty", "1", "42"])
        .assert()
        .success();
    assert_eq!(quantity_of(&parts_json(&tmp), 1), 42);
}

#[test]
fn test_part_adjust_below_zero_fails() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["part", "adjust", "2", "-3"])
        .assert()
        .failure();
    assert_eq!(quantity_of(&parts_json(&tmp), 2), 2);
}

#[test]
fn test_part_show_unknown_id() {
    let tmp = setup_small_project();
    scaf(&tmp).args(["part", "show", "99"]).assert().failure();
}

#[test]
fn test_part_remove_with_yes() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["part", "remove", "2", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed part"));
    assert_eq!(parts_json(&tmp).as_array().unwrap().len(), 1);
}

// ============================================================================
// Withdrawals
// ============================================================================

#[test]
fn test_withdraw_records_and_lists() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["withdraw", "new", "1", "20", "--note", "site A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("180 remaining"));

    assert_eq!(quantity_of(&parts_json(&tmp), 1), 180);

    let output = scaf(&tmp)
        .args(["withdraw", "list", "-f", "json"])
        .output()
        .unwrap();
    let list: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entry = &list.as_array().unwrap()[0];
    assert_eq!(entry["part_id"], 1);
    assert_eq!(entry["quantity"], 20);
    assert_eq!(entry["operator"], "tester");
    assert_eq!(entry["note"], "site A");
}

#[test]
fn test_withdraw_list_by_days() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["withdraw", "new", "1", "5"])
        .assert()
        .success();

    let count = |days: &str| {
        let output = scaf(&tmp)
            .args(["withdraw", "list", "--days", days, "-f", "json"])
            .output()
            .unwrap();
        let list: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        list.as_array().unwrap().len()
    };
    assert_eq!(count("1"), 1);
    assert_eq!(count("0"), 0);
}

#[test]
fn test_withdraw_more_than_stock_fails() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["withdraw", "new", "2", "5"])
        .assert()
        .failure();
    assert_eq!(quantity_of(&parts_json(&tmp), 2), 2);
}

// ============================================================================
// Calculation
// ============================================================================

#[test]
fn test_calc_reports_usage_without_touching_stock() {
    let tmp = setup_small_project();
    let output = scaf(&tmp)
        .args(["calc", "--height", "4", "--length", "6", "--width", "1", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let usage = report["usage"].as_array().unwrap();
    assert_eq!(usage.len(), 2);
    assert_eq!(usage[0]["part"]["name"], "Poteau 2m");
    assert_eq!(usage[0]["used"], 12);
    assert_eq!(usage[1]["used"], 2);
    assert!(!report["shortfalls"].as_array().unwrap().is_empty());
    assert_eq!(report["applied"], false);

    assert!(tmp.path().join(".scaf/usage.yaml").exists());
    assert_eq!(quantity_of(&parts_json(&tmp), 1), 200);
}

#[test]
fn test_calc_apply_deducts_stock() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["calc", "--height", "4", "--length", "6", "--width", "1", "--apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stock updated"));

    let parts = parts_json(&tmp);
    assert_eq!(quantity_of(&parts, 1), 188);
    assert_eq!(quantity_of(&parts, 2), 0);

    let output = scaf(&tmp)
        .args(["withdraw", "list", "-f", "json"])
        .output()
        .unwrap();
    let list: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[test]
fn test_calc_quiet_prints_total() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["calc", "--height", "4", "--length", "6", "--width", "1", "-q"])
        .assert()
        .success()
        .stdout("14\n");
}

#[test]
fn test_calc_rejects_invalid_geometry() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["calc", "--height", "0", "--length", "6", "--width", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("height"));
    assert!(!tmp.path().join(".scaf/usage.yaml").exists());
}

#[test]
fn test_calc_rejects_oversized_request() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["calc", "--height", "1e10", "--length", "6", "--width", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too large"));
}

#[test]
fn test_calc_on_seeded_inventory() {
    let tmp = setup_seeded_project();
    scaf(&tmp)
        .args(["calc", "--height", "6", "--length", "10", "--width", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Levels:"))
        .stdout(predicate::str::contains("Total:"));
}

#[test]
fn test_reset_clears_usage_record() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["calc", "--height", "4", "--length", "6", "--width", "1"])
        .assert()
        .success();

    scaf(&tmp)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared"));
    assert!(!tmp.path().join(".scaf/usage.yaml").exists());

    scaf(&tmp)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to reset"));
    assert_eq!(quantity_of(&parts_json(&tmp), 1), 200);
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_report_usage_requires_calculation() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["report", "usage"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no calculation recorded"));
}

#[test]
fn test_report_usage_csv_to_file() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["calc", "--height", "4", "--length", "6", "--width", "1"])
        .assert()
        .success();

    let out = tmp.path().join("usage.csv");
    scaf(&tmp)
        .args(["report", "usage", "-f", "csv", "-o"])
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("name,used,length,width,height,weight"));
    assert!(csv.contains("Poteau 2m,12,"));
    assert!(csv.contains("Total,14,,,,276.00"));
}

#[test]
fn test_report_usage_markdown() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["calc", "--height", "4", "--length", "6", "--width", "1"])
        .assert()
        .success();
    scaf(&tmp)
        .args(["report", "usage"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Scaffold Usage Report"))
        .stdout(predicate::str::contains("276.00 kg"));
}

#[test]
fn test_report_stock() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["report", "stock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Stock Report"))
        .stdout(predicate::str::contains("## Low Stock"))
        .stdout(predicate::str::contains("Plancher alu"));

    let output = scaf(&tmp)
        .args(["report", "stock", "-f", "json"])
        .output()
        .unwrap();
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total_parts"], 2);
    assert_eq!(stats["total_units"], 202);
    assert_eq!(stats["low_stock"], 1);
}

#[test]
fn test_report_withdrawals_by_operator() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["withdraw", "new", "1", "20"])
        .assert()
        .success();
    scaf(&tmp)
        .args(["withdraw", "new", "1", "4"])
        .env("SCAF_OPERATOR", "marc")
        .assert()
        .success();

    let output = scaf(&tmp)
        .args(["report", "withdrawals", "-f", "csv"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let csv = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "operator,withdrawals,units,weight");
    assert_eq!(lines[1], "tester,1,20,390.00");
    assert_eq!(lines[2], "marc,1,4,78.00");
    assert_eq!(lines[3], "Total,2,24,468.00");

    scaf(&tmp)
        .args(["report", "withdrawals", "--days", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_No withdrawals recorded._"));
}

// ============================================================================
// Standalone tools
// ============================================================================

#[test]
fn test_categorize() {
    let tmp = TempDir::new().unwrap();
    scaf(&tmp)
        .args(["categorize", "Poteau 3m", "Garde-corps 2.07m", "Widget"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upright\tPoteau 3m"))
        .stdout(predicate::str::contains("guardrail\tGarde-corps 2.07m"))
        .stdout(predicate::str::contains("other\tWidget"));
}

#[test]
fn test_categorize_shows_keywords() {
    let tmp = TempDir::new().unwrap();
    scaf(&tmp)
        .args(["categorize", "Plancher alu 3.07m"])
        .assert()
        .success()
        .stdout("platform\tPlancher alu 3.07m\tplancher\n");

    scaf(&tmp)
        .args(["categorize", "--keywords"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shim\tcale, shim, bloc"))
        .stdout(predicate::str::contains("other").not());
}

#[test]
fn test_segment_without_project() {
    let tmp = TempDir::new().unwrap();
    scaf(&tmp)
        .args(["segment", "6", "-q"])
        .assert()
        .success()
        .stdout("3 3\n");
}

#[test]
fn test_segment_custom_lengths() {
    let tmp = TempDir::new().unwrap();
    scaf(&tmp)
        .args(["segment", "5", "--lengths", "2,1", "-q"])
        .assert()
        .success()
        .stdout("2 2 1\n");
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_set_and_show() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["config", "set", "low_stock_threshold", "3"])
        .assert()
        .success();
    scaf(&tmp)
        .args(["config", "show", "low_stock_threshold"])
        .assert()
        .success()
        .stdout("3\n");

    scaf(&tmp)
        .args(["part", "list", "--low-stock", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_config_set_lists_drive_calculation() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["config", "set", "segment_lengths", "2,1"])
        .assert()
        .success();
    scaf(&tmp)
        .args(["segment", "6", "-q"])
        .assert()
        .success()
        .stdout("2 2 2\n");
}

#[test]
fn test_config_rejects_unknown_key() {
    let tmp = setup_small_project();
    scaf(&tmp)
        .args(["config", "set", "editor", "vim"])
        .assert()
        .failure();
}

#[test]
fn test_completions() {
    let tmp = TempDir::new().unwrap();
    scaf(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scaf"));
}
