use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use serde_json::Value;

fn insight() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("insight"))
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn sales_export() -> String {
    let mut csv = String::from("Monthly sales export,,,\n,,,\nMonth,Region,Revenue,Notes\n");
    for m in 1..=12 {
        let region = if m % 2 == 0 { "East" } else { "West" };
        csv.push_str(&format!("2023-{m:02}-01,{region},{},\n", 1000 + 50 * m));
    }
    csv.push_str(",,,\n,,,\n,,,\nGenerated by ExportTool,,,\n");
    csv
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|err| panic!("invalid json ({err}):\n{stdout}"))
}

#[test]
fn inspect_reports_parser_decisions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "sales.csv", &sales_export());

    let assert = insight().arg("inspect").arg(&path).assert().success();
    let json = stdout_json(assert.get_output());

    assert_eq!(json["sheet"], "sales");
    assert_eq!(json["parser"]["header_row"], 2);
    assert_eq!(json["row_count"], 12);
    assert_eq!(
        json["headers"],
        serde_json::json!(["Month", "Region", "Revenue"])
    );
    assert_eq!(json["roles"]["Month"], "date");
    assert_eq!(json["roles"]["Region"], "category");
    assert_eq!(json["roles"]["Revenue"], "metric");
    assert!(json.get("insights").is_none());
}

#[test]
fn inspect_with_insights_reports_trend() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "sales.csv", &sales_export());

    let assert = insight()
        .args(["inspect", "--insights"])
        .arg(&path)
        .assert()
        .success();
    let json = stdout_json(assert.get_output());
    assert_eq!(json["insights"]["trend"]["direction"], "up");
}

#[test]
fn forecast_projects_the_metric() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "sales.csv", &sales_export());

    let assert = insight()
        .arg("forecast")
        .arg(&path)
        .args(["--x", "Month", "--y", "Revenue", "--horizon", "2"])
        .assert()
        .success();
    let json = stdout_json(assert.get_output());

    assert_eq!(json["points"], 12);
    assert_eq!(json["time_axis"], true);
    assert_eq!(json["result"]["methodology"], "holt_linear_trend");
    let forecast = json["result"]["forecast"].as_array().unwrap();
    assert_eq!(forecast.len(), 2);
    assert_eq!(forecast[0]["t"], "2024-01-01");
    assert_eq!(forecast[1]["t"], "2024-02-01");
}

#[test]
fn forecast_with_too_few_points_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "short.csv",
        "Month,Revenue\n2024-01,10\n2024-02,11\n2024-03,12\n",
    );

    let assert = insight()
        .arg("forecast")
        .arg(&path)
        .args(["--x", "Month", "--y", "Revenue"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("insufficient data"), "stderr:\n{stderr}");
}

#[test]
fn forecast_rejects_unknown_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "sales.csv", &sales_export());

    let assert = insight()
        .arg("forecast")
        .arg(&path)
        .args(["--x", "Month", "--y", "Profit"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("column `Profit` not found"), "stderr:\n{stderr}");
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "data.csv",
        "sku,qty\nA1,5\nA2,7\nA3,9\n",
    );
    let config = write_file(
        dir.path(),
        "insight.json",
        r#"{ "roles": { "id_pattern": "(?i)^sku$" } }"#,
    );

    let assert = insight()
        .arg("inspect")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
    let json = stdout_json(assert.get_output());
    assert_eq!(json["roles"]["sku"], "id");
    assert_eq!(json["roles"]["qty"], "metric");
}

#[test]
fn bad_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "data.csv", "a,b\n1,2\n");
    let config = write_file(dir.path(), "insight.json", r#"{ "roles": { "id_pattern": "(" } }"#);

    insight()
        .arg("inspect")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}

#[test]
fn configured_min_points_applies_to_the_time_axis_check() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "short.csv",
        "Month,Revenue\n2024-01,10\n2024-02,11\n2024-03,12\n",
    );
    let config = write_file(
        dir.path(),
        "insight.json",
        r#"{ "forecast": { "min_points": 3 } }"#,
    );

    let assert = insight()
        .arg("forecast")
        .arg(&path)
        .args(["--x", "Month", "--y", "Revenue", "--config"])
        .arg(&config)
        .assert()
        .success();
    let json = stdout_json(assert.get_output());
    assert_eq!(json["points"], 3);
    assert_eq!(json["time_axis"], true);
}

#[test]
fn zero_min_points_forecasts_a_single_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "one.csv", "Month,Revenue\n2024-01,10\n");
    let config = write_file(
        dir.path(),
        "insight.json",
        r#"{ "forecast": { "min_points": 0 } }"#,
    );

    let assert = insight()
        .arg("forecast")
        .arg(&path)
        .args(["--x", "Month", "--y", "Revenue", "--horizon", "1", "--config"])
        .arg(&config)
        .assert()
        .success();
    let json = stdout_json(assert.get_output());
    assert_eq!(json["result"]["methodology"], "simple_exponential_smoothing");
    assert_eq!(json["result"]["forecast"][0]["t"], "2024-02");
    assert_eq!(json["result"]["forecast"][0]["y"], 10.0);
}
