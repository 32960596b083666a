use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const FIXTURE: &str = "Company Name,Address,Phone Number,Website (Profile Link),Description,Contacted,Date Contacted,Response Received,Response Date,Notes
Acme Holdings,Plot 1,555-0101,https://acme.example,Mining supplies,Yes,2024-01-01,Yes,2024-01-03,
Bolt Couriers,Plot 2,555-0102,,Courier,Yes,2024-01-01,No,,follow up
Cedar Foods,Plot 3,555-0103,,Catering,No,,,,
";

fn outreach(file: &Path) -> Command {
    let mut cmd = Command::cargo_bin("outreach").unwrap();
    cmd.env_remove("OUTREACH_LOG_DIR")
        .env_remove("OUTREACH_LOG_LEVEL")
        .arg("--file")
        .arg(file);
    cmd
}

fn fixture(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("companies.csv");
    fs::write(&path, FIXTURE).unwrap();
    path
}

fn first_id(file: &Path, name: &str) -> String {
    let output = outreach(file)
        .args(["list", "--json", "--name", name])
        .output()
        .unwrap();
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    records[0]["id"].as_str().unwrap().to_string()
}

#[test]
fn list_filters_by_name_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir);

    outreach(&file)
        .args(["list", "--contacted", "yes", "--response", "no"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bolt Couriers"))
        .stdout(predicate::str::contains("Acme Holdings").not())
        .stdout(predicate::str::contains("1 of 3 companies"));
}

#[test]
fn list_on_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();

    outreach(&dir.path().join("new.csv"))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 0 companies"));
}

#[test]
fn add_set_and_delete_persist() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir);

    outreach(&file)
        .args(["add", "--name", "Delta Mining", "--contacted", "yes"])
        .args(["--date-contacted", "2024-02-01"])
        .assert()
        .success();
    let saved = fs::read_to_string(&file).unwrap();
    assert!(saved.trim_end().ends_with("Delta Mining,,,,,Yes,2024-02-01,,,"));

    let id = first_id(&file, "delta");
    outreach(&file)
        .args(["set", &id, "--notes", "sent brochure", "--date-contacted", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Delta Mining"));
    let saved = fs::read_to_string(&file).unwrap();
    assert!(saved.contains("Delta Mining,,,,,Yes,,,,sent brochure"));

    let id = first_id(&file, "delta");
    outreach(&file)
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted 1 of 1"));
    assert!(!fs::read_to_string(&file).unwrap().contains("Delta Mining"));
}

#[test]
fn id_printed_by_add_addresses_the_saved_record() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir);

    let output = outreach(&file)
        .args(["add", "--name", "Hotel Supplies"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = String::from_utf8(output.stdout).unwrap().trim().to_string();
    assert_eq!(id, first_id(&file, "hotel"));

    outreach(&file)
        .args(["set", &id, "--notes", "asked for a quote"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hotel Supplies"));
    assert!(fs::read_to_string(&file)
        .unwrap()
        .contains("Hotel Supplies,,,,,,,,,asked for a quote"));
}

#[test]
fn set_rejects_unknown_id_and_bad_date() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir);

    outreach(&file)
        .args(["set", "00000000-0000-4000-8000-000000000000", "--notes", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("record not found"));

    let id = first_id(&file, "acme");
    outreach(&file)
        .args(["set", &id, "--response-date", "someday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--response-date"));
    assert_eq!(fs::read_to_string(&file).unwrap(), FIXTURE);
}

#[test]
fn view_then_apply_round_trip_with_deletion_and_insertion() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir);
    let view_path = dir.path().join("view.json");

    outreach(&file)
        .args(["view", "--contacted", "yes", "--output"])
        .arg(&view_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote 2 rows"));

    let mut view: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&view_path).unwrap()).unwrap();
    view["rows"][0]["notes"] = "edited and removed".into();
    view["rows"][0]["deleted"] = true.into();
    view["rows"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::json!({ "name": "Echo Media", "contacted": "No" }));
    fs::write(&view_path, view.to_string()).unwrap();

    outreach(&file)
        .arg("apply")
        .arg(&view_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("inserted=1 deleted=1"));

    let saved = fs::read_to_string(&file).unwrap();
    let lines = saved.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("Bolt Couriers"));
    assert!(lines[2].starts_with("Cedar Foods"));
    assert!(lines[3].starts_with("Echo Media"));
}

#[test]
fn view_survives_a_delete_saved_in_between() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir);

    let output = outreach(&file).arg("view").output().unwrap();
    let mut view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    view["rows"].as_array_mut().unwrap().remove(0);
    view["rows"][1]["notes"] = "tasting booked".into();

    let acme = first_id(&file, "acme");
    outreach(&file).args(["delete", &acme]).assert().success();

    outreach(&file)
        .args(["apply", "-"])
        .write_stdin(view.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("updated=2 inserted=0 deleted=0"));

    let saved = fs::read_to_string(&file).unwrap();
    let lines = saved.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("Bolt Couriers"));
    assert!(lines[2].starts_with("Cedar Foods"));
    assert!(lines[2].ends_with("tasting booked"));
}

#[test]
fn panel_apply_clears_orphan_dates() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir);

    let output = outreach(&file)
        .args(["view", "--name", "acme"])
        .output()
        .unwrap();
    let mut view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    view["rows"][0]["response_received"] = "No".into();

    outreach(&file)
        .args(["apply", "--panel", "-"])
        .write_stdin(view.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared dates on 1 companies"));

    let saved = fs::read_to_string(&file).unwrap();
    assert!(saved.contains("Mining supplies,Yes,2024-01-01,No,,"));
}

#[test]
fn apply_dry_run_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir);

    outreach(&file)
        .args(["apply", "--dry-run", "-"])
        .write_stdin(r#"{"rows":[{"name":"Foxtrot"}]}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));
    assert_eq!(fs::read_to_string(&file).unwrap(), FIXTURE);
}

#[test]
fn report_prints_distribution_and_series() {
    let dir = tempfile::tempdir().unwrap();
    let file = fixture(&dir);

    outreach(&file)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Contacted Distribution"))
        .stdout(predicate::str::contains("Responses Over Time"))
        .stdout(predicate::str::contains("2024-01-03"));

    let output = outreach(&file).args(["report", "--json"]).output().unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status_distribution"]["yes"], 2);
    assert_eq!(report["status_distribution"]["no"], 1);
    assert_eq!(report["contacts_over_time"][0]["count"], 2);
}

#[test]
fn save_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("missing-dir").join("companies.csv");

    outreach(&file)
        .args(["add", "--name", "Golf Traders"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOT saved"));
}
