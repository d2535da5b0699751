use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DATASET: &str = "\
Delivery_person_ID,Delivery_person_Age,Delivery_person_Ratings,Type_of_vehicle,Road_traffic_density,City,Time_taken (min)
P1,24,4.9,motorcycle,Low,A,(min) 10
P2,31,4.5,scooter,High,A,(min) 20
P3,38,4.1,scooter,Jam,B,(min) 30
";

fn write_dataset(dir: &Path) -> PathBuf {
  let path = dir.join("deliveries.csv");
  fs::write(&path, DATASET).unwrap();
  path
}

fn courier(dir: &Path) -> Command {
  let mut cmd = Command::cargo_bin("courier").unwrap();
  cmd.current_dir(dir).env_remove("COURIER_DATASET").env_remove("RUST_LOG").env("NO_COLOR", "1");
  cmd
}

#[test]
#[serial]
fn test_ask_prints_city_table() {
  let temp_dir = TempDir::new().unwrap();
  let data = write_dataset(temp_dir.path());

  courier(temp_dir.path())
    .arg("--data")
    .arg(&data)
    .args(["ask", "What", "is", "the", "average", "delivery", "time", "per", "city?"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Average delivery time per city"))
    .stdout(predicate::str::contains("avg_time_min (min)"))
    .stdout(predicate::str::contains("15"));
}

#[test]
#[serial]
fn test_ask_json_output() {
  let temp_dir = TempDir::new().unwrap();
  let data = write_dataset(temp_dir.path());

  let output = courier(temp_dir.path())
    .arg("--data")
    .arg(&data)
    .args(["ask", "How does traffic affect delivery time?", "--format", "json"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["intent"]["tag"], "traffic_effect");
  assert_eq!(json["result"]["body"]["kind"], "series");
  assert_eq!(json["result"]["body"]["points"][0]["category"], "low");
}

#[test]
#[serial]
fn test_unknown_question_still_succeeds() {
  let temp_dir = TempDir::new().unwrap();
  let data = write_dataset(temp_dir.path());

  courier(temp_dir.path())
    .arg("--data")
    .arg(&data)
    .args(["ask", "asdkjasd"])
    .assert()
    .success()
    .stdout(predicate::str::contains("I don't understand this question"))
    .stdout(predicate::str::contains("Try one of these"));
}

#[test]
#[serial]
fn test_unknown_city_is_reported_not_fatal() {
  let temp_dir = TempDir::new().unwrap();
  let data = write_dataset(temp_dir.path());

  courier(temp_dir.path())
    .arg("--data")
    .arg(&data)
    .args(["ask", "Who is the fastest delivery person in Atlantis?"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Atlantis"));
}

#[test]
#[serial]
fn test_dataset_from_environment() {
  let temp_dir = TempDir::new().unwrap();
  let data = write_dataset(temp_dir.path());

  courier(temp_dir.path())
    .env("COURIER_DATASET", &data)
    .args(["classify", "Which", "vehicle", "is", "most", "efficient", "for", "scooter", "deliveries?"])
    .assert()
    .success()
    .stdout(predicate::str::contains("vehicle_efficiency"));
}

#[test]
#[serial]
fn test_missing_dataset_fails() {
  let temp_dir = TempDir::new().unwrap();

  courier(temp_dir.path())
    .args(["ask", "What is the average delivery time per city?"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("deliveries.csv"));
}

#[test]
#[serial]
fn test_invalid_config_fails() {
  let temp_dir = TempDir::new().unwrap();
  let data = write_dataset(temp_dir.path());
  let config = temp_dir.path().join("bad.json");
  fs::write(&config, r#"{ "analytics": { "default_top_k": 0 } }"#).unwrap();

  courier(temp_dir.path())
    .arg("--data")
    .arg(&data)
    .arg("--config")
    .arg(&config)
    .args(["ask", "Who is the fastest delivery person?"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("default_top_k"));
}

#[test]
fn test_examples_lists_questions() {
  let temp_dir = TempDir::new().unwrap();

  courier(temp_dir.path())
    .arg("examples")
    .assert()
    .success()
    .stdout(predicate::str::contains("Which areas have the highest delays?"));
}
