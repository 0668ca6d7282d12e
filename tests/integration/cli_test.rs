use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn indexctl() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("indexctl").unwrap()
}

const INDEX_A: &str = r#"{"collectionGroup":"orders","queryScope":"COLLECTION","fields":[{"fieldPath":"status","order":"ASCENDING"}]}"#;
const INDEX_B: &str = r#"{"collectionGroup":"users","queryScope":"COLLECTION","fields":[{"fieldPath":"status","order":"ASCENDING"},{"fieldPath":"createdAt","order":"DESCENDING"}]}"#;

fn index_set(indexes: &[&str]) -> String {
    format!(
        r#"{{"indexes":[{}],"fieldOverrides":[]}}"#,
        indexes.join(",")
    )
}

fn write_source(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// ========== validate ==========

#[test]
fn validate_reports_missing_composite_index() {
    let dir = TempDir::new().unwrap();
    write_source(
        dir.path(),
        "src/orders.js",
        "const q = db.collection(\"orders\")\n  .where(\"status\", \"==\", \"paid\")\n  .orderBy(\"createdAt\", \"desc\");\n",
    );

    indexctl()
        .args(["validate", "--src", "src", "--pattern", "**/*.js"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("1 composite index(es) missing"));

    let report: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("index-report.json")).unwrap())
            .unwrap();
    assert!(report.get("generatedAt").is_some());
    let indexes = report["indexes"].as_array().unwrap();
    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0]["collectionGroup"], "orders");
    let fields = indexes[0]["fields"].as_array().unwrap();
    assert_eq!(fields[0]["fieldPath"], "status");
    assert_eq!(fields[0]["order"], "ASCENDING");
    assert_eq!(fields[1]["fieldPath"], "createdAt");
    assert_eq!(fields[1]["order"], "DESCENDING");
    assert!(indexes[0]["source"]
        .as_str()
        .unwrap()
        .contains("orders.js"));
}

#[test]
fn validate_single_filter_writes_no_report() {
    let dir = TempDir::new().unwrap();
    write_source(
        dir.path(),
        "src/users.js",
        "db.collection(\"users\").where(\"status\", \"==\", \"active\");\n",
    );

    indexctl()
        .args(["validate", "--src", "src", "--pattern", "**/*.js"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("covered"));

    assert!(!dir.path().join("index-report.json").exists());
}

#[test]
fn validate_survives_a_malformed_file() {
    let dir = TempDir::new().unwrap();
    write_source(dir.path(), "src/broken.js", "const broken = (;\n");
    write_source(
        dir.path(),
        "src/good.js",
        "db.collection(\"orders\").where(\"status\", \"==\", \"paid\").orderBy(\"createdAt\", \"desc\");\n",
    );

    indexctl()
        .args(["validate", "--src", "src", "--pattern", "**/*.js"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicates::str::contains("broken.js"));

    // The good file's candidate still made it into the report.
    let report: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("index-report.json")).unwrap())
            .unwrap();
    assert_eq!(report["indexes"].as_array().unwrap().len(), 1);
}

#[test]
fn validate_skips_candidates_already_declared() {
    let dir = TempDir::new().unwrap();
    write_source(
        dir.path(),
        "src/users.js",
        "db.collection(\"users\").where(\"status\", \"==\", \"a\").orderBy(\"createdAt\", \"desc\");\n",
    );
    fs::write(dir.path().join("indexes.json"), index_set(&[INDEX_B])).unwrap();

    indexctl()
        .args(["validate", "--src", "src", "--pattern", "**/*.js"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("covered"));

    assert!(!dir.path().join("index-report.json").exists());
}

#[test]
fn validate_bootstraps_a_missing_index_file() {
    let dir = TempDir::new().unwrap();
    write_source(dir.path(), "src/app.js", "const nothing = 1;\n");

    indexctl()
        .args(["validate", "--src", "src", "--pattern", "**/*.js"])
        .current_dir(dir.path())
        .assert()
        .success();

    let bootstrapped: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("indexes.json")).unwrap())
            .unwrap();
    assert_eq!(bootstrapped["indexes"], Value::Array(vec![]));
}

#[test]
fn validate_json_mode_prints_the_report() {
    let dir = TempDir::new().unwrap();
    write_source(
        dir.path(),
        "src/orders.js",
        "db.collection(\"orders\").where(\"status\", \"==\", \"paid\").orderBy(\"createdAt\");\n",
    );

    let output = indexctl()
        .args(["validate", "--json", "--src", "src", "--pattern", "**/*.js"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: Value = serde_json::from_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(parsed["indexes"].as_array().unwrap().len(), 1);
}

// ========== sync (stub deployment CLI) ==========

#[cfg(unix)]
fn write_stub_remote(dir: &Path, remote_json: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-deploy.sh");
    let body = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"firestore:indexes\" ]; then\n\
         cat <<'EOF'\n\
         {remote_json}\n\
         EOF\n\
         exit 0\n\
         fi\n\
         if [ \"$1\" = \"deploy\" ]; then\n\
         echo deployed > deploy-marker.txt\n\
         exit 0\n\
         fi\n\
         exit 1\n"
    );
    fs::write(&script, body).unwrap();
    let mut perms = fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).unwrap();
    script
}

#[cfg(unix)]
fn sync_cmd(dir: &Path, stub: &Path, rest: &[&str]) -> Command {
    let mut cmd = indexctl();
    cmd.args([
        "sync",
        "--env",
        "staging",
        "--deploy-bin",
        stub.to_str().unwrap(),
    ])
    .args(rest)
    .current_dir(dir);
    cmd
}

#[cfg(unix)]
#[test]
fn sync_diff_reports_the_removed_index() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("indexes.json"), index_set(&[INDEX_A])).unwrap();
    let stub = write_stub_remote(dir.path(), &index_set(&[INDEX_A, INDEX_B]));

    sync_cmd(dir.path(), &stub, &["--direction", "diff"])
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "0 index(es) only local, 1 index(es) only remote",
        ));
}

#[cfg(unix)]
#[test]
fn sync_diff_json_lists_membership_differences() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("indexes.json"), index_set(&[INDEX_A])).unwrap();
    let stub = write_stub_remote(dir.path(), &index_set(&[INDEX_A, INDEX_B]));

    let output = sync_cmd(dir.path(), &stub, &["--direction", "diff", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: Value = serde_json::from_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(parsed["identical"], Value::Bool(false));
    assert_eq!(parsed["added"]["indexes"].as_array().unwrap().len(), 0);
    let removed = parsed["removed"]["indexes"].as_array().unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0]["collectionGroup"], "users");
}

#[cfg(unix)]
#[test]
fn sync_identical_sets_report_no_differences() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("indexes.json"), index_set(&[INDEX_A])).unwrap();
    let stub = write_stub_remote(dir.path(), &index_set(&[INDEX_A]));

    sync_cmd(dir.path(), &stub, &["--direction", "diff"])
        .assert()
        .success()
        .stdout(predicates::str::contains("No differences"));
}

#[cfg(unix)]
#[test]
fn sync_pull_without_force_aborts_on_critical_index() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("indexes.json"), index_set(&[INDEX_A])).unwrap();
    fs::write(
        dir.path().join("critical.json"),
        format!("[{INDEX_B}]"),
    )
    .unwrap();
    let stub = write_stub_remote(dir.path(), &index_set(&[INDEX_A, INDEX_B]));

    sync_cmd(
        dir.path(),
        &stub,
        &["--direction", "pull", "--critical-path", "critical.json"],
    )
    .assert()
    .failure()
    .stdout(predicates::str::contains("CRITICAL"))
    .stdout(predicates::str::contains("users"));

    // Local file untouched.
    let local: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("indexes.json")).unwrap())
            .unwrap();
    assert_eq!(local["indexes"].as_array().unwrap().len(), 1);
}

#[cfg(unix)]
#[test]
fn sync_pull_force_applies_backs_up_and_converges() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("indexes.json"), index_set(&[INDEX_A])).unwrap();
    fs::write(dir.path().join("critical.json"), format!("[{INDEX_B}]")).unwrap();
    let stub = write_stub_remote(dir.path(), &index_set(&[INDEX_A, INDEX_B]));

    sync_cmd(
        dir.path(),
        &stub,
        &[
            "--direction",
            "pull",
            "--critical-path",
            "critical.json",
            "--force",
        ],
    )
    .assert()
    .success()
    .stdout(predicates::str::contains("Pulled remote configuration"));

    // Remote truth won: both indexes are local now.
    let local: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("indexes.json")).unwrap())
            .unwrap();
    let groups: Vec<&str> = local["indexes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|ix| ix["collectionGroup"].as_str().unwrap())
        .collect();
    assert!(groups.contains(&"orders"));
    assert!(groups.contains(&"users"));

    // The previous local file was snapshotted first.
    let backups: Vec<String> = fs::read_dir(dir.path().join(".index-backups"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with("local-"));

    // Immediately re-running diff finds nothing left to do.
    sync_cmd(dir.path(), &stub, &["--direction", "diff"])
        .assert()
        .success()
        .stdout(predicates::str::contains("No differences"));
}

#[cfg(unix)]
#[test]
fn sync_push_invokes_the_deploy_cli() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("indexes.json"),
        index_set(&[INDEX_A, INDEX_B]),
    )
    .unwrap();
    let stub = write_stub_remote(dir.path(), &index_set(&[INDEX_A]));

    sync_cmd(dir.path(), &stub, &["--direction", "push", "--force"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Deployed"));

    assert!(dir.path().join("deploy-marker.txt").exists());

    let backups: Vec<String> = fs::read_dir(dir.path().join(".index-backups"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with("remote-"));
}

#[cfg(unix)]
#[test]
fn sync_fetch_failure_is_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("indexes.json"), index_set(&[INDEX_A])).unwrap();
    let script = dir.path().join("fake-deploy.sh");
    fs::write(&script, "#!/bin/sh\nexit 2\n").unwrap();
    let mut perms = fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).unwrap();

    sync_cmd(dir.path(), &script, &["--direction", "diff"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("remote fetch failed"));
}

#[cfg(unix)]
#[test]
fn sync_rejects_a_malformed_local_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("indexes.json"), "{ not json").unwrap();
    let stub = write_stub_remote(dir.path(), &index_set(&[INDEX_A]));

    sync_cmd(dir.path(), &stub, &["--direction", "diff"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("not a valid index configuration"));
}
