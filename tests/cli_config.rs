use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn stringstore_cmd() -> Command {
    Command::cargo_bin("stringstore").expect("locate stringstore binary")
}

#[test]
fn project_config_supplies_store_defaults() {
    let dir = tempdir().expect("tempdir");

    let config_dir = dir.path().join(".stringstore");
    std::fs::create_dir_all(&config_dir).expect("create config dir");
    std::fs::write(
        config_dir.join("config.toml"),
        r#"
            [store]
            backend = "flat"
            path = "data/strings.json"
        "#,
    )
    .expect("write config");

    stringstore_cmd()
        .current_dir(dir.path())
        .args(["add", "racecar"])
        .assert()
        .success();

    // The store landed at the configured path, as a flat JSON file.
    let store_file = dir.path().join("data/strings.json");
    assert!(store_file.exists());

    let contents = std::fs::read_to_string(&store_file).expect("read store file");
    assert!(contents.trim_start().starts_with('['));
    assert!(contents.contains("racecar"));
}

#[test]
fn cli_flags_override_project_config() {
    let dir = tempdir().expect("tempdir");

    let config_dir = dir.path().join(".stringstore");
    std::fs::create_dir_all(&config_dir).expect("create config dir");
    std::fs::write(
        config_dir.join("config.toml"),
        r#"
            [store]
            backend = "flat"
            path = "data/strings.json"
        "#,
    )
    .expect("write config");

    stringstore_cmd()
        .current_dir(dir.path())
        .args(["add", "racecar", "--store-path", "override/strings.json"])
        .assert()
        .success();

    assert!(dir.path().join("override/strings.json").exists());
    assert!(!dir.path().join("data/strings.json").exists());
}

#[test]
fn config_is_discovered_from_a_subdirectory() {
    let dir = tempdir().expect("tempdir");

    let config_dir = dir.path().join(".stringstore");
    std::fs::create_dir_all(&config_dir).expect("create config dir");
    std::fs::write(
        config_dir.join("config.toml"),
        r#"
            [store]
            backend = "flat"
            path = "data/strings.json"

            [output]
            format = "json"
        "#,
    )
    .expect("write config");

    let nested = dir.path().join("nested/deeper");
    std::fs::create_dir_all(&nested).expect("create nested dirs");

    // Relative store paths resolve against the working directory, so
    // point at the shared location explicitly while still picking up
    // the backend and format from the discovered config.
    let store_path = dir.path().join("data/strings.json");

    stringstore_cmd()
        .current_dir(&nested)
        .args(["add", "racecar", "--store-path"])
        .arg(&store_path)
        .assert()
        .success()
        // [output] format = "json" from the walked-up config applies.
        .stdout(predicate::str::contains(r#""value":"racecar""#));

    assert!(store_path.exists());
}
