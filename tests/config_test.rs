// tests/config_test.rs
use std::fs;
use std::io::Write;

use tempfile::{NamedTempFile, TempDir};
use v_and_r::config::{load_config, validate_rules, Config, FileRule, CONFIG_FILE_NAME};
use v_and_r::domain::Version;
use v_and_r::VandrError;

#[test]
fn test_default_config_rules() {
    let config = Config::default();
    let files: Vec<&str> = config.files.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(files, vec!["app.py", "README.md", "dags/*.py"]);
    assert_eq!(config.release.changelog, "CHANGELOG.md");
    assert_eq!(config.release.remote, "origin");
    assert!(config.file_configs().is_ok());
}

#[test]
fn test_load_from_explicit_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[[files]]
file = "Cargo.toml"
pattern = '^version = "(\d+\.\d+\.\d+)"'
template = 'version = "{version}"'

[release]
changelog = "docs/CHANGES.md"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let root = TempDir::new().unwrap();
    let config = load_config(root.path(), Some(temp_file.path())).unwrap();
    assert_eq!(config.files.len(), 1);
    assert_eq!(config.files[0].file, "Cargo.toml");
    assert_eq!(config.release.changelog, "docs/CHANGES.md");
    // unspecified release settings keep their defaults
    assert_eq!(config.release.release_notes, "RELEASES.md");
}

#[test]
fn test_project_config_is_picked_up() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join(CONFIG_FILE_NAME),
        r#"
[[files]]
file = "VERSION"
pattern = '(v\d+\.\d+\.\d+)'
template = "{version}"
"#,
    )
    .unwrap();

    let config = load_config(root.path(), None).unwrap();
    assert_eq!(config.files, vec![FileRule::new("VERSION", r"(v\d+\.\d+\.\d+)", "{version}")]);
}

#[test]
fn test_malformed_toml_is_config_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[[files]\nfile = ").unwrap();
    temp_file.flush().unwrap();

    let root = TempDir::new().unwrap();
    let err = load_config(root.path(), Some(temp_file.path())).unwrap_err();
    assert!(matches!(err, VandrError::Config(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("nope.toml");
    let err = load_config(root.path(), Some(&missing)).unwrap_err();
    assert!(matches!(err, VandrError::Config(_)));
}

#[test]
fn test_rule_validation_reports_position() {
    let rules = vec![
        FileRule::new("app.py", r#"version = "(v\d+\.\d+\.\d+)""#, r#"version = "{version}""#),
        FileRule::new("README.md", r"- Version (v\d+\.\d+\.\d+)", "- Version"),
    ];
    let err = validate_rules(&rules).unwrap_err();
    assert!(err.to_string().contains("#2"), "unexpected message: {}", err);
}

#[test]
fn test_rule_validation_failures() {
    let cases = vec![
        FileRule::new("", r"(v\d+)", "{version}"),
        FileRule::new("app.py", "", "{version}"),
        FileRule::new("app.py", r"(v\d+", "{version}"),
        FileRule::new("app.py", r"v\d+\.\d+\.\d+", "{version}"),
        FileRule::new("app.py", r"(v\d+\.\d+\.\d+)", "no placeholder"),
    ];
    for rule in cases {
        let result = validate_rules(&[rule.clone()]);
        assert!(
            matches!(result, Err(VandrError::Config(_))),
            "rule should be rejected: {:?}",
            rule
        );
    }
    assert!(validate_rules(&[]).is_err());
}

#[test]
fn test_tag_message_template() {
    let config = Config::default();
    let version = Version::new(1, 4, 0);
    assert_eq!(config.release.tag_message_for(&version), "Release v1.4.0");
}
