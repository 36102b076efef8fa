//! Tests for root folder resolution priority
//!
//! Uses serial_test because the tests manipulate SFL_ROOT_FOLDER.

use serial_test::serial;
use sfl_common::config::{default_root_folder, resolve_root_folder, ROOT_FOLDER_ENV};
use std::env;
use std::path::{Path, PathBuf};

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");

    let resolved = resolve_root_folder(Some(Path::new("/from/cli")), ROOT_FOLDER_ENV, None);
    assert_eq!(resolved, PathBuf::from("/from/cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_var_beats_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "root_folder = \"/from/toml\"\n").unwrap();
    env::set_var(ROOT_FOLDER_ENV, "/from/env");

    let resolved = resolve_root_folder(None, ROOT_FOLDER_ENV, Some(&config));
    assert_eq!(resolved, PathBuf::from("/from/env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_config_file_used_without_env() {
    env::remove_var(ROOT_FOLDER_ENV);
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "root_folder = \"/from/toml\"\nport = 8080\n").unwrap();

    let resolved = resolve_root_folder(None, ROOT_FOLDER_ENV, Some(&config));
    assert_eq!(resolved, PathBuf::from("/from/toml"));
}

#[test]
#[serial]
fn test_falls_back_to_compiled_default() {
    env::remove_var(ROOT_FOLDER_ENV);
    let dir = tempfile::tempdir().unwrap();

    // Config file path that does not exist
    let resolved = resolve_root_folder(None, ROOT_FOLDER_ENV, Some(&dir.path().join("none.toml")));
    assert_eq!(resolved, default_root_folder());
    assert!(!resolved.as_os_str().is_empty());
}
