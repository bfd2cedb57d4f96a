//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

fn write_temp(name: &str, content: &str) -> PathBuf {
    let path = env::temp_dir().join(name);
    fs::write(&path, content).expect("Failed to write test config");
    path
}

// ===== Paths =====

#[test]
fn default_config_path_points_into_logrows_dir() {
    if let Some(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(
            path_str.contains("logrows") && path_str.ends_with("config.toml"),
            "Path should contain 'logrows' and end with 'config.toml', got: {}",
            path_str
        );
    }
}

#[test]
fn default_log_path_ends_with_logrows_log() {
    let path = default_log_path();
    assert!(
        path.to_string_lossy().ends_with("logrows.log"),
        "Default log path should end with 'logrows.log', got: {:?}",
        path
    );
}

// ===== load_config_file =====

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(result, Ok(None));
}

#[test]
fn load_config_file_parses_valid_toml() {
    let path = write_temp(
        "logrows_test_config.toml",
        r#"
wrap_lines = true
dedup = "numbers"
sort_order = "descending"
popover_menu = false
app = "panel-editor"
overscan = 5
row_height = 2
char_width = 1.5
margins = 12
popover_width = 30
popover_height = 6
log_file_path = "/tmp/logrows-test.log"
"#,
    );

    let config = load_config_file(&path).unwrap().unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(config.wrap_lines, Some(true));
    assert_eq!(config.dedup, Some(DedupStrategy::Numbers));
    assert_eq!(config.sort_order, Some(SortOrder::Descending));
    assert_eq!(config.popover_menu, Some(false));
    assert_eq!(config.app, Some(CoreApp::PanelEditor));
    assert_eq!(config.overscan, Some(5));
    assert_eq!(config.row_height, Some(2));
    assert_eq!(config.char_width, Some(1.5));
    assert_eq!(config.margins, Some(12));
    assert_eq!(config.popover_width, Some(30));
    assert_eq!(config.popover_height, Some(6));
    assert_eq!(config.log_file_path, Some(PathBuf::from("/tmp/logrows-test.log")));
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let path = write_temp("logrows_test_invalid.toml", "this is not valid TOML ][}{");

    let result = load_config_file(&path);
    fs::remove_file(&path).ok();

    match result {
        Err(ConfigError::ParseError { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

#[test]
fn load_config_file_rejects_unknown_keys() {
    let path = write_temp("logrows_test_unknown_key.toml", "theme = \"dark\"\n");

    let result = load_config_file(&path);
    fs::remove_file(&path).ok();

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn load_config_file_rejects_unknown_dedup_value() {
    let path = write_temp("logrows_test_bad_dedup.toml", "dedup = \"fuzzy\"\n");

    let result = load_config_file(&path);
    fs::remove_file(&path).ok();

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn load_config_file_handles_partial_config() {
    let path = write_temp("logrows_test_partial.toml", "wrap_lines = true\n# rest omitted\n");

    let config = load_config_file(&path).unwrap().unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(config.wrap_lines, Some(true));
    assert_eq!(config.dedup, None);
}

// ===== load_config_with_precedence =====

#[test]
#[serial]
fn explicit_path_beats_env_var() {
    let explicit = write_temp("logrows_test_explicit.toml", "overscan = 7\n");
    let from_env = write_temp("logrows_test_env.toml", "overscan = 9\n");
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let config = load_config_with_precedence(Some(explicit.clone()));

    env::remove_var(CONFIG_ENV_VAR);
    fs::remove_file(&explicit).ok();
    fs::remove_file(&from_env).ok();

    assert_eq!(config.unwrap().unwrap().overscan, Some(7));
}

#[test]
#[serial]
fn env_var_used_without_explicit_path() {
    let from_env = write_temp("logrows_test_env_only.toml", "overscan = 9\n");
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let config = load_config_with_precedence(None);

    env::remove_var(CONFIG_ENV_VAR);
    fs::remove_file(&from_env).ok();

    assert_eq!(config.unwrap().unwrap().overscan, Some(9));
}

#[test]
#[serial]
fn env_var_pointing_at_missing_file_is_not_an_error() {
    env::set_var(CONFIG_ENV_VAR, "/nonexistent/logrows/config.toml");
    let config = load_config_with_precedence(None);
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config, Ok(None));
}

// ===== merge / overrides =====

#[test]
fn merge_without_file_gives_defaults() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn defaults_match_terminal_host() {
    let config = ResolvedConfig::default();
    assert!(!config.wrap_lines);
    assert_eq!(config.dedup, DedupStrategy::None);
    assert_eq!(config.sort_order, None);
    assert!(config.popover_menu);
    assert_eq!(config.app, CoreApp::Explore);
    assert_eq!(config.overscan, 2);
    assert_eq!(config.row_height, 1);
}

#[test]
fn merge_takes_present_fields_only() {
    let file = ConfigFile {
        dedup: Some(DedupStrategy::Signature),
        overscan: Some(0),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(file));

    assert_eq!(resolved.dedup, DedupStrategy::Signature);
    assert_eq!(resolved.overscan, 0);
    assert_eq!(resolved.wrap_lines, ResolvedConfig::default().wrap_lines);
    assert_eq!(resolved.log_file_path, default_log_path());
}

#[test]
fn merge_ignores_non_positive_char_width() {
    let file = ConfigFile {
        char_width: Some(0.0),
        ..ConfigFile::default()
    };
    assert_eq!(merge_config(Some(file)).char_width, 1.0);
}

#[test]
#[serial]
fn env_dedup_override_applies() {
    env::set_var(DEDUP_ENV_VAR, "Exact");
    let config = apply_env_overrides(ResolvedConfig::default());
    env::remove_var(DEDUP_ENV_VAR);

    assert_eq!(config.dedup, DedupStrategy::Exact);
}

#[test]
#[serial]
fn invalid_env_dedup_is_ignored() {
    env::set_var(DEDUP_ENV_VAR, "sometimes");
    let config = apply_env_overrides(ResolvedConfig::default());
    env::remove_var(DEDUP_ENV_VAR);

    assert_eq!(config.dedup, DedupStrategy::None);
}

#[test]
fn cli_overrides_win() {
    let base = ResolvedConfig {
        wrap_lines: false,
        dedup: DedupStrategy::Exact,
        ..ResolvedConfig::default()
    };

    let config = apply_cli_overrides(base, Some(true), Some(DedupStrategy::None), Some(SortOrder::Ascending));

    assert!(config.wrap_lines);
    assert_eq!(config.dedup, DedupStrategy::None);
    assert_eq!(config.sort_order, Some(SortOrder::Ascending));
}

#[test]
fn absent_cli_flags_keep_config() {
    let base = ResolvedConfig {
        wrap_lines: true,
        sort_order: Some(SortOrder::Descending),
        ..ResolvedConfig::default()
    };

    let config = apply_cli_overrides(base.clone(), None, None, None);

    assert_eq!(config, base);
}
