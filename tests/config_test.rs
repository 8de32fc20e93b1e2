//! Integration tests for configuration loading and persistence.

use scriba::Config;
use scriba::config::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};

#[test]
fn first_load_creates_file_and_later_loads_reuse_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");

    let mut config = Config::load_from(&path).unwrap();
    assert!(path.exists());
    config.set_parameter("model", "openai/gpt-4o").unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.model(), "openai/gpt-4o");
    assert_eq!(reloaded.temperature(), DEFAULT_TEMPERATURE);
}

#[test]
fn saved_file_omits_unset_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");

    let mut config = Config::load_from(&path).unwrap();
    config.set_parameter("api_token", "sk-or-secret").unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("api_token"));
    assert!(!text.contains("model"));
    assert!(!text.contains("temperature"));
}

#[test]
fn hand_edited_file_is_respected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "model: mistral/mistral-large\ntemperature: 0.2\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.model(), "mistral/mistral-large");
    assert_eq!(config.temperature(), 0.2);
    assert!(config.api_token().is_none());
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "model: [unclosed\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, scriba::ConfigError::ParseFailed(_)));
}

#[cfg(target_os = "linux")]
#[test]
fn load_resolves_the_xdg_config_directory() {
    let dir = tempfile::tempdir().unwrap();

    temp_env::with_var("XDG_CONFIG_HOME", Some(dir.path()), || {
        let config = Config::load().unwrap();
        assert_eq!(
            config.path(),
            dir.path().join("scriba").join("config.yaml")
        );
        assert!(config.path().exists());
        assert_eq!(config.model(), DEFAULT_MODEL);
    });
}
