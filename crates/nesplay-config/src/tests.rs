#[cfg(test)]
mod tests {
    use crate::{Config, ConfigOverrides, ProviderKind};
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> String {
        let config_path = dir.path().join("test_config.toml");
        fs::write(&config_path, content).unwrap();
        config_path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();

        assert_eq!(config.timing.press_interval_ms, 200);
        assert_eq!(config.timing.cycle_delay_ms, 5000);
        assert_eq!(config.agent.history_capacity, 3);
        assert_eq!(config.agent.fallback_action.as_deref(), Some("EXIT_MENU"));
        assert_eq!(config.provider.kind, ProviderKind::Console);
        assert_eq!(
            config.macros.get("GO_STAIRS").unwrap(),
            &vec!["confirm", "down", "down", "confirm"]
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
[paths]
stats_file = "/tmp/stats.txt"
action_file = "/tmp/action.txt"

[timing]
press_interval_ms = 50
"#,
        );

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.paths.stats_file, "/tmp/stats.txt");
        assert_eq!(config.paths.action_file, "/tmp/action.txt");
        assert!(config.paths.screenshot_file.is_none());
        assert_eq!(config.timing.press_interval_ms, 50);
        // Unspecified timing fields keep their defaults
        assert_eq!(config.timing.cycle_delay_ms, 5000);
        assert!(config.macros.contains_key("TALK"));
    }

    #[test]
    fn test_custom_macros_replace_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
[agent]
history_capacity = 10
fallback_action = "back"

[macros]
back = ["cancel"]
open_menu = ["confirm", "menu-down", "confirm"]
"#,
        );

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.macros.len(), 2);
        assert!(config.has_macro("BACK"));
        assert!(config.has_macro("Open_Menu"));
        assert!(!config.has_macro("TALK"));
        assert_eq!(config.agent.history_capacity, 10);
    }

    #[test]
    fn test_fallback_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
[agent]
fallback_action = "TELEPORT"
"#,
        );

        let err = Config::load(Some(&path)).unwrap_err().to_string();
        assert!(err.contains("TELEPORT"), "unexpected error: {}", err);
    }

    #[test]
    fn test_history_capacity_bounds() {
        let mut config = Config::default();

        config.agent.history_capacity = 0;
        assert!(config.validate().is_err());

        config.agent.history_capacity = 101;
        assert!(config.validate().is_err());

        config.agent.history_capacity = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_macro_rejected() {
        let mut config = Config::default();
        config.macros.insert("NOTHING".to_string(), Vec::new());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("NOTHING"));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");

        assert!(Config::load(Some(missing.to_str().unwrap())).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("saved.toml");

        let mut config = Config::default();
        config.paths.screenshot_file = Some("~/frame.png".to_string());
        config.agent.max_cycles = Some(7);
        config.input.tokens.insert("confirm".to_string(), "A".to_string());
        config.save(&path).unwrap();

        let reloaded = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(reloaded.agent.max_cycles, Some(7));
        assert_eq!(reloaded.paths.screenshot_file.as_deref(), Some("~/frame.png"));
        assert_eq!(reloaded.input.tokens.get("confirm").map(String::as_str), Some("A"));
        assert_eq!(reloaded.macros, config.macros);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();

        config
            .apply_overrides(ConfigOverrides {
                stats_file: Some("/tmp/s.txt".to_string()),
                action_file: Some("/tmp/a.txt".to_string()),
                provider: None,
                mock_responses: vec![r#"{"action": "TALK"}"#.to_string()],
                max_cycles: Some(2),
            })
            .unwrap();

        assert_eq!(config.paths.stats_path().to_str(), Some("/tmp/s.txt"));
        assert_eq!(config.paths.action_path().to_str(), Some("/tmp/a.txt"));
        // Mock responses imply the mock provider
        assert_eq!(config.provider.kind, ProviderKind::Mock);
        assert_eq!(config.agent.max_cycles, Some(2));
    }

    #[test]
    fn test_mock_provider_needs_responses() {
        let mut config = Config::default();

        let result = config.apply_overrides(ConfigOverrides {
            provider: Some(ProviderKind::Mock),
            ..Default::default()
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("Mock".parse::<ProviderKind>().unwrap(), ProviderKind::Mock);
        assert_eq!("console".parse::<ProviderKind>().unwrap(), ProviderKind::Console);
        assert!("ollama".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_tilde_expansion() {
        let mut config = Config::default();
        config.paths.stats_file = "~/stats.txt".to_string();

        let expanded = config.paths.stats_path();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("stats.txt"));
    }
}
