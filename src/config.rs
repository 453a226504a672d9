use crate::mappings::TrackedKeyNames;
use crate::services::{SkipSet, DEFAULT_SKIP_SOURCES};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub sources: SourcesConfig,
    pub notification: NotificationConfig,
    pub settings: SettingsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub device_path: String,
    pub tracked_key: String,
    /// Удержание эмулируемого нажатия в dry-run
    pub dry_run_hold_ms: u64,
    /// Период эмулируемых нажатий в dry-run
    pub dry_run_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    pub backend: String,
    pub skip: Vec<String>,
    #[serde(default)]
    pub display_names: HashMap<String, String>,
    pub dry_run_sources: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    pub app_name: String,
    pub display_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettingsConfig {
    /// Путь к файлу пользовательских настроек или `auto`
    pub path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            input: InputConfig {
                device_path: "auto".to_string(),
                tracked_key: "fn".to_string(),
                dry_run_hold_ms: 400,
                dry_run_interval_ms: 5000,
            },
            sources: SourcesConfig {
                backend: "xkb-switch".to_string(),
                skip: DEFAULT_SKIP_SOURCES.iter().map(|s| s.to_string()).collect(),
                display_names: HashMap::new(),
                dry_run_sources: vec![
                    "English (US)".to_string(),
                    "Russian".to_string(),
                    "Emoji & Symbols".to_string(),
                    "French".to_string(),
                ],
            },
            notification: NotificationConfig {
                app_name: "LangSwitch".to_string(),
                display_ms: 1000,
            },
            settings: SettingsConfig {
                path: "auto".to_string(),
            },
        }
    }
}

impl Config {
    /// Значения по умолчанию, затем TOML-файл (если есть), затем `LANGSWITCH_*`
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("LANGSWITCH_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if !TrackedKeyNames::is_known(&self.input.tracked_key) {
            anyhow::bail!(
                "Неизвестная отслеживаемая клавиша '{}'. Допустимые: {}",
                self.input.tracked_key,
                TrackedKeyNames::known_names().join(", ")
            );
        }

        if self.input.dry_run_interval_ms <= self.input.dry_run_hold_ms {
            anyhow::bail!("dry_run_interval_ms должно быть больше dry_run_hold_ms");
        }

        match self.sources.backend.as_str() {
            "xkb-switch" | "sway" | "dry-run" => {}
            _ => anyhow::bail!("Неверный бэкенд источников ввода: {}", self.sources.backend),
        }

        if self.sources.backend == "dry-run" && self.sources.dry_run_sources.is_empty() {
            anyhow::bail!("Для бэкенда dry-run нужен непустой dry_run_sources");
        }

        if self.notification.display_ms == 0 {
            anyhow::bail!("display_ms должно быть больше 0");
        }

        Ok(())
    }

    /// Набор отображаемых имён, которые никогда не выбираются следующими
    pub fn skip_set(&self) -> SkipSet {
        SkipSet::new(self.sources.skip.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.skip_set().contains("Emoji & Symbols"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/non/existent/langswitch.toml").unwrap();
        assert_eq!(config.input.tracked_key, "fn");
        assert_eq!(config.notification.display_ms, 1000);
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[input]
tracked_key = "capslock"

[sources]
backend = "sway"
skip = ["Emoji"]

[sources.display_names]
ru = "Русская"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.input.tracked_key, "capslock");
        assert_eq!(config.input.device_path, "auto");
        assert_eq!(config.sources.backend, "sway");
        assert_eq!(config.sources.display_names.get("ru").map(String::as_str), Some("Русская"));

        let skip = config.skip_set();
        assert!(skip.contains("Emoji"));
        assert!(!skip.contains("Dictation"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.input.tracked_key = "space".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sources.backend = "carbon".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.notification.display_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "json".to_string();
        assert!(config.validate().is_err());
    }
}
