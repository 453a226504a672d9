//! Persisted user settings: gesture window and popup flag.
//!
//! Settings live in a small key-value store separate from the static config
//! file. Failures never abort startup: unreadable values fall back to defaults.

use crate::error::{LangSwitchError, Result};
use crate::langswitch_error;
use crate::services::{GestureConfig, DEFAULT_MAX_DURATION_MS, DEFAULT_MIN_DURATION_MS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const MIN_DURATION_KEY: &str = "min_key_press_duration_ms";
pub const MAX_DURATION_KEY: &str = "max_key_press_duration_ms";
pub const SHOW_POPUP_KEY: &str = "show_popup";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
}

impl SettingValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Number(value) => Some(*value),
            SettingValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(value) => Some(*value),
            SettingValue::Number(_) => None,
        }
    }
}

/// Key-value хранилище настроек
pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Option<SettingValue>;
    fn set(&mut self, key: &str, value: SettingValue) -> Result<()>;
}

/// Хранилище в памяти (dry-run и тесты)
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, SettingValue>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: SettingValue) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Хранилище в TOML-файле, перезаписывается целиком при каждом изменении
#[derive(Debug)]
pub struct TomlSettingsStore {
    path: PathBuf,
    values: BTreeMap<String, SettingValue>,
}

impl TomlSettingsStore {
    /// Открыть хранилище. Отсутствующий или повреждённый файл даёт пустое хранилище.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<BTreeMap<String, toml::Value>>(&contents) {
                Ok(raw) => {
                    let values = Self::convert_entries(raw);
                    debug!("Загружено {} настроек из {:?}", values.len(), path);
                    values
                }
                Err(e) => {
                    warn!("Файл настроек {:?} повреждён, используем значения по умолчанию: {}", path, e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Файл настроек {:?} не найден, используем значения по умолчанию", path);
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Не удалось прочитать {:?}: {}", path, e);
                BTreeMap::new()
            }
        };

        Self { path, values }
    }

    /// Некорректные значения отбрасываются по одному, остальные ключи сохраняются
    fn convert_entries(raw: BTreeMap<String, toml::Value>) -> BTreeMap<String, SettingValue> {
        raw.into_iter()
            .filter_map(|(key, value)| match value {
                toml::Value::Boolean(value) => Some((key, SettingValue::Bool(value))),
                toml::Value::Integer(value) => Some((key, SettingValue::Number(value as f64))),
                toml::Value::Float(value) => Some((key, SettingValue::Number(value))),
                other => {
                    warn!("Настройка '{}' имеет неподдерживаемое значение {}, пропускаем", key, other);
                    None
                }
            })
            .collect()
    }

    /// Путь по умолчанию: `<config_dir>/langswitch/settings.toml`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("langswitch").join("settings.toml"))
            .ok_or_else(|| langswitch_error!(settings, "Не удалось определить каталог конфигурации пользователя"))
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string(&self.values)
            .map_err(|e| LangSwitchError::Settings(format!("Не удалось сериализовать настройки: {}", e)))?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl SettingsStore for TomlSettingsStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: SettingValue) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }
}

/// Пользовательские настройки, прочитанные из хранилища
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserSettings {
    pub gesture: GestureConfig,
    pub show_popup: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            show_popup: true,
        }
    }
}

impl UserSettings {
    pub fn load(store: &dyn SettingsStore) -> Self {
        let min = store
            .get(MIN_DURATION_KEY)
            .and_then(|value| value.as_f64())
            .unwrap_or(DEFAULT_MIN_DURATION_MS);

        let mut max = store
            .get(MAX_DURATION_KEY)
            .and_then(|value| value.as_f64())
            .unwrap_or(DEFAULT_MAX_DURATION_MS);

        // Сохранённый ноль означает "не задано"
        if max == 0.0 {
            max = DEFAULT_MAX_DURATION_MS;
        }

        let gesture = GestureConfig::new(min, max).unwrap_or_else(|e| {
            warn!("Сохранённые пороги некорректны ({}), используем значения по умолчанию", e);
            GestureConfig::default()
        });

        let show_popup = store
            .get(SHOW_POPUP_KEY)
            .and_then(|value| value.as_bool())
            .unwrap_or(true);

        info!(
            "Настройки: окно ({}мс, {}мс), всплывающее уведомление: {}",
            gesture.min_duration_ms, gesture.max_duration_ms, show_popup
        );

        Self { gesture, show_popup }
    }

    /// Сохранить минимальную длительность, не нарушая `min < max`
    pub fn set_min_duration(store: &mut dyn SettingsStore, min_ms: f64) -> Result<GestureConfig> {
        let current = Self::load(store).gesture;
        let gesture = GestureConfig::new(min_ms, current.max_duration_ms)?;
        Self::store_gesture(store, gesture)?;
        Ok(gesture)
    }

    /// Сохранить максимальную длительность, не нарушая `min < max`
    pub fn set_max_duration(store: &mut dyn SettingsStore, max_ms: f64) -> Result<GestureConfig> {
        let current = Self::load(store).gesture;
        let gesture = GestureConfig::new(current.min_duration_ms, max_ms)?;
        Self::store_gesture(store, gesture)?;
        Ok(gesture)
    }

    /// Пара записывается целиком: сохранённое окно всегда совпадает с проверенным
    fn store_gesture(store: &mut dyn SettingsStore, gesture: GestureConfig) -> Result<()> {
        store.set(MIN_DURATION_KEY, SettingValue::Number(gesture.min_duration_ms))?;
        store.set(MAX_DURATION_KEY, SettingValue::Number(gesture.max_duration_ms))
    }

    pub fn set_show_popup(store: &mut dyn SettingsStore, enabled: bool) -> Result<()> {
        store.set(SHOW_POPUP_KEY, SettingValue::Bool(enabled))
    }
}

/// Открыть хранилище по пути из конфигурации (`auto` означает каталог пользователя)
pub fn open_store(path: &str, dry_run: bool) -> Box<dyn SettingsStore> {
    if dry_run {
        return Box::new(MemorySettingsStore::new());
    }

    let path = if path == "auto" {
        match TomlSettingsStore::default_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("{}. Настройки не будут сохраняться", e);
                return Box::new(MemorySettingsStore::new());
            }
        }
    } else {
        PathBuf::from(path)
    };

    Box::new(TomlSettingsStore::open(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_empty() {
        let store = MemorySettingsStore::new();
        assert_eq!(UserSettings::load(&store), UserSettings::default());
    }

    #[test]
    fn test_zero_max_is_unset() {
        let mut store = MemorySettingsStore::new();
        store.set(MIN_DURATION_KEY, SettingValue::Number(300.0)).unwrap();
        store.set(MAX_DURATION_KEY, SettingValue::Number(0.0)).unwrap();

        let settings = UserSettings::load(&store);
        assert_eq!(settings.gesture.min_duration_ms, 300.0);
        assert_eq!(settings.gesture.max_duration_ms, 1000.0);
    }

    #[test]
    fn test_inverted_window_falls_back() {
        let mut store = MemorySettingsStore::new();
        store.set(MIN_DURATION_KEY, SettingValue::Number(900.0)).unwrap();
        store.set(MAX_DURATION_KEY, SettingValue::Number(400.0)).unwrap();

        assert_eq!(UserSettings::load(&store).gesture, GestureConfig::default());
    }

    #[test]
    fn test_wrong_value_type_ignored() {
        let mut store = MemorySettingsStore::new();
        store.set(SHOW_POPUP_KEY, SettingValue::Number(1.0)).unwrap();
        store.set(MIN_DURATION_KEY, SettingValue::Bool(true)).unwrap();

        let settings = UserSettings::load(&store);
        assert!(settings.show_popup);
        assert_eq!(settings.gesture.min_duration_ms, 200.0);
    }

    #[test]
    fn test_setters_validate_against_counterpart() {
        let mut store = MemorySettingsStore::new();
        assert!(UserSettings::set_min_duration(&mut store, 1000.0).is_err());
        assert!(store.get(MIN_DURATION_KEY).is_none());

        let gesture = UserSettings::set_max_duration(&mut store, 1500.0).unwrap();
        assert_eq!(gesture.max_duration_ms, 1500.0);
        let gesture = UserSettings::set_min_duration(&mut store, 1000.0).unwrap();
        assert_eq!(gesture, GestureConfig::new(1000.0, 1500.0).unwrap());
    }

    #[test]
    fn test_setter_repairs_invalid_stored_window() {
        let mut store = MemorySettingsStore::new();
        store.set(MIN_DURATION_KEY, SettingValue::Number(900.0)).unwrap();
        store.set(MAX_DURATION_KEY, SettingValue::Number(400.0)).unwrap();

        let reported = UserSettings::set_min_duration(&mut store, 500.0).unwrap();
        assert_eq!(reported, GestureConfig::new(500.0, 1000.0).unwrap());
        assert_eq!(UserSettings::load(&store).gesture, reported);
        assert_eq!(store.get(MAX_DURATION_KEY), Some(SettingValue::Number(1000.0)));

        let reported = UserSettings::set_max_duration(&mut store, 800.0).unwrap();
        assert_eq!(UserSettings::load(&store).gesture, reported);
        assert_eq!(reported, GestureConfig::new(500.0, 800.0).unwrap());
    }

    #[test]
    fn test_bad_entry_does_not_drop_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "min_key_press_duration_ms = 300\nmax_key_press_duration_ms = 750.5\nshow_popup = \"no\"\n",
        )
        .unwrap();

        let mut store = TomlSettingsStore::open(&path);
        let settings = UserSettings::load(&store);
        assert_eq!(settings.gesture, GestureConfig::new(300.0, 750.5).unwrap());
        assert!(settings.show_popup);

        // Перезапись файла сохраняет корректные ключи
        UserSettings::set_show_popup(&mut store, false).unwrap();
        let reopened = TomlSettingsStore::open(&path);
        let settings = UserSettings::load(&reopened);
        assert_eq!(settings.gesture.min_duration_ms, 300.0);
        assert!(!settings.show_popup);
    }

    #[test]
    fn test_toml_store_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        {
            let mut store = TomlSettingsStore::open(&path);
            UserSettings::set_min_duration(&mut store, 150.0).unwrap();
            UserSettings::set_show_popup(&mut store, false).unwrap();
        }

        let store = TomlSettingsStore::open(&path);
        let settings = UserSettings::load(&store);
        assert_eq!(settings.gesture.min_duration_ms, 150.0);
        assert!(!settings.show_popup);
    }

    #[test]
    fn test_corrupted_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let store = TomlSettingsStore::open(&path);
        assert_eq!(UserSettings::load(&store), UserSettings::default());
    }
}
