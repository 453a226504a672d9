use crate::error::{LangSwitchError, Result};
use evdev::{Device, KeyCode};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct DeviceFinder;

/// Кандидат в клавиатуры с приоритетом
#[derive(Debug)]
struct Candidate {
    path: PathBuf,
    priority: u32,
}

impl DeviceFinder {
    /// Найти клавиатуру: указанный путь или автопоиск.
    /// При автопоиске предпочитаются устройства, сообщающие о `tracked` клавише.
    pub fn find_keyboard_device(device_path: &str, tracked: &[KeyCode]) -> Result<PathBuf> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(path)
            } else {
                LangSwitchError::device_not_found(format!("Указанное устройство не найдено: {:?}", path))
            };
        }

        Self::auto_find_keyboard(tracked)
    }

    fn auto_find_keyboard(tracked: &[KeyCode]) -> Result<PathBuf> {
        info!("Начинаем автопоиск клавиатурного устройства...");

        let mut candidates = Self::event_devices()?
            .into_iter()
            .filter_map(|path| {
                let priority = Self::keyboard_priority(&path, tracked)?;
                Some(Candidate { path, priority })
            })
            .collect::<Vec<_>>();

        // Стабильная сортировка: при равном приоритете меньший номер event
        candidates.sort_by(|a, b| b.priority.cmp(&a.priority));

        match candidates.into_iter().next() {
            Some(candidate) => {
                info!(
                    "Выбрано устройство {:?} (приоритет: {})",
                    candidate.path, candidate.priority
                );
                Ok(candidate.path)
            }
            None => LangSwitchError::device_not_found(
                "Не удалось найти доступное клавиатурное устройство. \
                 Убедитесь, что пользователь добавлен в группу 'input'",
            ),
        }
    }

    fn event_devices() -> Result<Vec<PathBuf>> {
        let input_dir = Path::new("/dev/input");

        let entries = fs::read_dir(input_dir).map_err(|e| {
            LangSwitchError::Permission(format!("Нет доступа к {}: {}", input_dir.display(), e))
        })?;

        let mut event_devices = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if let Some(number) = Self::event_number(&path) {
                event_devices.push((number, path));
            }
        }

        event_devices.sort_by_key(|(number, _)| *number);
        Ok(event_devices.into_iter().map(|(_, path)| path).collect())
    }

    /// Номер `N` из имени `eventN`, `None` для остальных узлов
    fn event_number(path: &Path) -> Option<u32> {
        path.file_name()?
            .to_str()?
            .strip_prefix("event")?
            .parse()
            .ok()
    }

    /// Приоритет устройства как клавиатуры, `None` если это не клавиатура
    fn keyboard_priority(path: &Path, tracked: &[KeyCode]) -> Option<u32> {
        let device = match Device::open(path) {
            Ok(device) => device,
            Err(e) => {
                debug!("Не удалось открыть устройство {:?}: {}", path, e);
                return None;
            }
        };

        let name = device.name().unwrap_or("Unknown").to_lowercase();
        if Self::is_pointer_name(&name) {
            debug!("Исключаем устройство как мышь/тачпад: {:?} ({})", path, name);
            return None;
        }

        let keys = device.supported_keys()?;
        let basic_keys = keys.contains(KeyCode::KEY_A)
            && keys.contains(KeyCode::KEY_SPACE)
            && keys.contains(KeyCode::KEY_ENTER);
        if !basic_keys || keys.iter().count() <= 20 {
            debug!("Устройство {:?} не подходит как клавиатура ({})", path, name);
            return None;
        }

        let mut priority = 10;
        if name.contains("keyboard") {
            priority += 40;
        }
        if tracked.iter().any(|&code| keys.contains(code)) {
            priority += 100;
        }

        debug!("Клавиатура {:?} ({}), приоритет {}", path, name, priority);
        Some(priority)
    }

    fn is_pointer_name(name: &str) -> bool {
        ["mouse", "deathadder", "touchpad", "trackpoint"]
            .iter()
            .any(|word| name.contains(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_keyboard_device_with_specific_path() {
        let result = DeviceFinder::find_keyboard_device("/non/existent/path", &[KeyCode::KEY_FN]);
        assert!(matches!(result, Err(LangSwitchError::DeviceNotFound(_))));
    }

    #[test]
    fn test_pointer_names_excluded() {
        assert!(DeviceFinder::is_pointer_name("logitech usb optical mouse"));
        assert!(DeviceFinder::is_pointer_name("synps/2 synaptics touchpad"));
        assert!(!DeviceFinder::is_pointer_name("at translated set 2 keyboard"));
    }

    #[test]
    fn test_event_number_orders_numerically() {
        assert_eq!(DeviceFinder::event_number(Path::new("/dev/input/event2")), Some(2));
        assert_eq!(DeviceFinder::event_number(Path::new("/dev/input/event10")), Some(10));
        assert_eq!(DeviceFinder::event_number(Path::new("/dev/input/mice")), None);
        assert_eq!(DeviceFinder::event_number(Path::new("/dev/input/by-id")), None);

        let mut paths = vec![
            PathBuf::from("/dev/input/event10"),
            PathBuf::from("/dev/input/event2"),
            PathBuf::from("/dev/input/event1"),
        ];
        paths.sort_by_key(|path| DeviceFinder::event_number(path));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/dev/input/event1"),
                PathBuf::from("/dev/input/event2"),
                PathBuf::from("/dev/input/event10"),
            ]
        );
    }
}
