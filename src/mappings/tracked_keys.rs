use evdev::KeyCode;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Имена клавиш, которые можно отслеживать, и соответствующие коды evdev.
/// Модификаторы без указания стороны покрывают обе физические клавиши.
static TRACKED_KEYS: Lazy<HashMap<&'static str, &'static [KeyCode]>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, &'static [KeyCode]> = HashMap::new();

    // Fn/Globe (на ноутбуках часто обрабатывается прошивкой и не виден)
    map.insert("fn", &[KeyCode::KEY_FN]);
    map.insert("capslock", &[KeyCode::KEY_CAPSLOCK]);

    // Модификаторы с обеих сторон
    map.insert("shift", &[KeyCode::KEY_LEFTSHIFT, KeyCode::KEY_RIGHTSHIFT]);
    map.insert("ctrl", &[KeyCode::KEY_LEFTCTRL, KeyCode::KEY_RIGHTCTRL]);
    map.insert("alt", &[KeyCode::KEY_LEFTALT, KeyCode::KEY_RIGHTALT]);
    map.insert("super", &[KeyCode::KEY_LEFTMETA, KeyCode::KEY_RIGHTMETA]);

    // Конкретная сторона
    map.insert("leftshift", &[KeyCode::KEY_LEFTSHIFT]);
    map.insert("rightshift", &[KeyCode::KEY_RIGHTSHIFT]);
    map.insert("leftctrl", &[KeyCode::KEY_LEFTCTRL]);
    map.insert("rightctrl", &[KeyCode::KEY_RIGHTCTRL]);
    map.insert("leftalt", &[KeyCode::KEY_LEFTALT]);
    map.insert("rightalt", &[KeyCode::KEY_RIGHTALT]);
    map.insert("leftsuper", &[KeyCode::KEY_LEFTMETA]);
    map.insert("rightsuper", &[KeyCode::KEY_RIGHTMETA]);

    map
});

pub struct TrackedKeyNames;

impl TrackedKeyNames {
    /// Коды evdev для имени клавиши из конфигурации (без учёта регистра)
    pub fn codes(name: &str) -> Option<&'static [KeyCode]> {
        TRACKED_KEYS.get(name.to_lowercase().as_str()).copied()
    }

    pub fn is_known(name: &str) -> bool {
        Self::codes(name).is_some()
    }

    /// Все допустимые имена, отсортированные для сообщений об ошибках
    pub fn known_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = TRACKED_KEYS.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_agnostic_modifiers() {
        let shift = TrackedKeyNames::codes("Shift").unwrap();
        assert_eq!(shift, &[KeyCode::KEY_LEFTSHIFT, KeyCode::KEY_RIGHTSHIFT]);
        assert_eq!(TrackedKeyNames::codes("rightalt").unwrap(), &[KeyCode::KEY_RIGHTALT]);
    }

    #[test]
    fn test_unknown_key() {
        assert!(!TrackedKeyNames::is_known("space"));
        assert!(TrackedKeyNames::is_known("fn"));
        assert!(TrackedKeyNames::known_names().contains(&"capslock"));
    }
}
