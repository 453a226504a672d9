use evdev::KeyCode;

/// Состояние отслеживаемой клавиши с учётом обеих физических сторон.
///
/// Клавиша считается активной, пока удерживается хотя бы одна из сторон.
#[derive(Debug)]
pub struct TrackedKeyState {
    codes: &'static [KeyCode],
    pressed: Vec<bool>,
}

impl TrackedKeyState {
    pub fn new(codes: &'static [KeyCode]) -> Self {
        Self {
            codes,
            pressed: vec![false; codes.len()],
        }
    }

    #[cfg(test)]
    pub fn tracks(&self, key: KeyCode) -> bool {
        self.codes.contains(&key)
    }

    pub fn is_active(&self) -> bool {
        self.pressed.iter().any(|&pressed| pressed)
    }

    /// Обновить сторону `key`. Возвращает новое состояние или `None`,
    /// если клавиша не отслеживается.
    pub fn update_key(&mut self, key: KeyCode, pressed: bool) -> Option<bool> {
        let index = self.codes.iter().position(|&code| code == key)?;
        self.pressed[index] = pressed;
        Some(self.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIFT: &[KeyCode] = &[KeyCode::KEY_LEFTSHIFT, KeyCode::KEY_RIGHTSHIFT];

    #[test]
    fn test_active_while_any_side_held() {
        let mut state = TrackedKeyState::new(SHIFT);
        assert!(!state.is_active());

        assert_eq!(state.update_key(KeyCode::KEY_LEFTSHIFT, true), Some(true));
        assert_eq!(state.update_key(KeyCode::KEY_RIGHTSHIFT, true), Some(true));
        assert_eq!(state.update_key(KeyCode::KEY_LEFTSHIFT, false), Some(true));
        assert_eq!(state.update_key(KeyCode::KEY_RIGHTSHIFT, false), Some(false));
    }

    #[test]
    fn test_untracked_key_ignored() {
        let mut state = TrackedKeyState::new(SHIFT);
        assert!(!state.tracks(KeyCode::KEY_A));
        assert_eq!(state.update_key(KeyCode::KEY_A, true), None);
        assert!(!state.is_active());
    }
}
