pub mod keyboard;
pub mod source;

pub use keyboard::KeyTransitionEvent;
pub use source::{InputSource, SourceId, SourceList};

use crate::services::GestureConfig;

/// События единого канала, который разбирает Controller
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Переход отслеживаемой клавиши от слушателя клавиатуры
    Key(KeyTransitionEvent),
    /// Перечитанные настройки (по SIGHUP)
    Reconfigure {
        gesture: GestureConfig,
        show_popup: bool,
    },
}

impl ControlEvent {
    #[cfg(test)]
    pub fn key(is_tracked_key_active: bool, timestamp: f64) -> Self {
        Self::Key(KeyTransitionEvent::new(is_tracked_key_active, timestamp))
    }
}
