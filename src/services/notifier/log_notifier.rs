use tracing::info;

use super::r#trait::NotificationSink;

/// Уведомления только в лог (dry-run и запасной вариант без D-Bus)
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for LogNotifier {
    fn notify(&self, language: &str) {
        info!("[УВЕДОМЛЕНИЕ] {}", language);
    }
}
