use crate::config::Config;
use std::sync::Arc;
use tracing::{info, warn};

use super::dbus::DbusNotifier;
use super::log_notifier::LogNotifier;

/// Sink for "input source switched" notifications.
///
/// Fire-and-forget: implementations must not block the caller.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, language: &str);
}

/// Factory function: D-Bus notifications, or plain logging in dry-run mode
/// and when the session bus is unreachable.
pub async fn create_notifier(config: Arc<Config>, dry_run: bool) -> Box<dyn NotificationSink> {
    if dry_run {
        return Box::new(LogNotifier::new());
    }

    match DbusNotifier::connect(&config.notification).await {
        Ok(notifier) => {
            info!("Уведомления через org.freedesktop.Notifications");
            Box::new(notifier)
        }
        Err(e) => {
            warn!("Сессионная шина D-Bus недоступна ({}), уведомления только в лог", e);
            Box::new(LogNotifier::new())
        }
    }
}
