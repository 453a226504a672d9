use crate::config::NotificationConfig;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};
use zbus::zvariant::Value;
use zbus::Connection;

use super::r#trait::NotificationSink;
use super::token::{NotificationToken, NotificationTokens};

const DESTINATION: &str = "org.freedesktop.Notifications";
const OBJECT_PATH: &str = "/org/freedesktop/Notifications";
const INTERFACE: &str = "org.freedesktop.Notifications";

/// Всплывающее уведомление через org.freedesktop.Notifications.
///
/// Новое уведомление заменяет предыдущее на экране (`replaces_id`) и
/// выдаёт новый маркер; закрытие по таймеру выполняется только если
/// маркер всё ещё текущий.
pub struct DbusNotifier {
    connection: Connection,
    app_name: Arc<str>,
    display: Duration,
    tokens: Arc<NotificationTokens>,
    last_id: Arc<Mutex<u32>>,
}

impl DbusNotifier {
    pub async fn connect(config: &NotificationConfig) -> Result<Self> {
        let connection = Connection::session().await?;
        Ok(Self {
            connection,
            app_name: Arc::from(config.app_name.as_str()),
            display: Duration::from_millis(config.display_ms),
            tokens: Arc::new(NotificationTokens::new()),
            last_id: Arc::new(Mutex::new(0)),
        })
    }

    /// Подсказки сервера: не сохранять в истории, заменять предыдущее уведомление
    fn hints() -> HashMap<&'static str, Value<'static>> {
        let mut hints = HashMap::new();
        hints.insert("transient", Value::from(true));
        hints.insert("x-canonical-private-synchronous", Value::from("langswitch"));
        hints
    }

    fn expire_timeout(display: Duration) -> i32 {
        i32::try_from(display.as_millis()).unwrap_or(i32::MAX)
    }

    async fn show(
        connection: &Connection,
        app_name: &str,
        replaces_id: u32,
        language: &str,
        display: Duration,
    ) -> Result<u32> {
        let hints = Self::hints();
        let actions: Vec<&str> = Vec::new();
        let expire_timeout = Self::expire_timeout(display);

        let reply = connection
            .call_method(
                Some(DESTINATION),
                OBJECT_PATH,
                Some(INTERFACE),
                "Notify",
                &(
                    app_name,
                    replaces_id,
                    "input-keyboard",
                    language,
                    "",
                    actions,
                    hints,
                    expire_timeout,
                ),
            )
            .await?;

        let id: u32 = reply.body().deserialize()?;
        Ok(id)
    }

    async fn dismiss(
        connection: &Connection,
        tokens: &NotificationTokens,
        token: NotificationToken,
        id: u32,
    ) {
        if !tokens.is_current(token) {
            debug!("Уведомление {} уже заменено, закрытие пропущено", id);
            return;
        }

        if let Err(e) = connection
            .call_method(Some(DESTINATION), OBJECT_PATH, Some(INTERFACE), "CloseNotification", &(id,))
            .await
        {
            debug!("Не удалось закрыть уведомление {}: {}", id, e);
        }
    }
}

impl NotificationSink for DbusNotifier {
    fn notify(&self, language: &str) {
        let token = self.tokens.mint();
        let connection = self.connection.clone();
        let app_name = self.app_name.clone();
        let display = self.display;
        let tokens = Arc::clone(&self.tokens);
        let last_id = Arc::clone(&self.last_id);
        let language = language.to_string();

        tokio::spawn(async move {
            let replaces_id = *last_id.lock();
            let id = match Self::show(&connection, &app_name, replaces_id, &language, display).await {
                Ok(id) => id,
                Err(e) => {
                    warn!("Не удалось показать уведомление '{}': {}", language, e);
                    return;
                }
            };
            *last_id.lock() = id;
            debug!("Показано уведомление {} для '{}'", id, language);

            sleep(display).await;
            Self::dismiss(&connection, &tokens, token, id).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints_mark_notification_transient() {
        let hints = DbusNotifier::hints();
        assert_eq!(hints.get("transient"), Some(&Value::from(true)));
        assert_eq!(
            hints.get("x-canonical-private-synchronous"),
            Some(&Value::from("langswitch"))
        );
    }

    #[test]
    fn test_expire_timeout_saturates() {
        assert_eq!(DbusNotifier::expire_timeout(Duration::from_millis(1000)), 1000);
        assert_eq!(DbusNotifier::expire_timeout(Duration::from_secs(u64::MAX)), i32::MAX);
    }
}
