use std::sync::atomic::{AtomicU64, Ordering};

/// Маркер владения текущим уведомлением
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationToken(u64);

/// Выдаёт маркеры уведомлений. Каждое новое уведомление делает
/// предыдущие маркеры устаревшими, и отложенное закрытие со старым
/// маркером ничего не делает.
#[derive(Debug, Default)]
pub struct NotificationTokens {
    current: AtomicU64,
}

impl NotificationTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self) -> NotificationToken {
        NotificationToken(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: NotificationToken) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }
}
