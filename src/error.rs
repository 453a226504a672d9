use thiserror::Error;

#[derive(Error, Debug)]
pub enum LangSwitchError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка D-Bus: {0}")]
    DBus(#[from] zbus::Error),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Источник ввода недоступен: {0}")]
    HostUnavailable(String),

    #[error("Текущий источник ввода '{0}' отсутствует в списке")]
    CurrentSourceNotFound(String),

    #[error("Все {0} источников ввода находятся в списке пропуска")]
    AllSourcesSkipped(usize),

    #[error("Ошибка хранилища настроек: {0}")]
    Settings(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl LangSwitchError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(LangSwitchError::DeviceNotFound(msg.into()))
    }

    /// Ошибки цикла переключения не фатальны: детектор остаётся взведённым
    pub fn is_cycle_failure(&self) -> bool {
        matches!(
            self,
            LangSwitchError::HostUnavailable(_)
                | LangSwitchError::CurrentSourceNotFound(_)
                | LangSwitchError::AllSourcesSkipped(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LangSwitchError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! langswitch_error {
    (host_unavailable, $($arg:tt)*) => {
        $crate::error::LangSwitchError::HostUnavailable(format!($($arg)*))
    };
    (device_not_found, $($arg:tt)*) => {
        $crate::error::LangSwitchError::DeviceNotFound(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::LangSwitchError::Permission(format!($($arg)*))
    };
    (settings, $($arg:tt)*) => {
        $crate::error::LangSwitchError::Settings(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::LangSwitchError::Internal(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_failures_are_recognised() {
        assert!(LangSwitchError::AllSourcesSkipped(3).is_cycle_failure());
        assert!(LangSwitchError::CurrentSourceNotFound("us".into()).is_cycle_failure());
        assert!(langswitch_error!(host_unavailable, "нет {}", "списка").is_cycle_failure());
        assert!(!langswitch_error!(internal, "boom").is_cycle_failure());
    }
}
