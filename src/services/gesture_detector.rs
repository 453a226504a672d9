use crate::debug_if_enabled;
use crate::error::{LangSwitchError, Result};
use crate::events::KeyTransitionEvent;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_MIN_DURATION_MS: f64 = 200.0;
pub const DEFAULT_MAX_DURATION_MS: f64 = 1000.0;

/// Окно длительности нажатия, в миллисекундах. Обе границы исключающие.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: DEFAULT_MIN_DURATION_MS,
            max_duration_ms: DEFAULT_MAX_DURATION_MS,
        }
    }
}

impl GestureConfig {
    pub fn new(min_duration_ms: f64, max_duration_ms: f64) -> Result<Self> {
        let config = Self {
            min_duration_ms,
            max_duration_ms,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_duration_ms.is_finite() || !self.max_duration_ms.is_finite() {
            return Err(LangSwitchError::Settings(format!(
                "Длительности должны быть конечными числами: {} / {}",
                self.min_duration_ms, self.max_duration_ms
            )));
        }
        if self.min_duration_ms < 0.0 {
            return Err(LangSwitchError::Settings(format!(
                "Минимальная длительность не может быть отрицательной: {}",
                self.min_duration_ms
            )));
        }
        if self.min_duration_ms >= self.max_duration_ms {
            return Err(LangSwitchError::Settings(format!(
                "Минимальная длительность ({}мс) должна быть меньше максимальной ({}мс)",
                self.min_duration_ms, self.max_duration_ms
            )));
        }
        Ok(())
    }

    pub fn qualifies(&self, elapsed_ms: f64) -> bool {
        elapsed_ms > self.min_duration_ms && elapsed_ms < self.max_duration_ms
    }
}

/// Состояние, которым владеет только детектор
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureState {
    pub is_key_down: bool,
    pub key_down_timestamp: Option<f64>,
}

/// Результат обработки одного перехода
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Повтор того же значения, состояние не изменилось
    Ignored,
    /// Клавиша нажата, время запомнено
    Pressed,
    /// Нажатие уложилось в окно, нужно переключать источник
    Qualified { elapsed_ms: f64 },
    /// Нажатие вне окна
    Rejected { elapsed_ms: f64 },
    /// Отпускание без зафиксированного нажатия
    Orphaned,
}

impl GestureOutcome {
    #[cfg(test)]
    pub fn is_qualified(&self) -> bool {
        matches!(self, GestureOutcome::Qualified { .. })
    }
}

pub struct GestureDetector {
    config: GestureConfig,
    state: GestureState,
}

impl GestureDetector {
    pub fn new(config: GestureConfig) -> Self {
        info!(
            "Инициализация GestureDetector: окно ({}мс, {}мс)",
            config.min_duration_ms, config.max_duration_ms
        );
        Self {
            config,
            state: GestureState::default(),
        }
    }

    pub fn config(&self) -> GestureConfig {
        self.config
    }

    #[cfg(test)]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Новые пороги применяются при ближайшем отпускании,
    /// в том числе к уже начатому нажатию.
    pub fn reconfigure(&mut self, config: GestureConfig) {
        info!(
            "Пороги жеста изменены: ({}мс, {}мс) -> ({}мс, {}мс)",
            self.config.min_duration_ms,
            self.config.max_duration_ms,
            config.min_duration_ms,
            config.max_duration_ms
        );
        self.config = config;
    }

    pub fn handle_event(&mut self, event: KeyTransitionEvent) -> GestureOutcome {
        if self.state.is_key_down == event.is_tracked_key_active {
            return GestureOutcome::Ignored;
        }
        self.state.is_key_down = event.is_tracked_key_active;

        if event.is_tracked_key_active {
            self.state.key_down_timestamp = Some(event.timestamp);
            debug_if_enabled!("Клавиша нажата в {:.3}s", event.timestamp);
            return GestureOutcome::Pressed;
        }

        let Some(key_down_timestamp) = self.state.key_down_timestamp.take() else {
            debug_if_enabled!("Отпускание в {:.3}s без нажатия, пропускаем", event.timestamp);
            return GestureOutcome::Orphaned;
        };

        let elapsed_ms = (event.timestamp - key_down_timestamp) * 1000.0;
        debug_if_enabled!(
            "Клавиша отпущена в {:.3}s, удержание {:.1}мс",
            event.timestamp,
            elapsed_ms
        );

        if self.config.qualifies(elapsed_ms) {
            GestureOutcome::Qualified { elapsed_ms }
        } else {
            debug_if_enabled!(
                "Удержание {:.1}мс вне окна ({}мс, {}мс), переключение не требуется",
                elapsed_ms,
                self.config.min_duration_ms,
                self.config.max_duration_ms
            );
            GestureOutcome::Rejected { elapsed_ms }
        }
    }
}
