use crate::config::Config;
use crate::error::{LangSwitchError, Result};
use crate::events::{ControlEvent, KeyTransitionEvent};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, Duration};
use tracing::{debug, info};

use super::r#trait::KeyboardListenerTrait;

/// Эмулирует жест: нажатие и отпускание с фиксированным удержанием
pub struct DryRunKeyboardListener {
    config: Arc<Config>,
    events: mpsc::Sender<ControlEvent>,
}

impl DryRunKeyboardListener {
    pub fn new(config: Arc<Config>, events: mpsc::Sender<ControlEvent>) -> Self {
        info!("Инициализация DryRunKeyboardListener");
        Self { config, events }
    }

    async fn send(&self, event: KeyTransitionEvent) -> Result<()> {
        debug!("[DRY RUN] Переход клавиши: {}", event);
        self.events
            .send(ControlEvent::Key(event))
            .await
            .map_err(|_| LangSwitchError::Internal("Канал событий закрыт".to_string()))
    }

    async fn run_impl(self) -> Result<()> {
        let hold = Duration::from_millis(self.config.input.dry_run_hold_ms);
        let period = Duration::from_millis(self.config.input.dry_run_interval_ms);
        info!(
            "Dry-run режим - эмулируем нажатие '{}' на {}мс каждые {}мс",
            self.config.input.tracked_key,
            hold.as_millis(),
            period.as_millis()
        );

        let epoch = Instant::now();
        let mut ticker = interval(period);
        // Первый тик interval срабатывает сразу
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.send(KeyTransitionEvent::since(epoch, true)).await?;
            sleep(hold).await;
            self.send(KeyTransitionEvent::since(epoch, false)).await?;
        }
    }
}

#[async_trait::async_trait]
impl KeyboardListenerTrait for DryRunKeyboardListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
