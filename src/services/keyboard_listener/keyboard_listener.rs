use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::{LangSwitchError, Result};
use crate::events::{ControlEvent, KeyTransitionEvent};
use crate::mappings::TrackedKeyNames;
use crate::utils::DeviceFinder;
use evdev::{Device, EventType, KeyCode};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::r#trait::KeyboardListenerTrait;
use super::tracked_key_state::TrackedKeyState;

/// Слушает evdev-устройство без эксклюзивного захвата,
/// чтобы отслеживаемая клавиша продолжала работать как обычно.
pub struct RealKeyboardListener {
    device: Device,
    events: mpsc::Sender<ControlEvent>,
    tracked: TrackedKeyState,
    epoch: Instant,
}

impl RealKeyboardListener {
    pub fn new(config: Arc<Config>, events: mpsc::Sender<ControlEvent>) -> Result<Self> {
        info!("Инициализация RealKeyboardListener");

        let codes = TrackedKeyNames::codes(&config.input.tracked_key).ok_or_else(|| {
            LangSwitchError::Internal(format!(
                "Неизвестная отслеживаемая клавиша: {}",
                config.input.tracked_key
            ))
        })?;

        let device_path = DeviceFinder::find_keyboard_device(&config.input.device_path, codes)?;

        let device = Device::open(&device_path).map_err(|e| {
            LangSwitchError::DeviceNotFound(format!(
                "Не удалось открыть устройство {:?}: {}",
                device_path, e
            ))
        })?;

        info!("Устройство: {}", device.name().unwrap_or("Unknown"));
        info!("Физический путь: {:?}", device.physical_path());

        let supports_tracked = device
            .supported_keys()
            .is_some_and(|keys| codes.iter().any(|&code| keys.contains(code)));
        if !supports_tracked {
            warn!(
                "Устройство не сообщает о поддержке клавиши '{}', жест может не срабатывать",
                config.input.tracked_key
            );
        }

        Ok(Self {
            device,
            events,
            tracked: TrackedKeyState::new(codes),
            epoch: Instant::now(),
        })
    }

    async fn run_impl(self) -> Result<()> {
        info!("RealKeyboardListener запущен, начинаем чтение событий");

        let Self {
            device,
            events,
            mut tracked,
            epoch,
        } = self;
        let mut stream = device.into_event_stream()?;

        loop {
            let event = match stream.next_event().await {
                Ok(event) => event,
                Err(e) => {
                    error!("Ошибка чтения событий: {}", e);
                    return Err(LangSwitchError::Io(e));
                }
            };

            if event.event_type() != EventType::KEY {
                continue;
            }

            let key = KeyCode::new(event.code());
            // 0 - отпускание, 1 - нажатие, 2 - автоповтор (клавиша всё ещё удерживается)
            let pressed = match event.value() {
                0 => false,
                1 | 2 => true,
                other => {
                    debug_if_enabled!("Неизвестное значение события: {}", other);
                    continue;
                }
            };

            let Some(active) = tracked.update_key(key, pressed) else {
                continue;
            };

            let transition = KeyTransitionEvent::since(epoch, active);
            debug_if_enabled!("Событие отслеживаемой клавиши {:?}: {}", key, transition);

            if events.send(ControlEvent::Key(transition)).await.is_err() {
                info!("Канал событий закрыт, RealKeyboardListener завершает работу");
                return Ok(());
            }
        }
    }
}

#[async_trait::async_trait]
impl KeyboardListenerTrait for RealKeyboardListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
