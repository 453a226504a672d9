use crate::debug_if_enabled;
use crate::events::{ControlEvent, KeyTransitionEvent};
use crate::services::notifier::NotificationSink;
use crate::services::{GestureConfig, GestureDetector, GestureOutcome, InputSourceDirectory};
use crate::settings::UserSettings;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Единственный владелец детектора, каталога источников и уведомлений.
///
/// Создаётся один раз при запуске и живёт до конца процесса. События
/// обрабатываются по одному в порядке поступления, каждое до конца.
pub struct Controller {
    detector: GestureDetector,
    directory: InputSourceDirectory,
    notifier: Box<dyn NotificationSink>,
    show_popup: bool,
}

impl Controller {
    pub fn new(
        settings: UserSettings,
        directory: InputSourceDirectory,
        notifier: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            detector: GestureDetector::new(settings.gesture),
            directory,
            notifier,
            show_popup: settings.show_popup,
        }
    }

    pub async fn run(mut self, mut events: mpsc::Receiver<ControlEvent>) {
        info!("Controller запущен, ожидаем события");
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        info!("Все отправители событий закрыты, Controller завершает работу");
    }

    pub fn handle(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Key(transition) => {
                self.handle_key(transition);
            }
            ControlEvent::Reconfigure { gesture, show_popup } => {
                self.reconfigure(gesture, show_popup)
            }
        }
    }

    fn reconfigure(&mut self, gesture: GestureConfig, show_popup: bool) {
        if gesture != self.detector.config() {
            self.detector.reconfigure(gesture);
        }
        if show_popup != self.show_popup {
            info!("Всплывающее уведомление: {}", if show_popup { "включено" } else { "выключено" });
            self.show_popup = show_popup;
        }
    }

    /// Возвращает имя нового источника, если жест сработал и переключение удалось
    fn handle_key(&mut self, transition: KeyTransitionEvent) -> Option<String> {
        let elapsed_ms = match self.detector.handle_event(transition) {
            GestureOutcome::Qualified { elapsed_ms } => elapsed_ms,
            GestureOutcome::Rejected { elapsed_ms } => {
                info!("Удержание {:.0}мс, переключение не требуется", elapsed_ms);
                return None;
            }
            outcome => {
                debug_if_enabled!("Переход {}: {:?}", transition, outcome);
                return None;
            }
        };

        info!("Удержание {:.0}мс, переключаем источник ввода...", elapsed_ms);
        let name = match self.directory.cycle_to_next() {
            Ok(name) => name,
            Err(e) if e.is_cycle_failure() => {
                warn!("Переключение пропущено: {}", e);
                return None;
            }
            Err(e) => {
                error!("Не удалось переключить источник ввода: {}", e);
                return None;
            }
        };

        if self.show_popup {
            self.notifier.notify(&name);
        }
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SourceList;
    use crate::services::input_source::{DryRunSourceService, InputSourceService};
    use crate::services::SkipSet;
    use crate::error::Result;
    use crate::events::InputSource;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        shown: Arc<Mutex<Vec<String>>>,
    }

    impl NotificationSink for RecordingNotifier {
        fn notify(&self, language: &str) {
            self.shown.lock().push(language.to_string());
        }
    }

    fn controller(settings: UserSettings, sources: &[&str]) -> (Controller, RecordingNotifier) {
        let names: Vec<String> = sources.iter().map(|s| s.to_string()).collect();
        let service = DryRunSourceService::from_names(&names).unwrap();
        let directory = InputSourceDirectory::new(Box::new(service), SkipSet::new(["Emoji & Symbols"]));
        let notifier = RecordingNotifier::default();
        let controller = Controller::new(settings, directory, Box::new(notifier.clone()));
        (controller, notifier)
    }

    fn gesture(controller: &mut Controller, down: f64, up: f64) -> Option<String> {
        assert_eq!(controller.handle_key(KeyTransitionEvent::down(down)), None);
        controller.handle_key(KeyTransitionEvent::up(up))
    }

    #[test]
    fn test_qualifying_gesture_switches_and_notifies() {
        let (mut controller, notifier) =
            controller(UserSettings::default(), &["EN", "RU", "Emoji & Symbols", "FR"]);

        assert_eq!(gesture(&mut controller, 0.0, 0.5), Some("RU".to_string()));
        assert_eq!(gesture(&mut controller, 1.0, 1.05), None);
        assert_eq!(gesture(&mut controller, 2.0, 2.3), Some("FR".to_string()));
        assert_eq!(gesture(&mut controller, 3.0, 3.3), Some("EN".to_string()));

        assert_eq!(*notifier.shown.lock(), vec!["RU", "FR", "EN"]);
    }

    #[test]
    fn test_popup_disabled_still_switches() {
        let settings = UserSettings {
            show_popup: false,
            ..UserSettings::default()
        };
        let (mut controller, notifier) = controller(settings, &["EN", "RU"]);

        assert_eq!(gesture(&mut controller, 0.0, 0.5), Some("RU".to_string()));
        assert!(notifier.shown.lock().is_empty());

        controller.handle(ControlEvent::Reconfigure {
            gesture: GestureConfig::default(),
            show_popup: true,
        });
        assert_eq!(gesture(&mut controller, 1.0, 1.5), Some("EN".to_string()));
        assert_eq!(*notifier.shown.lock(), vec!["EN"]);
    }

    #[test]
    fn test_failed_cycle_keeps_detector_armed() {
        struct FlakyHost {
            calls: Mutex<usize>,
            inner: DryRunSourceService,
        }

        impl InputSourceService for FlakyHost {
            fn name(&self) -> &'static str {
                "flaky"
            }

            fn current_source(&self) -> Result<InputSource> {
                let mut calls = self.calls.lock();
                *calls += 1;
                if *calls == 1 {
                    return Err(crate::error::LangSwitchError::HostUnavailable("занят".into()));
                }
                self.inner.current_source()
            }

            fn list_sources(&self) -> Result<SourceList> {
                self.inner.list_sources()
            }

            fn activate(&self, source: &InputSource) -> Result<()> {
                self.inner.activate(source)
            }
        }

        let host = FlakyHost {
            calls: Mutex::new(0),
            inner: DryRunSourceService::from_names(&["EN".to_string(), "RU".to_string()]).unwrap(),
        };
        let directory = InputSourceDirectory::new(Box::new(host), SkipSet::default());
        let notifier = RecordingNotifier::default();
        let mut controller =
            Controller::new(UserSettings::default(), directory, Box::new(notifier.clone()));

        assert_eq!(gesture(&mut controller, 0.0, 0.5), None);
        assert_eq!(gesture(&mut controller, 1.0, 1.5), Some("RU".to_string()));
        assert_eq!(*notifier.shown.lock(), vec!["RU"]);
    }

    #[tokio::test]
    async fn test_run_consumes_channel_in_order() {
        let (controller, notifier) = controller(UserSettings::default(), &["EN", "RU", "FR"]);
        let (tx, rx) = mpsc::channel(16);

        let events = [
            ControlEvent::key(true, 0.0),
            ControlEvent::key(true, 0.1),
            ControlEvent::key(false, 0.5),
            ControlEvent::Reconfigure {
                gesture: GestureConfig::new(100.0, 300.0).unwrap(),
                show_popup: true,
            },
            ControlEvent::key(true, 1.0),
            ControlEvent::key(false, 1.5),
            ControlEvent::key(true, 2.0),
            ControlEvent::key(false, 2.2),
        ];
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        controller.run(rx).await;
        assert_eq!(*notifier.shown.lock(), vec!["RU", "FR"]);
    }
}
