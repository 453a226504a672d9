use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod mappings;
mod services;
mod settings;
mod utils;

use config::Config;
use events::ControlEvent;
use services::{
    create_input_source_service,
    create_keyboard_listener,
    create_notifier,
    Controller,
    InputSourceDirectory,
};
use settings::{SettingsStore, UserSettings};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Parser, Debug)]
#[command(name = "langswitch")]
#[command(about = "Переключение раскладки коротким нажатием модификатора")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "langswitch.toml")]
    config: String,

    /// Режим сухого запуска (эмуляция клавиатуры и источников ввода)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Запустить фоновый агент (по умолчанию)
    Run,
    /// Показать сохранённые настройки
    Show,
    /// Минимальная длительность нажатия, мс
    SetMin { ms: f64 },
    /// Максимальная длительность нажатия, мс
    SetMax { ms: f64 },
    /// Включить или выключить всплывающее уведомление
    Popup {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Arc::new(Config::load(&args.config)?);

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск LangSwitch v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - клавиатура и источники ввода эмулируются");
    }

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run(config, args.dry_run).await,
        Command::Show => {
            let store = settings::open_store(&config.settings.path, args.dry_run);
            let current = UserSettings::load(store.as_ref());
            println!("min_key_press_duration_ms = {}", current.gesture.min_duration_ms);
            println!("max_key_press_duration_ms = {}", current.gesture.max_duration_ms);
            println!("show_popup = {}", current.show_popup);
            Ok(())
        }
        Command::SetMin { ms } => {
            let mut store = settings::open_store(&config.settings.path, args.dry_run);
            let gesture = UserSettings::set_min_duration(store.as_mut(), ms)?;
            info!("Сохранено окно ({}мс, {}мс)", gesture.min_duration_ms, gesture.max_duration_ms);
            info!("Чтобы применить без перезапуска: pkill -HUP langswitch");
            Ok(())
        }
        Command::SetMax { ms } => {
            let mut store = settings::open_store(&config.settings.path, args.dry_run);
            let gesture = UserSettings::set_max_duration(store.as_mut(), ms)?;
            info!("Сохранено окно ({}мс, {}мс)", gesture.min_duration_ms, gesture.max_duration_ms);
            info!("Чтобы применить без перезапуска: pkill -HUP langswitch");
            Ok(())
        }
        Command::Popup { state } => {
            let mut store = settings::open_store(&config.settings.path, args.dry_run);
            UserSettings::set_show_popup(store.as_mut(), matches!(state, Toggle::On))?;
            info!("Всплывающее уведомление: {:?}", state);
            Ok(())
        }
    }
}

async fn run(config: Arc<Config>, dry_run: bool) -> Result<()> {
    // Проверка прав доступа
    if !dry_run {
        utils::permissions::check_permissions()?;
    }

    let store = settings::open_store(&config.settings.path, dry_run);
    let user_settings = UserSettings::load(store.as_ref());
    drop(store);

    // Инициализация компонентов: единственный Controller владеет всем состоянием
    let service = create_input_source_service(config.clone(), dry_run)?;
    let directory = InputSourceDirectory::new(service, config.skip_set());
    let notifier = create_notifier(config.clone(), dry_run).await;
    let controller = Controller::new(user_settings, directory, notifier);

    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let keyboard_listener = create_keyboard_listener(config.clone(), events_tx.clone(), dry_run)?;

    info!("Все компоненты инициализированы");

    let controller_handle = tokio::spawn(controller.run(events_rx));
    let keyboard_handle = tokio::spawn(async move {
        if let Err(e) = keyboard_listener.run().await {
            error!("Ошибка в KeyboardListener: {}", e);
        }
    });
    let reload_handle = tokio::spawn(async move {
        if let Err(e) = watch_settings_reload(config, dry_run, events_tx).await {
            error!("Перечитывание настроек по SIGHUP недоступно: {}", e);
        }
    });

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    keyboard_handle.abort();
    reload_handle.abort();
    controller_handle.abort();

    // Ожидаем завершения задач (с таймаутом)
    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = keyboard_handle.await;
        let _ = reload_handle.await;
        let _ = controller_handle.await;
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    info!("LangSwitch завершил работу");
    Ok(())
}

/// По SIGHUP перечитать пользовательские настройки и передать их в Controller
async fn watch_settings_reload(
    config: Arc<Config>,
    dry_run: bool,
    events: mpsc::Sender<ControlEvent>,
) -> error::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    while hangup.recv().await.is_some() {
        info!("Получен SIGHUP, перечитываем настройки");
        let event = {
            let store = settings::open_store(&config.settings.path, dry_run);
            reload_event(store.as_ref())
        };
        if events.send(event).await.is_err() {
            break;
        }
    }
    Ok(())
}

/// Событие для Controller с текущими настройками из хранилища
fn reload_event(store: &dyn SettingsStore) -> ControlEvent {
    let current = UserSettings::load(store);
    ControlEvent::Reconfigure {
        gesture: current.gesture,
        show_popup: current.show_popup,
    }
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if format == "full" {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}
