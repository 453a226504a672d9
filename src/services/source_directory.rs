use crate::debug_if_enabled;
use crate::error::{LangSwitchError, Result};
use crate::events::InputSource;
use crate::services::input_source::InputSourceService;
use std::collections::HashSet;
use tracing::{info, warn};

/// Системные псевдо-источники, которые никогда не выбираются следующими
pub const DEFAULT_SKIP_SOURCES: &[&str] = &[
    "Emoji & Symbols",
    "com.apple.PressAndHold",
    "Dictation",
    "EmojiFunctionRowIM_Extension",
];

/// Неизменяемый набор отображаемых имён для пропуска
#[derive(Debug, Clone, Default)]
pub struct SkipSet {
    names: HashSet<String>,
}

impl SkipSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.names.contains(display_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Индекс следующего подходящего источника после `current`.
///
/// Просматривает не более `sources.len()` кандидатов, последним из них
/// оказывается сам `current`.
pub fn next_eligible_index(
    sources: &[InputSource],
    current: usize,
    mut is_skipped: impl FnMut(&InputSource) -> bool,
) -> Option<usize> {
    let count = sources.len();
    (1..=count)
        .map(|step| (current + step) % count)
        .find(|&index| !is_skipped(&sources[index]))
}

pub struct InputSourceDirectory {
    service: Box<dyn InputSourceService>,
    skip: SkipSet,
}

impl InputSourceDirectory {
    pub fn new(service: Box<dyn InputSourceService>, skip: SkipSet) -> Self {
        info!(
            "Инициализация InputSourceDirectory (бэкенд: {}, пропускаем {} имён)",
            service.name(),
            skip.len()
        );
        Self { service, skip }
    }

    /// Переключиться на следующий подходящий источник и вернуть его имя.
    ///
    /// Источники перечисляются заново при каждом вызове.
    pub fn cycle_to_next(&self) -> Result<String> {
        let current = self.service.current_source()?;

        let sources = self.service.list_sources()?;
        if sources.is_empty() {
            return Err(LangSwitchError::HostUnavailable(
                "Список источников ввода пуст".to_string(),
            ));
        }

        let current_index = sources
            .iter()
            .position(|source| *source == current)
            .ok_or_else(|| LangSwitchError::CurrentSourceNotFound(current.id.to_string()))?;

        let next_index = next_eligible_index(&sources, current_index, |source| {
            let skipped = self.skip.contains(&source.display_name);
            if skipped {
                debug_if_enabled!("Пропускаем системный источник {}", source);
            }
            skipped
        })
        .ok_or(LangSwitchError::AllSourcesSkipped(sources.len()))?;

        let next = &sources[next_index];
        if next_index == current_index {
            warn!("Других подходящих источников нет, остаёмся на {}", next);
        }

        self.service.activate(next)?;
        info!("Переключено: {} -> {}", current, next);

        Ok(next.display_name.clone())
    }
}
