use crate::error::{LangSwitchError, Result};
use crate::events::{InputSource, SourceList};
use parking_lot::Mutex;
use tracing::info;

use super::r#trait::InputSourceService;

/// Источники ввода в памяти для режима сухого запуска
pub struct DryRunSourceService {
    sources: SourceList,
    current: Mutex<usize>,
}

impl DryRunSourceService {
    pub fn new(sources: SourceList) -> Result<Self> {
        if sources.is_empty() {
            return Err(LangSwitchError::Internal(
                "Для dry-run нужен хотя бы один источник ввода".to_string(),
            ));
        }
        Ok(Self {
            sources,
            current: Mutex::new(0),
        })
    }

    pub fn from_names(names: &[String]) -> Result<Self> {
        Self::new(names.iter().map(InputSource::named).collect())
    }
}

impl InputSourceService for DryRunSourceService {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    fn current_source(&self) -> Result<InputSource> {
        Ok(self.sources[*self.current.lock()].clone())
    }

    fn list_sources(&self) -> Result<SourceList> {
        Ok(self.sources.clone())
    }

    fn activate(&self, source: &InputSource) -> Result<()> {
        let index = self
            .sources
            .iter()
            .position(|candidate| candidate == source)
            .ok_or_else(|| LangSwitchError::HostUnavailable(format!("Нет источника {}", source)))?;

        info!("[DRY RUN] Активирован источник ввода {}", source);
        *self.current.lock() = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_changes_current() {
        let service = DryRunSourceService::from_names(&["us".to_string(), "ru".to_string()]).unwrap();
        assert_eq!(service.current_source().unwrap().id.as_str(), "us");

        service.activate(&InputSource::named("ru")).unwrap();
        assert_eq!(service.current_source().unwrap().id.as_str(), "ru");

        assert!(service.activate(&InputSource::named("de")).is_err());
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(DryRunSourceService::from_names(&[]).is_err());
    }
}
