use crate::config::Config;
use crate::error::{LangSwitchError, Result};
use crate::events::{InputSource, SourceList};
use std::sync::Arc;
use tracing::info;

use super::dry_run::DryRunSourceService;
use super::sway::SwaySourceService;
use super::xkb_switch::XkbSwitchSourceService;

/// Trait for host input-source services.
///
/// Calls are synchronous and bounded; if the host blocks, the caller blocks.
pub trait InputSourceService: Send {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Currently active source
    fn current_source(&self) -> Result<InputSource>;

    /// Ordered list of enabled sources, enumerated fresh on every call
    fn list_sources(&self) -> Result<SourceList>;

    /// Make `source` the active one
    fn activate(&self, source: &InputSource) -> Result<()>;
}

/// Factory function to create the input-source backend named in the config
pub fn create_input_source_service(
    config: Arc<Config>,
    dry_run: bool,
) -> Result<Box<dyn InputSourceService>> {
    let backend = if dry_run {
        "dry-run"
    } else {
        config.sources.backend.as_str()
    };
    info!("Бэкенд источников ввода: {}", backend);

    match backend {
        "dry-run" => Ok(Box::new(DryRunSourceService::from_names(
            &config.sources.dry_run_sources,
        )?)),
        "xkb-switch" => Ok(Box::new(XkbSwitchSourceService::new(
            config.sources.display_names.clone(),
        ))),
        "sway" => Ok(Box::new(SwaySourceService::new(
            config.sources.display_names.clone(),
        ))),
        other => Err(LangSwitchError::Internal(format!(
            "Неизвестный бэкенд источников ввода: {}",
            other
        ))),
    }
}
