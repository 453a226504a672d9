use crate::error::Result;
use crate::events::{InputSource, SourceList};
use crate::langswitch_error;
use std::collections::HashMap;
use tracing::debug;

use super::command::HostCommand;
use super::labeled_source;
use super::r#trait::InputSourceService;

/// Раскладки XKB через утилиту `xkb-switch` (X11)
pub struct XkbSwitchSourceService {
    command: HostCommand,
    display_names: HashMap<String, String>,
}

impl XkbSwitchSourceService {
    pub fn new(display_names: HashMap<String, String>) -> Self {
        Self {
            command: HostCommand::new("xkb-switch"),
            display_names,
        }
    }
}

fn parse_layout_list(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

impl InputSourceService for XkbSwitchSourceService {
    fn name(&self) -> &'static str {
        "xkb-switch"
    }

    fn current_source(&self) -> Result<InputSource> {
        let stdout = self.command.run(&["-p"])?;
        let layout = stdout.trim();
        if layout.is_empty() {
            return Err(langswitch_error!(host_unavailable, "xkb-switch -p вернул пустую строку"));
        }
        Ok(labeled_source(layout, &self.display_names))
    }

    fn list_sources(&self) -> Result<SourceList> {
        let stdout = self.command.run(&["-l"])?;
        let sources: SourceList = parse_layout_list(&stdout)
            .into_iter()
            .map(|layout| labeled_source(layout, &self.display_names))
            .collect();
        debug!("xkb-switch: {} раскладок", sources.len());
        Ok(sources)
    }

    fn activate(&self, source: &InputSource) -> Result<()> {
        self.command.run(&["-s", source.id.as_str()])?;
        Ok(())
    }
}
