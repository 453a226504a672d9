use crate::error::Result;
use crate::events::{InputSource, SourceList};
use crate::langswitch_error;
use serde::Deserialize;
use std::collections::HashMap;

use super::command::HostCommand;
use super::labeled_source;
use super::r#trait::InputSourceService;

/// Раскладки клавиатуры sway через `swaymsg`
pub struct SwaySourceService {
    command: HostCommand,
    display_names: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SwayInput {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    xkb_layout_names: Vec<String>,
    #[serde(default)]
    xkb_active_layout_index: Option<usize>,
}

/// Раскладки первой клавиатуры: (имена, индекс активной)
fn parse_keyboard_layouts(json: &str) -> Result<(Vec<String>, Option<usize>)> {
    let inputs: Vec<SwayInput> = serde_json::from_str(json).map_err(|e| {
        langswitch_error!(host_unavailable, "Не удалось разобрать вывод swaymsg: {}", e)
    })?;

    inputs
        .into_iter()
        .find(|input| input.kind == "keyboard" && !input.xkb_layout_names.is_empty())
        .map(|input| (input.xkb_layout_names, input.xkb_active_layout_index))
        .ok_or_else(|| langswitch_error!(host_unavailable, "sway не сообщил ни одной клавиатуры с раскладками"))
}

impl SwaySourceService {
    pub fn new(display_names: HashMap<String, String>) -> Self {
        Self {
            command: HostCommand::new("swaymsg"),
            display_names,
        }
    }

    fn keyboard_layouts(&self) -> Result<(Vec<String>, Option<usize>)> {
        let stdout = self.command.run(&["-t", "get_inputs", "--raw"])?;
        parse_keyboard_layouts(&stdout)
    }
}

impl InputSourceService for SwaySourceService {
    fn name(&self) -> &'static str {
        "sway"
    }

    fn current_source(&self) -> Result<InputSource> {
        let (names, active) = self.keyboard_layouts()?;
        active
            .and_then(|index| names.get(index))
            .map(|name| labeled_source(name, &self.display_names))
            .ok_or_else(|| langswitch_error!(host_unavailable, "sway не сообщил активную раскладку"))
    }

    fn list_sources(&self) -> Result<SourceList> {
        let (names, _) = self.keyboard_layouts()?;
        Ok(names
            .iter()
            .map(|name| labeled_source(name, &self.display_names))
            .collect())
    }

    fn activate(&self, source: &InputSource) -> Result<()> {
        // sway переключает раскладки по индексу, поэтому ищем его заново
        let (names, _) = self.keyboard_layouts()?;
        let index = names
            .iter()
            .position(|name| name == source.id.as_str())
            .ok_or_else(|| langswitch_error!(host_unavailable, "Раскладка {} исчезла из sway", source))?;

        let index = index.to_string();
        self.command
            .run(&["input", "type:keyboard", "xkb_switch_layout", &index])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET_INPUTS: &str = r#"[
        {"identifier": "1267:12377:ELAN_Touchpad", "type": "touchpad", "name": "ELAN Touchpad"},
        {"identifier": "1:1:AT_Translated_Set_2_keyboard", "type": "keyboard",
         "xkb_layout_names": ["English (US)", "Russian"], "xkb_active_layout_index": 1},
        {"identifier": "2:2:Other", "type": "keyboard",
         "xkb_layout_names": ["German"], "xkb_active_layout_index": 0}
    ]"#;

    #[test]
    fn test_parse_first_keyboard() {
        let (names, active) = parse_keyboard_layouts(GET_INPUTS).unwrap();
        assert_eq!(names, vec!["English (US)", "Russian"]);
        assert_eq!(active, Some(1));
    }

    #[test]
    fn test_parse_without_keyboards_fails() {
        let json = r#"[{"identifier": "x", "type": "pointer"}]"#;
        assert!(parse_keyboard_layouts(json).is_err());
        assert!(parse_keyboard_layouts("not json").is_err());
    }
}
