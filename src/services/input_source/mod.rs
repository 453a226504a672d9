//! Host input-source service: enumeration, current source and activation.
//!
//! Backends here only talk to the host. Choosing the next source and skip
//! filtering belong to `InputSourceDirectory`.

mod command;
mod dry_run;
mod sway;
mod xkb_switch;
mod r#trait;

pub use self::dry_run::DryRunSourceService;
pub use self::r#trait::{create_input_source_service, InputSourceService};

use crate::events::InputSource;
use std::collections::HashMap;

/// Подставить человекочитаемое имя из `[sources.display_names]`
pub(crate) fn labeled_source(id: &str, display_names: &HashMap<String, String>) -> InputSource {
    match display_names.get(id) {
        Some(name) => InputSource::new(id, name.clone()),
        None => InputSource::named(id),
    }
}
