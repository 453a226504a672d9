use crate::config::Config;
use crate::error::Result;
use crate::events::ControlEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Trait for host key-event feeds.
///
/// A listener pushes `ControlEvent::Key` transitions into the controller's
/// channel in the order the host delivers them.
#[async_trait::async_trait]
pub trait KeyboardListenerTrait {
    /// Run the keyboard listener
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate keyboard listener based on the dry_run flag
pub fn create_keyboard_listener(
    config: Arc<Config>,
    events: mpsc::Sender<ControlEvent>,
    dry_run: bool,
) -> Result<Box<dyn KeyboardListenerTrait + Send>> {
    if dry_run {
        Ok(Box::new(super::dry_keyboard_listener::DryRunKeyboardListener::new(
            config, events,
        )))
    } else {
        Ok(Box::new(super::keyboard_listener::RealKeyboardListener::new(
            config, events,
        )?))
    }
}
