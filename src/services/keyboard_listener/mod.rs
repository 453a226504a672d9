mod dry_keyboard_listener;
mod keyboard_listener;
mod tracked_key_state;
mod r#trait;

pub use self::r#trait::{create_keyboard_listener, KeyboardListenerTrait};
pub use self::tracked_key_state::TrackedKeyState;
