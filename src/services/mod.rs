pub mod controller;
pub mod gesture_detector;
pub mod input_source;
pub mod keyboard_listener;
pub mod notifier;
pub mod source_directory;

pub use controller::Controller;
pub use gesture_detector::{
    GestureConfig, GestureDetector, GestureOutcome, DEFAULT_MAX_DURATION_MS, DEFAULT_MIN_DURATION_MS,
};
pub use input_source::create_input_source_service;
pub use keyboard_listener::create_keyboard_listener;
pub use notifier::create_notifier;
pub use source_directory::{InputSourceDirectory, SkipSet, DEFAULT_SKIP_SOURCES};
