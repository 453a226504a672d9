mod dbus;
mod log_notifier;
mod token;
mod r#trait;

pub use self::log_notifier::LogNotifier;
pub use self::r#trait::{create_notifier, NotificationSink};
pub use self::token::{NotificationToken, NotificationTokens};
