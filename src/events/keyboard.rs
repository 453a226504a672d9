use std::fmt;
use std::time::Instant;

/// Переход отслеживаемой клавиши.
///
/// `timestamp` измеряется в секундах от монотонной эпохи слушателя.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyTransitionEvent {
    pub is_tracked_key_active: bool,
    pub timestamp: f64,
}

impl KeyTransitionEvent {
    pub fn new(is_tracked_key_active: bool, timestamp: f64) -> Self {
        Self {
            is_tracked_key_active,
            timestamp,
        }
    }

    #[cfg(test)]
    pub fn down(timestamp: f64) -> Self {
        Self::new(true, timestamp)
    }

    #[cfg(test)]
    pub fn up(timestamp: f64) -> Self {
        Self::new(false, timestamp)
    }

    /// Событие с меткой времени относительно `epoch`
    pub fn since(epoch: Instant, is_tracked_key_active: bool) -> Self {
        Self::new(is_tracked_key_active, epoch.elapsed().as_secs_f64())
    }
}

impl fmt::Display for KeyTransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_tracked_key_active { "down" } else { "up" };
        write!(f, "{} @ {:.3}s", state, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(KeyTransitionEvent::down(1.0).is_tracked_key_active);
        assert!(!KeyTransitionEvent::up(1.5).is_tracked_key_active);
        assert_eq!(KeyTransitionEvent::up(1.5).timestamp, 1.5);
    }

    #[test]
    fn test_since_epoch_is_monotonic() {
        let epoch = Instant::now();
        let first = KeyTransitionEvent::since(epoch, true);
        let second = KeyTransitionEvent::since(epoch, false);
        assert!(first.timestamp >= 0.0);
        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyTransitionEvent::down(0.25).to_string(), "down @ 0.250s");
    }
}
