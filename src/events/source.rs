use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Идентификатор источника ввода, выданный хостом (имя раскладки, id движка и т.п.)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Источник ввода. Идентичность определяется только `id`,
/// отображаемое имя может меняться между запросами к хосту.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSource {
    pub id: SourceId,
    pub display_name: String,
}

/// Списки источников обычно короткие
pub type SourceList = SmallVec<[InputSource; 8]>;

impl InputSource {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: SourceId::new(id),
            display_name: display_name.into(),
        }
    }

    /// Источник, у которого отображаемое имя совпадает с идентификатором
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name)
    }
}

impl PartialEq for InputSource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for InputSource {}

impl Hash for InputSource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display_name == self.id.0 {
            write!(f, "\"{}\"", self.display_name)
        } else {
            write!(f, "\"{}\" ({})", self.display_name, self.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_ignores_display_name() {
        let a = InputSource::new("us", "English (US)");
        let b = InputSource::new("us", "English");
        let c = InputSource::new("ru", "English (US)");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<InputSource> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(InputSource::named("us").to_string(), "\"us\"");
        assert_eq!(InputSource::new("ru", "Russian").to_string(), "\"Russian\" (ru)");
    }
}
