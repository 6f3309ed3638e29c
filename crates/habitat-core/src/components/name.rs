use std::fmt;

use crate::ecs::Component;

/// Display name: the details-panel heading for a module, the glTF node name for a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Falls back to `id` when `name` is blank
    pub fn or_id(name: &str, id: &str) -> Self {
        Self::new(if name.trim().is_empty() { id } else { name })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl Component for Name {}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
