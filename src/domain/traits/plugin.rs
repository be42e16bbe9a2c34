use crate::domain::entities::{Command, Task};

/// Capability contract every hosted extension satisfies
pub trait Plugin: Send + Sync {
    /// Display name, used in logs and help output
    fn name(&self) -> &str;

    fn author(&self) -> Author;

    fn version(&self) -> &str;

    /// Triggered commands, in declaration order
    fn commands(&self) -> &[Command];

    /// Scheduled tasks, in declaration order
    fn tasks(&self) -> &[Task] {
        &[]
    }
}

/// Plugin author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
