use std::collections::BTreeMap;

use thiserror::Error;

/// Environment overrides applied to every child process of the wrapped tool.
///
/// Variables are layered on top of the inherited environment of the current
/// process; the current process environment itself is never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolContext {
    vars: BTreeMap<String, String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("environment variable name is empty")]
    EmptyName,
    #[error("environment variable name {name:?} contains '=' or NUL")]
    InvalidName { name: String },
    #[error("value for environment variable {name} contains NUL")]
    InvalidValue { name: String },
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ContextError> {
        let name = name.into();
        let value = value.into();
        if name.is_empty() {
            return Err(ContextError::EmptyName);
        }
        if name.contains('=') || name.contains('\0') {
            return Err(ContextError::InvalidName { name });
        }
        if value.contains('\0') {
            return Err(ContextError::InvalidValue { name });
        }
        self.vars.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
