use std::collections::BTreeMap;

use crate::command::Command;
use crate::error::RegistryError;

/// Collects commands into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    commands: BTreeMap<(&'static str, &'static str), Command>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the (section, verb) pair is
    /// already registered.
    pub fn register(&mut self, command: Command) -> Result<&mut Self, RegistryError> {
        let key = (command.section, command.verb);
        if self.commands.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                section: command.section,
                verb: command.verb,
            });
        }
        self.commands.insert(key, command);
        Ok(self)
    }

    /// Add every command of `commands`.
    pub fn register_all(
        &mut self,
        commands: impl IntoIterator<Item = Command>,
    ) -> Result<&mut Self, RegistryError> {
        for command in commands {
            self.register(command)?;
        }
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            commands: self.commands,
        }
    }
}

/// The immutable command table, keyed by (section, verb).
#[derive(Debug)]
pub struct Registry {
    commands: BTreeMap<(&'static str, &'static str), Command>,
}

impl Registry {
    /// The registry holding every nl802154 command.
    pub fn standard() -> Result<Self, RegistryError> {
        let mut builder = RegistryBuilder::new();
        builder
            .register_all(crate::commands::phy::COMMANDS.iter().copied())?
            .register_all(crate::commands::mac::COMMANDS.iter().copied())?
            .register_all(crate::commands::security::COMMANDS.iter().copied())?;
        Ok(builder.build())
    }

    /// Look up a command.
    pub fn lookup(&self, section: &str, verb: &str) -> Option<&Command> {
        self.commands
            .iter()
            .find(|((s, v), _)| *s == section && *v == verb)
            .map(|(_, command)| command)
    }

    /// Return an [`Iterator`] over the commands, sorted by section and verb.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
