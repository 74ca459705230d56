use std::collections::HashMap;

use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

pub struct CommandEntry {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            aliases: &[],
            description,
            usage,
            handler,
        }
    }

    pub fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }
}

/// Shell commands in registration order. Aliases resolve to their command's
/// entry; a later registration never steals an existing name.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
    lookup: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: CommandEntry) {
        if self.lookup.contains_key(entry.name) {
            tracing::debug!(command = entry.name, "command already registered");
            return;
        }
        let index = self.entries.len();
        self.lookup.insert(entry.name, index);
        for alias in entry.aliases {
            self.lookup.entry(alias).or_insert(index);
        }
        self.entries.push(entry);
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.lookup.get(name).map(|index| &self.entries[*index])
    }

    pub fn list(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Canonical names followed by aliases, for completion and suggestions.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries
            .iter()
            .map(|entry| entry.name)
            .chain(self.entries.iter().flat_map(|entry| entry.aliases.iter().copied()))
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.get(name).map(|entry| entry.handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
        Ok(())
    }

    #[test]
    fn aliases_resolve_to_their_command() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("next", "Advance", "next", noop).with_aliases(&["n"]));
        registry.register(CommandEntry::new("exit", "Quit", "exit", noop).with_aliases(&["quit", "n"]));

        assert_eq!(registry.get("n").map(|entry| entry.name), Some("next"));
        assert_eq!(registry.get("quit").map(|entry| entry.name), Some("exit"));
        assert!(registry.get("missing").is_none());
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["next", "exit", "n", "quit", "n"]
        );
    }

    #[test]
    fn duplicate_registration_keeps_first_entry() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("help", "First", "help", noop));
        registry.register(CommandEntry::new("help", "Second", "help", noop));
        assert_eq!(registry.list().len(), 1);
        assert_eq!(registry.get("help").map(|entry| entry.description), Some("First"));
    }
}
