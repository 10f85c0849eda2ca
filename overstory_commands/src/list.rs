// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command list projection.

use alloc::string::ToString;
use alloc::vec::Vec;

use overstory_element_tree::ElementId;
use tracing::debug;

use crate::{Command, CommandError, CommandKind};

/// An ordered list of commands with unique ids.
#[derive(Clone, Debug)]
pub struct CommandList<O> {
    commands: Vec<Command<O>>,
}

impl<O> Default for CommandList<O> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<O: Copy> CommandList<O> {
    /// Build a list, rejecting duplicate ids.
    pub fn new(commands: impl IntoIterator<Item = Command<O>>) -> Result<Self, CommandError> {
        let commands: Vec<_> = commands.into_iter().collect();
        for (i, c) in commands.iter().enumerate() {
            if commands[..i].iter().any(|prev| prev.id == c.id) {
                return Err(CommandError::DuplicateCommandId { id: c.id.clone() });
            }
        }
        Ok(Self { commands })
    }

    /// All commands in order.
    pub fn commands(&self) -> &[Command<O>] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Look up a command by id.
    pub fn get_command_by_id(&self, id: &str) -> Option<&Command<O>> {
        self.commands.iter().find(|c| c.id == id)
    }

    /// The command hosted by `element`.
    pub fn command_at_element(&self, element: ElementId) -> Option<&Command<O>> {
        self.commands.iter().find(|c| c.element == Some(element))
    }

    /// Commands that are not hidden, in order.
    pub fn visible(&self) -> impl Iterator<Item = &Command<O>> + '_ {
        self.commands.iter().filter(|c| !c.hidden)
    }

    /// The overlay chained by command `id`, if it is a visible flyout command.
    pub fn flyout_target(&self, id: &str) -> Option<O> {
        self.get_command_by_id(id)
            .filter(|c| c.kind == CommandKind::Flyout && !c.hidden)
            .and_then(|c| c.flyout)
    }

    /// Unhide the named commands. Works while the owner is open.
    ///
    /// Fails without changing anything if an id is unknown.
    pub fn show_commands(&mut self, ids: &[&str]) -> Result<(), CommandError> {
        self.check_known(ids)?;
        self.set_many(ids, false);
        Ok(())
    }

    /// Hide the named commands. Works while the owner is open.
    ///
    /// Fails without changing anything if an id is unknown.
    pub fn hide_commands(&mut self, ids: &[&str]) -> Result<(), CommandError> {
        self.check_known(ids)?;
        self.set_many(ids, true);
        Ok(())
    }

    /// Show exactly the named commands and hide every other one.
    pub fn show_only_commands(&mut self, ids: &[&str]) -> Result<(), CommandError> {
        self.check_known(ids)?;
        for c in &mut self.commands {
            c.hidden = !ids.contains(&c.id.as_str());
        }
        debug!(shown = ids.len(), total = self.commands.len(), "show only commands");
        Ok(())
    }

    /// Set `hidden` on one command directly.
    ///
    /// Fails with [`CommandError::CannotChangeHiddenProperty`] while the
    /// owning surface is open and the value would change.
    pub fn set_hidden(&mut self, id: &str, hidden: bool, owner_open: bool) -> Result<(), CommandError> {
        let command = self
            .commands
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CommandError::UnknownCommand { id: id.to_string() })?;
        if command.hidden == hidden {
            return Ok(());
        }
        if owner_open {
            return Err(CommandError::CannotChangeHiddenProperty { id: id.to_string() });
        }
        command.hidden = hidden;
        Ok(())
    }

    /// Flip the selected state of a toggle command and return the new state.
    pub fn toggle(&mut self, id: &str) -> Result<bool, CommandError> {
        let command = self
            .commands
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CommandError::UnknownCommand { id: id.to_string() })?;
        if command.kind == CommandKind::Toggle {
            command.selected = !command.selected;
        }
        Ok(command.selected)
    }

    fn check_known(&self, ids: &[&str]) -> Result<(), CommandError> {
        match ids.iter().find(|id| self.get_command_by_id(id).is_none()) {
            Some(id) => Err(CommandError::UnknownCommand { id: id.to_string() }),
            None => Ok(()),
        }
    }

    fn set_many(&mut self, ids: &[&str], hidden: bool) {
        for c in self.commands.iter_mut().filter(|c| ids.contains(&c.id.as_str())) {
            c.hidden = hidden;
        }
        debug!(count = ids.len(), hidden, "set command visibility");
    }
}
