// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use core::fmt;

/// Errors raised while building or mutating a [`CommandList`](crate::CommandList).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// A command `type` string did not name a known kind.
    InvalidCommandType {
        /// The rejected value.
        value: String,
    },
    /// Two commands in one list share an id.
    DuplicateCommandId {
        /// The repeated id.
        id: String,
    },
    /// No command with this id exists in the list.
    UnknownCommand {
        /// The id that was looked up.
        id: String,
    },
    /// `hidden` cannot be changed directly while the owning surface is open.
    ///
    /// Use [`CommandList::show_commands`](crate::CommandList::show_commands) and friends instead.
    CannotChangeHiddenProperty {
        /// The command whose `hidden` flag was being changed.
        id: String,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCommandType { value } => {
                write!(f, "invalid command type {value:?}")
            }
            Self::DuplicateCommandId { id } => write!(f, "duplicate command id {id:?}"),
            Self::UnknownCommand { id } => write!(f, "no command with id {id:?}"),
            Self::CannotChangeHiddenProperty { id } => write!(
                f,
                "cannot change the hidden property of command {id:?} while its owner is open; \
                 use show_commands or hide_commands instead"
            ),
        }
    }
}

impl core::error::Error for CommandError {}
