// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use core::fmt;

use overstory_commands::CommandError;
use overstory_element_tree::ElementId;

/// Errors from constructing overlays and mutating their commands.
///
/// Lifecycle misuse (showing a disposed overlay, hiding a hidden one, stale
/// transition tokens) is never an error; it is logged and ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayError {
    /// The element already hosts a control.
    DuplicateControl {
        /// The host element.
        element: ElementId,
    },
    /// The element id does not refer to a live element.
    StaleElement {
        /// The stale id.
        element: ElementId,
    },
    /// A strictly validated option had an unrecognized value.
    InvalidOption {
        /// Option name.
        option: &'static str,
        /// The rejected value.
        value: String,
    },
    /// A command's `hidden` flag cannot be set while its overlay is open.
    CannotChangeHiddenProperty {
        /// Command id.
        command: String,
    },
    /// No such command on this overlay.
    UnknownCommand {
        /// Command id.
        command: String,
    },
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateControl { element } => {
                write!(f, "element {element:?} already hosts a control")
            }
            Self::StaleElement { element } => write!(f, "element {element:?} is not alive"),
            Self::InvalidOption { option, value } => {
                write!(f, "invalid value {value:?} for option `{option}`")
            }
            Self::CannotChangeHiddenProperty { command } => write!(
                f,
                "cannot change the hidden property of command {command:?} while the overlay is open"
            ),
            Self::UnknownCommand { command } => write!(f, "no command with id {command:?}"),
        }
    }
}

impl core::error::Error for OverlayError {}

impl From<CommandError> for OverlayError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::InvalidCommandType { value } => Self::InvalidOption {
                option: "type",
                value,
            },
            CommandError::DuplicateCommandId { id } => Self::InvalidOption {
                option: "commands",
                value: id,
            },
            CommandError::UnknownCommand { id } => Self::UnknownCommand { command: id },
            CommandError::CannotChangeHiddenProperty { id } => {
                Self::CannotChangeHiddenProperty { command: id }
            }
        }
    }
}
