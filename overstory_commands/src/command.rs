// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use overstory_element_tree::ElementId;

use crate::CommandError;

/// What a command does when invoked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CommandKind {
    /// A push button.
    #[default]
    Button,
    /// A button with a selected state.
    Toggle,
    /// A visual divider; never invocable.
    Separator,
    /// Opens a chained flyout anchored at the command.
    Flyout,
    /// Hosts arbitrary content.
    Content,
}

impl CommandKind {
    /// Parse a command kind. Unknown values are rejected.
    pub fn parse(value: &str) -> Result<Self, CommandError> {
        match value {
            "button" => Ok(Self::Button),
            "toggle" => Ok(Self::Toggle),
            "separator" => Ok(Self::Separator),
            "flyout" => Ok(Self::Flyout),
            "content" => Ok(Self::Content),
            _ => Err(CommandError::InvalidCommandType {
                value: value.to_string(),
            }),
        }
    }

    /// The string form accepted by [`CommandKind::parse`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Toggle => "toggle",
            Self::Separator => "separator",
            Self::Flyout => "flyout",
            Self::Content => "content",
        }
    }

    /// Whether invoking a command of this kind does anything.
    pub const fn is_invocable(self) -> bool {
        !matches!(self, Self::Separator | Self::Content)
    }
}

impl FromStr for CommandKind {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command descriptor.
///
/// `O` identifies the overlay a [`CommandKind::Flyout`] command opens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command<O> {
    /// Identifier, unique within a list.
    pub id: String,
    /// Kind of command.
    pub kind: CommandKind,
    /// Hidden commands are not shown and cannot chain.
    pub hidden: bool,
    /// Toggle state; only meaningful for [`CommandKind::Toggle`].
    pub selected: bool,
    /// Element hosting the command, used as the anchor for chained flyouts.
    pub element: Option<ElementId>,
    /// Overlay opened by a flyout command.
    pub flyout: Option<O>,
}

impl<O> Command<O> {
    /// A visible command with no element and no flyout.
    pub fn new(id: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            id: id.into(),
            kind,
            hidden: false,
            selected: false,
            element: None,
            flyout: None,
        }
    }

    /// Set the hosting element.
    pub fn with_element(mut self, element: ElementId) -> Self {
        self.element = Some(element);
        self
    }

    /// Set the overlay this command opens.
    pub fn with_flyout(mut self, flyout: O) -> Self {
        self.flyout = Some(flyout);
        self
    }

    /// Set the initial hidden state.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}
