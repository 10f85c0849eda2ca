// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory Commands: command descriptors for menus and app bars.
//!
//! A [`CommandList`] is the data an overlay's cascade and dismiss logic read:
//! which commands are visible, and which visible [`CommandKind::Flyout`]
//! command chains to which overlay.
//!
//! ```rust
//! use overstory_commands::{Command, CommandKind, CommandList};
//!
//! let mut commands = CommandList::new([
//!     Command::new("open", CommandKind::Button),
//!     Command::new("recent", CommandKind::Flyout).with_flyout(1_u32),
//! ])
//! .unwrap();
//!
//! assert_eq!(commands.flyout_target("recent"), Some(1));
//! commands.show_only_commands(&["open"]).unwrap();
//! assert_eq!(commands.flyout_target("recent"), None);
//! ```
//!
//! ## Features
//!
//! - `std` (default): `std` support for dependencies.
//! - `serde`: `Serialize`/`Deserialize` for [`CommandKind`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod command;
mod error;
mod list;

pub use command::{Command, CommandKind};
pub use error::CommandError;
pub use list::CommandList;
