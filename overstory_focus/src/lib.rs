// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory Focus: focus capture, restoration and traversal for transient surfaces.
//!
//! Overlays take focus when they open and must give it back when they close.
//! This crate keeps that bookkeeping separate from the overlay state machine:
//!
//! - [`FocusTracker`] remembers the focused element and, per open surface, the
//!   element that was focused when it opened. [`FocusTracker::restore`] puts
//!   focus back, falling back to other candidates when the original element
//!   has been detached or hidden.
//! - [`Containment`] is the seam to the document: containment, connectedness
//!   and focusability. Containment answers may be unknown (`None`), in which
//!   case callers do nothing.
//! - [`FocusPolicy`] / [`DefaultPolicy`] pick the next element for Tab,
//!   Shift+Tab and the arrow keys from a [`FocusSpace`] of [`FocusEntry`]s.
//!   Overlays trap focus by traversing with [`WrapMode::Scope`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Rect;
//! use overstory_focus::{DefaultPolicy, FocusEntry, FocusPolicy, FocusSpace, Navigation};
//!
//! let entries = vec![
//!     FocusEntry::new(1_u32, Rect::new(0.0, 0.0, 10.0, 10.0)),
//!     FocusEntry::new(2_u32, Rect::new(20.0, 0.0, 30.0, 10.0)),
//! ];
//! let space = FocusSpace { nodes: &entries };
//! let policy = DefaultPolicy::default();
//!
//! assert_eq!(policy.next(1, Navigation::Next, &space), Some(2));
//! // Focus is trapped: Tab from the last entry wraps to the first.
//! assert_eq!(policy.next(2, Navigation::Next, &space), Some(1));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `kurbo`.
//! - `libm`: `no_std` builds relying on `libm` for floating-point math.
//! - `element_tree_adapter` (default): implements [`Containment`] for
//!   `overstory_element_tree::ElementTree` and adds helpers in
//!   [`adapters::element_tree`] that build focus spaces from a subtree.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
mod policy;
mod tracker;

pub use policy::{DefaultPolicy, FocusEntry, FocusPolicy, FocusSpace, Navigation, WrapMode};
pub use tracker::{Containment, FocusTracker, Restored};
