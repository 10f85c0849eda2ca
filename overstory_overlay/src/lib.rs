// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory Overlay: transient surfaces above application content.
//!
//! An [`OverlayHost`] owns an [`ElementTree`](overstory_element_tree::ElementTree)
//! and every overlay shown in it. It coordinates:
//!
//! - **Lifecycle.** `create`, `show`, `hide`, `dispose`, with
//!   [`OverlayEvent`]s before and after each transition. Transitions are
//!   played by a [`Renderer`] that may finish them later.
//! - **The cascade.** Cascading overlays (flyouts and menus) form a stack in
//!   which each entry was anchored inside the one below. Showing at an anchor
//!   inside entry `i` first hides everything above `i`; hiding an entry hides
//!   everything above it, tip first and one at a time. Shows requested during
//!   such a collapse wait for it to finish, and only the latest one runs.
//! - **Focus.** Focus moves into an overlay when it shows and back to where it
//!   was when it hides. Focus moving into a lower entry closes the entries
//!   above it; focus leaving the cascade closes all of it.
//! - **Light dismiss.** A click-eater element sits just below the topmost
//!   non-sticky overlay, with the cascade counted as one layer. Pointer input
//!   outside every overlay, a window blur or the back button dismisses
//!   non-sticky overlays.
//!
//! Concrete controls in [`controls`] wrap an [`OverlayId`] and add their own
//! options and command lists.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Rect;
//! use overstory_element_tree::{ElementTree, LocalElement};
//! use overstory_overlay::{Instant, OverlayHost, OverlayOptions};
//!
//! let mut host = OverlayHost::new(ElementTree::new(), Instant);
//! let doc = host.tree().document();
//! let button = host.tree_mut().insert(Some(doc), LocalElement::focusable(Rect::new(0.0, 0.0, 80.0, 24.0)));
//! let menu_el = host.tree_mut().insert(Some(doc), LocalElement::default());
//! let item = host.tree_mut().insert(Some(menu_el), LocalElement::focusable(Rect::new(0.0, 30.0, 80.0, 50.0)));
//! let sub_el = host.tree_mut().insert(Some(doc), LocalElement::default());
//!
//! let cascading = OverlayOptions::default().with_cascading(true);
//! let menu = host.create(menu_el, cascading.clone()).unwrap();
//! let sub = host.create(sub_el, cascading).unwrap();
//!
//! host.focus_changed(Some(button));
//! host.show_at(menu, button);
//! assert_eq!(host.focused(), Some(item));
//! host.show_at(sub, item);
//! assert_eq!(host.cascade(), &[menu, sub]);
//!
//! // Closing the root closes the whole chain and puts focus back.
//! host.hide(menu);
//! assert!(host.cascade().is_empty());
//! assert_eq!(host.focused(), Some(button));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cascade;
pub mod controls;
mod error;
mod events;
mod host;
mod light_dismiss;
mod options;
mod renderer;

pub use cascade::{CascadeManager, Location};
pub use error::OverlayError;
pub use events::{OverlayEvent, OverlayEventKind, Requests};
pub use host::{Key, Listener, OVERLAY_Z_BASE, OverlayHost, OverlayId};
pub use light_dismiss::LightDismissService;
pub use options::{
    AppBarLayout, AppBarOptions, ClosedDisplayMode, OverlayOptions, Placement, VisiblePosition,
};
pub use renderer::{Completion, Deferred, Instant, Renderer, TransitionToken};
