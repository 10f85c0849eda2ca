// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory Element Tree: the document model overlay controls are hosted in.
//!
//! Overlay coordination only needs a handful of facts about the document:
//! which element contains which, whether an element is still attached, what
//! sits on top at a given point, and which elements can take focus. This
//! crate provides exactly that over a generational arena, so the overlay
//! logic can be exercised headlessly and adapted to a real DOM by mirroring
//! the relevant elements.
//!
//! - [`ElementTree`]: container with a document root, insert/remove/detach/reparent.
//! - [`LocalElement`]: per-element bounds, z-order, flags, and tab order.
//! - [`ElementFlags`]: visibility, picking, focusability, and opaque (cross-origin) boundaries.
//! - [`ElementId`]: generational handle of an element.
//! - [`QueryFilter`]: restricts hit testing results.
//!
//! Key operations:
//! - [`ElementTree::contains`] answers containment, returning `None` when an
//!   opaque boundary makes the answer unknowable.
//! - [`ElementTree::is_connected`] tells whether an element is attached under the document root.
//! - [`ElementTree::hit_test_point`] picks the topmost element under a point
//!   (higher z, then deeper, then newer).
//! - [`ElementTree::descendants`], [`ElementTree::next_depth_first`] and
//!   [`ElementTree::prev_depth_first`] walk the tree in document order.
//!
//! This is not a layout engine: bounds are supplied by the host, in document coordinates.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod tree;
mod types;

pub use tree::{Descendants, ElementTree, Hit, QueryFilter};
pub use types::{ElementFlags, ElementId, LocalElement};
