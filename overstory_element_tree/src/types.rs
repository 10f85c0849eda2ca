// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the element tree: identifiers, flags, and local data.

use kurbo::Rect;

/// Identifier for an element in the tree (generational).
///
/// A removed element's slot may be reused, but the generation is bumped, so a
/// stale `ElementId` never aliases the new occupant.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Slot index, stable for the lifetime of the element.
    pub const fn slot(self) -> u32 {
        self.0
    }

    /// Generation of the slot when this id was handed out.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Element flags controlling rendering, picking, focus, and ancestry access.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Element is rendered. An element whose ancestor is not visible is not rendered either.
        const VISIBLE   = 0b0000_0001;
        /// Element participates in hit testing.
        const PICKABLE  = 0b0000_0010;
        /// Element can receive keyboard focus.
        const FOCUSABLE = 0b0000_0100;
        /// Descendants of this element cannot observe anything above it.
        ///
        /// Models a frame whose content lives in another origin: an ancestor
        /// walk that starts inside the frame stops here, and containment
        /// questions crossing it cannot be answered.
        const OPAQUE    = 0b0000_1000;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Per-element local data.
#[derive(Clone, Debug)]
pub struct LocalElement {
    /// Bounds in document coordinates.
    pub bounds: Rect,
    /// Stacking order. Higher is drawn on top.
    pub z_index: i32,
    /// Rendering, picking and focus flags.
    pub flags: ElementFlags,
    /// Optional explicit tab order, consulted by focus traversal.
    pub tab_order: Option<i32>,
}

impl Default for LocalElement {
    fn default() -> Self {
        Self {
            bounds: Rect::ZERO,
            z_index: 0,
            flags: ElementFlags::default(),
            tab_order: None,
        }
    }
}

impl LocalElement {
    /// A visible, pickable element with the given bounds.
    pub fn with_bounds(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// A visible, pickable and focusable element with the given bounds.
    pub fn focusable(bounds: Rect) -> Self {
        Self {
            bounds,
            flags: ElementFlags::default() | ElementFlags::FOCUSABLE,
            ..Self::default()
        }
    }

    /// Set the stacking order.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Replace the flags.
    pub fn with_flags(mut self, flags: ElementFlags) -> Self {
        self.flags = flags;
        self
    }
}
