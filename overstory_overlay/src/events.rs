// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle notifications and the requests handlers may make in response.

use alloc::vec::Vec;

use overstory_element_tree::ElementId;

use crate::OverlayId;

/// Which lifecycle step an [`OverlayEvent`] brackets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OverlayEventKind {
    /// The overlay is about to show.
    BeforeShow,
    /// The overlay finished showing and holds focus.
    AfterShow,
    /// The overlay is about to hide.
    BeforeHide,
    /// The overlay finished hiding.
    AfterHide,
    /// The overlay was disposed.
    Disposed,
}

/// A lifecycle notification. Events do not bubble.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OverlayEvent {
    /// The overlay the event is about.
    pub overlay: OverlayId,
    /// What happened.
    pub kind: OverlayEventKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Request {
    Show(OverlayId, Option<ElementId>),
    Hide(OverlayId),
    CollapseAll,
}

/// Requests made from inside an event listener.
///
/// Listeners cannot touch the host while it is mid-transition. They record
/// what they want here and the host applies it, in order, once the current
/// step is done.
#[derive(Clone, Debug, Default)]
pub struct Requests {
    pub(crate) items: Vec<Request>,
}

impl Requests {
    /// Ask to show `overlay` at its current anchor.
    pub fn show(&mut self, overlay: OverlayId) {
        self.items.push(Request::Show(overlay, None));
    }

    /// Ask to show `overlay` anchored at `anchor`.
    pub fn show_at(&mut self, overlay: OverlayId, anchor: ElementId) {
        self.items.push(Request::Show(overlay, Some(anchor)));
    }

    /// Ask to hide `overlay`.
    pub fn hide(&mut self, overlay: OverlayId) {
        self.items.push(Request::Hide(overlay));
    }

    /// Ask to collapse the whole cascade.
    pub fn collapse_all(&mut self) {
        self.items.push(Request::CollapseAll);
    }

    /// Whether nothing was requested.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
