// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cascade: the ordered stack of chained overlays.
//!
//! Index 0 is the root, the last entry is the tip. Each entry after the root
//! was anchored inside the entry below it. The manager itself only does stack
//! bookkeeping; [`OverlayHost`](crate::OverlayHost) drives the hides.
//!
//! ## Collapsing
//!
//! A collapse truncates the stack to a target length, hiding entries one at a
//! time from the tip down. An entry leaves the stack when its hide begins, and
//! the next hide only begins once the previous one has completed. While a
//! collapse runs the manager is *locked*: shows are parked in a single slot
//! (a newer show replaces an older one) and run once the collapse finishes,
//! and further hides of stack entries only lower the target length.

use alloc::vec::Vec;

use overstory_element_tree::ElementId;
use overstory_focus::Containment;
use tracing::{debug, trace};

use crate::OverlayId;

/// One step of a running collapse.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum CollapseStep {
    /// No collapse running.
    Idle,
    /// Begin hiding this entry; it has been removed from the stack.
    Hide(OverlayId),
    /// A hide is still in flight.
    Wait,
    /// The collapse finished and the lock is released. Carries the parked show.
    Done(Option<OverlayId>),
}

/// Where a node sits relative to the cascade.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// Inside the entry at this index (the deepest one, if several contain it).
    Inside(usize),
    /// Outside every entry.
    Outside,
    /// Containment could not be determined for at least one entry and no
    /// entry is known to contain the node.
    Unknown,
}

/// Stack of chained overlays plus the reentrancy lock.
#[derive(Clone, Debug, Default)]
pub struct CascadeManager {
    stack: Vec<OverlayId>,
    /// Target length of the running collapse. `Some` means locked.
    collapse_to: Option<usize>,
    /// Entry whose hide the collapse is waiting on.
    waiting: Option<OverlayId>,
    /// Show parked while locked.
    queued: Option<OverlayId>,
}

impl CascadeManager {
    /// An empty cascade.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries from root to tip.
    pub fn stack(&self) -> &[OverlayId] {
        &self.stack
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether the cascade is empty.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// The topmost entry.
    pub fn tip(&self) -> Option<OverlayId> {
        self.stack.last().copied()
    }

    /// Position of `overlay` in the stack.
    pub fn index_of(&self, overlay: OverlayId) -> Option<usize> {
        self.stack.iter().position(|&o| o == overlay)
    }

    /// Whether a collapse is running.
    pub fn is_locked(&self) -> bool {
        self.collapse_to.is_some()
    }

    /// The show waiting for the lock to be released.
    pub fn queued(&self) -> Option<OverlayId> {
        self.queued
    }

    /// Locate `node` against the entries' elements.
    pub fn locate(
        &self,
        node: ElementId,
        element_of: impl Fn(OverlayId) -> Option<ElementId>,
        doc: &impl Containment<ElementId>,
    ) -> Location {
        let mut unknown = false;
        for (i, &entry) in self.stack.iter().enumerate().rev() {
            let Some(element) = element_of(entry) else {
                continue;
            };
            match doc.contains(element, node) {
                Some(true) => return Location::Inside(i),
                Some(false) => {}
                None => unknown = true,
            }
        }
        if unknown {
            Location::Unknown
        } else {
            Location::Outside
        }
    }

    pub(crate) fn push(&mut self, overlay: OverlayId) {
        debug!(?overlay, depth = self.stack.len() + 1, "cascade push");
        self.stack.push(overlay);
    }

    /// Start (or extend) a collapse down to `keep` entries.
    pub(crate) fn begin_collapse(&mut self, keep: usize) {
        let keep = self.collapse_to.map_or(keep, |current| current.min(keep));
        debug!(keep, len = self.stack.len(), "cascade collapse");
        self.collapse_to = Some(keep);
    }

    /// Park a show until the running collapse finishes. Returns the show it
    /// replaced, if any.
    pub(crate) fn queue_show(&mut self, overlay: OverlayId) -> Option<OverlayId> {
        let replaced = self.queued.replace(overlay).filter(|&o| o != overlay);
        trace!(?overlay, ?replaced, "show queued behind cascade collapse");
        replaced
    }

    /// Advance the running collapse.
    pub(crate) fn next_step(&mut self) -> CollapseStep {
        let Some(keep) = self.collapse_to else {
            return CollapseStep::Idle;
        };
        if self.waiting.is_some() {
            return CollapseStep::Wait;
        }
        if self.stack.len() > keep
            && let Some(tip) = self.stack.pop()
        {
            self.waiting = Some(tip);
            return CollapseStep::Hide(tip);
        }
        self.collapse_to = None;
        CollapseStep::Done(self.queued.take())
    }

    /// Record that `overlay` finished hiding.
    pub(crate) fn hide_finished(&mut self, overlay: OverlayId) {
        if self.waiting == Some(overlay) {
            self.waiting = None;
        }
    }

    /// Pop the tip if `overlay` is still in the stack.
    ///
    /// Calling this until it returns `None` removes `overlay` and everything
    /// above it, tip first. Used when entries go away without a collapse.
    pub(crate) fn pop_through(&mut self, overlay: OverlayId) -> Option<OverlayId> {
        self.index_of(overlay)?;
        self.stack.pop()
    }

    /// Drop `overlay` from the parked show slot.
    pub(crate) fn forget(&mut self, overlay: OverlayId) {
        if self.queued == Some(overlay) {
            self.queued = None;
        }
        self.hide_finished(overlay);
    }
}
