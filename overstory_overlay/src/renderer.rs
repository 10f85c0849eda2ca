// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam to whatever draws overlays.
//!
//! The host never animates anything itself. It asks a [`Renderer`] to begin a
//! transition; the renderer either finishes on the spot or hands back a
//! [`TransitionToken`] that the embedder later passes to
//! [`OverlayHost::complete_transition`](crate::OverlayHost::complete_transition).
//! A conflicting request (hide while showing, show while hiding) cancels the
//! token through [`Renderer::cancel`].

use alloc::vec::Vec;

use overstory_element_tree::ElementId;

use crate::OverlayId;

/// Identifies one in-flight show or hide transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionToken(pub u64);

/// How a transition request finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Done already.
    Immediate,
    /// Still running; report the token when it ends.
    Pending(TransitionToken),
}

/// Plays show and hide transitions.
///
/// With `animate == false` implementations should return
/// [`Completion::Immediate`]; a pending result for a forced hide is cancelled
/// straight away.
pub trait Renderer {
    /// Start showing `overlay`, hosted by `element`.
    fn begin_show(&mut self, overlay: OverlayId, element: ElementId, animate: bool) -> Completion;

    /// Start hiding `overlay`.
    fn begin_hide(&mut self, overlay: OverlayId, element: ElementId, animate: bool) -> Completion;

    /// Abandon a pending transition. Its token will not be reported.
    fn cancel(&mut self, token: TransitionToken) {
        let _ = token;
    }
}

/// A renderer whose transitions always complete immediately.
#[derive(Copy, Clone, Debug, Default)]
pub struct Instant;

impl Renderer for Instant {
    fn begin_show(&mut self, _: OverlayId, _: ElementId, _: bool) -> Completion {
        Completion::Immediate
    }

    fn begin_hide(&mut self, _: OverlayId, _: ElementId, _: bool) -> Completion {
        Completion::Immediate
    }
}

/// A renderer that leaves every animated transition pending until told otherwise.
///
/// Useful for driving the host step by step: read [`Deferred::pending`] and
/// feed the tokens back to
/// [`OverlayHost::complete_transition`](crate::OverlayHost::complete_transition).
#[derive(Clone, Debug, Default)]
pub struct Deferred {
    next: u64,
    pending: Vec<(TransitionToken, OverlayId)>,
}

impl Deferred {
    /// Create a renderer with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending transitions, oldest first.
    pub fn pending(&self) -> &[(TransitionToken, OverlayId)] {
        &self.pending
    }

    /// The oldest pending transition, removed from the list.
    pub fn take_oldest(&mut self) -> Option<TransitionToken> {
        (!self.pending.is_empty()).then(|| self.pending.remove(0).0)
    }

    fn start(&mut self, overlay: OverlayId, animate: bool) -> Completion {
        if !animate {
            return Completion::Immediate;
        }
        self.next += 1;
        let token = TransitionToken(self.next);
        self.pending.push((token, overlay));
        Completion::Pending(token)
    }
}

impl Renderer for Deferred {
    fn begin_show(&mut self, overlay: OverlayId, _: ElementId, animate: bool) -> Completion {
        self.start(overlay, animate)
    }

    fn begin_hide(&mut self, overlay: OverlayId, _: ElementId, animate: bool) -> Completion {
        self.start(overlay, animate)
    }

    fn cancel(&mut self, token: TransitionToken) {
        self.pending.retain(|(t, _)| *t != token);
    }
}
