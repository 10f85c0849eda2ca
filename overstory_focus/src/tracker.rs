// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus bookkeeping for transient surfaces.

use core::hash::Hash;

use hashbrown::HashMap;
use tracing::trace;

/// Read-only document queries the tracker needs.
///
/// Implemented for `overstory_element_tree::ElementTree` behind the
/// `element_tree_adapter` feature.
pub trait Containment<K> {
    /// Whether `node` is `ancestor` or one of its descendants.
    ///
    /// `None` means the answer cannot be determined, and callers must not act on it.
    fn contains(&self, ancestor: K, node: K) -> Option<bool>;

    /// Whether `node` is still attached to the document.
    fn is_connected(&self, node: K) -> bool;

    /// Whether focus can be moved to `node` right now.
    fn can_receive_focus(&self, node: K) -> bool {
        self.is_connected(node)
    }
}

/// Outcome of [`FocusTracker::restore`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Restored<K> {
    /// Focus went back to the element that had it before the surface opened.
    Previous(K),
    /// The previous element was gone; focus went to a fallback.
    Fallback(K),
    /// Nothing suitable; focus was left where it was.
    Unchanged,
}

impl<K: Copy> Restored<K> {
    /// The element that received focus, if any.
    pub fn target(self) -> Option<K> {
        match self {
            Self::Previous(k) | Self::Fallback(k) => Some(k),
            Self::Unchanged => None,
        }
    }
}

/// Tracks the focused element and, per open surface, the element that was
/// focused when the surface opened.
///
/// `K` identifies elements and `O` identifies surfaces.
///
/// ```rust
/// use overstory_focus::{Containment, FocusTracker, Restored};
///
/// // Everything is connected; containment is equality.
/// struct Flat;
/// impl Containment<u32> for Flat {
///     fn contains(&self, a: u32, n: u32) -> Option<bool> { Some(a == n) }
///     fn is_connected(&self, _: u32) -> bool { true }
/// }
///
/// let mut focus: FocusTracker<u32, &str> = FocusTracker::new();
/// focus.set_focused(Some(1));
/// focus.capture("menu");
/// focus.set_focused(Some(10));
///
/// assert_eq!(focus.restore("menu", [], &Flat), Restored::Previous(1));
/// assert_eq!(focus.focused(), Some(1));
/// ```
#[derive(Clone, Debug)]
pub struct FocusTracker<K, O> {
    focused: Option<K>,
    captured: HashMap<O, Option<K>>,
}

impl<K, O> Default for FocusTracker<K, O> {
    fn default() -> Self {
        Self {
            focused: None,
            captured: HashMap::new(),
        }
    }
}

impl<K, O> FocusTracker<K, O>
where
    K: Copy + Eq + core::fmt::Debug,
    O: Copy + Eq + Hash + core::fmt::Debug,
{
    /// Create a tracker with nothing focused.
    pub fn new() -> Self {
        Self::default()
    }

    /// The focused element.
    pub fn focused(&self) -> Option<K> {
        self.focused
    }

    /// Record a focus change and return the previously focused element.
    pub fn set_focused(&mut self, focused: Option<K>) -> Option<K> {
        core::mem::replace(&mut self.focused, focused)
    }

    /// Snapshot the focused element for `surface`.
    ///
    /// Only the first capture of a show cycle counts; later calls keep the
    /// original snapshot until [`FocusTracker::release`].
    pub fn capture(&mut self, surface: O) -> Option<K> {
        let focused = self.focused;
        *self.captured.entry(surface).or_insert_with(|| {
            trace!(?surface, ?focused, "captured previous focus");
            focused
        })
    }

    /// Whether `surface` has a snapshot for the current show cycle.
    pub fn has_capture(&self, surface: O) -> bool {
        self.captured.contains_key(&surface)
    }

    /// The element captured for `surface`, if any.
    pub fn previous(&self, surface: O) -> Option<K> {
        self.captured.get(&surface).copied().flatten()
    }

    /// Drop the snapshot for `surface`, returning it.
    pub fn release(&mut self, surface: O) -> Option<K> {
        self.captured.remove(&surface).flatten()
    }

    /// Whether the focused element is `root` or inside it.
    ///
    /// Unknowable containment counts as outside.
    pub fn is_focus_inside(&self, root: K, doc: &impl Containment<K>) -> bool {
        self.focused
            .is_some_and(|f| doc.contains(root, f) == Some(true))
    }

    /// Move focus back after `surface` closes, and release its snapshot.
    ///
    /// The captured element wins if it can still receive focus. Otherwise the
    /// first of `fallbacks` (nearest first, for example the surfaces still open
    /// below this one) that can receive focus is used. If none qualifies,
    /// focus is left alone.
    pub fn restore(
        &mut self,
        surface: O,
        fallbacks: impl IntoIterator<Item = K>,
        doc: &impl Containment<K>,
    ) -> Restored<K> {
        let restored = match self.release(surface) {
            Some(previous) if doc.can_receive_focus(previous) => Restored::Previous(previous),
            _ => fallbacks
                .into_iter()
                .find(|&k| doc.can_receive_focus(k))
                .map_or(Restored::Unchanged, Restored::Fallback),
        };
        if let Some(target) = restored.target() {
            self.focused = Some(target);
        }
        trace!(?surface, ?restored, "restored focus");
        restored
    }

    /// Forget all snapshots and the focused element.
    pub fn clear(&mut self) {
        self.focused = None;
        self.captured.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    /// Parent table: index = node, value = parent.
    struct Doc {
        parents: Vec<Option<u32>>,
        connected: Vec<bool>,
    }

    impl Containment<u32> for Doc {
        fn contains(&self, ancestor: u32, node: u32) -> Option<bool> {
            let mut cur = Some(node);
            while let Some(c) = cur {
                if c == ancestor {
                    return Some(true);
                }
                cur = self.parents[c as usize];
            }
            Some(false)
        }

        fn is_connected(&self, node: u32) -> bool {
            self.connected[node as usize]
        }
    }

    fn doc() -> Doc {
        // 0 = body, 1 = button, 2 = flyout, 3 = item in flyout, 4 = removed button
        Doc {
            parents: alloc::vec![None, Some(0), Some(0), Some(2), None],
            connected: alloc::vec![true, true, true, true, false],
        }
    }

    #[test]
    fn capture_is_taken_once_per_cycle() {
        let mut focus: FocusTracker<u32, u8> = FocusTracker::new();
        focus.set_focused(Some(1));
        assert_eq!(focus.capture(7), Some(1));
        focus.set_focused(Some(3));
        assert_eq!(focus.capture(7), Some(1), "second capture keeps the first snapshot");
        assert_eq!(focus.release(7), Some(1));
        assert!(!focus.has_capture(7));
        assert_eq!(focus.capture(7), Some(3), "a new cycle snapshots again");
    }

    #[test]
    fn focus_inside_follows_containment() {
        let doc = doc();
        let mut focus: FocusTracker<u32, u8> = FocusTracker::new();
        focus.set_focused(Some(3));
        assert!(focus.is_focus_inside(2, &doc));
        assert!(!focus.is_focus_inside(1, &doc));
        focus.set_focused(None);
        assert!(!focus.is_focus_inside(2, &doc));
    }

    #[test]
    fn restore_prefers_previous_then_fallbacks() {
        let doc = doc();
        let mut focus: FocusTracker<u32, u8> = FocusTracker::new();

        focus.set_focused(Some(1));
        focus.capture(2);
        focus.set_focused(Some(3));
        assert_eq!(focus.restore(2, [0], &doc), Restored::Previous(1));
        assert_eq!(focus.focused(), Some(1));

        focus.set_focused(Some(4));
        focus.capture(2);
        focus.set_focused(Some(3));
        assert_eq!(
            focus.restore(2, [4, 0], &doc),
            Restored::Fallback(0),
            "disconnected candidates are skipped"
        );

        focus.set_focused(Some(4));
        focus.capture(2);
        focus.set_focused(Some(3));
        assert_eq!(focus.restore(2, [], &doc), Restored::Unchanged);
        assert_eq!(focus.focused(), Some(3), "focus is left alone");
    }
}
