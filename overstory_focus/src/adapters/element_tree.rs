// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus helpers backed by an [`ElementTree`].
//!
//! ## Feature
//!
//! Enable with `element_tree_adapter` (on by default).

use alloc::vec::Vec;

use overstory_element_tree::{ElementFlags, ElementId, ElementTree};

use crate::policy::{DefaultPolicy, FocusEntry, FocusPolicy, FocusSpace, Navigation};
use crate::tracker::Containment;

impl Containment<ElementId> for ElementTree {
    fn contains(&self, ancestor: ElementId, node: ElementId) -> Option<bool> {
        Self::contains(self, ancestor, node)
    }

    fn is_connected(&self, node: ElementId) -> bool {
        Self::is_connected(self, node)
    }

    /// Focus can only land on elements that are actually rendered.
    fn can_receive_focus(&self, node: ElementId) -> bool {
        self.is_rendered(node)
    }
}

/// Focus entries for the rendered, focusable strict descendants of `root`,
/// in document order.
pub fn focus_entries(tree: &ElementTree, root: ElementId) -> Vec<FocusEntry<ElementId>> {
    tree.descendants(root)
        .filter(|&id| {
            tree.flags(id)
                .is_some_and(|f| f.contains(ElementFlags::FOCUSABLE))
                && tree.is_rendered(id)
        })
        .map(|id| FocusEntry {
            id,
            rect: tree.bounds(id).unwrap_or_default(),
            order: tree.tab_order(id),
            enabled: true,
        })
        .collect()
}

/// The first element in Tab order inside `root`.
pub fn first_focusable(tree: &ElementTree, root: ElementId) -> Option<ElementId> {
    let entries = focus_entries(tree, root);
    DefaultPolicy::default().first(&FocusSpace { nodes: &entries })
}

/// Move from `origin` within `root` using `policy`.
///
/// Returns `None` when `root` has no focusable descendants.
pub fn navigate(
    tree: &ElementTree,
    root: ElementId,
    origin: ElementId,
    direction: Navigation,
    policy: &impl FocusPolicy<ElementId>,
) -> Option<ElementId> {
    let entries = focus_entries(tree, root);
    policy.next(origin, direction, &FocusSpace { nodes: &entries })
}
