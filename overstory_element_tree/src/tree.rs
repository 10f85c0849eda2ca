// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, updates, queries.

use alloc::vec::Vec;
use core::cmp::Ordering;
use kurbo::{Point, Rect};
use tracing::warn;

use crate::types::{ElementFlags, ElementId, LocalElement};

/// Element tree standing in for a document.
///
/// The tree always has a document root, created by [`ElementTree::new`]. An
/// element is *connected* while its ancestor chain reaches that root; elements
/// inserted without a parent, or detached later, stay alive but disconnected,
/// the way a DOM node does after `removeChild`.
///
/// ## Example
///
/// ```rust
/// use kurbo::Rect;
/// use overstory_element_tree::{ElementTree, LocalElement};
///
/// let mut tree = ElementTree::with_viewport(Rect::new(0.0, 0.0, 800.0, 600.0));
/// let panel = tree.insert(Some(tree.document()), LocalElement::default());
/// let button = tree.insert(Some(panel), LocalElement::default());
///
/// assert_eq!(tree.contains(panel, button), Some(true));
/// tree.detach(panel);
/// assert!(!tree.is_connected(button));
/// ```
pub struct ElementTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    document: ElementId,
}

impl core::fmt::Debug for ElementTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("ElementTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Results of a hit test.
#[derive(Clone, Debug)]
pub struct Hit {
    /// The matched element.
    pub element: ElementId,
    /// Path from the document root to the element (inclusive).
    pub path: Vec<ElementId>,
}

/// Filters applied during hit testing.
#[derive(Clone, Copy, Debug)]
pub struct QueryFilter {
    /// Bitfield of required element flags. Only elements containing all these flags are included.
    pub required_flags: ElementFlags,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            required_flags: ElementFlags::empty(),
        }
    }
}

impl QueryFilter {
    /// Create a new empty filter (includes all elements).
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter to only rendered elements.
    ///
    /// Besides the element's own [`ElementFlags::VISIBLE`], every ancestor
    /// must be visible too.
    pub fn visible(mut self) -> Self {
        self.required_flags |= ElementFlags::VISIBLE;
        self
    }

    /// Filter to only pickable elements.
    pub fn pickable(mut self) -> Self {
        self.required_flags |= ElementFlags::PICKABLE;
        self
    }

    /// Filter to only focusable elements.
    pub fn focusable(mut self) -> Self {
        self.required_flags |= ElementFlags::FOCUSABLE;
        self
    }

    /// Check if an element's flags satisfy this filter.
    pub fn matches(&self, flags: ElementFlags) -> bool {
        flags.contains(self.required_flags)
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    local: LocalElement,
}

impl Node {
    fn new(generation: u32, local: LocalElement) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
        }
    }
}

impl ElementTree {
    /// Create a tree holding only a document root with an empty viewport.
    pub fn new() -> Self {
        Self::with_viewport(Rect::ZERO)
    }

    /// Create a tree whose document root covers `viewport`.
    pub fn with_viewport(viewport: Rect) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            document: ElementId::new(0, 1),
        };
        tree.document = tree.alloc(LocalElement::with_bounds(viewport));
        tree
    }

    /// The document root.
    pub fn document(&self) -> ElementId {
        self.document
    }

    /// Bounds of the document root.
    pub fn viewport(&self) -> Rect {
        self.node(self.document).local.bounds
    }

    /// Resize the document root.
    pub fn set_viewport(&mut self, viewport: Rect) {
        let document = self.document;
        self.node_mut(document).local.bounds = viewport;
    }

    fn alloc(&mut self, local: LocalElement) -> ElementId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        ElementId::new(idx, generation)
    }

    /// Insert a new element as the last child of `parent`.
    ///
    /// With `None` (or a stale parent) the element is created disconnected.
    pub fn insert(&mut self, parent: Option<ElementId>, local: LocalElement) -> ElementId {
        let id = self.alloc(local);
        if let Some(p) = parent {
            if self.is_alive(p) {
                self.link_parent(id, p);
            } else {
                warn!(parent = ?p, "insert under a stale parent; element left disconnected");
            }
        }
        id
    }

    /// Remove an element and its subtree. The ids become stale.
    ///
    /// The document root cannot be removed.
    pub fn remove(&mut self, id: ElementId) {
        if !self.is_alive(id) {
            return;
        }
        if id == self.document {
            warn!("the document root cannot be removed");
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let children = self.node(id).children.clone();
        for child in children {
            self.remove(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Unlink an element from its parent, keeping it (and its subtree) alive.
    pub fn detach(&mut self, id: ElementId) {
        self.reparent(id, None);
    }

    /// Move `id` under `new_parent` (appended as the last child).
    ///
    /// Moving an element under itself or one of its descendants is ignored.
    pub fn reparent(&mut self, id: ElementId, new_parent: Option<ElementId>) {
        if !self.is_alive(id) {
            return;
        }
        if id == self.document {
            warn!("the document root cannot be reparented");
            return;
        }
        if let Some(p) = new_parent {
            if !self.is_alive(p) {
                warn!(parent = ?p, "reparent under a stale parent ignored");
                return;
            }
            if self.is_inclusive_ancestor(id, p) {
                warn!(element = ?id, parent = ?p, "reparent would create a cycle; ignored");
                return;
            }
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
    }

    /// Update bounds.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.bounds = bounds;
        }
    }

    /// Update z index.
    pub fn set_z_index(&mut self, id: ElementId, z: i32) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.z_index = z;
        }
    }

    /// Replace element flags.
    pub fn set_flags(&mut self, id: ElementId, flags: ElementFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags = flags;
        }
    }

    /// Add flags to an element.
    pub fn insert_flags(&mut self, id: ElementId, flags: ElementFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags.insert(flags);
        }
    }

    /// Clear flags on an element.
    pub fn remove_flags(&mut self, id: ElementId, flags: ElementFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags.remove(flags);
        }
    }

    /// Update the explicit tab order.
    pub fn set_tab_order(&mut self, id: ElementId, order: Option<i32>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.tab_order = order;
        }
    }

    /// Hit test a document-space point and return the topmost matching element
    /// with its path from the document root.
    ///
    /// - Only connected elements are considered.
    /// - Elements must satisfy the [`QueryFilter`] and contain the point.
    ///   When the filter requires [`ElementFlags::VISIBLE`], all ancestors must
    ///   be visible as well.
    /// - `z_index` nests like stacking contexts: candidates compare the
    ///   `z_index` of their ancestors outermost first, and the first
    ///   difference decides. If the shared prefix ties, deeper elements win;
    ///   if that also ties, the newer [`ElementId`] wins.
    pub fn hit_test_point(&self, point: Point, filter: QueryFilter) -> Option<Hit> {
        let mut best: Option<(ElementId, Vec<i32>, Vec<ElementId>)> = None;

        for (i, slot) in self.nodes.iter().enumerate() {
            let Some(node) = slot else {
                continue;
            };
            if !filter.matches(node.local.flags) || !node.local.bounds.contains(point) {
                continue;
            }
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            let id = ElementId::new(i as u32, node.generation);
            let Some(path) = self.document_path(id, filter) else {
                continue;
            };
            // The document root does not take part in stacking.
            let stacking: Vec<i32> = path[1..]
                .iter()
                .map(|&e| self.node(e).local.z_index)
                .collect();

            let wins = match &best {
                None => true,
                Some((id_best, stacking_best, path_best)) => {
                    match compare_stacking(&stacking, stacking_best) {
                        Ordering::Greater => true,
                        Ordering::Less => false,
                        Ordering::Equal => {
                            path.len() > path_best.len()
                                || (path.len() == path_best.len() && id_is_newer(id, *id_best))
                        }
                    }
                }
            };
            if wins {
                best = Some((id, stacking, path));
            }
        }

        best.map(|(element, _, path)| Hit { element, path })
    }

    /// Root→element path, or `None` if the element is disconnected or an
    /// ancestor fails the visibility requirement of `filter`.
    fn document_path(&self, id: ElementId, filter: QueryFilter) -> Option<Vec<ElementId>> {
        let need_visible = filter.required_flags.contains(ElementFlags::VISIBLE);
        let mut path = Vec::new();
        path.push(id);
        for ancestor in self.ancestors(id) {
            if need_visible && !self.node(ancestor).local.flags.contains(ElementFlags::VISIBLE) {
                return None;
            }
            path.push(ancestor);
        }
        if path.last() != Some(&self.document) {
            return None;
        }
        path.reverse();
        Some(path)
    }
}

/// Compare stacking keys over their shared prefix.
fn compare_stacking(a: &[i32], b: &[i32]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[inline]
fn id_is_newer(a: ElementId, b: ElementId) -> bool {
    (a.1 > b.1) || (a.1 == b.1 && a.0 > b.0)
}

/// Pre-order iterator over the strict descendants of an element.
///
/// Created by [`ElementTree::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a ElementTree,
    stack: Vec<ElementId>,
}

impl Iterator for Descendants<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children_of(id).iter().rev().copied());
        Some(id)
    }
}

impl ElementTree {
    /// Returns true if `id` refers to a live element.
    ///
    /// An `ElementId` is live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Returns true if the element is alive and attached under the document root.
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.is_alive(id) && (id == self.document || self.ancestors(id).any(|a| a == self.document))
    }

    /// Returns true if the element is connected and it and all of its
    /// ancestors carry [`ElementFlags::VISIBLE`].
    pub fn is_rendered(&self, id: ElementId) -> bool {
        self.document_path(id, QueryFilter::new().visible())
            .is_some_and(|_| self.node(id).local.flags.contains(ElementFlags::VISIBLE))
    }

    /// Returns the parent of an element if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.node_opt(id).and_then(|node| node.parent)
    }

    /// Get the children of an element, or an empty slice if the element is stale.
    pub fn children_of(&self, id: ElementId) -> &[ElementId] {
        match self.node_opt(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Iterate the strict ancestors of an element, nearest first.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        core::iter::successors(self.parent_of(id), move |p| self.parent_of(*p))
    }

    /// Iterate the strict descendants of an element in document order.
    pub fn descendants(&self, id: ElementId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: self.children_of(id).iter().rev().copied().collect(),
        }
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    ///
    /// Returns `None` when the answer cannot be determined: the walk up from
    /// `node` reached an [`ElementFlags::OPAQUE`] ancestor before finding
    /// `ancestor`. Stale ids are never contained.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> Option<bool> {
        if !self.is_alive(ancestor) || !self.is_alive(node) {
            return Some(false);
        }
        let mut cur = node;
        loop {
            if cur == ancestor {
                return Some(true);
            }
            if cur != node && self.node(cur).local.flags.contains(ElementFlags::OPAQUE) {
                return None;
            }
            match self.node(cur).parent {
                Some(p) => cur = p,
                None => return Some(false),
            }
        }
    }

    /// Returns the bounds of an element if the identifier is live.
    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.node_opt(id).map(|node| node.local.bounds)
    }

    /// Returns the z-index of an element if the identifier is live.
    pub fn z_index(&self, id: ElementId) -> Option<i32> {
        self.node_opt(id).map(|node| node.local.z_index)
    }

    /// Returns the flags of an element if the identifier is live.
    pub fn flags(&self, id: ElementId) -> Option<ElementFlags> {
        self.node_opt(id).map(|node| node.local.flags)
    }

    /// Returns the explicit tab order of an element, if any.
    pub fn tab_order(&self, id: ElementId) -> Option<i32> {
        self.node_opt(id).and_then(|node| node.local.tab_order)
    }

    /// Get the next element in depth-first traversal order.
    ///
    /// Returns `None` if no next element exists or if the current one is stale.
    /// This is a standard tree traversal that does not wrap around.
    pub fn next_depth_first(&self, current: ElementId) -> Option<ElementId> {
        if !self.is_alive(current) {
            return None;
        }
        let children = &self.node(current).children;
        if let Some(&first_child) = children.first() {
            return Some(first_child);
        }

        let mut node = current;
        while let Some(parent) = self.parent_of(node) {
            if let Some(next_sibling) = self.next_sibling(node) {
                return Some(next_sibling);
            }
            node = parent;
        }
        None
    }

    /// Get the previous element in reverse depth-first traversal order.
    ///
    /// Returns `None` if no previous element exists or if the current one is stale.
    pub fn prev_depth_first(&self, current: ElementId) -> Option<ElementId> {
        if !self.is_alive(current) {
            return None;
        }
        if let Some(prev_sibling) = self.prev_sibling(current) {
            return Some(self.last_in_subtree(prev_sibling));
        }
        self.parent_of(current)
    }

    fn next_sibling(&self, node: ElementId) -> Option<ElementId> {
        let parent = self.parent_of(node)?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&id| id == node)?;
        siblings.get(pos + 1).copied()
    }

    fn prev_sibling(&self, node: ElementId) -> Option<ElementId> {
        let parent = self.parent_of(node)?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&id| id == node)?;
        pos.checked_sub(1).and_then(|p| siblings.get(p).copied())
    }

    fn last_in_subtree(&self, mut node: ElementId) -> ElementId {
        while let Some(&last) = self.node(node).children.last() {
            node = last;
        }
        node
    }

    /// Like [`ElementTree::contains`] but ignores opaque boundaries.
    fn is_inclusive_ancestor(&self, ancestor: ElementId, node: ElementId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Access a live element; panics if `id` is stale.
    fn node(&self, id: ElementId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling ElementId")
    }

    fn node_mut(&mut self, id: ElementId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling ElementId")
    }

    fn node_opt(&self, id: ElementId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: ElementId, parent: ElementId) {
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: ElementId, parent: ElementId) {
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}
