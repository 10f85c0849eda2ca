// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus traversal inside a surface: Tab order and arrow-key movement.

use alloc::vec::Vec;
use core::cmp::Ordering;

use kurbo::Rect;

/// Direction of focus navigation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Move to the next candidate in forward order (Tab).
    Next,
    /// Move to the previous candidate in backward order (Shift+Tab).
    Prev,
    /// Move up relative to the current focus.
    Up,
    /// Move down relative to the current focus.
    Down,
    /// Move left relative to the current focus.
    Left,
    /// Move right relative to the current focus.
    Right,
}

/// A single focusable candidate within a [`FocusSpace`].
#[derive(Clone, Debug)]
pub struct FocusEntry<K> {
    /// Identifier for this focusable node.
    pub id: K,
    /// Bounds; all entries in one [`FocusSpace`] share a coordinate space.
    pub rect: Rect,
    /// Optional explicit ordering key. Entries with a key come first.
    pub order: Option<i32>,
    /// Whether this node is enabled for focus.
    pub enabled: bool,
}

impl<K> FocusEntry<K> {
    /// An enabled entry without explicit order.
    pub fn new(id: K, rect: Rect) -> Self {
        Self {
            id,
            rect,
            order: None,
            enabled: true,
        }
    }
}

/// A read-only view of the focusable candidates of one surface.
#[derive(Clone, Debug)]
pub struct FocusSpace<'a, K> {
    /// Focusable candidates, in document order.
    pub nodes: &'a [FocusEntry<K>],
}

/// Whether traversal wraps around at the ends of a surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Reaching the end yields no next candidate.
    Never,
    /// Wrap within the surface. Overlays trap focus this way.
    Scope,
}

/// Trait for focus traversal policies.
pub trait FocusPolicy<K>
where
    K: Copy + Eq,
{
    /// Compute the next focus target given an origin, navigation intent, and focus space.
    ///
    /// When `origin` is not part of `space`, linear navigation starts from the
    /// appropriate end.
    fn next(&self, origin: K, direction: Navigation, space: &FocusSpace<'_, K>) -> Option<K>;
}

/// Default policy: explicit order then reading order for Tab, nearest
/// forward candidate for arrows (falling back to linear order).
#[derive(Copy, Clone, Debug)]
pub struct DefaultPolicy {
    /// Wrap behavior when traversing focusable candidates.
    pub wrap: WrapMode,
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        Self {
            wrap: WrapMode::Scope,
        }
    }
}

impl DefaultPolicy {
    /// The first candidate in Tab order.
    pub fn first<K: Copy + Eq>(&self, space: &FocusSpace<'_, K>) -> Option<K> {
        let order = linear_order(space);
        order.first().map(|&i| space.nodes[i].id)
    }

    /// The last candidate in Tab order.
    pub fn last<K: Copy + Eq>(&self, space: &FocusSpace<'_, K>) -> Option<K> {
        let order = linear_order(space);
        order.last().map(|&i| space.nodes[i].id)
    }
}

impl<K> FocusPolicy<K> for DefaultPolicy
where
    K: Copy + Eq,
{
    fn next(&self, origin: K, direction: Navigation, space: &FocusSpace<'_, K>) -> Option<K> {
        match direction {
            Navigation::Next => next_linear(origin, space, self.wrap, Step::Forward),
            Navigation::Prev => next_linear(origin, space, self.wrap, Step::Backward),
            Navigation::Up | Navigation::Down | Navigation::Left | Navigation::Right => {
                next_directional(origin, direction, space).or_else(|| {
                    let step = match direction {
                        Navigation::Up | Navigation::Left => Step::Backward,
                        _ => Step::Forward,
                    };
                    next_linear(origin, space, self.wrap, step)
                })
            }
        }
    }
}

#[derive(Copy, Clone)]
enum Step {
    Forward,
    Backward,
}

/// Indices of enabled entries sorted into Tab order. The sort is stable, so
/// entries that compare equal keep their document order.
fn linear_order<K>(space: &FocusSpace<'_, K>) -> Vec<usize> {
    let nodes = space.nodes;
    let mut indices: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.enabled.then_some(i))
        .collect();
    indices.sort_by(|&ia, &ib| compare_linear(&nodes[ia], &nodes[ib]));
    indices
}

fn next_linear<K>(origin: K, space: &FocusSpace<'_, K>, wrap: WrapMode, step: Step) -> Option<K>
where
    K: Copy + Eq,
{
    let nodes = space.nodes;
    let indices = linear_order(space);
    let (&first, &last) = (indices.first()?, indices.last()?);
    let origin_pos = indices.iter().position(|&i| nodes[i].id == origin);
    let wraps = matches!(wrap, WrapMode::Scope);

    match (step, origin_pos) {
        (Step::Forward, None) => Some(nodes[first].id),
        (Step::Backward, None) => Some(nodes[last].id),
        (Step::Forward, Some(pos)) => match indices.get(pos + 1) {
            Some(&i) => Some(nodes[i].id),
            None => wraps.then(|| nodes[first].id),
        },
        (Step::Backward, Some(pos)) => match pos.checked_sub(1) {
            Some(p) => Some(nodes[indices[p]].id),
            None => wraps.then(|| nodes[last].id),
        },
    }
}

fn compare_linear<K>(a: &FocusEntry<K>, b: &FocusEntry<K>) -> Ordering {
    match (a.order, b.order) {
        (Some(ao), Some(bo)) => ao
            .cmp(&bo)
            .then_with(|| compare_rect_reading(&a.rect, &b.rect)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_rect_reading(&a.rect, &b.rect),
    }
}

fn compare_rect_reading(a: &Rect, b: &Rect) -> Ordering {
    const RELATIVE_EPS: f64 = 1e-6;
    let (ay, by) = (a.y0, b.y0);
    if (ay - by).abs() > f64::max(ay.abs(), by.abs()) * RELATIVE_EPS {
        return ay.partial_cmp(&by).unwrap_or(Ordering::Equal);
    }
    a.x0.partial_cmp(&b.x0).unwrap_or(Ordering::Equal)
}

fn next_directional<K>(origin: K, direction: Navigation, space: &FocusSpace<'_, K>) -> Option<K>
where
    K: Copy + Eq,
{
    let nodes = space.nodes;
    let origin_entry = nodes.iter().find(|e| e.id == origin && e.enabled)?;
    let oc = origin_entry.rect.center();

    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in nodes.iter().enumerate() {
        if !candidate.enabled || candidate.id == origin {
            continue;
        }
        let cc = candidate.rect.center();
        let (dx, dy) = (cc.x - oc.x, cc.y - oc.y);
        let (primary, secondary, forward_sign) = match direction {
            Navigation::Right => (dx, dy, 1.0),
            Navigation::Left => (dx, dy, -1.0),
            Navigation::Down => (dy, dx, 1.0),
            Navigation::Up => (dy, dx, -1.0),
            Navigation::Next | Navigation::Prev => return None,
        };
        // Forward hemiplane only.
        if forward_sign * primary <= 0.0 {
            continue;
        }
        // Closer wins; off-axis motion is penalized.
        let score = primary.abs() + 4.0 * secondary.abs();
        if score.is_finite() && best.is_none_or(|(_, s)| score < s) {
            best = Some((i, score));
        }
    }

    best.map(|(i, _)| nodes[i].id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn row(ids: &[u32]) -> Vec<FocusEntry<u32>> {
        ids.iter()
            .enumerate()
            .map(|(i, &id)| {
                let x = 20.0 * i as f64;
                FocusEntry::new(id, Rect::new(x, 0.0, x + 10.0, 10.0))
            })
            .collect()
    }

    #[test]
    fn tab_wraps_inside_scope() {
        let entries = row(&[1, 2]);
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();

        assert_eq!(policy.next(1, Navigation::Next, &space), Some(2));
        assert_eq!(policy.next(2, Navigation::Next, &space), Some(1));
        assert_eq!(policy.next(1, Navigation::Prev, &space), Some(2));
    }

    #[test]
    fn unknown_origin_starts_at_the_ends() {
        let entries = row(&[1, 2, 3]);
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();

        assert_eq!(policy.next(99, Navigation::Next, &space), Some(1));
        assert_eq!(policy.next(99, Navigation::Prev, &space), Some(3));
        assert_eq!(policy.first(&space), Some(1));
        assert_eq!(policy.last(&space), Some(3));
    }

    #[test]
    fn explicit_order_beats_geometry() {
        let mut entries = row(&[1, 2]);
        entries[0].order = Some(2);
        entries[1].order = Some(1);
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();

        assert_eq!(policy.first(&space), Some(2));
        assert_eq!(policy.next(2, Navigation::Next, &space), Some(1));
    }

    #[test]
    fn equal_geometry_keeps_document_order() {
        let entries = vec![
            FocusEntry::new(7_u32, Rect::ZERO),
            FocusEntry::new(3_u32, Rect::ZERO),
            FocusEntry::new(5_u32, Rect::ZERO),
        ];
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();

        assert_eq!(policy.first(&space), Some(7));
        assert_eq!(policy.next(7, Navigation::Next, &space), Some(3));
        assert_eq!(policy.next(3, Navigation::Next, &space), Some(5));
    }

    #[test]
    fn disabled_entries_are_skipped() {
        let mut entries = row(&[1, 2, 3]);
        entries[1].enabled = false;
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();

        assert_eq!(policy.next(1, Navigation::Next, &space), Some(3));
        assert_eq!(policy.next(3, Navigation::Prev, &space), Some(1));
        assert_eq!(policy.next(1, Navigation::Right, &space), Some(3));
    }

    #[test]
    fn no_wrap_stops_at_edges() {
        let entries = row(&[1, 2]);
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy {
            wrap: WrapMode::Never,
        };

        assert_eq!(policy.next(2, Navigation::Next, &space), None);
        assert_eq!(policy.next(1, Navigation::Prev, &space), None);
    }

    #[test]
    fn arrows_move_within_a_column() {
        // A vertical menu: Down walks the column, Up walks back, and Up from the
        // top falls back to wrapping linear order.
        let entries: Vec<_> = (0..3_u32)
            .map(|i| {
                let y = 20.0 * f64::from(i);
                FocusEntry::new(i, Rect::new(0.0, y, 100.0, y + 10.0))
            })
            .collect();
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();

        assert_eq!(policy.next(0, Navigation::Down, &space), Some(1));
        assert_eq!(policy.next(2, Navigation::Up, &space), Some(1));
        assert_eq!(policy.next(0, Navigation::Up, &space), Some(2));
    }
}
