// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Light dismiss: which shown overlays go away when the user interacts
//! elsewhere, and the click-eater that catches those interactions.

use alloc::vec::Vec;

use overstory_element_tree::{ElementFlags, ElementId, ElementTree, LocalElement};
use tracing::{debug, warn};

use crate::OverlayId;

#[derive(Copy, Clone, Debug)]
struct Registration {
    overlay: OverlayId,
    element: ElementId,
    sticky: bool,
    cascading: bool,
    z_index: i32,
}

/// Tracks shown overlays for light dismiss and owns the click-eater.
///
/// The click-eater is a full-viewport element placed one step below the
/// topmost non-sticky overlay. Cascading overlays count as one layer, so the
/// eater sits below the whole cascade and a click on a lower entry reaches
/// that entry. It is visible and pickable exactly while some non-sticky
/// overlay is registered, so pointer input aimed past an overlay lands on it
/// instead of on application content.
///
/// One service exists per host; [`LightDismissService::init`] and
/// [`LightDismissService::reset`] bracket its life.
#[derive(Clone, Debug, Default)]
pub struct LightDismissService {
    click_eater: Option<ElementId>,
    /// Registered overlays, in show order.
    registered: Vec<Registration>,
}

impl LightDismissService {
    /// A service without a click-eater.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the click-eater under the document root. Idempotent.
    pub fn init(&mut self, tree: &mut ElementTree) -> ElementId {
        if let Some(eater) = self.click_eater
            && tree.is_alive(eater)
        {
            return eater;
        }
        let eater = tree.insert(
            Some(tree.document()),
            LocalElement::with_bounds(tree.viewport()).with_flags(ElementFlags::empty()),
        );
        debug!(?eater, "click-eater created");
        self.click_eater = Some(eater);
        self.sync(tree);
        eater
    }

    /// Remove the click-eater and forget every registration.
    pub fn reset(&mut self, tree: &mut ElementTree) {
        if let Some(eater) = self.click_eater.take() {
            tree.remove(eater);
        }
        self.registered.clear();
    }

    /// The click-eater element, once initialized.
    pub fn click_eater(&self) -> Option<ElementId> {
        self.click_eater
    }

    /// Track a shown overlay.
    pub fn register(
        &mut self,
        tree: &mut ElementTree,
        overlay: OverlayId,
        element: ElementId,
        sticky: bool,
        cascading: bool,
        z_index: i32,
    ) {
        self.registered.retain(|r| r.overlay != overlay);
        self.registered.push(Registration {
            overlay,
            element,
            sticky,
            cascading,
            z_index,
        });
        self.sync(tree);
    }

    /// Stop tracking an overlay.
    pub fn unregister(&mut self, tree: &mut ElementTree, overlay: OverlayId) {
        let before = self.registered.len();
        self.registered.retain(|r| r.overlay != overlay);
        if self.registered.len() != before {
            self.sync(tree);
        }
    }

    /// Whether `overlay` is registered.
    pub fn is_registered(&self, overlay: OverlayId) -> bool {
        self.registered.iter().any(|r| r.overlay == overlay)
    }

    /// Whether some registered overlay is not sticky.
    pub fn has_dismissible(&self) -> bool {
        self.registered.iter().any(|r| !r.sticky)
    }

    /// Registered non-sticky overlays, oldest first.
    pub fn dismissible(&self) -> impl DoubleEndedIterator<Item = OverlayId> + '_ {
        self.registered
            .iter()
            .filter(|r| !r.sticky)
            .map(|r| r.overlay)
    }

    /// Whether `target` lies inside a registered non-sticky overlay.
    ///
    /// Sticky overlays do not count: a press on an app bar is outside every
    /// dismissible overlay, just as a hit on the click-eater is.
    ///
    /// `None` when that cannot be determined for some overlay and no overlay
    /// is known to contain it.
    pub fn is_inside_dismissible(&self, tree: &ElementTree, target: ElementId) -> Option<bool> {
        let mut unknown = false;
        for r in self.registered.iter().filter(|r| !r.sticky) {
            match tree.contains(r.element, target) {
                Some(true) => return Some(true),
                Some(false) => {}
                None => unknown = true,
            }
        }
        (!unknown).then_some(false)
    }

    /// Bring the click-eater in line with the registrations and viewport.
    pub fn sync(&self, tree: &mut ElementTree) {
        let Some(eater) = self.click_eater else {
            return;
        };
        if !tree.is_alive(eater) {
            warn!(?eater, "click-eater was removed from the tree");
            return;
        }
        tree.set_bounds(eater, tree.viewport());
        match self.eater_floor() {
            Some(floor) => {
                tree.set_z_index(eater, floor.saturating_sub(1));
                tree.set_flags(eater, ElementFlags::VISIBLE | ElementFlags::PICKABLE);
            }
            None => tree.set_flags(eater, ElementFlags::empty()),
        }
    }

    /// The z-index the click-eater sits directly under.
    fn eater_floor(&self) -> Option<i32> {
        let top = self
            .registered
            .iter()
            .filter(|r| !r.sticky)
            .max_by_key(|r| r.z_index)?;
        if !top.cascading {
            return Some(top.z_index);
        }
        self.registered
            .iter()
            .filter(|r| !r.sticky && r.cascading)
            .map(|r| r.z_index)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Rect};
    use overstory_element_tree::QueryFilter;

    fn setup() -> (ElementTree, LightDismissService, ElementId) {
        let mut tree = ElementTree::with_viewport(Rect::new(0.0, 0.0, 400.0, 300.0));
        let mut service = LightDismissService::new();
        let eater = service.init(&mut tree);
        (tree, service, eater)
    }

    #[test]
    fn click_eater_tracks_non_sticky_registrations() {
        let (mut tree, mut service, eater) = setup();
        let doc = tree.document();
        let bar = tree.insert(Some(doc), LocalElement::default());
        let flyout = tree.insert(Some(doc), LocalElement::default());

        assert!(!tree.is_rendered(eater), "nothing registered");

        service.register(&mut tree, OverlayId(0), bar, true, false, 10);
        assert!(!tree.is_rendered(eater), "sticky overlays do not raise the click-eater");

        service.register(&mut tree, OverlayId(1), flyout, false, false, 20);
        assert!(tree.is_rendered(eater));
        assert_eq!(tree.z_index(eater), Some(19));
        assert_eq!(tree.bounds(eater), Some(tree.viewport()));

        service.unregister(&mut tree, OverlayId(1));
        assert!(!tree.is_rendered(eater));
    }

    #[test]
    fn click_eater_intercepts_points_outside_the_overlay() {
        let (mut tree, mut service, eater) = setup();
        let doc = tree.document();
        let _content = tree.insert(
            Some(doc),
            LocalElement::with_bounds(Rect::new(0.0, 0.0, 400.0, 300.0)),
        );
        let flyout = tree.insert(
            Some(doc),
            LocalElement::with_bounds(Rect::new(100.0, 100.0, 200.0, 200.0)).with_z_index(20),
        );
        let item = tree.insert(
            Some(flyout),
            LocalElement::with_bounds(Rect::new(110.0, 110.0, 190.0, 130.0)),
        );
        service.register(&mut tree, OverlayId(0), flyout, false, false, 20);

        let filter = QueryFilter::new().visible().pickable();
        assert_eq!(tree.hit_test_point(Point::new(10.0, 10.0), filter).unwrap().element, eater);
        assert_eq!(tree.hit_test_point(Point::new(120.0, 120.0), filter).unwrap().element, item);
        assert_eq!(service.is_inside_dismissible(&tree, item), Some(true));
        assert_eq!(service.is_inside_dismissible(&tree, eater), Some(false));
    }

    #[test]
    fn dismissible_skips_sticky_and_keeps_show_order() {
        let (mut tree, mut service, _) = setup();
        let doc = tree.document();
        let e: Vec<_> = (0..3).map(|_| tree.insert(Some(doc), LocalElement::default())).collect();
        service.register(&mut tree, OverlayId(0), e[0], false, false, 2);
        service.register(&mut tree, OverlayId(1), e[1], true, false, 4);
        service.register(&mut tree, OverlayId(2), e[2], false, false, 6);

        let order: Vec<_> = service.dismissible().collect();
        assert_eq!(order, [OverlayId(0), OverlayId(2)]);
        assert_eq!(service.dismissible().next_back(), Some(OverlayId(2)));
    }

    #[test]
    fn click_eater_sits_below_the_whole_cascade() {
        let (mut tree, mut service, eater) = setup();
        let doc = tree.document();
        let e: Vec<_> = (0..4).map(|_| tree.insert(Some(doc), LocalElement::default())).collect();
        service.register(&mut tree, OverlayId(0), e[0], false, false, 2);
        service.register(&mut tree, OverlayId(1), e[1], false, true, 4);
        service.register(&mut tree, OverlayId(2), e[2], false, true, 6);
        assert_eq!(tree.z_index(eater), Some(3), "below the cascade root");

        service.register(&mut tree, OverlayId(3), e[3], false, false, 8);
        assert_eq!(tree.z_index(eater), Some(7), "below the newer plain overlay");
    }

    #[test]
    fn sticky_overlays_are_not_inside_for_dismissal() {
        let (mut tree, mut service, _) = setup();
        let doc = tree.document();
        let bar = tree.insert(Some(doc), LocalElement::default());
        let button = tree.insert(Some(bar), LocalElement::default());
        let flyout = tree.insert(Some(doc), LocalElement::default());
        service.register(&mut tree, OverlayId(0), bar, true, false, 2);
        service.register(&mut tree, OverlayId(1), flyout, false, false, 4);

        assert_eq!(service.is_inside_dismissible(&tree, button), Some(false));
        assert_eq!(service.is_inside_dismissible(&tree, flyout), Some(true));
    }

    #[test]
    fn reset_removes_the_click_eater() {
        let (mut tree, mut service, eater) = setup();
        service.reset(&mut tree);
        assert!(!tree.is_alive(eater));
        assert_eq!(service.click_eater(), None);
        let again = service.init(&mut tree);
        assert!(tree.is_alive(again));
    }
}
