// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use overstory_element_tree::ElementId;

use super::OverlayBehavior;
use crate::{OverlayError, OverlayHost, OverlayId, OverlayOptions, Placement, Renderer};

/// Window edge a settings pane slides in from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SettingsEdge {
    /// The right edge.
    #[default]
    Right,
    /// The left edge, for right-to-left layouts.
    Left,
}

impl SettingsEdge {
    /// The placement matching this edge.
    pub fn placement(self) -> Placement {
        match self {
            Self::Right => Placement::Right,
            Self::Left => Placement::Left,
        }
    }
}

/// A full-height pane docked to a window edge.
///
/// Showing it does not extend the cascade; focus moving into it collapses
/// any open cascade like any other focus move outside.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SettingsFlyout {
    overlay: OverlayId,
    edge: SettingsEdge,
}

impl SettingsFlyout {
    /// Host a settings pane in `element`.
    pub fn new<R: Renderer>(
        host: &mut OverlayHost<R>,
        element: ElementId,
        options: OverlayOptions,
        edge: SettingsEdge,
    ) -> Result<Self, OverlayError> {
        let options = options
            .with_cascading(false)
            .with_placement(edge.placement());
        let overlay = host.create(element, options)?;
        Ok(Self { overlay, edge })
    }

    /// The docking edge.
    pub fn edge(&self) -> SettingsEdge {
        self.edge
    }
}

impl OverlayBehavior for SettingsFlyout {
    fn overlay(&self) -> OverlayId {
        self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Cascading, Flyout};
    use crate::{Instant, Key};
    use kurbo::Rect;
    use overstory_element_tree::{ElementTree, LocalElement};

    #[test]
    fn settings_pane_replaces_the_cascade_and_leaves_on_escape() {
        let mut host = OverlayHost::new(ElementTree::new(), Instant);
        let doc = host.tree().document();
        let button = host
            .tree_mut()
            .insert(Some(doc), LocalElement::focusable(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let flyout_el = host.tree_mut().insert(Some(doc), LocalElement::default());
        let pane_el = host.tree_mut().insert(Some(doc), LocalElement::default());
        let field = host
            .tree_mut()
            .insert(Some(pane_el), LocalElement::focusable(Rect::new(600.0, 0.0, 700.0, 20.0)));

        let flyout = Flyout::new(&mut host, flyout_el, OverlayOptions::default()).unwrap();
        let pane = SettingsFlyout::new(
            &mut host,
            pane_el,
            OverlayOptions::default().with_placement(Placement::Top),
            SettingsEdge::Left,
        )
        .unwrap();
        assert_eq!(host.options(pane.overlay()).unwrap().placement, Placement::Left);
        assert_eq!(pane.edge(), SettingsEdge::Left);

        host.focus_changed(Some(button));
        flyout.show_at(&mut host, button);
        pane.show(&mut host);
        assert_eq!(host.focused(), Some(field));
        assert!(host.cascade().is_empty(), "focus left the cascade");
        assert!(flyout.is_hidden(&host));

        assert!(host.key_down(Key::Escape));
        assert!(pane.is_hidden(&host));
    }
}
