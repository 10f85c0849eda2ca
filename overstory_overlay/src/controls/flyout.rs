// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use overstory_element_tree::ElementId;

use super::{Cascading, OverlayBehavior};
use crate::{OverlayError, OverlayHost, OverlayId, OverlayOptions, Placement, Renderer};

/// A light-dismissible surface shown next to an anchor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Flyout {
    overlay: OverlayId,
    element: ElementId,
}

impl Flyout {
    /// Host a flyout in `element`. The options are forced to cascade.
    pub fn new<R: Renderer>(
        host: &mut OverlayHost<R>,
        element: ElementId,
        options: OverlayOptions,
    ) -> Result<Self, OverlayError> {
        let overlay = host.create(element, options.with_cascading(true))?;
        Ok(Self { overlay, element })
    }

    /// The hosting element.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Preferred placement relative to the anchor.
    pub fn placement<R: Renderer>(&self, host: &OverlayHost<R>) -> Placement {
        host.options(self.overlay)
            .map_or(Placement::Auto, |o| o.placement)
    }
}

impl OverlayBehavior for Flyout {
    fn overlay(&self) -> OverlayId {
        self.overlay
    }
}

impl Cascading for Flyout {}
