// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concrete controls built on the host.
//!
//! A control is a thin handle around an [`OverlayId`]. Shared behavior comes
//! from [`OverlayBehavior`], whose default methods delegate to the
//! [`OverlayHost`]; controls that chain into the cascade also implement
//! [`Cascading`].

use overstory_element_tree::ElementId;

use crate::{OverlayHost, OverlayId, Renderer};

mod app_bar;
mod flyout;
mod menu;
mod settings_flyout;

pub use app_bar::AppBar;
pub use flyout::Flyout;
pub use menu::Menu;
pub use settings_flyout::{SettingsEdge, SettingsFlyout};

/// What every overlay control can do.
pub trait OverlayBehavior {
    /// The overlay this control drives.
    fn overlay(&self) -> OverlayId;

    /// Show the overlay.
    fn show<R: Renderer>(&self, host: &mut OverlayHost<R>) {
        host.show(self.overlay());
    }

    /// Hide the overlay.
    fn hide<R: Renderer>(&self, host: &mut OverlayHost<R>) {
        host.hide(self.overlay());
    }

    /// Dispose the overlay. Safe to call more than once.
    fn dispose<R: Renderer>(&self, host: &mut OverlayHost<R>) {
        host.dispose(self.overlay());
    }

    /// Whether focus is inside the overlay.
    fn contains_focus<R: Renderer>(&self, host: &OverlayHost<R>) -> bool {
        host.contains_focus(self.overlay())
    }

    /// Whether the overlay is hidden or hiding.
    fn is_hidden<R: Renderer>(&self, host: &OverlayHost<R>) -> bool {
        host.is_hidden(self.overlay())
    }
}

/// Overlays that join the cascade when shown.
pub trait Cascading: OverlayBehavior {
    /// The element the overlay was last anchored at.
    fn anchor<R: Renderer>(&self, host: &OverlayHost<R>) -> Option<ElementId> {
        host.anchor(self.overlay())
    }

    /// Show anchored at `anchor`. An anchor inside a cascade entry chains
    /// after that entry; any other anchor starts a new cascade.
    fn show_at<R: Renderer>(&self, host: &mut OverlayHost<R>, anchor: ElementId) {
        host.show_at(self.overlay(), anchor);
    }
}
