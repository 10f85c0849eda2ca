// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use overstory_commands::{Command, CommandList};
use overstory_element_tree::ElementId;

use super::OverlayBehavior;
use crate::{
    AppBarLayout, AppBarOptions, ClosedDisplayMode, OverlayError, OverlayHost, OverlayId,
    Renderer, VisiblePosition,
};

/// A bar of commands along an edge of the window.
///
/// An app bar never joins the cascade. While closed it may keep part of
/// itself on screen, as set by its [`ClosedDisplayMode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppBar {
    overlay: OverlayId,
    element: ElementId,
    closed_display_mode: ClosedDisplayMode,
    layout: AppBarLayout,
}

impl AppBar {
    /// Host an app bar in `element`.
    pub fn new<R: Renderer>(
        host: &mut OverlayHost<R>,
        element: ElementId,
        options: AppBarOptions,
        commands: impl IntoIterator<Item = Command<OverlayId>>,
    ) -> Result<Self, OverlayError> {
        let list = CommandList::new(commands)?;
        let mut overlay_options = options.overlay.with_cascading(false);
        overlay_options.closed_position = options.closed_display_mode.closed_position();
        let overlay = host.create(element, overlay_options)?;
        host.set_commands(overlay, list);
        Ok(Self {
            overlay,
            element,
            closed_display_mode: options.closed_display_mode,
            layout: options.layout,
        })
    }

    /// The hosting element.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Content model, fixed at construction.
    pub fn layout(&self) -> AppBarLayout {
        self.layout
    }

    /// How much of the bar stays on screen while closed.
    pub fn closed_display_mode(&self) -> ClosedDisplayMode {
        self.closed_display_mode
    }

    /// Change the closed appearance.
    pub fn set_closed_display_mode<R: Renderer>(
        &mut self,
        host: &mut OverlayHost<R>,
        mode: ClosedDisplayMode,
    ) {
        self.closed_display_mode = mode;
        host.set_closed_position(self.overlay, mode.closed_position());
    }

    /// Open the bar.
    pub fn open<R: Renderer>(&self, host: &mut OverlayHost<R>) {
        self.show(host);
    }

    /// Close the bar.
    pub fn close<R: Renderer>(&self, host: &mut OverlayHost<R>) {
        self.hide(host);
    }

    /// Whether the bar is open.
    pub fn opened<R: Renderer>(&self, host: &OverlayHost<R>) -> bool {
        !self.is_hidden(host)
    }

    /// How much of the bar is on screen.
    pub fn visible_position<R: Renderer>(&self, host: &OverlayHost<R>) -> VisiblePosition {
        host.visible_position(self.overlay)
    }

    /// Look up a command by id.
    pub fn get_command_by_id<'h, R: Renderer>(
        &self,
        host: &'h OverlayHost<R>,
        id: &str,
    ) -> Option<&'h Command<OverlayId>> {
        host.commands(self.overlay)?.get_command_by_id(id)
    }

    /// Invoke the command `id`.
    pub fn invoke<R: Renderer>(&self, host: &mut OverlayHost<R>, id: &str) -> Result<(), OverlayError> {
        host.invoke_command(self.overlay, id)
    }

    /// Set the `hidden` flag of one command. Fails while the bar is open.
    pub fn set_command_hidden<R: Renderer>(
        &self,
        host: &mut OverlayHost<R>,
        id: &str,
        hidden: bool,
    ) -> Result<(), OverlayError> {
        host.set_command_hidden(self.overlay, id, hidden)
    }

    /// Unhide the named commands.
    pub fn show_commands<R: Renderer>(
        &self,
        host: &mut OverlayHost<R>,
        ids: &[&str],
    ) -> Result<(), OverlayError> {
        host.show_commands(self.overlay, ids)
    }

    /// Hide the named commands.
    pub fn hide_commands<R: Renderer>(
        &self,
        host: &mut OverlayHost<R>,
        ids: &[&str],
    ) -> Result<(), OverlayError> {
        host.hide_commands(self.overlay, ids)
    }

    /// Show exactly the named commands.
    pub fn show_only_commands<R: Renderer>(
        &self,
        host: &mut OverlayHost<R>,
        ids: &[&str],
    ) -> Result<(), OverlayError> {
        host.show_only_commands(self.overlay, ids)
    }
}

impl OverlayBehavior for AppBar {
    fn overlay(&self) -> OverlayId {
        self.overlay
    }
}
