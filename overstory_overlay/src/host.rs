// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The overlay host: lifecycle, cascade, focus and light dismiss in one place.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Point, Rect};
use overstory_commands::{CommandKind, CommandList};
use overstory_element_tree::{ElementFlags, ElementId, ElementTree, QueryFilter};
use overstory_focus::adapters::element_tree::{first_focusable, navigate};
use overstory_focus::{DefaultPolicy, FocusTracker, Navigation, Restored};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::cascade::{CascadeManager, CollapseStep, Location};
use crate::events::{OverlayEvent, OverlayEventKind, Request, Requests};
use crate::light_dismiss::LightDismissService;
use crate::options::{OverlayOptions, VisiblePosition};
use crate::renderer::{Completion, Renderer, TransitionToken};
use crate::OverlayError;

/// Identifies an overlay created by an [`OverlayHost`].
///
/// Ids are never reused; a disposed overlay keeps its id and ignores
/// further requests.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub(crate) u32);

/// Z index given to the first shown overlay; later shows stack above it.
pub const OVERLAY_Z_BASE: i32 = 1000;

/// Keys the host reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Shift+Tab.
    ShiftTab,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Alt on its own.
    Alt,
    /// F10.
    F10,
    /// Anything else.
    Other,
}

/// Event listener. See [`Requests`].
pub type Listener = Box<dyn FnMut(&OverlayEvent, &mut Requests)>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Hidden,
    Showing(Option<TransitionToken>),
    Shown,
    Hiding(Option<TransitionToken>),
}

#[derive(Clone, Debug)]
struct OverlayRecord {
    element: ElementId,
    options: OverlayOptions,
    anchor: Option<ElementId>,
    phase: Phase,
    disposed: bool,
    /// Adopted overlays, disposed with this one.
    children: Vec<OverlayId>,
    parent: Option<OverlayId>,
    commands: Option<CommandList<OverlayId>>,
    /// Show order, for "most recently shown".
    shown_at: u32,
}

/// Owns the element tree and every overlay shown in it.
///
/// All state changes go through the host: it keeps the cascade, the
/// light-dismiss registrations, the focus tracker and the element→control
/// registry consistent, and asks its [`Renderer`] to play transitions.
///
/// Listeners registered with [`OverlayHost::on_event`] run synchronously at
/// each lifecycle step. Anything they request through [`Requests`] is
/// applied after the step completes.
pub struct OverlayHost<R> {
    tree: ElementTree,
    renderer: R,
    overlays: Vec<OverlayRecord>,
    /// Element → control registry.
    controls: HashMap<ElementId, OverlayId>,
    focus: FocusTracker<ElementId, OverlayId>,
    light_dismiss: LightDismissService,
    cascade: CascadeManager,
    listeners: Vec<Listener>,
    deferred: VecDeque<Request>,
    show_counter: u32,
}

impl<R> core::fmt::Debug for OverlayHost<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OverlayHost")
            .field("tree", &self.tree)
            .field("overlays", &self.overlays.len())
            .field("cascade", &self.cascade)
            .field("focused", &self.focus.focused())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Overlay ids are 32-bit; a host never holds 2^32 overlays."
)]
fn overlay_id(index: usize) -> OverlayId {
    OverlayId(index as u32)
}

impl<R: Renderer> OverlayHost<R> {
    /// Take ownership of `tree` and create the click-eater in it.
    pub fn new(mut tree: ElementTree, renderer: R) -> Self {
        let mut light_dismiss = LightDismissService::new();
        light_dismiss.init(&mut tree);
        Self {
            tree,
            renderer,
            overlays: Vec::new(),
            controls: HashMap::new(),
            focus: FocusTracker::new(),
            light_dismiss,
            cascade: CascadeManager::new(),
            listeners: Vec::new(),
            deferred: VecDeque::new(),
            show_counter: 0,
        }
    }

    /// The element tree.
    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    /// Mutable access to the element tree, for building content.
    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the renderer.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Cascade entries, root first.
    pub fn cascade(&self) -> &[OverlayId] {
        self.cascade.stack()
    }

    /// The cascade manager.
    pub fn cascade_manager(&self) -> &CascadeManager {
        &self.cascade
    }

    /// The light-dismiss service.
    pub fn light_dismiss(&self) -> &LightDismissService {
        &self.light_dismiss
    }

    /// The focused element.
    pub fn focused(&self) -> Option<ElementId> {
        self.focus.focused()
    }

    /// Register an event listener.
    pub fn on_event(&mut self, listener: impl FnMut(&OverlayEvent, &mut Requests) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Resize the viewport; the click-eater follows.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.tree.set_viewport(viewport);
        self.light_dismiss.sync(&mut self.tree);
    }

    /// Make `element` host a new, hidden overlay.
    pub fn create(
        &mut self,
        element: ElementId,
        options: OverlayOptions,
    ) -> Result<OverlayId, OverlayError> {
        if !self.tree.is_alive(element) {
            return Err(OverlayError::StaleElement { element });
        }
        if self.controls.contains_key(&element) {
            return Err(OverlayError::DuplicateControl { element });
        }
        let id = overlay_id(self.overlays.len());
        debug!(
            ?id,
            ?element,
            cascading = options.cascading,
            sticky = options.sticky,
            "overlay created"
        );
        self.tree.remove_flags(element, ElementFlags::VISIBLE);
        self.overlays.push(OverlayRecord {
            element,
            anchor: options.anchor,
            options,
            phase: Phase::Hidden,
            disposed: false,
            children: Vec::new(),
            parent: None,
            commands: None,
            shown_at: 0,
        });
        self.controls.insert(element, id);
        Ok(id)
    }

    /// The control hosted by `element`.
    pub fn control_for(&self, element: ElementId) -> Option<OverlayId> {
        self.controls.get(&element).copied()
    }

    /// The element hosting `overlay`.
    pub fn element(&self, overlay: OverlayId) -> Option<ElementId> {
        self.record(overlay).map(|r| r.element)
    }

    /// The anchor `overlay` was last shown at, or its default anchor.
    pub fn anchor(&self, overlay: OverlayId) -> Option<ElementId> {
        self.record(overlay).and_then(|r| r.anchor)
    }

    /// Options of `overlay`.
    pub fn options(&self, overlay: OverlayId) -> Option<&OverlayOptions> {
        self.record(overlay).map(|r| &r.options)
    }

    /// Enable or disable `overlay`. Disabling does not hide it.
    pub fn set_disabled(&mut self, overlay: OverlayId, disabled: bool) {
        if let Some(r) = self.live_mut(overlay) {
            r.options.disabled = disabled;
        }
    }

    /// Whether `overlay` is hidden or on its way out.
    pub fn is_hidden(&self, overlay: OverlayId) -> bool {
        self.record(overlay)
            .is_none_or(|r| matches!(r.phase, Phase::Hidden | Phase::Hiding(_)))
    }

    /// Whether `overlay` has been disposed.
    pub fn is_disposed(&self, overlay: OverlayId) -> bool {
        self.record(overlay).is_none_or(|r| r.disposed)
    }

    /// How much of `overlay` is on screen.
    pub fn visible_position(&self, overlay: OverlayId) -> VisiblePosition {
        match self.record(overlay) {
            Some(r) if r.disposed => VisiblePosition::Hidden,
            Some(r) if matches!(r.phase, Phase::Showing(_) | Phase::Shown) => {
                VisiblePosition::Shown
            }
            Some(r) => r.options.closed_position,
            None => VisiblePosition::Hidden,
        }
    }

    /// Set the position reported while `overlay` is hidden.
    pub fn set_closed_position(&mut self, overlay: OverlayId, position: VisiblePosition) {
        if let Some(r) = self.live_mut(overlay) {
            r.options.closed_position = position;
        }
    }

    /// Whether focus is inside `overlay`'s element.
    pub fn contains_focus(&self, overlay: OverlayId) -> bool {
        self.element(overlay)
            .is_some_and(|e| self.focus.is_focus_inside(e, &self.tree))
    }

    /// Show `overlay` at its current anchor.
    pub fn show(&mut self, overlay: OverlayId) {
        self.show_inner(overlay, None);
        self.pump();
    }

    /// Show `overlay` anchored at `anchor`.
    ///
    /// For cascading overlays the anchor decides where in the cascade the
    /// overlay lands.
    pub fn show_at(&mut self, overlay: OverlayId, anchor: ElementId) {
        self.show_inner(overlay, Some(anchor));
        self.pump();
    }

    /// Hide `overlay`, and for cascade entries everything above it.
    pub fn hide(&mut self, overlay: OverlayId) {
        self.hide_inner(overlay);
        self.pump();
    }

    /// Hide every cascade entry, tip first.
    pub fn collapse_all(&mut self) {
        self.collapse_all_inner();
        self.pump();
    }

    /// Tear `overlay` down: hide it without animation, dispose adopted
    /// overlays, and release its element. Disposing twice does nothing.
    pub fn dispose(&mut self, overlay: OverlayId) {
        self.dispose_inner(overlay);
        self.advance_collapse();
        self.pump();
    }

    /// Dispose `child` whenever `parent` is disposed.
    pub fn adopt(&mut self, parent: OverlayId, child: OverlayId) {
        if parent == child || self.live(parent).is_none() || self.live(child).is_none() {
            warn!(?parent, ?child, "adopt ignored");
            return;
        }
        if let Some(old) = self.record(child).and_then(|r| r.parent)
            && let Some(r) = self.record_mut(old)
        {
            r.children.retain(|&c| c != child);
        }
        if let Some(r) = self.record_mut(parent)
            && !r.children.contains(&child)
        {
            r.children.push(child);
        }
        if let Some(r) = self.record_mut(child) {
            r.parent = Some(parent);
        }
    }

    /// Dispose every overlay and remove the click-eater.
    pub fn shutdown(&mut self) {
        for index in 0..self.overlays.len() {
            self.dispose_inner(overlay_id(index));
        }
        self.advance_collapse();
        self.deferred.clear();
        self.light_dismiss.reset(&mut self.tree);
    }

    /// Report the end of a pending show or hide transition.
    pub fn complete_transition(&mut self, token: TransitionToken) {
        let found = self.overlays.iter().position(|r| {
            matches!(r.phase, Phase::Showing(Some(t)) | Phase::Hiding(Some(t)) if t == token)
        });
        let Some(index) = found else {
            warn!(?token, "unknown transition token");
            return;
        };
        let id = overlay_id(index);
        if matches!(self.overlays[index].phase, Phase::Showing(_)) {
            self.finish_show(id);
        } else {
            self.finish_hide(id);
            self.advance_collapse();
        }
        self.pump();
    }

    /// Report that focus moved.
    ///
    /// Focus landing in a cascade entry hides the entries above it; focus
    /// leaving the cascade collapses it. When containment cannot be
    /// determined nothing happens.
    pub fn focus_changed(&mut self, focused: Option<ElementId>) {
        if self.focus.set_focused(focused) == focused {
            return;
        }
        trace!(?focused, "focus changed");
        self.apply_focus_rules();
        self.pump();
    }

    /// Handle a key press. Returns whether the key was consumed.
    pub fn key_down(&mut self, key: Key) -> bool {
        let handled = match key {
            Key::Alt | Key::F10 => {
                let active = !self.cascade.is_empty();
                if active {
                    debug!(?key, "collapse cascade from keyboard");
                    self.collapse_all_inner();
                }
                active
            }
            Key::Left => {
                let inside = self
                    .focus
                    .focused()
                    .is_some_and(|f| matches!(self.locate(f), Location::Inside(_)));
                match self.cascade.tip() {
                    Some(tip) if inside && self.cascade.len() > 1 => {
                        self.hide_inner(tip);
                        true
                    }
                    _ => false,
                }
            }
            Key::Right => self.open_focused_flyout_command(),
            Key::Escape => match self.focused_overlay() {
                Some(id) => {
                    self.hide_inner(id);
                    true
                }
                None => false,
            },
            Key::Tab => self.move_focus_within(Navigation::Next, false),
            Key::ShiftTab => self.move_focus_within(Navigation::Prev, false),
            Key::Up => self.move_focus_within(Navigation::Up, true),
            Key::Down => self.move_focus_within(Navigation::Down, true),
            Key::Other => false,
        };
        self.pump();
        handled
    }

    /// Pointer pressed on `target`.
    ///
    /// Outside every shown non-sticky overlay (or on the click-eater) this
    /// dismisses all non-sticky overlays. A press inside a sticky overlay
    /// counts as outside, matching what [`OverlayHost::pointer_down_at`] sees
    /// when the click-eater covers the bar. Returns whether anything was
    /// dismissed.
    pub fn pointer_down(&mut self, target: ElementId) -> bool {
        if self.light_dismiss.click_eater() != Some(target) {
            match self.light_dismiss.is_inside_dismissible(&self.tree, target) {
                Some(false) => {}
                Some(true) => return false,
                None => {
                    trace!(?target, "pointer target location unknown; not dismissing");
                    return false;
                }
            }
        }
        let dismissed = self.dismiss_all_non_sticky("pointer");
        self.pump();
        dismissed
    }

    /// Pointer pressed at a document position. Hit tests, then behaves like
    /// [`OverlayHost::pointer_down`].
    pub fn pointer_down_at(&mut self, point: Point) -> bool {
        let target = self
            .tree
            .hit_test_point(point, QueryFilter::new().visible().pickable())
            .map_or(self.tree.document(), |hit| hit.element);
        self.pointer_down(target)
    }

    /// The window lost focus: dismiss all non-sticky overlays.
    pub fn window_blur(&mut self) -> bool {
        let dismissed = self.dismiss_all_non_sticky("blur");
        self.pump();
        dismissed
    }

    /// The platform back button. Dismisses one overlay: the cascade tip if it
    /// is light dismissible, else the most recently shown non-sticky overlay.
    ///
    /// Returns whether the request was handled.
    pub fn back_requested(&mut self) -> bool {
        let target = self
            .cascade
            .tip()
            .filter(|&tip| self.light_dismiss.dismissible().any(|d| d == tip))
            .or_else(|| self.light_dismiss.dismissible().next_back());
        let Some(target) = target else {
            trace!("back request not handled");
            return false;
        };
        debug!(?target, "back request dismisses overlay");
        self.hide_inner(target);
        self.pump();
        true
    }

    /// Attach a command list to `overlay`.
    pub fn set_commands(&mut self, overlay: OverlayId, commands: CommandList<OverlayId>) {
        if let Some(r) = self.live_mut(overlay) {
            r.commands = Some(commands);
        }
    }

    /// The command list of `overlay`.
    pub fn commands(&self, overlay: OverlayId) -> Option<&CommandList<OverlayId>> {
        self.record(overlay).and_then(|r| r.commands.as_ref())
    }

    /// Unhide commands of `overlay`. Allowed while it is open.
    pub fn show_commands(&mut self, overlay: OverlayId, ids: &[&str]) -> Result<(), OverlayError> {
        self.commands_mut(overlay, ids)?.show_commands(ids)?;
        Ok(())
    }

    /// Hide commands of `overlay`. Allowed while it is open.
    pub fn hide_commands(&mut self, overlay: OverlayId, ids: &[&str]) -> Result<(), OverlayError> {
        self.commands_mut(overlay, ids)?.hide_commands(ids)?;
        Ok(())
    }

    /// Show exactly the named commands of `overlay`.
    pub fn show_only_commands(
        &mut self,
        overlay: OverlayId,
        ids: &[&str],
    ) -> Result<(), OverlayError> {
        self.commands_mut(overlay, ids)?.show_only_commands(ids)?;
        Ok(())
    }

    /// Set `hidden` on one command. Fails while `overlay` is open.
    pub fn set_command_hidden(
        &mut self,
        overlay: OverlayId,
        command: &str,
        hidden: bool,
    ) -> Result<(), OverlayError> {
        let open = !self.is_hidden(overlay);
        self.commands_mut(overlay, &[command])?
            .set_hidden(command, hidden, open)?;
        Ok(())
    }

    /// Invoke a command of `overlay`.
    ///
    /// A flyout command shows its target anchored at the command's element.
    /// A button or toggle inside a cascade collapses it. Hidden commands,
    /// separators and content do nothing.
    pub fn invoke_command(&mut self, overlay: OverlayId, command: &str) -> Result<(), OverlayError> {
        let unknown = || OverlayError::UnknownCommand {
            command: command.into(),
        };
        let record = self.live(overlay).ok_or_else(unknown)?;
        let list = record.commands.as_ref().ok_or_else(unknown)?;
        let cmd = list.get_command_by_id(command).ok_or_else(unknown)?;
        if cmd.hidden {
            trace!(?overlay, command, "hidden command not invoked");
            return Ok(());
        }
        let kind = cmd.kind;
        let anchor = cmd.element.unwrap_or(record.element);
        let target = list.flyout_target(command);

        match kind {
            CommandKind::Flyout => match target {
                Some(target) => self.show_inner(target, Some(anchor)),
                None => warn!(?overlay, command, "flyout command without a target"),
            },
            CommandKind::Button | CommandKind::Toggle => {
                if kind == CommandKind::Toggle
                    && let Some(list) = self.live_mut(overlay).and_then(|r| r.commands.as_mut())
                {
                    list.toggle(command)?;
                }
                if self.cascade.index_of(overlay).is_some() {
                    self.collapse_all_inner();
                }
            }
            CommandKind::Separator | CommandKind::Content => {}
        }
        self.pump();
        Ok(())
    }

    fn record(&self, id: OverlayId) -> Option<&OverlayRecord> {
        self.overlays.get(id.0 as usize)
    }

    fn record_mut(&mut self, id: OverlayId) -> Option<&mut OverlayRecord> {
        self.overlays.get_mut(id.0 as usize)
    }

    fn live(&self, id: OverlayId) -> Option<&OverlayRecord> {
        self.record(id).filter(|r| !r.disposed)
    }

    fn live_mut(&mut self, id: OverlayId) -> Option<&mut OverlayRecord> {
        self.record_mut(id).filter(|r| !r.disposed)
    }

    fn commands_mut(
        &mut self,
        overlay: OverlayId,
        ids: &[&str],
    ) -> Result<&mut CommandList<OverlayId>, OverlayError> {
        self.live_mut(overlay)
            .and_then(|r| r.commands.as_mut())
            .ok_or_else(|| OverlayError::UnknownCommand {
                command: ids.first().copied().unwrap_or_default().into(),
            })
    }

    fn locate(&self, node: ElementId) -> Location {
        self.cascade
            .locate(node, |o| self.record(o).map(|r| r.element), &self.tree)
    }

    fn emit(&mut self, overlay: OverlayId, kind: OverlayEventKind) {
        let event = OverlayEvent { overlay, kind };
        trace!(?event, "overlay event");
        let mut requests = Requests::default();
        for listener in &mut self.listeners {
            listener(&event, &mut requests);
        }
        self.deferred.extend(requests.items);
    }

    /// Apply requests made by listeners, including ones made while applying.
    fn pump(&mut self) {
        while let Some(request) = self.deferred.pop_front() {
            trace!(?request, "applying listener request");
            match request {
                Request::Show(id, anchor) => self.show_inner(id, anchor),
                Request::Hide(id) => self.hide_inner(id),
                Request::CollapseAll => self.collapse_all_inner(),
            }
        }
    }

    fn show_inner(&mut self, id: OverlayId, anchor: Option<ElementId>) {
        let locked = self.cascade.is_locked();
        let Some(record) = self.live_mut(id) else {
            trace!(?id, "show ignored: unknown or disposed overlay");
            return;
        };
        if record.options.disabled {
            trace!(?id, "show ignored: overlay disabled");
            return;
        }
        if matches!(record.phase, Phase::Showing(_) | Phase::Shown) {
            trace!(?id, "show ignored: already shown");
            return;
        }
        if let Some(anchor) = anchor {
            record.anchor = Some(anchor);
        }
        let (phase, cascading, anchor) = (record.phase, record.options.cascading, record.anchor);
        if locked {
            self.cascade.queue_show(id);
            return;
        }
        if let Phase::Hiding(token) = phase {
            trace!(?id, "show finishes an in-flight hide");
            if let Some(token) = token {
                self.renderer.cancel(token);
            }
            self.finish_hide(id);
        }
        if cascading {
            let keep = match anchor.map(|a| self.locate(a)) {
                Some(Location::Inside(i)) => i + 1,
                _ => 0,
            };
            if self.cascade.len() > keep {
                debug!(?id, keep, "cascade truncates before show");
                self.cascade.begin_collapse(keep);
                self.cascade.queue_show(id);
                self.advance_collapse();
                return;
            }
            self.cascade.push(id);
        }
        self.begin_show(id);
    }

    fn begin_show(&mut self, id: OverlayId) {
        self.show_counter = self.show_counter.saturating_add(1);
        let order = self.show_counter;
        let z = i32::try_from(order)
            .unwrap_or(i32::MAX)
            .saturating_mul(2)
            .saturating_add(OVERLAY_Z_BASE);
        let Some(record) = self.record_mut(id) else {
            return;
        };
        record.phase = Phase::Showing(None);
        record.shown_at = order;
        let (element, sticky, cascading, animate) = (
            record.element,
            record.options.sticky,
            record.options.cascading,
            record.options.animate,
        );

        debug!(?id, ?element, animate, "overlay show");
        self.focus.capture(id);
        self.tree.set_z_index(element, z);
        self.tree.insert_flags(element, ElementFlags::VISIBLE);
        self.light_dismiss
            .register(&mut self.tree, id, element, sticky, cascading, z);
        self.emit(id, OverlayEventKind::BeforeShow);

        match self.renderer.begin_show(id, element, animate) {
            Completion::Immediate => self.finish_show(id),
            Completion::Pending(token) => {
                if let Some(record) = self.record_mut(id) {
                    record.phase = Phase::Showing(Some(token));
                }
            }
        }
    }

    fn finish_show(&mut self, id: OverlayId) {
        let Some(record) = self.record_mut(id) else {
            return;
        };
        record.phase = Phase::Shown;
        let element = record.element;
        let target = first_focusable(&self.tree, element).unwrap_or(element);
        debug!(?id, ?target, "overlay shown");
        self.focus.set_focused(Some(target));
        self.apply_focus_rules();
        self.emit(id, OverlayEventKind::AfterShow);
    }

    fn hide_inner(&mut self, id: OverlayId) {
        let Some(record) = self.live(id) else {
            trace!(?id, "hide ignored: unknown or disposed overlay");
            return;
        };
        if matches!(record.phase, Phase::Hidden | Phase::Hiding(_)) {
            if self.cascade.queued() == Some(id) {
                trace!(?id, "hide drops a queued show");
                self.cascade.forget(id);
            } else {
                trace!(?id, "hide ignored: already hidden");
            }
            return;
        }
        match self.cascade.index_of(id) {
            Some(i) => self.collapse_to(i),
            None => {
                self.begin_hide(id, false);
            }
        }
    }

    /// Start hiding `id`. Returns whether the hide is still in flight.
    ///
    /// `force` skips the animation; a renderer that still reports a pending
    /// transition has it cancelled.
    fn begin_hide(&mut self, id: OverlayId, force: bool) -> bool {
        let show_token = match self.record(id).map(|r| r.phase) {
            None | Some(Phase::Hidden) => {
                self.cascade.hide_finished(id);
                return false;
            }
            Some(Phase::Hiding(_)) => return true,
            Some(Phase::Showing(token)) => token,
            Some(Phase::Shown) => None,
        };
        let Some(record) = self.record_mut(id) else {
            return false;
        };
        record.phase = Phase::Hiding(None);
        let element = record.element;
        let animate = record.options.animate && !force;

        if let Some(token) = show_token {
            trace!(?id, "show transition cancelled by hide");
            self.renderer.cancel(token);
        }
        debug!(?id, animate, "overlay hide");
        self.emit(id, OverlayEventKind::BeforeHide);
        self.light_dismiss.unregister(&mut self.tree, id);
        self.restore_focus(id, element);

        match self.renderer.begin_hide(id, element, animate) {
            Completion::Immediate => {
                self.finish_hide(id);
                false
            }
            Completion::Pending(token) if force => {
                self.renderer.cancel(token);
                self.finish_hide(id);
                false
            }
            Completion::Pending(token) => {
                if let Some(record) = self.record_mut(id) {
                    record.phase = Phase::Hiding(Some(token));
                }
                true
            }
        }
    }

    fn finish_hide(&mut self, id: OverlayId) {
        let Some(record) = self.record_mut(id) else {
            return;
        };
        record.phase = Phase::Hidden;
        let element = record.element;
        self.tree.remove_flags(element, ElementFlags::VISIBLE);
        self.cascade.hide_finished(id);
        debug!(?id, "overlay hidden");
        self.emit(id, OverlayEventKind::AfterHide);
    }

    /// Hide immediately, whatever the current phase.
    fn force_hide(&mut self, id: OverlayId) {
        if self.begin_hide(id, true)
            && let Some(Phase::Hiding(token)) = self.record(id).map(|r| r.phase)
        {
            if let Some(token) = token {
                self.renderer.cancel(token);
            }
            self.finish_hide(id);
        }
    }

    /// Put focus back when `id` starts hiding with focus inside it.
    ///
    /// The snapshot taken at show wins; otherwise the entry now at the cascade
    /// tip, then the anchor. With no candidate focus goes to nothing, as a
    /// browser moves it to the body.
    fn restore_focus(&mut self, id: OverlayId, element: ElementId) {
        if !self.focus.is_focus_inside(element, &self.tree) {
            self.focus.release(id);
            return;
        }
        let fallbacks: SmallVec<[ElementId; 2]> = self
            .cascade
            .tip()
            .and_then(|tip| self.record(tip).map(|r| r.element))
            .into_iter()
            .chain(self.record(id).and_then(|r| r.anchor))
            .collect();
        match self.focus.restore(id, fallbacks, &self.tree) {
            Restored::Unchanged => {
                debug!(?id, "no focus target after hide; focus cleared");
                self.focus.set_focused(None);
            }
            restored => debug!(?id, ?restored, "focus restored"),
        }
        self.apply_focus_rules();
    }

    fn apply_focus_rules(&mut self) {
        if self.cascade.is_locked() || self.cascade.is_empty() {
            return;
        }
        let Some(focused) = self.focus.focused() else {
            return;
        };
        match self.locate(focused) {
            Location::Inside(i) if i + 1 < self.cascade.len() => {
                debug!(entry = i, "focus moved into cascade entry; shedding descendants");
                self.collapse_to(i + 1);
            }
            Location::Inside(_) => {}
            Location::Outside => {
                debug!("focus left the cascade");
                self.collapse_to(0);
            }
            Location::Unknown => trace!(?focused, "focus location unknown; cascade left alone"),
        }
    }

    fn collapse_to(&mut self, keep: usize) {
        self.cascade.begin_collapse(keep);
        self.advance_collapse();
    }

    fn collapse_all_inner(&mut self) {
        if !self.cascade.is_empty() || self.cascade.is_locked() {
            self.collapse_to(0);
        }
    }

    fn advance_collapse(&mut self) {
        loop {
            match self.cascade.next_step() {
                CollapseStep::Idle | CollapseStep::Wait => return,
                CollapseStep::Hide(id) => {
                    if self.begin_hide(id, false) {
                        return;
                    }
                }
                CollapseStep::Done(queued) => {
                    debug!(len = self.cascade.len(), ?queued, "cascade collapse finished");
                    // A queued show moves focus itself once it is shown.
                    match queued {
                        Some(id) => self.show_inner(id, None),
                        None => self.apply_focus_rules(),
                    }
                    return;
                }
            }
        }
    }

    fn dispose_inner(&mut self, id: OverlayId) {
        let Some(record) = self.live_mut(id) else {
            trace!(?id, "dispose ignored: unknown or already disposed");
            return;
        };
        record.disposed = true;
        let children = core::mem::take(&mut record.children);
        let (element, parent) = (record.element, record.parent);
        debug!(?id, children = children.len(), "overlay dispose");

        for child in children {
            self.dispose_inner(child);
        }
        while let Some(entry) = self.cascade.pop_through(id) {
            self.force_hide(entry);
        }
        self.force_hide(id);
        self.cascade.forget(id);
        self.light_dismiss.unregister(&mut self.tree, id);
        self.focus.release(id);
        if self.controls.get(&element) == Some(&id) {
            self.controls.remove(&element);
        }
        if let Some(parent) = parent
            && let Some(r) = self.record_mut(parent)
        {
            r.children.retain(|&c| c != id);
        }
        self.emit(id, OverlayEventKind::Disposed);
    }

    fn dismiss_all_non_sticky(&mut self, trigger: &'static str) -> bool {
        let targets: SmallVec<[OverlayId; 8]> = self.light_dismiss.dismissible().collect();
        if targets.is_empty() {
            trace!(trigger, "nothing to light dismiss");
            return false;
        }
        debug!(trigger, count = targets.len(), "light dismiss");
        // The cascade goes as one unit from its lowest dismissible entry.
        if let Some(lowest) = targets
            .iter()
            .filter_map(|&t| self.cascade.index_of(t))
            .min()
        {
            self.collapse_to(lowest);
        }
        for target in targets {
            if self.cascade.index_of(target).is_none() {
                self.hide_inner(target);
            }
        }
        true
    }

    /// The most recently shown overlay that contains focus.
    fn focused_overlay(&self) -> Option<OverlayId> {
        let focused = self.focus.focused()?;
        self.overlays
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.disposed && matches!(r.phase, Phase::Showing(_) | Phase::Shown))
            .filter(|(_, r)| self.tree.contains(r.element, focused) == Some(true))
            .max_by_key(|(_, r)| r.shown_at)
            .map(|(i, _)| overlay_id(i))
    }

    /// Move focus inside the focused overlay. Tab and Shift+Tab wrap inside
    /// any overlay; arrows only move within overlays that carry commands.
    fn move_focus_within(&mut self, direction: Navigation, commands_only: bool) -> bool {
        let (Some(id), Some(origin)) = (self.focused_overlay(), self.focus.focused()) else {
            return false;
        };
        let Some(record) = self.record(id) else {
            return false;
        };
        if commands_only && record.commands.is_none() {
            return false;
        }
        let root = record.element;
        if let Some(next) = navigate(&self.tree, root, origin, direction, &DefaultPolicy::default()) {
            trace!(?id, ?direction, ?next, "focus moved within overlay");
            self.focus.set_focused(Some(next));
        }
        true
    }

    /// Right arrow on a flyout command opens its sub-flyout.
    fn open_focused_flyout_command(&mut self) -> bool {
        let (Some(id), Some(focused)) = (self.focused_overlay(), self.focus.focused()) else {
            return false;
        };
        let Some(list) = self.record(id).and_then(|r| r.commands.as_ref()) else {
            return false;
        };
        let Some(command) = list.command_at_element(focused) else {
            return false;
        };
        let Some(target) = list.flyout_target(&command.id) else {
            return false;
        };
        self.show_inner(target, Some(focused));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{Deferred, Instant};
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use overstory_commands::Command;
    use overstory_element_tree::LocalElement;

    type Log = Rc<RefCell<Vec<OverlayEvent>>>;

    struct Surface {
        id: OverlayId,
        element: ElementId,
        item: ElementId,
    }

    fn host<R: Renderer>(renderer: R) -> (OverlayHost<R>, ElementId, Log) {
        let tree = ElementTree::with_viewport(Rect::new(0.0, 0.0, 800.0, 600.0));
        let mut host = OverlayHost::new(tree, renderer);
        let doc = host.tree().document();
        let button = host
            .tree_mut()
            .insert(Some(doc), LocalElement::focusable(Rect::new(0.0, 0.0, 50.0, 20.0)));
        let log: Log = Rc::default();
        let sink = log.clone();
        host.on_event(move |event, _| sink.borrow_mut().push(*event));
        (host, button, log)
    }

    fn surface<R: Renderer>(host: &mut OverlayHost<R>, n: u32, options: OverlayOptions) -> Surface {
        let doc = host.tree().document();
        let x = 100.0 * f64::from(n);
        let tree = host.tree_mut();
        let element = tree.insert(
            Some(doc),
            LocalElement::with_bounds(Rect::new(x, 100.0, x + 90.0, 300.0)),
        );
        let item = tree.insert(
            Some(element),
            LocalElement::focusable(Rect::new(x, 100.0, x + 90.0, 120.0)),
        );
        let id = host.create(element, options).unwrap();
        Surface { id, element, item }
    }

    fn flyout() -> OverlayOptions {
        OverlayOptions::default().with_cascading(true)
    }

    /// Create `n` flyouts, each shown anchored at an item of the previous one.
    fn chain(host: &mut OverlayHost<Instant>, button: ElementId, n: u32) -> Vec<Surface> {
        let mut surfaces: Vec<Surface> = Vec::new();
        for i in 0..n {
            let s = surface(host, i, flyout());
            let anchor = surfaces.last().map_or(button, |p| p.item);
            host.show_at(s.id, anchor);
            surfaces.push(s);
        }
        surfaces
    }

    fn settle_deferred(host: &mut OverlayHost<Deferred>) {
        while let Some(token) = host.renderer_mut().take_oldest() {
            host.complete_transition(token);
        }
    }

    fn kinds(log: &Log, overlay: OverlayId) -> Vec<OverlayEventKind> {
        log.borrow()
            .iter()
            .filter(|e| e.overlay == overlay)
            .map(|e| e.kind)
            .collect()
    }

    fn after_hides(log: &Log) -> Vec<OverlayId> {
        log.borrow()
            .iter()
            .filter(|e| e.kind == OverlayEventKind::AfterHide)
            .map(|e| e.overlay)
            .collect()
    }

    #[test]
    fn chained_flyouts_build_a_cascade() {
        let (mut host, button, log) = host(Instant);
        host.focus_changed(Some(button));
        let s = chain(&mut host, button, 6);

        let ids: Vec<_> = s.iter().map(|s| s.id).collect();
        assert_eq!(host.cascade(), &ids[..]);
        assert_eq!(host.focused(), Some(s[5].item));
        for surface in &s {
            assert!(host.tree().is_rendered(surface.element));
            assert_eq!(
                kinds(&log, surface.id),
                [OverlayEventKind::BeforeShow, OverlayEventKind::AfterShow]
            );
        }
    }

    #[test]
    fn hiding_a_middle_entry_sheds_everything_above_it() {
        let (mut host, button, log) = host(Instant);
        host.focus_changed(Some(button));
        let s = chain(&mut host, button, 6);

        host.hide(s[2].id);
        assert_eq!(host.cascade(), &[s[0].id, s[1].id]);
        assert_eq!(after_hides(&log), [s[5].id, s[4].id, s[3].id, s[2].id]);
        assert_eq!(host.focused(), Some(s[1].item), "focus returns to what flyout 2 captured");
        assert!(!host.tree().is_rendered(s[3].element));
        assert!(!host.cascade_manager().is_locked());
    }

    #[test]
    fn alt_collapses_the_cascade_root_last() {
        let (mut host, button, log) = host(Instant);
        host.focus_changed(Some(button));
        let s = chain(&mut host, button, 6);
        assert_eq!(host.focused(), Some(s[5].item));

        assert!(host.key_down(Key::Alt));
        assert!(host.cascade().is_empty());
        let order: Vec<_> = s.iter().rev().map(|s| s.id).collect();
        assert_eq!(after_hides(&log), order);
        assert_eq!(host.focused(), Some(button));
        assert!(!host.key_down(Key::F10), "nothing left to collapse");
    }

    #[test]
    fn shows_requested_during_a_collapse_wait_for_it() {
        let (mut host, button, log) = host(Deferred::new());
        host.focus_changed(Some(button));
        let a = surface(&mut host, 0, flyout());
        let b = surface(&mut host, 1, flyout());
        let x = surface(&mut host, 2, flyout());
        host.show_at(a.id, button);
        settle_deferred(&mut host);
        host.show_at(b.id, a.item);
        settle_deferred(&mut host);

        let (a_id, x_id) = (a.id, x.id);
        host.on_event(move |event, requests| {
            if event.overlay == a_id && event.kind == OverlayEventKind::BeforeHide {
                requests.show_at(x_id, button);
            }
        });

        host.collapse_all();
        assert!(host.cascade_manager().is_locked());
        assert_eq!(host.renderer().pending().len(), 1, "only the tip is hiding");

        let token = host.renderer_mut().take_oldest().unwrap();
        host.complete_transition(token);
        assert_eq!(host.cascade_manager().queued(), Some(x.id));
        assert!(host.is_hidden(x.id), "x waits for the collapse");
        assert_eq!(host.visible_position(x.id), VisiblePosition::Hidden);

        settle_deferred(&mut host);
        assert_eq!(host.cascade(), &[x.id]);
        assert!(!host.is_hidden(x.id));

        let order: Vec<_> = log.borrow().iter().map(|e| (e.overlay, e.kind)).collect();
        let a_gone = order
            .iter()
            .position(|&e| e == (a.id, OverlayEventKind::AfterHide))
            .unwrap();
        let x_starts = order
            .iter()
            .position(|&e| e == (x.id, OverlayEventKind::BeforeShow))
            .unwrap();
        assert!(a_gone < x_starts);
    }

    #[test]
    fn showing_inside_a_lower_entry_truncates_first() {
        let (mut host, button, _) = host(Instant);
        let s = chain(&mut host, button, 4);
        let e = surface(&mut host, 4, flyout());

        host.show_at(e.id, s[1].item);
        assert_eq!(host.cascade(), &[s[0].id, s[1].id, e.id]);
        assert!(host.is_hidden(s[2].id) && host.is_hidden(s[3].id));
        assert_eq!(host.anchor(e.id), Some(s[1].item));
    }

    #[test]
    fn showing_outside_the_cascade_replaces_it() {
        let (mut host, button, _) = host(Instant);
        let s = chain(&mut host, button, 2);
        let other = surface(&mut host, 5, flyout());

        host.show_at(other.id, button);
        assert_eq!(host.cascade(), &[other.id]);
        assert!(host.is_hidden(s[0].id));
    }

    #[test]
    fn only_the_latest_parked_show_runs() {
        let (mut host, button, _) = host(Deferred::new());
        let a = surface(&mut host, 0, flyout());
        let b = surface(&mut host, 1, flyout());
        let x = surface(&mut host, 2, flyout());
        let y = surface(&mut host, 3, flyout());
        host.show_at(a.id, button);
        settle_deferred(&mut host);
        host.show_at(b.id, a.item);
        settle_deferred(&mut host);

        host.collapse_all();
        host.show_at(x.id, button);
        host.show_at(y.id, button);
        settle_deferred(&mut host);

        assert_eq!(host.cascade(), &[y.id]);
        assert!(host.is_hidden(x.id));
    }

    #[test]
    fn hiding_a_parked_show_cancels_it() {
        let (mut host, button, _) = host(Deferred::new());
        let a = surface(&mut host, 0, flyout());
        let x = surface(&mut host, 1, flyout());
        host.show_at(a.id, button);
        settle_deferred(&mut host);

        host.hide(a.id);
        host.show_at(x.id, button);
        assert_eq!(host.cascade_manager().queued(), Some(x.id));
        host.hide(x.id);
        assert_eq!(host.cascade_manager().queued(), None);
        settle_deferred(&mut host);

        assert!(host.cascade().is_empty());
        assert!(host.is_hidden(x.id));
    }

    #[test]
    fn hide_and_dispose_are_idempotent() {
        let (mut host, button, log) = host(Instant);
        let parent = surface(&mut host, 0, OverlayOptions::default().with_sticky(true));
        let child = surface(&mut host, 1, flyout());
        host.adopt(parent.id, child.id);
        host.show(parent.id);
        host.show_at(child.id, button);

        host.hide(child.id);
        host.hide(child.id);
        assert_eq!(after_hides(&log), [child.id]);

        host.dispose(parent.id);
        host.dispose(parent.id);
        host.dispose(child.id);
        let disposed = |id| {
            kinds(&log, id)
                .iter()
                .filter(|&&k| k == OverlayEventKind::Disposed)
                .count()
        };
        assert_eq!(disposed(parent.id), 1);
        assert_eq!(disposed(child.id), 1);
        assert!(host.is_disposed(child.id));
        assert_eq!(host.control_for(parent.element), None);
        assert!(!host.tree().is_rendered(parent.element));

        let before = log.borrow().len();
        host.show(parent.id);
        assert_eq!(log.borrow().len(), before, "disposed overlays ignore show");
    }

    #[test]
    fn disposing_a_cascade_entry_takes_the_entries_above_it() {
        let (mut host, button, log) = host(Deferred::new());
        let a = surface(&mut host, 0, flyout());
        let b = surface(&mut host, 1, flyout());
        let c = surface(&mut host, 2, flyout());
        host.show_at(a.id, button);
        settle_deferred(&mut host);
        host.show_at(b.id, a.item);
        settle_deferred(&mut host);
        host.show_at(c.id, b.item);
        settle_deferred(&mut host);

        host.dispose(b.id);
        assert_eq!(host.cascade(), &[a.id]);
        assert!(host.renderer().pending().is_empty(), "disposal never animates");
        assert_eq!(after_hides(&log), [c.id, b.id]);
    }

    #[test]
    fn focus_round_trips_through_a_flyout() {
        let (mut host, button, _) = host(Instant);
        let f = surface(&mut host, 0, flyout());
        host.focus_changed(Some(button));

        host.show_at(f.id, button);
        assert_eq!(host.focused(), Some(f.item));
        assert!(host.contains_focus(f.id));

        host.hide(f.id);
        assert_eq!(host.focused(), Some(button));
    }

    #[test]
    fn focus_goes_nowhere_when_nothing_can_take_it() {
        let (mut host, button, _) = host(Instant);
        let f = surface(&mut host, 0, flyout());
        host.focus_changed(Some(button));
        host.show_at(f.id, button);

        host.tree_mut().remove(button);
        host.hide(f.id);
        assert_eq!(host.focused(), None);
    }

    #[test]
    fn focus_moves_drive_the_cascade() {
        let (mut host, button, _) = host(Instant);
        let s = chain(&mut host, button, 3);

        host.focus_changed(Some(s[0].item));
        assert_eq!(host.cascade(), &[s[0].id], "focus in a lower entry sheds the ones above");

        host.focus_changed(Some(button));
        assert!(host.cascade().is_empty(), "focus outside collapses everything");
    }

    #[test]
    fn focus_leaving_during_a_collapse_applies_once_it_ends() {
        let (mut host, button, _) = host(Deferred::new());
        host.focus_changed(Some(button));
        let s: Vec<_> = (0..3).map(|i| surface(&mut host, i, flyout())).collect();
        host.show_at(s[0].id, button);
        settle_deferred(&mut host);
        host.show_at(s[1].id, s[0].item);
        settle_deferred(&mut host);
        host.show_at(s[2].id, s[1].item);
        settle_deferred(&mut host);
        assert_eq!(host.focused(), Some(s[2].item));

        host.hide(s[2].id);
        assert!(host.cascade_manager().is_locked());
        host.focus_changed(Some(button));
        settle_deferred(&mut host);

        assert!(host.cascade().is_empty());
        assert!(s.iter().all(|s| host.is_hidden(s.id)));
        assert_eq!(host.focused(), Some(button));
    }

    #[test]
    fn focus_entering_a_lower_entry_during_a_collapse_applies_once_it_ends() {
        let (mut host, button, _) = host(Deferred::new());
        let s: Vec<_> = (0..3).map(|i| surface(&mut host, i, flyout())).collect();
        host.show_at(s[0].id, button);
        settle_deferred(&mut host);
        host.show_at(s[1].id, s[0].item);
        settle_deferred(&mut host);
        host.show_at(s[2].id, s[1].item);
        settle_deferred(&mut host);

        host.hide(s[2].id);
        host.focus_changed(Some(s[0].item));
        settle_deferred(&mut host);

        assert_eq!(host.cascade(), &[s[0].id]);
        assert_eq!(host.focused(), Some(s[0].item));
    }

    #[test]
    fn unknowable_focus_leaves_the_cascade_alone() {
        let (mut host, button, _) = host(Instant);
        let s = chain(&mut host, button, 2);
        let doc = host.tree().document();
        let frame = host.tree_mut().insert(
            Some(doc),
            LocalElement::default().with_flags(ElementFlags::default() | ElementFlags::OPAQUE),
        );
        let inside = host
            .tree_mut()
            .insert(Some(frame), LocalElement::focusable(Rect::ZERO));

        host.focus_changed(Some(inside));
        assert_eq!(host.cascade(), &[s[0].id, s[1].id]);
    }

    #[test]
    fn click_eater_dismisses_non_sticky_overlays() {
        let (mut host, button, _) = host(Instant);
        let bar = surface(&mut host, 6, OverlayOptions::default().with_sticky(true));
        host.show(bar.id);
        let s = chain(&mut host, button, 2);
        let eater = host.light_dismiss().click_eater().unwrap();
        assert!(host.tree().is_rendered(eater));

        assert!(!host.pointer_down_at(Point::new(150.0, 110.0)), "inside the tip");
        assert_eq!(host.cascade().len(), 2);
        assert!(
            !host.pointer_down_at(Point::new(50.0, 200.0)),
            "the eater sits below the cascade root"
        );
        assert_eq!(host.cascade().len(), 2);

        assert!(host.pointer_down_at(Point::new(790.0, 590.0)));
        assert!(host.cascade().is_empty());
        assert!(host.is_hidden(s[0].id));
        assert!(!host.is_hidden(bar.id), "sticky overlays survive");
        assert!(!host.tree().is_rendered(eater));
        assert!(!host.pointer_down(eater));
    }

    #[test]
    fn presses_on_a_sticky_bar_dismiss_like_the_click_eater() {
        let (mut host, button, _) = host(Instant);
        let bar = surface(&mut host, 6, OverlayOptions::default().with_sticky(true));
        host.show(bar.id);
        let _ = chain(&mut host, button, 2);

        assert!(host.pointer_down_at(Point::new(610.0, 110.0)), "eater covers the bar");
        assert!(host.cascade().is_empty());

        let _ = chain(&mut host, button, 2);
        assert!(host.pointer_down(bar.item), "direct press on the bar");
        assert!(host.cascade().is_empty());
        assert!(!host.is_hidden(bar.id));
    }

    #[test]
    fn window_blur_dismisses_everything_non_sticky() {
        let (mut host, button, _) = host(Instant);
        let tip = surface(&mut host, 0, OverlayOptions::default());
        host.show(tip.id);
        let _ = chain(&mut host, button, 1);
        assert!(host.window_blur());
        assert!(host.is_hidden(tip.id));
        assert!(host.cascade().is_empty());
    }

    #[test]
    fn back_dismisses_one_overlay_at_a_time() {
        let (mut host, button, _) = host(Instant);
        let bar = surface(&mut host, 6, OverlayOptions::default().with_sticky(true));
        host.show(bar.id);
        let s = chain(&mut host, button, 2);

        assert!(host.back_requested());
        assert_eq!(host.cascade(), &[s[0].id]);
        assert!(host.back_requested());
        assert!(host.cascade().is_empty());
        assert!(!host.back_requested(), "only the sticky bar is left");
        assert!(!host.is_hidden(bar.id));
    }

    #[test]
    fn show_during_hide_finishes_the_hide_first() {
        let (mut host, _, log) = host(Deferred::new());
        let f = surface(&mut host, 0, OverlayOptions::default());
        host.show(f.id);
        settle_deferred(&mut host);

        host.hide(f.id);
        assert!(host.is_hidden(f.id));
        host.show(f.id);
        assert!(!host.is_hidden(f.id));
        assert_eq!(host.renderer().pending().len(), 1, "the hide was cancelled");
        settle_deferred(&mut host);

        assert_eq!(
            kinds(&log, f.id),
            [
                OverlayEventKind::BeforeShow,
                OverlayEventKind::AfterShow,
                OverlayEventKind::BeforeHide,
                OverlayEventKind::AfterHide,
                OverlayEventKind::BeforeShow,
                OverlayEventKind::AfterShow,
            ]
        );
    }

    #[test]
    fn reshowing_a_collapsing_entry_waits_for_the_collapse() {
        let (mut host, button, _) = host(Deferred::new());
        let f = surface(&mut host, 0, flyout());
        host.show_at(f.id, button);
        settle_deferred(&mut host);

        host.hide(f.id);
        host.show(f.id);
        assert_eq!(host.cascade_manager().queued(), Some(f.id));
        settle_deferred(&mut host);
        assert_eq!(host.cascade(), &[f.id]);
        assert!(!host.is_hidden(f.id));
    }

    #[test]
    fn hide_during_show_cancels_it() {
        let (mut host, _, log) = host(Deferred::new());
        let f = surface(&mut host, 0, OverlayOptions::default());
        host.show(f.id);
        host.hide(f.id);
        settle_deferred(&mut host);

        assert_eq!(
            kinds(&log, f.id),
            [
                OverlayEventKind::BeforeShow,
                OverlayEventKind::BeforeHide,
                OverlayEventKind::AfterHide,
            ]
        );
        assert!(host.is_hidden(f.id));
    }

    #[test]
    fn stale_tokens_are_ignored() {
        let (mut host, _, log) = host(Instant);
        host.complete_transition(TransitionToken(42));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn create_rejects_reused_and_dead_elements() {
        let (mut host, _, _) = host(Instant);
        let f = surface(&mut host, 0, OverlayOptions::default());
        assert_eq!(
            host.create(f.element, OverlayOptions::default()),
            Err(OverlayError::DuplicateControl { element: f.element })
        );
        let doc = host.tree().document();
        let gone = host.tree_mut().insert(Some(doc), LocalElement::default());
        host.tree_mut().remove(gone);
        assert_eq!(
            host.create(gone, OverlayOptions::default()),
            Err(OverlayError::StaleElement { element: gone })
        );
        assert_eq!(host.control_for(f.element), Some(f.id));
    }

    #[test]
    fn disabled_overlays_do_not_show() {
        let (mut host, _, log) = host(Instant);
        let f = surface(&mut host, 0, OverlayOptions::default().with_disabled(true));
        host.show(f.id);
        assert!(host.is_hidden(f.id));
        assert!(log.borrow().is_empty());
        host.set_disabled(f.id, false);
        host.show(f.id);
        assert!(!host.is_hidden(f.id));
    }

    #[test]
    fn keyboard_navigation_stays_inside_the_overlay() {
        let (mut host, button, _) = host(Instant);
        let f = surface(&mut host, 0, OverlayOptions::default());
        let second = host
            .tree_mut()
            .insert(Some(f.element), LocalElement::focusable(Rect::new(0.0, 130.0, 90.0, 150.0)));
        host.focus_changed(Some(button));
        host.show(f.id);
        assert_eq!(host.focused(), Some(f.item));

        assert!(host.key_down(Key::Tab));
        assert_eq!(host.focused(), Some(second));
        assert!(host.key_down(Key::Tab));
        assert_eq!(host.focused(), Some(f.item), "tab wraps");
        assert!(host.key_down(Key::ShiftTab));
        assert_eq!(host.focused(), Some(second));
        assert!(!host.key_down(Key::Down), "arrows need commands");

        assert!(host.key_down(Key::Escape));
        assert!(host.is_hidden(f.id));
        assert_eq!(host.focused(), Some(button));
        assert!(!host.key_down(Key::Escape));
    }

    #[test]
    fn left_arrow_closes_the_tip_only() {
        let (mut host, button, _) = host(Instant);
        let s = chain(&mut host, button, 2);
        assert!(host.key_down(Key::Left));
        assert_eq!(host.cascade(), &[s[0].id]);
        assert!(!host.key_down(Key::Left), "the root stays open");
    }

    #[test]
    fn commands_chain_flyouts_and_buttons_collapse() {
        let (mut host, button, _) = host(Instant);
        let menu = surface(&mut host, 0, flyout());
        let sub = surface(&mut host, 1, flyout());
        let list = CommandList::new(vec![
            Command::new("more", CommandKind::Flyout)
                .with_element(menu.item)
                .with_flyout(sub.id),
            Command::new("bold", CommandKind::Toggle),
        ])
        .unwrap();
        host.set_commands(menu.id, list);

        host.show_at(menu.id, button);
        assert!(host.key_down(Key::Right));
        assert_eq!(host.cascade(), &[menu.id, sub.id]);
        assert_eq!(host.anchor(sub.id), Some(menu.item));

        host.invoke_command(menu.id, "bold").unwrap();
        assert!(host.cascade().is_empty());
        assert!(host.commands(menu.id).unwrap().get_command_by_id("bold").unwrap().selected);

        assert_eq!(
            host.invoke_command(menu.id, "nope"),
            Err(OverlayError::UnknownCommand {
                command: "nope".into()
            })
        );
    }

    #[test]
    fn command_visibility_is_locked_while_open() {
        let (mut host, _, _) = host(Instant);
        let bar = surface(&mut host, 0, OverlayOptions::default().with_sticky(true));
        let list = CommandList::new(vec![Command::new("a", CommandKind::Button)]).unwrap();
        host.set_commands(bar.id, list);
        host.show(bar.id);

        assert_eq!(
            host.set_command_hidden(bar.id, "a", true),
            Err(OverlayError::CannotChangeHiddenProperty {
                command: "a".into()
            })
        );
        host.hide_commands(bar.id, &["a"]).unwrap();
        assert!(host.commands(bar.id).unwrap().get_command_by_id("a").unwrap().hidden);

        host.hide(bar.id);
        host.set_command_hidden(bar.id, "a", false).unwrap();
    }

    #[test]
    fn shutdown_disposes_everything() {
        let (mut host, button, log) = host(Instant);
        let s = chain(&mut host, button, 2);
        let eater = host.light_dismiss().click_eater().unwrap();
        host.shutdown();
        assert!(host.cascade().is_empty());
        assert!(s.iter().all(|s| host.is_disposed(s.id)));
        assert!(!host.tree().is_alive(eater));
        let disposed = log
            .borrow()
            .iter()
            .filter(|e| e.kind == OverlayEventKind::Disposed)
            .count();
        assert_eq!(disposed, 2);
    }
}
