// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tooltip state machine.
//!
//! Time is supplied by the caller in milliseconds, as with click tracking:
//! the tooltip never reads a clock. Hosts feed input with
//! [`Tooltip::handle`], call [`Tooltip::poll`] when
//! [`Tooltip::next_deadline`] passes, and report the end of show and hide
//! animations with [`Tooltip::finish_animation`].

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::options::{RESHOW_THRESHOLD, TooltipOptions};

/// Which kind of input invoked a tooltip.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Modality {
    /// Mouse or pen.
    Mouse,
    /// Touch contact.
    Touch,
    /// Keyboard focus.
    Keyboard,
}

/// Pointer device type reported with pointer input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// A mouse.
    Mouse,
    /// A pen; behaves like a mouse.
    Pen,
    /// A touch contact.
    Touch,
}

impl PointerKind {
    fn modality(self) -> Modality {
        match self {
            Self::Mouse | Self::Pen => Modality::Mouse,
            Self::Touch => Modality::Touch,
        }
    }
}

/// Input routed to a tooltip from its anchor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TooltipInput {
    /// Pointer entered the anchor.
    PointerOver(PointerKind),
    /// Pointer left the anchor.
    PointerOut(PointerKind),
    /// Pointer pressed on the anchor.
    PointerDown(PointerKind),
    /// Pointer released.
    PointerUp(PointerKind),
    /// Pointer interaction was cancelled.
    PointerCancel(PointerKind),
    /// A key was pressed.
    KeyDown,
    /// A key was released. `tab` is true for the Tab key.
    KeyUp {
        /// Whether the released key is Tab.
        tab: bool,
    },
    /// The anchor lost focus.
    Blur,
}

/// Notifications raised by a tooltip, in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TooltipEvent {
    /// The tooltip is about to appear.
    BeforeOpen,
    /// The tooltip is fully shown.
    Opened,
    /// The tooltip is about to disappear.
    BeforeClose,
    /// The tooltip is gone.
    Closed,
}

/// Events produced by one call.
pub type TooltipEvents = SmallVec<[TooltipEvent; 4]>;

/// When the last tooltip closed, shared by all tooltips of one host.
///
/// A tooltip invoked shortly after another one closed shows faster and
/// without animation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReshowClock {
    /// Timestamp of the most recent close.
    pub last_close: Option<u64>,
}

impl ReshowClock {
    /// Whether an invocation at `now` counts as a reshow.
    pub fn is_reshow(&self, now: u64) -> bool {
        self.last_close
            .is_some_and(|t| now.saturating_sub(t) < RESHOW_THRESHOLD)
    }
}

/// Visible state of a tooltip.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TooltipPhase {
    /// Not shown and nothing pending.
    Hidden,
    /// Waiting for the show delay.
    PendingShow {
        /// When the tooltip appears.
        at: u64,
        /// Whether the show animates.
        animate: bool,
    },
    /// Show animation running.
    Showing,
    /// Fully shown.
    Shown {
        /// When it hides on its own, if ever.
        hide_at: Option<u64>,
    },
    /// Hide animation running.
    Hiding,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum KeyOrBlur {
    KeyUp,
    Blur,
}

/// A tooltip attached to one anchor.
///
/// ```rust
/// use overstory_tooltip::{PointerKind, ReshowClock, Tooltip, TooltipEvent, TooltipInput, TooltipOptions};
///
/// let mut clock = ReshowClock::default();
/// let mut tip = Tooltip::new(TooltipOptions::default().with_content_len(12));
///
/// tip.handle(TooltipInput::PointerOver(PointerKind::Mouse), 1_000, &mut clock);
/// assert_eq!(tip.next_deadline(), Some(1_800));
///
/// assert_eq!(tip.poll(1_800, &mut clock).as_slice(), [TooltipEvent::BeforeOpen]);
/// assert_eq!(tip.finish_animation(1_900, &mut clock).as_slice(), [TooltipEvent::Opened]);
/// ```
#[derive(Clone, Debug)]
pub struct Tooltip {
    options: TooltipOptions,
    phase: TooltipPhase,
    /// Modality of the invocation that started the current cycle.
    trigger: Option<Modality>,
    /// Whether the current cycle hides on a timer.
    timed_hide: bool,
    /// A dismiss arrived during the show animation.
    should_dismiss: bool,
    /// Opened explicitly; ordinary input is ignored until closed.
    opened_explicitly: bool,
    /// Whether the current cycle animates.
    animated: bool,
    last_key_or_blur: Option<KeyOrBlur>,
}

impl Tooltip {
    /// Create a hidden tooltip.
    pub fn new(options: TooltipOptions) -> Self {
        Self {
            options,
            phase: TooltipPhase::Hidden,
            trigger: None,
            timed_hide: false,
            should_dismiss: false,
            opened_explicitly: false,
            animated: false,
            last_key_or_blur: None,
        }
    }

    /// Current options.
    pub fn options(&self) -> &TooltipOptions {
        &self.options
    }

    /// Current phase.
    pub fn phase(&self) -> TooltipPhase {
        self.phase
    }

    /// Whether the tooltip is on screen (showing, shown or hiding).
    pub fn is_visible(&self) -> bool {
        matches!(
            self.phase,
            TooltipPhase::Showing | TooltipPhase::Shown { .. } | TooltipPhase::Hiding
        )
    }

    /// The next time [`Tooltip::poll`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        match self.phase {
            TooltipPhase::PendingShow { at, .. } => Some(at),
            TooltipPhase::Shown { hide_at } => hide_at,
            _ => None,
        }
    }

    /// Feed an input event.
    pub fn handle(&mut self, input: TooltipInput, now: u64, clock: &mut ReshowClock) -> TooltipEvents {
        let mut events = TooltipEvents::new();
        if self.opened_explicitly {
            trace!(?input, "tooltip opened explicitly; input ignored");
            return events;
        }
        match input {
            TooltipInput::PointerOver(PointerKind::Touch) => {}
            TooltipInput::PointerOver(kind) => {
                self.invoke(kind.modality(), true, now, clock, &mut events);
            }
            TooltipInput::PointerDown(PointerKind::Touch) => {
                self.invoke(Modality::Touch, false, now, clock, &mut events);
            }
            TooltipInput::PointerDown(kind)
            | TooltipInput::PointerOut(kind)
            | TooltipInput::PointerUp(kind)
            | TooltipInput::PointerCancel(kind) => {
                self.dismiss(Some(kind.modality()), now, clock, &mut events);
            }
            TooltipInput::KeyDown => self.dismiss(Some(Modality::Keyboard), now, clock, &mut events),
            TooltipInput::KeyUp { tab } => {
                // Only the first Tab onto the anchor shows the tooltip; after a
                // blur any key does.
                let ignored = match self.last_key_or_blur {
                    Some(KeyOrBlur::KeyUp) => true,
                    None => !tab,
                    Some(KeyOrBlur::Blur) => false,
                };
                if ignored {
                    trace!(tab, "tooltip keyup ignored");
                } else {
                    self.last_key_or_blur = Some(KeyOrBlur::KeyUp);
                    self.invoke(Modality::Keyboard, true, now, clock, &mut events);
                }
            }
            TooltipInput::Blur => {
                self.last_key_or_blur = Some(KeyOrBlur::Blur);
                self.dismiss(None, now, clock, &mut events);
            }
        }
        events
    }

    /// Run timers that are due at `now`.
    pub fn poll(&mut self, now: u64, clock: &mut ReshowClock) -> TooltipEvents {
        let mut events = TooltipEvents::new();
        match self.phase {
            TooltipPhase::PendingShow { at, animate } if now >= at => {
                self.begin_show(animate, now, &mut events);
            }
            TooltipPhase::Shown { hide_at: Some(at) } if now >= at => {
                debug!("tooltip hide delay elapsed");
                self.begin_close(self.animated, now, clock, &mut events);
            }
            _ => {}
        }
        events
    }

    /// Report that the running show or hide animation finished.
    pub fn finish_animation(&mut self, now: u64, clock: &mut ReshowClock) -> TooltipEvents {
        let mut events = TooltipEvents::new();
        match self.phase {
            TooltipPhase::Showing => {
                self.enter_shown(now, &mut events);
                if self.should_dismiss {
                    self.should_dismiss = false;
                    self.begin_close(self.animated, now, clock, &mut events);
                }
            }
            TooltipPhase::Hiding => self.finish_close(now, clock, &mut events),
            _ => trace!(phase = ?self.phase, "no tooltip animation to finish"),
        }
        events
    }

    /// Show right away, bypassing delays. Until [`Tooltip::close`] or the hide
    /// delay, ordinary input is ignored.
    ///
    /// `modality` selects the hide behavior: mouse and keyboard opens hide on
    /// the usual timer, touch and `None` stay up until closed.
    pub fn open(&mut self, modality: Option<Modality>, now: u64, clock: &mut ReshowClock) -> TooltipEvents {
        let mut events = TooltipEvents::new();
        if self.options.content_len == 0 {
            trace!("tooltip without content not opened");
            return events;
        }
        self.opened_explicitly = true;
        self.should_dismiss = false;
        match self.phase {
            TooltipPhase::Hiding => self.finish_close(now, clock, &mut events),
            TooltipPhase::Showing | TooltipPhase::Shown { .. } => return events,
            _ => {}
        }
        self.trigger = modality;
        self.timed_hide = matches!(modality, Some(Modality::Mouse | Modality::Keyboard));
        let animate = !clock.is_reshow(now);
        self.begin_show(animate, now, &mut events);
        events
    }

    /// Close, cancelling any pending show.
    pub fn close(&mut self, now: u64, clock: &mut ReshowClock) -> TooltipEvents {
        let mut events = TooltipEvents::new();
        self.opened_explicitly = false;
        match self.phase {
            TooltipPhase::PendingShow { .. } => self.cancel_pending(),
            TooltipPhase::Showing | TooltipPhase::Shown { .. } => {
                self.begin_close(self.animated, now, clock, &mut events);
            }
            TooltipPhase::Hidden | TooltipPhase::Hiding => {}
        }
        events
    }

    /// Replace the content length. Empty content closes the tooltip at once.
    pub fn set_content(&mut self, content_len: usize, now: u64, clock: &mut ReshowClock) -> TooltipEvents {
        let mut events = TooltipEvents::new();
        self.options.content_len = content_len;
        if content_len > 0 {
            if let TooltipPhase::Shown { hide_at: Some(_) } = self.phase {
                self.phase = TooltipPhase::Shown {
                    hide_at: self.hide_at(now),
                };
            }
            return events;
        }
        self.opened_explicitly = false;
        match self.phase {
            TooltipPhase::PendingShow { .. } => self.cancel_pending(),
            TooltipPhase::Showing | TooltipPhase::Shown { .. } => {
                debug!("tooltip content cleared; closing");
                self.begin_close(false, now, clock, &mut events);
            }
            TooltipPhase::Hiding => self.finish_close(now, clock, &mut events),
            TooltipPhase::Hidden => {}
        }
        events
    }

    fn invoke(
        &mut self,
        modality: Modality,
        timed_hide: bool,
        now: u64,
        clock: &mut ReshowClock,
        events: &mut TooltipEvents,
    ) {
        self.should_dismiss = false;
        if self.options.content_len == 0 {
            trace!(?modality, "tooltip without content not invoked");
            return;
        }
        match self.phase {
            TooltipPhase::Showing | TooltipPhase::Shown { .. } | TooltipPhase::PendingShow { .. } => {
                trace!(?modality, "tooltip already invoked");
                return;
            }
            TooltipPhase::Hiding => self.finish_close(now, clock, events),
            TooltipPhase::Hidden => {}
        }
        let reshow = clock.is_reshow(now);
        let delay = self.options.show_delay(modality == Modality::Touch, reshow);
        self.trigger = Some(modality);
        self.timed_hide = timed_hide;
        self.phase = TooltipPhase::PendingShow {
            at: now.saturating_add(delay),
            animate: !reshow,
        };
        debug!(?modality, delay, reshow, "tooltip show scheduled");
    }

    fn dismiss(
        &mut self,
        modality: Option<Modality>,
        now: u64,
        clock: &mut ReshowClock,
        events: &mut TooltipEvents,
    ) {
        if matches!(self.phase, TooltipPhase::Hidden | TooltipPhase::Hiding) {
            return;
        }
        // Blur (no modality) dismisses whatever invoked the tooltip.
        if let Some(m) = modality
            && self.trigger != Some(m)
        {
            trace!(dismiss = ?m, trigger = ?self.trigger, "tooltip dismiss ignored by modality");
            return;
        }
        match self.phase {
            TooltipPhase::PendingShow { .. } => self.cancel_pending(),
            TooltipPhase::Showing => self.should_dismiss = true,
            TooltipPhase::Shown { .. } => self.begin_close(self.animated, now, clock, events),
            TooltipPhase::Hidden | TooltipPhase::Hiding => {}
        }
    }

    fn cancel_pending(&mut self) {
        trace!("pending tooltip show cancelled");
        self.phase = TooltipPhase::Hidden;
        self.trigger = None;
    }

    fn begin_show(&mut self, animate: bool, now: u64, events: &mut TooltipEvents) {
        debug!(animate, "tooltip opening");
        self.animated = animate;
        events.push(TooltipEvent::BeforeOpen);
        if animate {
            self.phase = TooltipPhase::Showing;
        } else {
            self.enter_shown(now, events);
        }
    }

    fn enter_shown(&mut self, now: u64, events: &mut TooltipEvents) {
        self.phase = TooltipPhase::Shown {
            hide_at: self.hide_at(now),
        };
        events.push(TooltipEvent::Opened);
    }

    fn hide_at(&self, now: u64) -> Option<u64> {
        if !self.timed_hide {
            return None;
        }
        self.options.hide_delay().map(|d| now.saturating_add(d))
    }

    fn begin_close(&mut self, animate: bool, now: u64, clock: &mut ReshowClock, events: &mut TooltipEvents) {
        debug!(animate, "tooltip closing");
        self.opened_explicitly = false;
        events.push(TooltipEvent::BeforeClose);
        if animate {
            self.phase = TooltipPhase::Hiding;
        } else {
            self.finish_close(now, clock, events);
        }
    }

    fn finish_close(&mut self, now: u64, clock: &mut ReshowClock, events: &mut TooltipEvents) {
        self.phase = TooltipPhase::Hidden;
        self.trigger = None;
        self.should_dismiss = false;
        clock.last_close = Some(now);
        events.push(TooltipEvent::Closed);
    }
}
