// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory Tooltip: when a tooltip shows and when it goes away.
//!
//! Tooltips never join an overlay cascade. They have their own small state
//! machine: a delayed show selected by how the tooltip was invoked (mouse,
//! touch or keyboard), a faster reshow without animation when another
//! tooltip closed moments ago, dismissal by input of the same modality (or
//! blur), and an auto-hide timer.
//!
//! The host owns time. Every entry point takes `now` in milliseconds, and a
//! [`ReshowClock`] shared by all tooltips of one host records the last close.
//!
//! Constants live in [`options`]: the initial non-touch delay is twice the
//! hover time (800 ms by default) and a reshow within 200 ms of the last
//! close waits 600 ms.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod options;
mod tooltip;

pub use options::{Placement, TooltipError, TooltipOptions};
pub use tooltip::{
    Modality, PointerKind, ReshowClock, Tooltip, TooltipEvent, TooltipEvents, TooltipInput,
    TooltipPhase,
};
