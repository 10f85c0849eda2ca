// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tooltip timing constants and options.

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

/// Default hover time in milliseconds.
pub const DEFAULT_HOVER_TIME: u64 = 400;
/// Touch show delay for ordinary tooltips.
pub const DELAY_INITIAL_TOUCH_SHORT: u64 = 400;
/// Touch show delay for infotips.
pub const DELAY_INITIAL_TOUCH_LONG: u64 = 1200;
/// Reshow delay for ordinary tooltips invoked by touch.
pub const DELAY_RESHOW_NONINFOTIP_TOUCH: u64 = 0;
/// Reshow delay for ordinary tooltips invoked by mouse or keyboard.
pub const DELAY_RESHOW_NONINFOTIP_NONTOUCH: u64 = 600;
/// Reshow delay for infotips invoked by touch.
pub const DELAY_RESHOW_INFOTIP_TOUCH: u64 = 400;
/// Reshow delay for infotips invoked by mouse or keyboard.
pub const DELAY_RESHOW_INFOTIP_NONTOUCH: u64 = 600;
/// A tooltip invoked less than this long after another one closed reshows.
pub const RESHOW_THRESHOLD: u64 = 200;
/// How long an ordinary tooltip stays up.
pub const DEFAULT_MESSAGE_DURATION: u64 = 5000;
/// Per-character reading time for infotips.
pub const INFOTIP_TIME_PER_CHAR: u64 = 60;
/// Upper bound for any hide delay.
pub const HIDE_DELAY_MAX: u64 = 300_000;

/// Error parsing tooltip options strictly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TooltipError {
    /// The placement string was not one of `top`, `bottom`, `left`, `right`.
    InvalidPlacement {
        /// The rejected value.
        value: String,
    },
}

impl fmt::Display for TooltipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlacement { value } => write!(f, "invalid tooltip placement {value:?}"),
        }
    }
}

impl core::error::Error for TooltipError {}

/// Side of the anchor the tooltip prefers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Placement {
    /// Above the anchor.
    #[default]
    Top,
    /// Below the anchor.
    Bottom,
    /// Left of the anchor.
    Left,
    /// Right of the anchor.
    Right,
}

impl Placement {
    /// Parse leniently: unknown values fall back to [`Placement::Top`].
    pub fn parse(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for Placement {
    type Err = TooltipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(TooltipError::InvalidPlacement {
                value: s.to_string(),
            }),
        }
    }
}

/// Tooltip configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TooltipOptions {
    /// Preferred side.
    pub placement: Placement,
    /// Infotips carry longer text and get longer delays and durations.
    pub infotip: bool,
    /// Length of the content in characters. Zero means no content.
    pub content_len: usize,
    /// Hide automatically after a duration. `false` keeps it up until dismissed.
    pub auto_hide: bool,
    /// Base hover time in milliseconds.
    pub hover_time: u64,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            placement: Placement::Top,
            infotip: false,
            content_len: 0,
            auto_hide: true,
            hover_time: DEFAULT_HOVER_TIME,
        }
    }
}

impl TooltipOptions {
    /// Set the placement.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Mark as an infotip.
    pub fn with_infotip(mut self, infotip: bool) -> Self {
        self.infotip = infotip;
        self
    }

    /// Set the content length.
    pub fn with_content_len(mut self, content_len: usize) -> Self {
        self.content_len = content_len;
        self
    }

    /// Enable or disable auto hide.
    pub fn with_auto_hide(mut self, auto_hide: bool) -> Self {
        self.auto_hide = auto_hide;
        self
    }

    /// Set the hover time.
    pub fn with_hover_time(mut self, hover_time: u64) -> Self {
        self.hover_time = hover_time;
        self
    }

    /// Show delay for an invocation by `touch` or not, and whether it is a reshow.
    pub fn show_delay(&self, touch: bool, reshow: bool) -> u64 {
        match (touch, reshow, self.infotip) {
            (true, true, false) => DELAY_RESHOW_NONINFOTIP_TOUCH,
            (true, true, true) => DELAY_RESHOW_INFOTIP_TOUCH,
            (true, false, false) => DELAY_INITIAL_TOUCH_SHORT,
            (true, false, true) => DELAY_INITIAL_TOUCH_LONG,
            (false, true, false) => DELAY_RESHOW_NONINFOTIP_NONTOUCH,
            (false, true, true) => DELAY_RESHOW_INFOTIP_NONTOUCH,
            (false, false, _) => self.hover_time.saturating_mul(2),
        }
    }

    /// How long a shown tooltip stays up, or `None` for never.
    pub fn hide_delay(&self) -> Option<u64> {
        if !self.auto_hide {
            return None;
        }
        let delay = if self.infotip {
            let reading = u64::try_from(self.content_len)
                .unwrap_or(u64::MAX)
                .saturating_mul(INFOTIP_TIME_PER_CHAR);
            reading.max(DEFAULT_MESSAGE_DURATION)
        } else {
            DEFAULT_MESSAGE_DURATION
        };
        Some(delay.min(HIDE_DELAY_MAX))
    }
}
