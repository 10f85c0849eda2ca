// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction options.
//!
//! Options are plain structs with builders. String values coming from markup
//! or configuration go through [`OverlayOptions::set_option`] and friends:
//! lenient options fall back to their default on unknown values, strict ones
//! fail with [`OverlayError::InvalidOption`].

use alloc::string::ToString;

use overstory_element_tree::ElementId;
use tracing::trace;

use crate::OverlayError;

/// Preferred position relative to the anchor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Placement {
    /// Whichever side fits.
    #[default]
    Auto,
    /// Above the anchor.
    Top,
    /// Below the anchor.
    Bottom,
    /// Left of the anchor.
    Left,
    /// Right of the anchor.
    Right,
}

impl Placement {
    /// Parse leniently; unknown values give [`Placement::Auto`].
    pub fn parse(value: &str) -> Self {
        match value {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Auto,
        }
    }
}

/// How much of an app bar stays on screen while it is closed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ClosedDisplayMode {
    /// Nothing.
    None,
    /// A thin strip.
    Minimal,
    /// Icons without labels.
    #[default]
    Compact,
    /// Everything but the overflow.
    Full,
}

impl ClosedDisplayMode {
    /// Parse strictly.
    pub fn parse(value: &str) -> Result<Self, OverlayError> {
        match value {
            "none" => Ok(Self::None),
            "minimal" => Ok(Self::Minimal),
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            _ => Err(OverlayError::InvalidOption {
                option: "closedDisplayMode",
                value: value.to_string(),
            }),
        }
    }

    /// Position reported while closed in this mode.
    pub fn closed_position(self) -> VisiblePosition {
        match self {
            Self::None => VisiblePosition::Hidden,
            Self::Minimal => VisiblePosition::Minimal,
            Self::Compact => VisiblePosition::Compact,
            Self::Full => VisiblePosition::Full,
        }
    }
}

/// Content model of an app bar.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AppBarLayout {
    /// A row of commands.
    #[default]
    Commands,
    /// Arbitrary content.
    Custom,
    /// Commands with an overflow menu.
    Menu,
}

impl AppBarLayout {
    /// Parse strictly.
    pub fn parse(value: &str) -> Result<Self, OverlayError> {
        match value {
            "commands" => Ok(Self::Commands),
            "custom" => Ok(Self::Custom),
            "menu" => Ok(Self::Menu),
            _ => Err(OverlayError::InvalidOption {
                option: "layout",
                value: value.to_string(),
            }),
        }
    }
}

/// How much of an overlay is on screen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VisiblePosition {
    /// Not visible.
    #[default]
    Hidden,
    /// Closed, showing a thin strip.
    Minimal,
    /// Closed, showing icons.
    Compact,
    /// Closed, showing the full bar.
    Full,
    /// Open.
    Shown,
}

/// Options shared by every overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverlayOptions {
    /// Exempt from light dismiss.
    pub sticky: bool,
    /// Disabled overlays ignore `show`.
    pub disabled: bool,
    /// Preferred placement.
    pub placement: Placement,
    /// Whether showing this overlay joins the cascade.
    pub cascading: bool,
    /// Play show and hide animations.
    pub animate: bool,
    /// Position reported while hidden.
    pub closed_position: VisiblePosition,
    /// Default anchor.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub anchor: Option<ElementId>,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            sticky: false,
            disabled: false,
            placement: Placement::Auto,
            cascading: false,
            animate: true,
            closed_position: VisiblePosition::Hidden,
            anchor: None,
        }
    }
}

impl OverlayOptions {
    /// Set stickiness.
    pub fn with_sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    /// Set disabled.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set placement.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Join the cascade when shown.
    pub fn with_cascading(mut self, cascading: bool) -> Self {
        self.cascading = cascading;
        self
    }

    /// Enable or disable animations.
    pub fn with_animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    /// Set the default anchor.
    pub fn with_anchor(mut self, anchor: ElementId) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Apply a string-valued option by name.
    ///
    /// Recognized keys: `sticky`, `disabled`, `placement`. Unknown keys are
    /// ignored; unknown values fall back to defaults.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), OverlayError> {
        match key {
            "sticky" => self.sticky = parse_bool(value),
            "disabled" => self.disabled = parse_bool(value),
            "placement" => self.placement = Placement::parse(value),
            _ => trace!(key, "unrecognized overlay option ignored"),
        }
        Ok(())
    }
}

/// Options for an app bar.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AppBarOptions {
    /// Shared overlay options.
    pub overlay: OverlayOptions,
    /// Closed appearance.
    pub closed_display_mode: ClosedDisplayMode,
    /// Content model.
    pub layout: AppBarLayout,
}

impl AppBarOptions {
    /// Set the closed display mode.
    pub fn with_closed_display_mode(mut self, mode: ClosedDisplayMode) -> Self {
        self.closed_display_mode = mode;
        self
    }

    /// Set the layout.
    pub fn with_layout(mut self, layout: AppBarLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set stickiness.
    pub fn with_sticky(mut self, sticky: bool) -> Self {
        self.overlay.sticky = sticky;
        self
    }

    /// Apply a string-valued option by name.
    ///
    /// `layout` and `closedDisplayMode` are strict; everything else is
    /// forwarded to [`OverlayOptions::set_option`].
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), OverlayError> {
        match key {
            "layout" => self.layout = AppBarLayout::parse(value)?,
            "closedDisplayMode" => self.closed_display_mode = ClosedDisplayMode::parse(value)?,
            _ => self.overlay.set_option(key, value)?,
        }
        Ok(())
    }

    /// Build from `(key, value)` pairs, failing on the first strict error.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, OverlayError> {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.set_option(key, value)?;
        }
        Ok(options)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "true" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_options_fall_back() {
        let mut options = OverlayOptions::default();
        options.set_option("placement", "diagonal").unwrap();
        assert_eq!(options.placement, Placement::Auto);
        options.set_option("placement", "left").unwrap();
        assert_eq!(options.placement, Placement::Left);
        options.set_option("sticky", "true").unwrap();
        assert!(options.sticky);
        options.set_option("colour", "teal").unwrap();
    }

    #[test]
    fn strict_app_bar_options_fail_fast() {
        let err = AppBarOptions::from_pairs([("closedDisplayMode", "minimal"), ("layout", "grid")])
            .unwrap_err();
        assert_eq!(
            err,
            OverlayError::InvalidOption {
                option: "layout",
                value: "grid".into()
            }
        );
        assert!(AppBarOptions::from_pairs([("closedDisplayMode", "tiny")]).is_err());

        let ok = AppBarOptions::from_pairs([("layout", "menu"), ("closedDisplayMode", "none")]).unwrap();
        assert_eq!(ok.layout, AppBarLayout::Menu);
        assert_eq!(ok.closed_display_mode.closed_position(), VisiblePosition::Hidden);
    }
}
