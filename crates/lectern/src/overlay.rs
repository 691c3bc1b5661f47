//! Placement of the read-aloud control.
//!
//! The overlay sits to the left of the hovered block, top-aligned with it and
//! as tall as its first line of text.

use lectern_speech::PlaybackState;

use crate::hover::{HoverCoordinate, HoverState};

/// Default horizontal distance between the block and the control.
pub const DEFAULT_OFFSET_X: f32 = 60.0;

/// Where to draw the overlay, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlacement {
    pub top: f32,
    pub left: f32,
    pub height: f32,
}

/// Place the overlay for an active coordinate.
pub fn place(coordinate: &HoverCoordinate, offset_x: f32) -> OverlayPlacement {
    OverlayPlacement {
        top: coordinate.top,
        left: coordinate.left - offset_x,
        height: coordinate.first_line_height,
    }
}

/// What the render collaborator should show.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OverlayView {
    #[default]
    Hidden,
    Visible {
        placement: OverlayPlacement,
        /// False while something is being spoken.
        enabled: bool,
    },
}

impl OverlayView {
    /// Derive the view from the hover and playback states.
    pub fn from_states(hover: &HoverState, playback: &PlaybackState, offset_x: f32) -> Self {
        match hover.coordinate() {
            None => Self::Hidden,
            Some(coordinate) => Self::Visible {
                placement: place(&coordinate, offset_x),
                enabled: !playback.is_speaking(),
            },
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible { .. })
    }

    pub fn placement(&self) -> Option<OverlayPlacement> {
        match self {
            Self::Hidden => None,
            Self::Visible { placement, .. } => Some(*placement),
        }
    }
}
