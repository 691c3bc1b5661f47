//! Absolute node geometry.
//!
//! [`NodeBounds`] turns a node's viewport-relative layout box into document
//! coordinates and resolves the height of its first line of text.

use std::convert::Infallible;
use std::str::FromStr;

use lectern_core::NodeId;

use crate::document::{ComputedStyle, DocumentResult, DocumentTree};
use crate::geometry::{Point, Rect};

/// Multiplier applied to the font size for `line-height: normal`.
pub const NORMAL_LINE_HEIGHT_FACTOR: f32 = 1.3;

/// A computed CSS `line-height`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LineHeight {
    /// `normal`.
    #[default]
    Normal,
    /// An absolute length in px.
    Px(f32),
    /// A unitless multiplier of the font size.
    Number(f32),
    /// Anything that could not be resolved; falls back to the font size.
    Unresolved,
}

impl FromStr for LineHeight {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("normal") {
            return Ok(Self::Normal);
        }
        let finite = |value: f32| value.is_finite() && value >= 0.0;
        if let Some(px) = s.strip_suffix("px") {
            return Ok(match px.trim().parse::<f32>() {
                Ok(value) if finite(value) => Self::Px(value),
                _ => Self::Unresolved,
            });
        }
        Ok(match s.parse::<f32>() {
            Ok(value) if finite(value) => Self::Number(value),
            _ => Self::Unresolved,
        })
    }
}

/// Height of the first line of text for the given style.
pub fn first_line_height(style: &ComputedStyle) -> f32 {
    match style.line_height {
        LineHeight::Normal => (style.font_size * NORMAL_LINE_HEIGHT_FACTOR).floor(),
        LineHeight::Px(px) => px,
        LineHeight::Number(factor) => (style.font_size * factor).floor(),
        LineHeight::Unresolved => style.font_size,
    }
}

/// A node's box in document coordinates and its first-line height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBounds {
    /// Layout box offset by the document scroll position.
    pub rect: Rect,
    pub first_line_height: f32,
}

impl NodeBounds {
    /// Compute the bounds of an element.
    pub fn of(doc: &DocumentTree, node: NodeId) -> DocumentResult<Self> {
        let element = doc.element(node)?;
        Ok(Self {
            rect: element.layout.translate(doc.scroll()),
            first_line_height: first_line_height(&element.style),
        })
    }

    pub fn top(&self) -> f32 {
        self.rect.top()
    }

    pub fn left(&self) -> f32 {
        self.rect.left()
    }

    /// Whether a point in document coordinates lies inside, edges included.
    pub fn contains_point(&self, point: Point) -> bool {
        self.rect.contains(point)
    }
}
