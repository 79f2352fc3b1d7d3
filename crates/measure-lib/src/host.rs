//! Host contract consumed by the measurement controller
//!
//! The core never draws anything itself. It mutates a map-rendering host
//! through this narrow interface: data sources holding immutable feature
//! snapshots, styled render layers, distance labels, a pointer-following
//! tooltip, a symbolic cursor and the host's double-click zoom gesture.
//! Style values are opaque pass-throughs forwarded from configuration and
//! have no behavioral effect on the state machine.

use crate::Result;
use crate::session::{DistanceLabel, MeasurePoint, Path, SessionKey};

/// RGBA color forwarded to the host renderer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineCap {
    #[default]
    Round,
    Butt,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineJoin {
    #[default]
    Round,
    Bevel,
    Miter,
}

/// Rendering style for measurement layers
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasureStyle {
    pub circle_radius: f32,
    pub circle_color: Color,
    pub line_color: Color,
    pub line_width: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
}

impl Default for MeasureStyle {
    fn default() -> Self {
        Self {
            circle_radius: 3.5,
            circle_color: Color::WHITE,
            line_color: Color::rgb(0x44, 0xbf, 0xf0),
            line_width: 3.0,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
        }
    }
}

/// What a render layer draws from its session's feature snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    /// The connecting polyline
    Line,
    /// One circle marker per measured point
    Circle,
}

/// A styled render layer scoped to one session's data source
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerDescriptor {
    pub key: SessionKey,
    pub kind: LayerKind,
    pub style: MeasureStyle,
}

impl LayerDescriptor {
    pub fn line(key: SessionKey, style: MeasureStyle) -> Self {
        Self {
            key,
            kind: LayerKind::Line,
            style,
        }
    }

    pub fn circle(key: SessionKey, style: MeasureStyle) -> Self {
        Self {
            key,
            kind: LayerKind::Circle,
            style,
        }
    }

    /// Stable identifier, unique per session and kind
    pub fn id(&self) -> String {
        match self.kind {
            LayerKind::Line => format!("measure-lines-{}", self.key.raw()),
            LayerKind::Circle => format!("measure-points-{}", self.key.raw()),
        }
    }
}

/// Symbolic cursor requested from the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorStyle {
    #[default]
    Default,
    Crosshair,
    Grab,
}

/// Raw screen position in host pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPosition {
    pub x: f32,
    pub y: f32,
}

/// Pointer-following tooltip owned by the active session
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub screen: ScreenPosition,
    pub text: String,
}

/// Immutable snapshot of one session's renderable features
///
/// Handed to the host on every recomputation as a fresh value; the line is
/// present only when the session has at least two points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureCollection {
    pub points: Vec<MeasurePoint>,
    pub line: Option<Path>,
}

/// The map-rendering host surface mutated by the controller
///
/// `add_source`/`update_source` enforce key preconditions: registering a
/// key twice or updating an unknown key is a programmer error reported
/// through [`crate::Error`].
pub trait MapHost {
    /// Create a dedicated data source for a new session
    fn add_source(&mut self, key: SessionKey, features: FeatureCollection) -> Result<()>;

    /// Replace a session's feature snapshot
    fn update_source(&mut self, key: SessionKey, features: FeatureCollection) -> Result<()>;

    /// Register a styled render layer over a session's data source
    fn add_layer(&mut self, layer: LayerDescriptor) -> Result<()>;

    /// Replace a session's rendered distance labels
    fn set_labels(&mut self, key: SessionKey, labels: Vec<DistanceLabel>) -> Result<()>;

    /// Create or destroy the pointer tooltip
    fn set_tooltip(&mut self, tooltip: Option<Tooltip>);

    /// Move the pointer tooltip without touching its text
    fn move_tooltip(&mut self, screen: ScreenPosition);

    /// Request a symbolic cursor
    fn set_cursor(&mut self, cursor: CursorStyle);

    /// Suppress or restore the host's default double-click zoom gesture
    fn set_double_click_zoom(&mut self, enabled: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_matches_widget_defaults() {
        let style = MeasureStyle::default();
        assert_eq!(style.circle_radius, 3.5);
        assert_eq!(style.circle_color, Color::WHITE);
        assert_eq!(style.line_color, Color::rgb(0x44, 0xbf, 0xf0));
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.line_cap, LineCap::Round);
        assert_eq!(style.line_join, LineJoin::Round);
    }

    #[test]
    fn test_layer_ids_are_scoped_by_session_and_kind() {
        let style = MeasureStyle::default();
        let key = SessionKey::from_raw(4);
        assert_eq!(LayerDescriptor::line(key, style).id(), "measure-lines-4");
        assert_eq!(LayerDescriptor::circle(key, style).id(), "measure-points-4");
    }
}
