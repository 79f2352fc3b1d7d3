//! Measure Lib - Core Model for Interactive Map Distance Measurement
//!
//! This library implements the state machine and geometry model behind a
//! click-to-measure map widget: the user clicks successive points on a map,
//! the widget draws the resulting path and annotates every point with its
//! running great-circle distance.
//!
//! # Architecture
//!
//! - **[`geometry`]**: pure distance engine (haversine segments, path
//!   length, per-point annotations)
//! - **[`Session`]**: one measurement run with its points, path and labels
//! - **[`MeasureController`]**: the `idle`/`measuring` state machine that
//!   consumes input stimuli and mutates the host
//! - **[`MapHost`]**: the narrow contract to the map-rendering host; the
//!   core never draws anything itself
//!
//! The library is UI-free. A concrete host (for example the walkers/egui
//! binding in the viewer crate) supplies rendering, tiles and raw input.

mod controller;
pub mod geometry;
mod host;
mod session;

// Public API exports
pub use controller::{ControllerState, MeasureController};
pub use geometry::DistanceUnit;
pub use host::{
    Color, CursorStyle, FeatureCollection, LayerDescriptor, LayerKind, LineCap, LineJoin, MapHost,
    MeasureStyle, ScreenPosition, Tooltip,
};
pub use session::{DistanceLabel, MeasurePoint, Path, PointId, Session, SessionKey};

/// Error types for the measurement model
///
/// These are programmer-error preconditions surfaced by the host, not
/// runtime conditions: stimuli arriving in the wrong controller state are
/// silent no-ops, never errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("data source already registered for session {key}")]
    DuplicateSource { key: SessionKey },

    #[error("no data source registered for session {key}")]
    UnknownSource { key: SessionKey },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_session() {
        let key = SessionKey::from_raw(7);
        let err = Error::DuplicateSource { key };
        assert!(err.to_string().contains("measure-7"));
    }
}
