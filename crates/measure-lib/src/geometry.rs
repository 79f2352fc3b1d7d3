//! Geometry and distance engine
//!
//! Pure functions over ordered point sequences: derive a connected path
//! from points, compute its great-circle length, and produce the per-point
//! running/previous distance annotations. Coordinates are WGS84
//! `geo::Point<f64>` with x = longitude and y = latitude.

use crate::session::Path;
use geo::Point;

/// Mean Earth radius in meters
const EARTH_RADIUS_M: f64 = 6371000.0;

/// Unit tag for measured distances
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceUnit {
    Meters,
    #[default]
    Kilometers,
    Miles,
    NauticalMiles,
}

impl DistanceUnit {
    /// Convert a length in meters into this unit
    #[inline]
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            Self::Meters => meters,
            Self::Kilometers => meters / 1000.0,
            Self::Miles => meters / 1609.344,
            Self::NauticalMiles => meters / 1852.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Kilometers => "km",
            Self::Miles => "mi",
            Self::NauticalMiles => "nmi",
        }
    }

    /// Format a value already expressed in this unit as a human-readable string
    pub fn format(self, value: f64) -> String {
        match self {
            Self::Meters => format!("{:.0} m", value),
            _ => format!("{:.2} {}", value, self.label()),
        }
    }
}

/// Per-point running distances, in the unit they were computed with
///
/// For point i (1-indexed), `cumulative` is the total path distance from
/// the first point through point i and `prior` is the cumulative distance
/// through point i-1 (0 for the first point).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Annotation {
    pub cumulative: f64,
    pub prior: f64,
}

/// Calculate the haversine distance between two WGS84 points in meters
#[inline]
pub fn haversine_distance(p1: Point<f64>, p2: Point<f64>) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let delta_lat = (p2.y() - p1.y()).to_radians();
    let delta_lon = (p2.x() - p1.x()).to_radians();

    let a =
        (delta_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Build a path from an ordered point sequence
///
/// A trivial projection that preserves insertion order: no reordering, no
/// deduplication. Defined for any number of points; a path with fewer than
/// two points has no rendered line.
pub fn build_path(positions: &[Point<f64>]) -> Path {
    Path::new(positions.to_vec())
}

/// Total geodesic length of a path in the requested unit
///
/// Sums pairwise haversine segment lengths; 0 for fewer than two points.
/// Deterministic for a given point sequence and unit.
pub fn path_distance(path: &Path, unit: DistanceUnit) -> f64 {
    let coordinates = path.coordinates();
    let mut meters = 0.0;
    for pair in coordinates.windows(2) {
        meters += haversine_distance(pair[0], pair[1]);
    }
    unit.from_meters(meters)
}

/// Annotate an ordered point sequence with running distances
///
/// A single incremental pass whose partial sums are exactly the prefix sums
/// a full `path_distance` recomputation over `positions[..=i]` would
/// produce: same segments, same summation order, so the results never
/// drift apart.
pub fn annotate(positions: &[Point<f64>], unit: DistanceUnit) -> Vec<Annotation> {
    let mut annotations = Vec::with_capacity(positions.len());
    let mut meters = 0.0;
    let mut prior = 0.0;
    for (i, position) in positions.iter().enumerate() {
        if i > 0 {
            meters += haversine_distance(positions[i - 1], *position);
        }
        let cumulative = unit.from_meters(meters);
        annotations.push(Annotation { cumulative, prior });
        prior = cumulative;
    }
    annotations
}
