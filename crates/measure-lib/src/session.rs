//! Session and annotation model
//!
//! A `Session` is one measurement run from start stimulus to end stimulus.
//! It owns its ordered point list, the path derived from it, and the
//! distance labels rendered next to the points (always exactly one label
//! per point).

use crate::geometry::{self, DistanceUnit};
use crate::host::FeatureCollection;
use geo::Point;

/// Unique, creation-ordered identifier for a measured point
///
/// Allocated from a per-controller monotonic counter, so ids are unique
/// within a session and totally ordered by creation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(u64);

impl PointId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque key identifying one measurement session
///
/// Allocated from a per-controller monotonic counter rather than wall-clock
/// time, so two sessions started within the same clock tick can never
/// collide, and independent controller instances never interfere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey(u64);

impl SessionKey {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "measure-{}", self.0)
    }
}

/// A measured point with its running distance annotations
///
/// `cumulative` is the total path distance from the first point through
/// this one, `prior` the cumulative distance through the previous point
/// (0 for the first). Both are expressed in the session's unit. Once a
/// point is appended its stored distances never change again.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurePoint {
    pub id: PointId,
    pub position: Point<f64>,
    pub cumulative: f64,
    pub prior: f64,
}

/// Ordered polyline derived from a session's points
///
/// Coordinates are exactly the points' coordinates in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path(Vec<Point<f64>>);

impl Path {
    pub fn new(coordinates: Vec<Point<f64>>) -> Self {
        Self(coordinates)
    }

    pub fn coordinates(&self) -> &[Point<f64>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The rendered line, present only once the path has at least two points
    pub fn line(&self) -> Option<&[Point<f64>]> {
        (self.0.len() >= 2).then_some(self.0.as_slice())
    }
}

/// Rendered distance annotation attached to one point
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceLabel {
    /// Geographic anchor, identical to the point's coordinates
    pub anchor: Point<f64>,
    /// Total distance through the anchored point, in the session's unit
    pub cumulative: f64,
    /// Cumulative distance through the previous point
    pub prior: f64,
    /// Preformatted display text
    pub text: String,
}

/// One measurement run with its points, labels and lifecycle flag
///
/// Created by the controller on the session-start stimulus and mutated by
/// each primary click. Ending a session only marks it closed: the measured
/// geometry stays in the registry (and on the map) after the run.
#[derive(Clone, Debug)]
pub struct Session {
    key: SessionKey,
    unit: DistanceUnit,
    points: Vec<MeasurePoint>,
    labels: Vec<DistanceLabel>,
    closed: bool,
}

impl Session {
    pub(crate) fn new(key: SessionKey, unit: DistanceUnit) -> Self {
        Self {
            key,
            unit,
            points: Vec::new(),
            labels: Vec::new(),
            closed: false,
        }
    }

    pub fn key(&self) -> SessionKey {
        self.key
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn points(&self) -> &[MeasurePoint] {
        &self.points
    }

    pub fn labels(&self) -> &[DistanceLabel] {
        &self.labels
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Total measured distance so far, in the session's unit
    pub fn total(&self) -> f64 {
        self.points.last().map(|p| p.cumulative).unwrap_or(0.0)
    }

    /// The session's path in insertion order
    pub fn path(&self) -> Path {
        geometry::build_path(&self.positions())
    }

    /// Immutable snapshot of the session's renderable features
    ///
    /// A fresh value every call: the host renderer never aliases the
    /// session's own storage.
    pub fn snapshot(&self) -> FeatureCollection {
        let path = self.path();
        let line = (path.len() >= 2).then_some(path);
        FeatureCollection {
            points: self.points.clone(),
            line,
        }
    }

    /// Append a point and refresh annotations and labels
    ///
    /// Labels are discarded and rebuilt from the refreshed annotation set
    /// rather than patched in place, which keeps the label count equal to
    /// the point count with no orphans.
    pub(crate) fn append(&mut self, id: PointId, position: Point<f64>) {
        self.points.push(MeasurePoint {
            id,
            position,
            cumulative: 0.0,
            prior: 0.0,
        });

        let annotations = geometry::annotate(&self.positions(), self.unit);
        for (point, annotation) in self.points.iter_mut().zip(&annotations) {
            point.cumulative = annotation.cumulative;
            point.prior = annotation.prior;
        }

        self.labels = self
            .points
            .iter()
            .map(|point| DistanceLabel {
                anchor: point.position,
                cumulative: point.cumulative,
                prior: point.prior,
                text: format!("total {}", self.unit.format(point.cumulative)),
            })
            .collect();
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    fn positions(&self) -> Vec<Point<f64>> {
        self.points.iter().map(|p| p.position).collect()
    }
}
