//! Measurement session controller
//!
//! A finite state machine driven by three external stimuli (primary click,
//! terminate click, pointer move) plus the session-start affordance. The
//! controller owns the session registry and all id allocation, and talks to
//! the outside world only through the injected [`MapHost`].
//!
//! Every transition is a total function over `{idle, measuring} × stimulus`:
//! stimuli arriving in the wrong state are silent no-ops, and host errors
//! are surfaced only after the controller's own state is already
//! consistent, so no stimulus can leave the machine in an invalid state.

use crate::Result;
use crate::geometry::DistanceUnit;
use crate::host::{
    CursorStyle, FeatureCollection, LayerDescriptor, MapHost, MeasureStyle, ScreenPosition, Tooltip,
};
use crate::session::{PointId, Session, SessionKey};
use geo::Point;
use std::collections::BTreeMap;

/// Tooltip prompt shown when a session starts
const START_PROMPT: &str = "click to set start point";

/// Interaction state, global to the controller rather than per-session
///
/// Only one session may be actively accumulating points at a time; its key
/// rides on the `Measuring` variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    /// Click stimuli are ignored
    Idle,
    /// The identified session accepts clicks
    Measuring(SessionKey),
}

/// The measurement widget core
///
/// One instance per map. All mutable state is owned here and ids come from
/// per-instance counters, so multiple controllers never interfere.
pub struct MeasureController<H: MapHost> {
    host: H,
    state: ControllerState,
    sessions: BTreeMap<SessionKey, Session>,
    style: MeasureStyle,
    unit: DistanceUnit,
    next_session: u64,
    next_point: u64,
}

impl<H: MapHost> MeasureController<H> {
    pub fn new(host: H) -> Self {
        Self::with_style(host, MeasureStyle::default(), DistanceUnit::default())
    }

    pub fn with_style(host: H, style: MeasureStyle, unit: DistanceUnit) -> Self {
        Self {
            host,
            state: ControllerState::Idle,
            sessions: BTreeMap::new(),
            style,
            unit,
            next_session: 0,
            next_point: 0,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_measuring(&self) -> bool {
        matches!(self.state, ControllerState::Measuring(_))
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn style(&self) -> MeasureStyle {
        self.style
    }

    /// Style used for sessions started after this call
    pub fn style_mut(&mut self) -> &mut MeasureStyle {
        &mut self.style
    }

    /// All sessions, oldest first, completed runs included
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn session(&self, key: SessionKey) -> Option<&Session> {
        self.sessions.get(&key)
    }

    /// The session currently accepting clicks, if any
    pub fn active_session(&self) -> Option<&Session> {
        match self.state {
            ControllerState::Measuring(key) => self.sessions.get(&key),
            ControllerState::Idle => None,
        }
    }

    /// Session-start stimulus: `idle -> measuring`
    ///
    /// Allocates a fresh session key, registers an empty session, prepares
    /// the host (tooltip, crosshair cursor, suppressed double-click zoom)
    /// and creates the session's data source and its line/circle layers.
    /// A no-op while a session is already active.
    pub fn start_session(&mut self) -> Result<()> {
        if let ControllerState::Measuring(key) = self.state {
            tracing::debug!(%key, "session already active, ignoring start");
            return Ok(());
        }

        let key = SessionKey::from_raw(self.next_session);
        self.next_session += 1;
        self.sessions.insert(key, Session::new(key, self.unit));
        self.state = ControllerState::Measuring(key);
        tracing::debug!(%key, unit = self.unit.label(), "measurement session started");

        self.host.set_double_click_zoom(false);
        self.host.set_cursor(CursorStyle::Crosshair);
        self.host.set_tooltip(Some(Tooltip {
            screen: ScreenPosition::default(),
            text: START_PROMPT.to_owned(),
        }));
        self.host.add_source(key, FeatureCollection::default())?;
        self.host.add_layer(LayerDescriptor::line(key, self.style))?;
        self.host.add_layer(LayerDescriptor::circle(key, self.style))?;
        Ok(())
    }

    /// Primary-click stimulus: append a point to the active session
    ///
    /// Recomputes the annotated path, pushes a fresh feature snapshot to
    /// the host and rebuilds the session's distance labels. Ignored while
    /// idle.
    pub fn primary_click(&mut self, position: Point<f64>) -> Result<()> {
        let ControllerState::Measuring(key) = self.state else {
            return Ok(());
        };
        let Some(session) = self.sessions.get_mut(&key) else {
            return Ok(());
        };

        let id = PointId::from_raw(self.next_point);
        self.next_point += 1;

        session.append(id, position);
        tracing::debug!(
            %key,
            point = %id,
            count = session.points().len(),
            total = session.total(),
            "measure point appended"
        );

        let snapshot = session.snapshot();
        let labels = session.labels().to_vec();
        self.host.update_source(key, snapshot)?;
        self.host.set_labels(key, labels)?;
        Ok(())
    }

    /// Pointer-move stimulus: the tooltip tracks the pointer
    ///
    /// Only the tooltip's screen position changes; its text and the
    /// session's points are untouched. Ignored while idle.
    pub fn pointer_move(&mut self, _position: Point<f64>, screen: ScreenPosition) -> Result<()> {
        if !self.is_measuring() {
            return Ok(());
        }
        tracing::trace!(x = screen.x, y = screen.y, "tooltip follows pointer");
        self.host.move_tooltip(screen);
        Ok(())
    }

    /// Session-end stimulus: `measuring -> idle`
    ///
    /// Destroys the tooltip and restores the cursor and double-click zoom,
    /// but leaves the session's rendered path and labels on the map — only
    /// live interaction stops. Ignored while idle.
    pub fn end_session(&mut self) -> Result<()> {
        let ControllerState::Measuring(key) = self.state else {
            return Ok(());
        };

        self.state = ControllerState::Idle;
        if let Some(session) = self.sessions.get_mut(&key) {
            session.close();
        }
        tracing::debug!(%key, "measurement session ended");

        self.host.set_tooltip(None);
        self.host.set_cursor(CursorStyle::Grab);
        self.host.set_double_click_zoom(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::session::DistanceLabel;
    use std::collections::HashMap;

    /// Recording host used to observe controller side effects
    struct MockHost {
        sources: HashMap<SessionKey, FeatureCollection>,
        layers: Vec<LayerDescriptor>,
        labels: HashMap<SessionKey, Vec<DistanceLabel>>,
        tooltip: Option<Tooltip>,
        cursor: CursorStyle,
        double_click_zoom: bool,
    }

    impl Default for MockHost {
        fn default() -> Self {
            Self {
                sources: HashMap::new(),
                layers: Vec::new(),
                labels: HashMap::new(),
                tooltip: None,
                cursor: CursorStyle::Default,
                double_click_zoom: true,
            }
        }
    }

    impl MapHost for MockHost {
        fn add_source(&mut self, key: SessionKey, features: FeatureCollection) -> Result<()> {
            if self.sources.contains_key(&key) {
                return Err(Error::DuplicateSource { key });
            }
            self.sources.insert(key, features);
            Ok(())
        }

        fn update_source(&mut self, key: SessionKey, features: FeatureCollection) -> Result<()> {
            match self.sources.get_mut(&key) {
                Some(slot) => {
                    *slot = features;
                    Ok(())
                }
                None => Err(Error::UnknownSource { key }),
            }
        }

        fn add_layer(&mut self, layer: LayerDescriptor) -> Result<()> {
            self.layers.push(layer);
            Ok(())
        }

        fn set_labels(&mut self, key: SessionKey, labels: Vec<DistanceLabel>) -> Result<()> {
            self.labels.insert(key, labels);
            Ok(())
        }

        fn set_tooltip(&mut self, tooltip: Option<Tooltip>) {
            self.tooltip = tooltip;
        }

        fn move_tooltip(&mut self, screen: ScreenPosition) {
            if let Some(tooltip) = self.tooltip.as_mut() {
                tooltip.screen = screen;
            }
        }

        fn set_cursor(&mut self, cursor: CursorStyle) {
            self.cursor = cursor;
        }

        fn set_double_click_zoom(&mut self, enabled: bool) {
            self.double_click_zoom = enabled;
        }
    }

    fn controller() -> MeasureController<MockHost> {
        MeasureController::new(MockHost::default())
    }

    fn click(c: &mut MeasureController<MockHost>, lon: f64, lat: f64) {
        c.primary_click(Point::new(lon, lat)).unwrap();
    }

    #[test]
    fn test_idle_stimuli_are_noops() {
        let mut c = controller();

        c.primary_click(Point::new(0.0, 0.0)).unwrap();
        c.pointer_move(Point::new(0.0, 0.0), ScreenPosition { x: 5.0, y: 5.0 })
            .unwrap();
        c.end_session().unwrap();

        assert_eq!(c.state(), ControllerState::Idle);
        assert_eq!(c.sessions().count(), 0);
        assert!(c.host().sources.is_empty());
        assert!(c.host().tooltip.is_none());
        assert!(c.host().double_click_zoom);
    }

    #[test]
    fn test_start_session_prepares_host() {
        let mut c = controller();
        c.start_session().unwrap();

        let key = match c.state() {
            ControllerState::Measuring(key) => key,
            ControllerState::Idle => panic!("controller should be measuring"),
        };

        let host = c.host();
        assert!(!host.double_click_zoom);
        assert_eq!(host.cursor, CursorStyle::Crosshair);
        let tooltip = host.tooltip.as_ref().expect("tooltip created");
        assert_eq!(tooltip.text, "click to set start point");
        assert!(host.sources.contains_key(&key));
        assert_eq!(host.layers.len(), 2);
        assert!(host.layers.iter().any(|l| l.id() == format!("measure-lines-{}", key.raw())));
        assert!(host.layers.iter().any(|l| l.id() == format!("measure-points-{}", key.raw())));
    }

    #[test]
    fn test_start_while_measuring_is_idempotent() {
        let mut c = controller();
        c.start_session().unwrap();
        let state = c.state();
        click(&mut c, 0.0, 0.0);

        c.start_session().unwrap();

        assert_eq!(c.state(), state);
        assert_eq!(c.sessions().count(), 1);
        assert_eq!(c.host().sources.len(), 1);
        assert_eq!(c.active_session().unwrap().points().len(), 1);
    }

    #[test]
    fn test_two_clicks_measure_one_degree() {
        let mut c = controller();
        c.start_session().unwrap();
        click(&mut c, 0.0, 0.0);
        click(&mut c, 0.0, 1.0);

        let session = c.active_session().unwrap();
        let points = session.points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].position, Point::new(0.0, 0.0));
        assert_eq!(points[1].position, Point::new(0.0, 1.0));
        assert!((points[1].cumulative - 111.19).abs() < 0.01);
        assert_eq!(points[1].prior, 0.0);

        let features = &c.host().sources[&session.key()];
        let line = features.line.as_ref().expect("line appears at two points");
        assert_eq!(line.coordinates(), &[Point::new(0.0, 0.0), Point::new(0.0, 1.0)]);
    }

    #[test]
    fn test_third_click_extends_without_rewriting_history() {
        let mut c = controller();
        c.start_session().unwrap();
        click(&mut c, 0.0, 0.0);
        click(&mut c, 0.0, 1.0);
        let before: Vec<_> = c.active_session().unwrap().points().to_vec();

        click(&mut c, 0.0, 2.0);

        let points = c.active_session().unwrap().points().to_vec();
        assert_eq!(&points[..2], before.as_slice());
        assert!((points[2].prior - 111.19).abs() < 0.01);
        assert!((points[2].cumulative - 222.38).abs() < 0.02);
    }

    #[test]
    fn test_cumulative_is_monotonic_across_clicks() {
        let mut c = controller();
        c.start_session().unwrap();
        let stops = [(0.0, 0.0), (1.0, 1.0), (0.5, 0.5), (2.0, 0.0), (2.0, 0.0)];
        let mut last_total = 0.0;
        for (lon, lat) in stops {
            click(&mut c, lon, lat);
            let total = c.active_session().unwrap().total();
            assert!(total >= last_total);
            last_total = total;
        }
    }

    #[test]
    fn test_label_count_tracks_point_count() {
        let mut c = controller();
        c.start_session().unwrap();
        let key = c.active_session().unwrap().key();

        for i in 0..4 {
            click(&mut c, i as f64, 0.0);
            let session = c.session(key).unwrap();
            assert_eq!(session.labels().len(), session.points().len());
            assert_eq!(c.host().labels[&key].len(), session.points().len());
        }
    }

    #[test]
    fn test_point_ids_are_strictly_increasing() {
        let mut c = controller();
        c.start_session().unwrap();
        click(&mut c, 0.0, 0.0);
        click(&mut c, 0.0, 1.0);
        c.end_session().unwrap();
        c.start_session().unwrap();
        click(&mut c, 0.0, 2.0);

        let ids: Vec<_> = c
            .sessions()
            .flat_map(|s| s.points())
            .map(|p| p.id)
            .collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_pointer_move_only_moves_tooltip() {
        let mut c = controller();
        c.start_session().unwrap();
        click(&mut c, 0.0, 0.0);

        c.pointer_move(Point::new(5.0, 5.0), ScreenPosition { x: 120.0, y: 80.0 })
            .unwrap();

        let tooltip = c.host().tooltip.as_ref().unwrap();
        assert_eq!(tooltip.screen, ScreenPosition { x: 120.0, y: 80.0 });
        assert_eq!(tooltip.text, "click to set start point");
        assert_eq!(c.active_session().unwrap().points().len(), 1);
    }

    #[test]
    fn test_terminate_empty_session() {
        let mut c = controller();
        c.start_session().unwrap();
        c.end_session().unwrap();

        assert_eq!(c.state(), ControllerState::Idle);
        assert_eq!(c.sessions().count(), 1);
        let session = c.sessions().next().unwrap();
        assert!(session.is_closed());
        assert!(session.path().is_empty());
        assert!(session.labels().is_empty());

        let host = c.host();
        assert!(host.tooltip.is_none());
        assert_eq!(host.cursor, CursorStyle::Grab);
        assert!(host.double_click_zoom);
    }

    #[test]
    fn test_completed_session_survives_the_next_run() {
        let mut c = controller();
        c.start_session().unwrap();
        let first = c.active_session().unwrap().key();
        click(&mut c, 0.0, 0.0);
        c.end_session().unwrap();

        c.start_session().unwrap();
        let second = c.active_session().unwrap().key();

        assert_ne!(first, second);
        assert_eq!(c.session(first).unwrap().points().len(), 1);
        assert_eq!(c.host().sources[&first].points.len(), 1);
        assert!(c.session(second).unwrap().points().is_empty());
        assert_eq!(c.sessions().count(), 2);
    }

    #[test]
    fn test_clicks_after_end_do_not_mutate_sessions() {
        let mut c = controller();
        c.start_session().unwrap();
        click(&mut c, 0.0, 0.0);
        c.end_session().unwrap();

        click(&mut c, 0.0, 1.0);

        assert_eq!(c.sessions().next().unwrap().points().len(), 1);
    }
}
