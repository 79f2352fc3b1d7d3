//! Retained rendering state bridging the measurement core to walkers/egui
//!
//! The controller mutates this host through the [`MapHost`] contract; the
//! render plugin draws the retained state every frame. Nothing is drained:
//! sources and labels persist until replaced, which is what keeps finished
//! measurements visible on the map.

use measure_lib::{
    CursorStyle, DistanceLabel, Error, FeatureCollection, LayerDescriptor, MapHost, Result,
    ScreenPosition, SessionKey, Tooltip,
};
use std::collections::BTreeMap;

/// Map-rendering host backed by the walkers plugin
pub struct WalkersHost {
    sources: BTreeMap<SessionKey, FeatureCollection>,
    layers: Vec<LayerDescriptor>,
    labels: BTreeMap<SessionKey, Vec<DistanceLabel>>,
    tooltip: Option<Tooltip>,
    cursor: CursorStyle,
    double_click_zoom: bool,
}

impl WalkersHost {
    pub fn new() -> Self {
        Self {
            sources: BTreeMap::new(),
            layers: Vec::new(),
            labels: BTreeMap::new(),
            tooltip: None,
            cursor: CursorStyle::Default,
            double_click_zoom: true,
        }
    }

    pub fn source(&self, key: SessionKey) -> Option<&FeatureCollection> {
        self.sources.get(&key)
    }

    /// Layers in registration order, which is also draw order
    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    pub fn labels(&self) -> impl Iterator<Item = (SessionKey, &[DistanceLabel])> {
        self.labels.iter().map(|(key, labels)| (*key, labels.as_slice()))
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    pub fn double_click_zoom(&self) -> bool {
        self.double_click_zoom
    }
}

impl Default for WalkersHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MapHost for WalkersHost {
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
        if !self.sources.contains_key(&key) {
            return Err(Error::UnknownSource { key });
        }
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
