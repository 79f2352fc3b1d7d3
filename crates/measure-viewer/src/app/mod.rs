//! Application module
//!
//! Full-screen walkers map with the measurement control overlay, a
//! toggleable sidebar listing measurements and settings, and lightweight
//! persisted UI settings.

mod control;
mod host;
mod plugin;

use crate::settings::Settings;
use control::MeasureControl;
use eframe::egui;
use host::WalkersHost;
use measure_lib::{DistanceUnit, MeasureController, MeasureStyle};
use plugin::{MeasurePlugin, SharedController};
use std::sync::{Arc, Mutex};
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17
    }
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }
}

/// Persisted settings (lightweight, no session data)
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedSettings {
    unit: DistanceUnit,
    style: MeasureStyle,
    tiles_provider: String,
    sidebar_open: bool,
}

/// Main application structure
pub struct MeasureViewerApp {
    /// Measurement controller shared with the plugin and the control button
    controller: SharedController,

    /// The mounted "start measuring" control
    control: MeasureControl,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    tiles_provider: TilesProvider,
    sidebar_open: bool,
}

impl MeasureViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let cli_args = Settings::from_cli();

        let mut unit = cli_args.unit;
        let mut style = MeasureStyle {
            line_width: cli_args.line_width,
            circle_radius: cli_args.circle_radius,
            ..MeasureStyle::default()
        };
        let mut tiles_provider = TilesProvider::OpenStreetMap;
        let mut sidebar_open = true;

        // CLI args take effect on a fresh start; persisted settings win on restore
        if !cli_args.ignore_persisted
            && let Some(storage) = cc.storage
            && let Some(json) = storage.get_string("persisted_settings")
            && let Ok(persisted) = serde_json::from_str::<PersistedSettings>(&json)
        {
            tracing::info!("restored persisted settings");
            unit = persisted.unit;
            style = persisted.style;
            sidebar_open = persisted.sidebar_open;
            tiles_provider = match persisted.tiles_provider.as_str() {
                "OpenTopoMap" => TilesProvider::OpenTopoMap,
                _ => TilesProvider::OpenStreetMap,
            };
        }

        let controller: SharedController = Arc::new(Mutex::new(MeasureController::with_style(
            WalkersHost::new(),
            style,
            unit,
        )));

        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());

        tracing::info!(unit = unit.label(), "initialized measure viewer");

        Self {
            control: MeasureControl::new(controller.clone()),
            controller,
            tiles_osm,
            tiles_otm,
            map_memory: MapMemory::default(),
            tiles_provider,
            sidebar_open,
        }
    }

    /// Render the sidebar toggle button (overlaid on top-right of map)
    fn sidebar_toggle_button(&mut self, ui: &mut egui::Ui) {
        let button_size = egui::vec2(40.0, 40.0);
        let margin = 10.0;

        let rect = ui.max_rect();
        let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
        let button_rect = egui::Rect::from_min_size(button_pos, button_size);

        let response = ui.allocate_rect(button_rect, egui::Sense::click());
        if response.clicked() {
            self.sidebar_open = !self.sidebar_open;
        }

        let bg_color = if response.hovered() {
            ui.visuals().widgets.hovered.bg_fill
        } else {
            ui.visuals().widgets.inactive.bg_fill
        };
        ui.painter().rect_filled(button_rect, 5.0, bg_color);

        let icon = if self.sidebar_open { "✕" } else { "☰" };
        ui.painter().text(
            button_rect.center(),
            egui::Align2::CENTER_CENTER,
            icon,
            egui::FontId::proportional(20.0),
            ui.visuals().text_color(),
        );
    }

    fn render_sidebar(&mut self, ctx: &egui::Context) {
        if !self.sidebar_open {
            return;
        }

        egui::SidePanel::right("measure_sidebar")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("Measurements");
                ui.separator();

                let mut controller = self.controller.lock().unwrap();
                let unit = controller.unit();
                if controller.sessions().count() == 0 {
                    ui.weak("No measurements yet.");
                }
                for session in controller.sessions() {
                    let status = if session.is_closed() { "done" } else { "active" };
                    ui.label(format!(
                        "{}: {} points, {} ({})",
                        session.key(),
                        session.points().len(),
                        unit.format(session.total()),
                        status
                    ));
                }

                ui.separator();
                ui.label("Style (applies to new measurements)");
                let style = controller.style_mut();
                ui.add(egui::Slider::new(&mut style.line_width, 1.0..=10.0).text("Line width"));
                ui.add(
                    egui::Slider::new(&mut style.circle_radius, 1.0..=10.0).text("Point radius"),
                );
                drop(controller);

                ui.separator();
                ui.label("Tiles");
                for provider in TilesProvider::all() {
                    ui.radio_value(&mut self.tiles_provider, *provider, provider.name());
                }

                ui.separator();
                ui.weak("Click the ruler button, then click the map to add points. Double-click to finish.");
            });
    }
}

impl eframe::App for MeasureViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_sidebar(ctx);

        // Central panel: map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let measure_plugin = MeasurePlugin::new(self.controller.clone());

                let tiles: &mut HttpTiles = match self.tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let map = Map::new(
                    Some(tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(52.5200, 13.4050),
                )
                .with_plugin(measure_plugin);

                let map_response = ui.add(map);

                // Double-click zoom is a host gesture; the controller suppresses
                // it while a measurement is running.
                let zoom_enabled = self.controller.lock().unwrap().host().double_click_zoom();
                if zoom_enabled && map_response.double_clicked() {
                    let _ = self.map_memory.set_zoom(self.map_memory.zoom() + 1.0);
                }

                self.control.show(ui);
                self.sidebar_toggle_button(ui);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    self.tiles_provider.attribution(),
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let controller = self.controller.lock().unwrap();
        let settings = PersistedSettings {
            unit: controller.unit(),
            style: controller.style(),
            tiles_provider: format!("{:?}", self.tiles_provider),
            sidebar_open: self.sidebar_open,
        };
        drop(controller);

        if let Ok(json) = serde_json::to_string(&settings) {
            storage.set_string("persisted_settings", json);
            tracing::debug!("saved settings on exit");
        }
    }
}
