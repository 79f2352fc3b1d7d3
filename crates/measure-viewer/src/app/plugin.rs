//! Walkers plugin for the measurement overlay
//!
//! This plugin is both the input edge and the render edge of the widget:
//! it feeds click/double-click/hover stimuli from the map response into the
//! controller, then draws every session's line, point markers and distance
//! labels plus the pointer tooltip from the host's retained state.

use crate::app::host::WalkersHost;
use egui::{Color32, CursorIcon, FontId, Rect, Stroke};
use measure_lib::{Color, CursorStyle, LayerKind, MeasureController, ScreenPosition};
use std::sync::{Arc, Mutex};
use walkers::{MapMemory, Plugin, Projector};

/// Controller handle shared between the plugin, the control button and the app
///
/// egui needs shared ownership across frames; the mutex serializes all
/// stimuli so the run-to-completion property of the state machine holds.
pub type SharedController = Arc<Mutex<MeasureController<WalkersHost>>>;

fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Convert a WGS84 point to screen space
fn project(projector: &Projector, position: geo::Point<f64>) -> egui::Pos2 {
    let screen = projector.project(walkers::lat_lon(position.y(), position.x()));
    egui::Pos2::new(screen.x, screen.y)
}

/// Plugin rendering measurement sessions on the map
pub struct MeasurePlugin {
    controller: SharedController,
}

impl MeasurePlugin {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }

    /// Translate this frame's map response into controller stimuli
    ///
    /// The terminating double-click is checked first so it wins over the
    /// plain click delivered in the same frame.
    fn handle_input(
        controller: &mut MeasureController<WalkersHost>,
        response: &egui::Response,
        projector: &Projector,
    ) {
        if response.double_clicked() {
            if let Err(err) = controller.end_session() {
                tracing::warn!(%err, "terminate click rejected");
            }
        } else if response.clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            let position = projector.unproject(egui::Vec2::new(pos.x, pos.y));
            if let Err(err) = controller.primary_click(geo::Point::new(position.x(), position.y()))
            {
                tracing::warn!(%err, "primary click rejected");
            }
        }

        if let Some(pos) = response.hover_pos() {
            let position = projector.unproject(egui::Vec2::new(pos.x, pos.y));
            let screen = ScreenPosition { x: pos.x, y: pos.y };
            if let Err(err) =
                controller.pointer_move(geo::Point::new(position.x(), position.y()), screen)
            {
                tracing::warn!(%err, "pointer move rejected");
            }
        }
    }

    /// Draw the registered layers over their sessions' feature snapshots
    fn draw_layers(&self, host: &WalkersHost, painter: &egui::Painter, projector: &Projector) {
        for layer in host.layers() {
            let Some(features) = host.source(layer.key) else {
                continue;
            };
            let style = layer.style;

            match layer.kind {
                LayerKind::Line => {
                    let Some(line) = features.line.as_ref() else {
                        continue;
                    };
                    let screen_points: Vec<egui::Pos2> = line
                        .coordinates()
                        .iter()
                        .map(|position| project(projector, *position))
                        .collect();
                    if screen_points.len() >= 2 {
                        painter.add(egui::Shape::line(
                            screen_points,
                            Stroke::new(style.line_width, to_color32(style.line_color)),
                        ));
                    }
                }
                LayerKind::Circle => {
                    for point in &features.points {
                        painter.circle(
                            project(projector, point.position),
                            style.circle_radius,
                            to_color32(style.circle_color),
                            Stroke::new(style.line_width, to_color32(style.line_color)),
                        );
                    }
                }
            }
        }
    }

    /// Draw one distance label per measured point
    fn draw_labels(&self, host: &WalkersHost, painter: &egui::Painter, projector: &Projector) {
        for (_key, labels) in host.labels() {
            for label in labels {
                let anchor = project(projector, label.anchor);
                let galley = painter.layout_no_wrap(
                    label.text.clone(),
                    FontId::proportional(12.0),
                    Color32::WHITE,
                );
                let pos = anchor + egui::vec2(8.0, -galley.size().y - 6.0);
                let rect = Rect::from_min_size(pos, galley.size());
                painter.rect_filled(rect.expand(3.0), 3.0, Color32::from_black_alpha(160));
                painter.galley(pos, galley, Color32::WHITE);
            }
        }
    }

    /// Draw the pointer-following tooltip, offset so the cursor stays visible
    fn draw_tooltip(&self, host: &WalkersHost, painter: &egui::Painter) {
        let Some(tooltip) = host.tooltip() else {
            return;
        };
        let pos = egui::Pos2::new(tooltip.screen.x + 10.0, tooltip.screen.y + 10.0);
        let galley =
            painter.layout_no_wrap(tooltip.text.clone(), FontId::proportional(13.0), Color32::BLACK);
        let rect = Rect::from_min_size(pos, galley.size());
        painter.rect_filled(rect.expand(4.0), 3.0, Color32::WHITE);
        painter.galley(pos, galley, Color32::BLACK);
    }
}

impl Plugin for MeasurePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &MapMemory,
    ) {
        profiling::scope!("MeasurePlugin::run");

        let mut controller = self.controller.lock().unwrap();
        Self::handle_input(&mut controller, response, projector);

        let painter = ui.painter();
        let host = controller.host();
        self.draw_layers(host, painter, projector);
        self.draw_labels(host, painter, projector);
        self.draw_tooltip(host, painter);

        if response.hovered() {
            match host.cursor() {
                CursorStyle::Crosshair => ui.ctx().set_cursor_icon(CursorIcon::Crosshair),
                CursorStyle::Grab => ui.ctx().set_cursor_icon(CursorIcon::Grab),
                CursorStyle::Default => {}
            }
        }
    }
}
