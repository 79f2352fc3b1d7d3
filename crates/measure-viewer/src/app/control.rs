//! Mountable measurement control
//!
//! The widget's single actionable affordance: a button overlaid on the
//! top-left corner of the map that starts a measurement session. Ending a
//! run is a map gesture (double-click), so the button stays a no-op while
//! a session is active.

use crate::app::plugin::SharedController;
use egui::{Align2, FontId, Rect, Sense, Ui};

pub struct MeasureControl {
    controller: SharedController,
}

impl MeasureControl {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }

    /// Draw the control overlaid on the map view
    pub fn show(&self, ui: &mut Ui) {
        let button_size = egui::vec2(40.0, 40.0);
        let margin = 10.0;

        let rect = ui.max_rect();
        let button_pos = rect.left_top() + egui::vec2(margin, margin);
        let button_rect = Rect::from_min_size(button_pos, button_size);

        let response = ui.allocate_rect(button_rect, Sense::click());

        let mut controller = self.controller.lock().unwrap();
        if response.clicked()
            && let Err(err) = controller.start_session()
        {
            tracing::warn!(%err, "failed to start measurement session");
        }
        let active = controller.is_measuring();
        drop(controller);

        let bg_color = if active {
            ui.visuals().selection.bg_fill
        } else if response.hovered() {
            ui.visuals().widgets.hovered.bg_fill
        } else {
            ui.visuals().widgets.inactive.bg_fill
        };

        ui.painter().rect_filled(button_rect, 5.0, bg_color);
        ui.painter().text(
            button_rect.center(),
            Align2::CENTER_CENTER,
            "📏",
            FontId::proportional(20.0),
            ui.visuals().text_color(),
        );

        response.on_hover_text("Start measuring (double-click the map to finish)");
    }
}
