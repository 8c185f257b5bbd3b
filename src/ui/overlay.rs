//! Non-interactive text drawn over the scene: the header and the loading
//! readout.

use egui::{Align2, Color32, FontId, RichText};

use crate::scene::LoadingOverlay;

use super::sidebar::PANEL_WIDTH;

pub const TITLE: &str = "PHANTOM VIEWER // 0.1";
pub const SUBTITLE: &str = "WGPU • STABLE DIFFUSION • MIDAS DEPTH";

const MARGIN: f32 = 24.0;

pub fn show_header(ctx: &egui::Context) {
    egui::Area::new(egui::Id::new("header"))
        .anchor(Align2::LEFT_TOP, [PANEL_WIDTH + MARGIN, MARGIN])
        .interactable(false)
        .order(egui::Order::Background)
        .show(ctx, |ui| {
            ui.label(
                RichText::new(TITLE)
                    .font(FontId::monospace(18.0))
                    .color(Color32::WHITE)
                    .strong(),
            );
            ui.label(
                RichText::new(SUBTITLE)
                    .font(FontId::monospace(10.0))
                    .color(Color32::from_white_alpha(120)),
            );
        });
}

/// Centered status text while the active entry is not drawable
pub fn show_loading(ctx: &egui::Context, overlay: &LoadingOverlay) {
    let color = match overlay {
        LoadingOverlay::Progress { .. } => Color32::from_white_alpha(200),
        LoadingOverlay::Failed { .. } => Color32::from_rgb(230, 80, 80),
    };

    egui::Area::new(egui::Id::new("loading_overlay"))
        .anchor(Align2::CENTER_CENTER, [PANEL_WIDTH / 2.0, 0.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(RichText::new(overlay.text()).font(FontId::monospace(14.0)).color(color));
        });
}
