//! Debug-control panel for the depth material.

use egui::Align2;

use crate::controls::{DISPLACEMENT_RANGE, DISPLACEMENT_STEP, ShaderControls};

/// Draw the "Controls" window. All writes go through [`ShaderControls`]
/// so values stay clamped.
pub fn show(ctx: &egui::Context, controls: &mut ShaderControls) {
    egui::Window::new("Controls")
        .anchor(Align2::RIGHT_TOP, [-16.0, 16.0])
        .resizable(false)
        .collapsible(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            let mut displacement = controls.displacement();
            let slider = egui::Slider::new(&mut displacement, DISPLACEMENT_RANGE)
                .step_by(DISPLACEMENT_STEP as f64)
                .text("displacement");
            if ui.add(slider).changed() {
                controls.set_displacement(displacement);
                log::debug!("Displacement set to {:.1}", controls.displacement());
            }

            ui.checkbox(&mut controls.wireframe, "wireframe");
        });
}
