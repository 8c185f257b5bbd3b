//! egui overlay: thumbnail sidebar, header, loading readout and the
//! debug-control panel.

pub mod controls_panel;
pub mod overlay;
pub mod pass;
pub mod sidebar;

pub use pass::UiPass;
pub use sidebar::Sidebar;
