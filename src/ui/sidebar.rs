//! Thumbnail selector on the left edge of the window.
//!
//! The sidebar never touches [`ViewerState`] itself. It reads the current
//! snapshot to decide how each thumbnail looks and reports clicks and
//! hover transitions as [`ViewerEvent`]s for the reducer.

use egui::{Align2, Color32, FontId, Id, LayerId, Order, Pos2, Rect, Sense, Stroke, Vec2};

use crate::catalog::CATALOG;
use crate::loading::DecodedImage;
use crate::state::{ViewerEvent, ViewerState};

pub const PANEL_WIDTH: f32 = 100.0;
pub const THUMBNAIL_DIAMETER: f32 = 50.0;
pub const THUMBNAIL_GAP: f32 = 24.0;
/// Seconds for the scale and label animations
const SCALE_ANIMATION: f32 = 0.3;
/// Horizontal distance the label slides in from
const LABEL_SLIDE: f32 = 10.0;

pub struct Sidebar {
    thumbnails: Vec<Option<egui::TextureHandle>>,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self::new()
    }
}

impl Sidebar {
    pub fn new() -> Self {
        Self {
            thumbnails: vec![None; CATALOG.len()],
        }
    }

    /// Register a decoded thumbnail with egui
    pub fn set_thumbnail(&mut self, ctx: &egui::Context, index: usize, image: &DecodedImage) {
        let Some(slot) = self.thumbnails.get_mut(index) else {
            return;
        };
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [image.width as usize, image.height as usize],
            &image.pixels,
        );
        let name = format!("thumbnail-{}", CATALOG[index].name);
        *slot = Some(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR));
    }

    /// Draw the panel and return this frame's events, leaves first
    pub fn show(&self, ctx: &egui::Context, state: &ViewerState) -> Vec<ViewerEvent> {
        let mut clicked = None;
        let mut hovered_now = None;

        let frame = egui::Frame::new()
            .fill(Color32::from_rgba_unmultiplied(10, 10, 10, 200))
            .stroke(Stroke::new(1.0, Color32::from_white_alpha(25)));

        egui::SidePanel::left("thumbnail_sidebar")
            .exact_width(PANEL_WIDTH)
            .resizable(false)
            .frame(frame)
            .show(ctx, |ui| {
                let column_height = column_height(CATALOG.len());
                let top = ui.max_rect().center().y - column_height / 2.0;
                let center_x = ui.max_rect().center().x;

                for index in 0..CATALOG.len() {
                    let center = Pos2::new(center_x, top + thumbnail_offset(index));
                    let rect = Rect::from_center_size(center, Vec2::splat(THUMBNAIL_DIAMETER));
                    let response = ui.interact(rect, ui.id().with(index), Sense::click());

                    if response.clicked() {
                        clicked = Some(index);
                    }
                    if response.hovered() {
                        hovered_now = Some(index);
                    }

                    self.paint_thumbnail(ui, index, center, state);
                }
            });

        let mut events = hover_transitions(state.hovered_index(), hovered_now);
        if let Some(index) = clicked {
            events.push(ViewerEvent::Select(index));
        }
        events
    }

    fn paint_thumbnail(&self, ui: &egui::Ui, index: usize, center: Pos2, state: &ViewerState) {
        let visual = state.thumbnail(index);
        let scale = ui.ctx().animate_value_with_time(
            Id::new(("thumbnail_scale", index)),
            visual.scale(),
            SCALE_ANIMATION,
        );
        let radius = THUMBNAIL_DIAMETER / 2.0 * scale;
        let painter = ui.painter();

        if visual.active {
            // soft glow
            for (spread, alpha) in [(10.0, 12), (6.0, 24), (3.0, 48)] {
                painter.circle_filled(center, radius + spread, Color32::from_white_alpha(alpha));
            }
        }

        match self.thumbnails.get(index).and_then(Option::as_ref) {
            Some(texture) => {
                let tint = if visual.active || visual.hovered {
                    Color32::WHITE
                } else {
                    Color32::from_white_alpha(150)
                };
                egui::Image::new(texture)
                    .fit_to_exact_size(Vec2::splat(radius * 2.0))
                    .corner_radius(radius.round() as u8)
                    .tint(tint)
                    .paint_at(ui, Rect::from_center_size(center, Vec2::splat(radius * 2.0)));
            }
            None => {
                painter.circle_filled(center, radius, Color32::from_gray(35));
            }
        }

        painter.circle_stroke(center, radius, border_stroke(visual.active));

        let shown = ui.ctx().animate_bool_with_time(
            Id::new(("thumbnail_label", index)),
            visual.label_visible(),
            SCALE_ANIMATION,
        );
        if shown > 0.0 {
            let (offset, opacity) = label_transition(shown);
            let anchor = Pos2::new(center.x + radius + 14.0 + offset, center.y);
            paint_label(ui.ctx(), CATALOG[index].name, anchor, opacity);
        }
    }
}

fn border_stroke(active: bool) -> Stroke {
    if active {
        Stroke::new(2.0, Color32::WHITE)
    } else {
        // white at 10%
        Stroke::new(2.0, Color32::from_white_alpha(26))
    }
}

/// Horizontal offset and opacity of a label `shown` of the way in
pub fn label_transition(shown: f32) -> (f32, f32) {
    let t = shown.clamp(0.0, 1.0);
    (-LABEL_SLIDE * (1.0 - t), t)
}

/// Name tag next to a hovered thumbnail, drawn above the panel clip
fn paint_label(ctx: &egui::Context, text: &str, anchor: Pos2, opacity: f32) {
    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("thumbnail_label")));
    let text_color = Color32::WHITE.gamma_multiply(opacity);
    let galley = painter.layout_no_wrap(text.to_uppercase(), FontId::monospace(11.0), text_color);
    let rect = Align2::LEFT_CENTER.anchor_size(anchor, galley.size());
    painter.rect_filled(
        rect.expand2(Vec2::new(8.0, 4.0)),
        2.0,
        Color32::from_black_alpha(200).gamma_multiply(opacity),
    );
    painter.galley(rect.min, galley, text_color);
}

/// Total height of `count` thumbnails stacked with the standard gap
pub fn column_height(count: usize) -> f32 {
    if count == 0 {
        return 0.0;
    }
    count as f32 * THUMBNAIL_DIAMETER + (count - 1) as f32 * THUMBNAIL_GAP
}

/// Distance from the top of the column to the center of thumbnail `index`
pub fn thumbnail_offset(index: usize) -> f32 {
    index as f32 * (THUMBNAIL_DIAMETER + THUMBNAIL_GAP) + THUMBNAIL_DIAMETER / 2.0
}

/// Enter/leave events for a hover change between two frames
pub fn hover_transitions(previous: Option<usize>, current: Option<usize>) -> Vec<ViewerEvent> {
    if previous == current {
        return Vec::new();
    }
    let mut events = Vec::with_capacity(2);
    if let Some(left) = previous {
        events.push(ViewerEvent::PointerLeave(left));
    }
    if let Some(entered) = current {
        events.push(ViewerEvent::PointerEnter(entered));
    }
    events
}
