//! Per-frame pointer input accumulated from winit events.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

#[derive(Default, Debug, Clone)]
pub struct PointerInput {
    pub cursor_position: Option<Vec2>,
    /// Movement since the last `end_frame`
    pub cursor_delta: Vec2,
    pub scroll_delta: Vec2,
    pub screen_size: Vec2,
    left_down: bool,
    right_down: bool,
}

impl PointerInput {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            screen_size: Vec2::new(width as f32, height as f32),
            ..Default::default()
        }
    }

    /// Clear per-frame deltas
    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    pub fn handle_cursor_move(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if let Some(old) = self.cursor_position {
            self.cursor_delta += new_pos - old;
        }
        self.cursor_position = Some(new_pos);
    }

    /// Track the cursor without accumulating movement, for moves another
    /// layer consumed.
    pub fn sync_cursor(&mut self, x: f64, y: f64) {
        self.cursor_position = Some(Vec2::new(x as f32, y as f32));
    }

    pub fn handle_cursor_left(&mut self) {
        self.cursor_position = None;
    }

    pub fn handle_mouse_input(&mut self, state: ElementState, button: MouseButton) {
        let pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.left_down = pressed,
            MouseButton::Right => self.right_down = pressed,
            _ => {}
        }
    }

    pub fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(x, y) => {
                self.scroll_delta += Vec2::new(x, y);
            }
            MouseScrollDelta::PixelDelta(pos) => {
                // pixel deltas are roughly 10x line deltas
                self.scroll_delta += Vec2::new(pos.x as f32, pos.y as f32) * 0.1;
            }
        }
    }

    pub fn rotating(&self) -> bool {
        self.left_down
    }

    pub fn panning(&self) -> bool {
        self.right_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_accumulate_until_end_frame() {
        let mut input = PointerInput::new(800, 600);
        input.handle_cursor_move(10.0, 10.0);
        assert_eq!(input.cursor_delta, Vec2::ZERO);
        input.handle_cursor_move(14.0, 7.0);
        input.handle_cursor_move(15.0, 9.0);
        assert_eq!(input.cursor_delta, Vec2::new(5.0, -1.0));
        input.end_frame();
        assert_eq!(input.cursor_delta, Vec2::ZERO);
    }

    #[test]
    fn synced_moves_do_not_jump() {
        let mut input = PointerInput::new(800, 600);
        input.handle_cursor_move(400.0, 300.0);
        // cursor travels across the sidebar
        input.sync_cursor(200.0, 300.0);
        input.sync_cursor(50.0, 280.0);
        assert_eq!(input.cursor_delta, Vec2::ZERO);
        // and comes back out a couple of pixels later
        input.handle_cursor_move(52.0, 281.0);
        assert_eq!(input.cursor_delta, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn leaving_the_window_forgets_position() {
        let mut input = PointerInput::new(800, 600);
        input.handle_cursor_move(100.0, 100.0);
        input.handle_cursor_left();
        input.handle_cursor_move(700.0, 500.0);
        assert_eq!(input.cursor_delta, Vec2::ZERO);
        assert_eq!(input.cursor_position, Some(Vec2::new(700.0, 500.0)));
    }
}
