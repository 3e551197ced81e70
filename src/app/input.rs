use glam::Vec2;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Pointer state for one frame, fed by whatever owns the OS message loop.
#[derive(Default, Debug, Clone)]
pub struct InputState {
    /// Cursor position inside the client area
    pub cursor_position: Vec2,
    /// Cursor movement since the last [`end_frame`](Self::end_frame)
    pub cursor_delta: Vec2,
    /// Scroll accumulated this frame, in lines
    pub scroll_delta: Vec2,
    pub screen_size: Vec2,
    pub mouse_buttons: FxHashSet<MouseButton>,
    has_cursor: bool,
}

impl InputState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-frame deltas.
    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    pub fn handle_cursor_move(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        // The first sample only establishes the position.
        if self.has_cursor {
            self.cursor_delta += new_pos - self.cursor_position;
        }
        self.cursor_position = new_pos;
        self.has_cursor = true;
    }

    pub fn handle_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.mouse_buttons.insert(button);
        } else {
            self.mouse_buttons.remove(&button);
        }
    }

    /// Scroll in lines. Pixel deltas should be scaled down by the caller.
    pub fn handle_scroll(&mut self, x: f32, y: f32) {
        self.scroll_delta += Vec2::new(x, y);
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cursor_sample_has_no_delta() {
        let mut input = InputState::new();
        input.handle_cursor_move(10.0, 10.0);
        assert_eq!(input.cursor_delta, Vec2::ZERO);
        input.handle_cursor_move(15.0, 7.0);
        assert_eq!(input.cursor_delta, Vec2::new(5.0, -3.0));
        input.end_frame();
        assert_eq!(input.cursor_delta, Vec2::ZERO);
    }
}
