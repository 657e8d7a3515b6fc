use raylib::prelude::*;

use crate::engine::Engine;
use crate::error::SceneResult;
use crate::input::InputFrame;
use crate::route::Route;
use crate::viewport::Viewport;
use crate::widgets::{draw_centered_text, MIST};

/// Shown for any path that matches neither home nor a scene.
pub struct NotFoundView {
    path: String,
    viewport: Viewport,
    closed: bool,
}

impl NotFoundView {
    pub fn new(path: impl Into<String>, viewport: Viewport) -> Self {
        Self {
            path: path.into(),
            viewport,
            closed: false,
        }
    }

    fn advance(&mut self, input: &InputFrame) -> Option<Route> {
        if self.closed || !(input.pressed || input.confirm) {
            return None;
        }
        Some(Route::Home)
    }
}

impl Engine for NotFoundView {
    fn initialize(&mut self, _rl: &mut RaylibHandle, _thread: &RaylibThread, viewport: Viewport) -> SceneResult<()> {
        self.viewport = viewport;
        tracing::warn!(path = %self.path, "no view for route");
        Ok(())
    }

    fn update(&mut self, _dt: f32, input: &InputFrame, _rl: &mut RaylibHandle, _thread: &RaylibThread) -> Option<Route> {
        self.advance(input)
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn render_frame(&mut self, d: &mut RaylibDrawHandle) {
        let (cx, cy) = self.viewport.center();
        draw_centered_text(d, "404", cx, cy - 80.0, 72, MIST);
        draw_centered_text(d, &format!("Nothing lives at {}", self.path), cx, cy + 10.0, 22, MIST);
        draw_centered_text(d, "Click or press Enter to go home", cx, cy + 50.0, 18, Color::GRAY);
    }

    fn teardown(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_or_confirm_goes_home() {
        let mut view = NotFoundView::new("/nowhere", Viewport::new(800, 600));
        assert_eq!(view.advance(&InputFrame::default()), None);

        let click = InputFrame {
            pressed: true,
            ..InputFrame::default()
        };
        assert_eq!(view.advance(&click), Some(Route::Home));

        let enter = InputFrame {
            confirm: true,
            ..InputFrame::default()
        };
        assert_eq!(view.advance(&enter), Some(Route::Home));
        assert_eq!(view.path, "/nowhere");
    }
}
