use raylib::prelude::*;

use crate::frames::loader::FrameSet;
use crate::widgets::with_alpha;

/// Anything with pixel dimensions that can stand in for a frame.
pub trait FrameImage {
    fn dimensions(&self) -> (i32, i32);
}

impl FrameImage for Texture2D {
    fn dimensions(&self) -> (i32, i32) {
        (self.width(), self.height())
    }
}

/// The frame at `index`, clamped into the set, if it is safe to draw.
/// Failed, pending and zero-sized frames yield nothing.
pub fn drawable<T: FrameImage>(frames: &FrameSet<T>, index: usize) -> Option<&T> {
    if frames.is_empty() {
        return None;
    }
    let index = index.min(frames.len() - 1);
    frames.loaded(index).filter(|frame| {
        let (width, height) = frame.dimensions();
        width > 0 && height > 0
    })
}

// --- Frame Layer ---

/// Clears the layer and draws frame `index` at the origin. Returns false when
/// the frame could not be drawn; the layer is left cleared.
pub fn draw_frame(d: &mut RaylibDrawHandle, frames: &FrameSet<Texture2D>, index: usize, opacity: f32) -> bool {
    let (width, height) = (d.get_screen_width(), d.get_screen_height());
    d.draw_rectangle(0, 0, width, height, Color::BLACK);

    match drawable(frames, index) {
        Some(texture) => {
            d.draw_texture(texture, 0, 0, with_alpha(Color::WHITE, opacity));
            true
        }
        None => false,
    }
}
