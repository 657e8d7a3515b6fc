use raylib::prelude::*;

use crate::viewport::Viewport;

pub const FOREST_GREEN: Color = Color::new(34, 139, 34, 255);
pub const MIST: Color = Color::new(230, 245, 230, 255);
pub const SHADE: Color = Color::new(0, 0, 0, 77);

pub fn with_alpha(color: Color, alpha: f32) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    Color::new(color.r, color.g, color.b, (color.a as f32 * alpha).round() as u8)
}

pub fn draw_centered_text(d: &mut RaylibDrawHandle, text: &str, cx: f32, y: f32, size: i32, color: Color) {
    let width = measure_text(text, size);
    d.draw_text(text, cx as i32 - width / 2, y as i32, size, color);
}

/// Greedy word wrap so a label fits `max_width` pixels at `size`.
fn wrap_label(text: &str, size: i32, max_width: i32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if !line.is_empty() && measure_text(&candidate, size) > max_width {
            lines.push(std::mem::take(&mut line));
            line = word.to_string();
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// A circular button with a wrapped label and an optional progress ring.
#[derive(Debug, Clone)]
pub struct RoundButton {
    pub center: Vector2,
    pub radius: f32,
    pub label: String,
    pub fill: Color,
}

impl RoundButton {
    pub fn new(label: impl Into<String>, radius: f32, fill: Color) -> Self {
        Self {
            center: Vector2::zero(),
            radius,
            label: label.into(),
            fill,
        }
    }

    pub fn contains(&self, point: Vector2) -> bool {
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    pub fn draw(&self, d: &mut RaylibDrawHandle, opacity: f32, ring: Option<f32>) {
        if opacity <= 0.0 {
            return;
        }
        d.draw_circle_v(self.center, self.radius, with_alpha(self.fill, 0.55 * opacity));
        d.draw_circle_lines(
            self.center.x as i32,
            self.center.y as i32,
            self.radius,
            with_alpha(Color::WHITE, 0.3 * opacity),
        );

        if let Some(progress) = ring.filter(|p| *p > 0.0) {
            d.draw_ring(
                self.center,
                self.radius + 4.0,
                self.radius + 9.0,
                -90.0,
                -90.0 + 360.0 * progress.min(1.0),
                64,
                with_alpha(MIST, opacity),
            );
        }

        let size = 18;
        let lines = wrap_label(&self.label, size, (self.radius * 1.6) as i32);
        let line_height = size as f32 + 4.0;
        let top = self.center.y - line_height * lines.len() as f32 * 0.5;
        for (i, line) in lines.iter().enumerate() {
            draw_centered_text(
                d,
                line,
                self.center.x,
                top + i as f32 * line_height,
                size,
                with_alpha(Color::WHITE, opacity),
            );
        }
    }
}

/// Loading screen shown while a scene's frames are fetched.
#[derive(Debug, Clone)]
pub struct LoadingScreen {
    pub title: String,
    pub percent: u32,
    pub opacity: f32,
    spinner: f32,
}

impl LoadingScreen {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            percent: 0,
            opacity: 1.0,
            spinner: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.percent = 0;
        self.opacity = 1.0;
    }

    pub fn update(&mut self, dt: f32) {
        self.spinner = (self.spinner + dt * 240.0) % 360.0;
    }

    pub fn draw(&self, d: &mut RaylibDrawHandle, viewport: Viewport) {
        if self.opacity <= 0.0 {
            return;
        }
        let (cx, cy) = viewport.center();
        let alpha = self.opacity;

        d.draw_rectangle(0, 0, viewport.width, viewport.height, with_alpha(Color::new(8, 24, 12, 255), alpha));

        d.draw_ring(
            Vector2::new(cx, cy - 80.0),
            22.0,
            28.0,
            self.spinner,
            self.spinner + 270.0,
            48,
            with_alpha(FOREST_GREEN, alpha),
        );

        draw_centered_text(d, &self.title, cx, cy - 20.0, 32, with_alpha(MIST, alpha));

        let bar_width = (viewport.width as f32 * 0.4).max(160.0);
        let left = cx - bar_width * 0.5;
        d.draw_rectangle(left as i32, (cy + 30.0) as i32, bar_width as i32, 4, with_alpha(SHADE, alpha));
        d.draw_rectangle(
            left as i32,
            (cy + 30.0) as i32,
            (bar_width * self.percent as f32 / 100.0) as i32,
            4,
            with_alpha(MIST, alpha),
        );

        draw_centered_text(d, &format!("{}%", self.percent), cx, cy + 46.0, 20, with_alpha(MIST, alpha));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_scales_and_clamps() {
        assert_eq!(with_alpha(Color::WHITE, 0.5).a, 128);
        assert_eq!(with_alpha(Color::WHITE, 2.0).a, 255);
        assert_eq!(with_alpha(Color::WHITE, -1.0).a, 0);
        let tinted = with_alpha(Color::new(10, 20, 30, 100), 0.5);
        assert_eq!((tinted.r, tinted.g, tinted.b, tinted.a), (10, 20, 30, 50));
    }

    #[test]
    fn button_hit_test_is_circular() {
        let mut button = RoundButton::new("Next Step", 50.0, FOREST_GREEN);
        button.center = Vector2::new(100.0, 100.0);
        assert!(button.contains(Vector2::new(100.0, 150.0)));
        assert!(button.contains(Vector2::new(130.0, 130.0)));
        assert!(!button.contains(Vector2::new(140.0, 140.0)));
    }
}
