use raylib::prelude::*;

use crate::engine::Engine;
use crate::error::SceneResult;
use crate::input::InputFrame;
use crate::particles::{ParticleOverlay, SparkleEmitter};
use crate::route::Route;
use crate::viewport::Viewport;
use crate::widgets::{draw_centered_text, with_alpha, RoundButton, MIST};

const HOME_TITLE: &str = "Welcome to Veda";
const HOME_SUBTITLE: &str = "Discover the ancient wisdom of nature and sea through our immersive experiences";
const JOURNEY_LABEL: &str = "Begin Your Journey";

const FOREST: Color = Color::new(34, 197, 94, 255);
const SEA: Color = Color::new(56, 189, 248, 255);
const JOURNEY: Color = Color::new(168, 85, 247, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    Forest,
    Sea,
}

struct HomeButton {
    button: RoundButton,
    sparkles: SparkleEmitter,
    destination: Destination,
}

/// Landing page with one round button per experience.
pub struct HomeView {
    viewport: Viewport,
    buttons: Vec<HomeButton>,
    journey: Rectangle,
    particles: ParticleOverlay,
    opacity: f32,
    closed: bool,
}

impl HomeView {
    pub fn new(viewport: Viewport) -> Self {
        let entry = |label: &str, color: Color, destination| HomeButton {
            button: RoundButton::new(label, 100.0, color),
            sparkles: SparkleEmitter::new(Vector2::zero(), color),
            destination,
        };
        let mut view = Self {
            viewport,
            buttons: vec![entry("ForestVeda", FOREST, Destination::Forest), entry("SeaVeda", SEA, Destination::Sea)],
            journey: Rectangle::new(0.0, 0.0, 0.0, 0.0),
            particles: ParticleOverlay::new(),
            opacity: 0.0,
            closed: false,
        };
        view.layout();
        view
    }

    fn layout(&mut self) {
        let (cx, cy) = self.viewport.center();
        let w = self.viewport.width as f32;
        let radius = (w * 0.18).min(100.0);
        let spread = (w * 0.2).max(radius * 1.2);
        for (i, entry) in self.buttons.iter_mut().enumerate() {
            let side = if i == 0 { -1.0 } else { 1.0 };
            let center = Vector2::new(cx + side * spread, cy - 130.0);
            entry.button.center = center;
            entry.button.radius = radius;
            entry.sparkles.set_center(center);
        }

        let width = (w * 0.8).min(280.0);
        self.journey = Rectangle::new(cx - width * 0.5, cy + 120.0, width, 52.0);
    }

    fn on_journey(&self, point: Vector2) -> bool {
        let r = self.journey;
        point.x >= r.x && point.x <= r.x + r.width && point.y >= r.y && point.y <= r.y + r.height
    }

    fn advance(&mut self, dt: f32, input: &InputFrame) -> Option<Route> {
        if self.closed {
            return None;
        }
        self.opacity = (self.opacity + dt / 0.6).min(1.0);

        if input.pointer_moved {
            self.particles.pointer_moved(input.pointer);
        }
        self.particles.tick();
        for entry in self.buttons.iter_mut() {
            entry.sparkles.tick();
        }

        if input.confirm {
            return Some(Route::Scene(0));
        }
        if !input.pressed {
            return None;
        }

        if self.on_journey(input.pointer) {
            tracing::info!("journey button pressed");
            return None;
        }

        let hit = self.buttons.iter().find(|e| e.button.contains(input.pointer))?;
        match hit.destination {
            Destination::Forest => Some(Route::Scene(0)),
            Destination::Sea => {
                tracing::info!("SeaVeda selected, no scenes yet");
                None
            }
        }
    }
}

impl Engine for HomeView {
    fn initialize(&mut self, _rl: &mut RaylibHandle, _thread: &RaylibThread, viewport: Viewport) -> SceneResult<()> {
        self.resize(viewport);
        self.particles.start();
        Ok(())
    }

    fn update(&mut self, dt: f32, input: &InputFrame, _rl: &mut RaylibHandle, _thread: &RaylibThread) -> Option<Route> {
        self.advance(dt, input)
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.layout();
    }

    fn render_frame(&mut self, d: &mut RaylibDrawHandle) {
        let (cx, cy) = self.viewport.center();
        let alpha = self.opacity;
        d.draw_rectangle(0, 0, self.viewport.width, self.viewport.height, Color::new(8, 24, 12, 255));

        for entry in &self.buttons {
            entry.sparkles.draw(d);
            entry.button.draw(d, alpha, None);
        }

        draw_centered_text(d, HOME_TITLE, cx, cy + 10.0, 44, with_alpha(MIST, alpha));
        draw_centered_text(d, HOME_SUBTITLE, cx, cy + 66.0, 18, with_alpha(Color::LIGHTGRAY, alpha));

        d.draw_rectangle_rounded(self.journey, 1.0, 16, with_alpha(JOURNEY, alpha));
        draw_centered_text(
            d,
            JOURNEY_LABEL,
            cx,
            self.journey.y + (self.journey.height - 20.0) * 0.5,
            20,
            with_alpha(Color::WHITE, alpha),
        );

        self.particles.draw(d);
    }

    fn teardown(&mut self) {
        self.particles.stop();
        self.closed = true;
    }
}
