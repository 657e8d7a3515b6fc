use std::f32::consts::TAU;

use rand::Rng;
use raylib::prelude::*;

use crate::constants::*;
use crate::widgets::with_alpha;

const TRAIL_COLOR: Color = Color::new(144, 238, 144, 255);

#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vector2,
    velocity: Vector2,
    pub size: f32,
    pub life: f32,
}

impl Particle {
    pub fn new(position: Vector2) -> Self {
        let mut rng = rand::rng();
        Self {
            position,
            velocity: Vector2::new(rng.random_range(-0.75..0.75), rng.random_range(-0.75..0.75)),
            size: rng.random_range(0.5..2.0),
            life: 1.0,
        }
    }

    pub fn update(&mut self) {
        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;
        self.life -= PARTICLE_DECAY;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Pointer trail drawn over the scene, independent of scrolling. Only spawns
/// and advances between `start` and `stop`.
#[derive(Debug, Default)]
pub struct ParticleOverlay {
    particles: Vec<Particle>,
    running: bool,
}

impl ParticleOverlay {
    pub fn new() -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            running: false,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            tracing::debug!("particle overlay started");
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.particles.clear();
            tracing::debug!("particle overlay stopped");
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.particles.len()
    }

    // Returns how many particles were added
    pub fn pointer_moved(&mut self, position: Vector2) -> usize {
        if !self.running {
            return 0;
        }
        let room = MAX_PARTICLES.saturating_sub(self.particles.len());
        let count = PARTICLES_PER_EVENT.min(room);
        for _ in 0..count {
            self.particles.push(Particle::new(position));
        }
        count
    }

    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        for particle in self.particles.iter_mut() {
            particle.update();
        }
        self.particles.retain(Particle::is_alive);
    }

    pub fn draw(&self, d: &mut RaylibDrawHandle) {
        for particle in &self.particles {
            d.draw_circle_v(particle.position, particle.size, with_alpha(TRAIL_COLOR, particle.life));
        }
    }
}

#[derive(Debug, Clone)]
struct Sparkle {
    position: Vector2,
    velocity: Vector2,
    age: f32,
    max_age: f32,
}

impl Sparkle {
    fn alpha(&self) -> f32 {
        1.0 - self.age / self.max_age
    }
}

/// Ambient sparkles orbiting a round button.
#[derive(Debug)]
pub struct SparkleEmitter {
    center: Vector2,
    color: Color,
    sparkles: Vec<Sparkle>,
}

impl SparkleEmitter {
    pub fn new(center: Vector2, color: Color) -> Self {
        Self {
            center,
            color,
            sparkles: Vec::with_capacity(MAX_SPARKLES),
        }
    }

    pub fn set_center(&mut self, center: Vector2) {
        self.center = center;
    }

    pub fn tick(&mut self) {
        let mut rng = rand::rng();
        if self.sparkles.len() < MAX_SPARKLES && rng.random_bool(SPARKLE_SPAWN_CHANCE) {
            let angle = rng.random_range(0.0..TAU);
            let radius = rng.random_range(20.0..100.0);
            self.sparkles.push(Sparkle {
                position: Vector2::new(
                    self.center.x + angle.cos() * radius,
                    self.center.y + angle.sin() * radius,
                ),
                velocity: Vector2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)),
                age: 0.0,
                max_age: rng.random_range(60.0..120.0),
            });
        }

        for sparkle in self.sparkles.iter_mut() {
            sparkle.position.x += sparkle.velocity.x;
            sparkle.position.y += sparkle.velocity.y;
            sparkle.age += 1.0;
        }
        self.sparkles.retain(|s| s.alpha() > 0.0);
    }

    pub fn draw(&self, d: &mut RaylibDrawHandle) {
        for sparkle in &self.sparkles {
            let alpha = sparkle.alpha();
            let size = (4.0 * alpha).max(1.0);
            d.draw_circle_v(sparkle.position, size, with_alpha(self.color, alpha));
        }
    }
}
