use std::ops::RangeInclusive;
use std::time::Duration;

// --- Gated Control ---

/// A control whose visibility follows the playback position.
#[derive(Debug, Clone)]
pub struct GatedControl {
    zone: RangeInclusive<usize>,
    fade: Duration,
    opacity: f32,
    target: f32,
    shown: bool,
    hide_at: Option<Duration>,
}

impl GatedControl {
    pub fn new(zone: RangeInclusive<usize>, fade: Duration) -> Self {
        Self {
            zone,
            fade,
            opacity: 0.0,
            target: 0.0,
            shown: false,
            hide_at: None,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn evaluate(&mut self, frame: usize, now: Duration) {
        if self.zone.contains(&frame) {
            self.shown = true;
            self.opacity = 1.0;
            self.target = 1.0;
            self.hide_at = None;
        } else {
            self.target = 0.0;
            if self.shown && self.hide_at.is_none() {
                self.hide_at = Some(now + self.fade);
            }
        }
    }

    // Hide fires only if the latest frame is still outside the zone
    pub fn tick(&mut self, frame: usize, now: Duration, dt: Duration) {
        if let Some(deadline) = self.hide_at {
            if now >= deadline {
                self.hide_at = None;
                if self.zone.contains(&frame) {
                    self.opacity = 1.0;
                    self.target = 1.0;
                } else {
                    self.shown = false;
                    self.opacity = 0.0;
                }
            }
        }

        if self.opacity > self.target {
            let step = if self.fade.is_zero() {
                1.0
            } else {
                dt.as_secs_f32() / self.fade.as_secs_f32()
            };
            self.opacity = (self.opacity - step).max(self.target);
        }
    }

    /// Hides without a fade, cancelling any pending hide.
    pub fn hide_now(&mut self) {
        self.shown = false;
        self.opacity = 0.0;
        self.target = 0.0;
        self.hide_at = None;
    }
}

#[derive(Debug, Clone)]
struct GateEntry {
    id: String,
    control: GatedControl,
    hides: Vec<String>,
}

// --- Gate ---

#[derive(Debug, Clone, Default)]
pub struct VisibilityGate {
    entries: Vec<GateEntry>,
}

impl VisibilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, control: GatedControl, hides: Vec<String>) {
        self.entries.push(GateEntry {
            id: id.into(),
            control,
            hides,
        });
    }

    pub fn get(&self, id: &str) -> Option<&GatedControl> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.control)
    }

    pub fn evaluate(&mut self, frame: usize, now: Duration) {
        let mut hidden = Vec::new();
        for entry in self.entries.iter_mut() {
            entry.control.evaluate(frame, now);
            if entry.control.is_shown() && entry.control.zone.contains(&frame) {
                hidden.extend(entry.hides.iter().cloned());
            }
        }

        for entry in self.entries.iter_mut() {
            if hidden.contains(&entry.id) {
                entry.control.hide_now();
            }
        }
    }

    pub fn tick(&mut self, frame: usize, now: Duration, dt: Duration) {
        for entry in self.entries.iter_mut() {
            entry.control.tick(frame, now, dt);
        }
    }

    pub fn hide_all(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.control.hide_now();
        }
    }
}
