use std::time::Duration;

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    pub fn at(elapsed: Duration) -> Self {
        let in_cycle = elapsed.as_millis() as u64 % BREATH_CYCLE_MS;
        if in_cycle < BREATH_PHASE_MS {
            BreathPhase::Inhale
        } else if in_cycle < 2 * BREATH_PHASE_MS {
            BreathPhase::Hold
        } else {
            BreathPhase::Exhale
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "INHALE",
            BreathPhase::Hold => "HOLD",
            BreathPhase::Exhale => "EXHALE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelStage {
    Steady,
    FadingOut,
    FadingIn,
}

// --- Instruction Label ---

/// Instruction text that only swaps while fully transparent.
#[derive(Debug, Clone)]
pub struct InstructionLabel {
    shown: BreathPhase,
    pending: Option<BreathPhase>,
    opacity: f32,
    stage: LabelStage,
}

impl InstructionLabel {
    pub fn new(phase: BreathPhase) -> Self {
        Self {
            shown: phase,
            pending: None,
            opacity: 1.0,
            stage: LabelStage::Steady,
        }
    }

    pub fn text(&self) -> &'static str {
        self.shown.label()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn request(&mut self, phase: BreathPhase) -> bool {
        let wanted = self.pending.unwrap_or(self.shown);
        if phase == wanted {
            return false;
        }
        self.pending = Some(phase);
        self.stage = LabelStage::FadingOut;
        true
    }

    pub fn update(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32();
        match self.stage {
            LabelStage::Steady => {}
            LabelStage::FadingOut => {
                self.opacity -= dt / LABEL_FADE_OUT;
                if self.opacity <= 0.0 {
                    self.opacity = 0.0;
                    if let Some(next) = self.pending.take() {
                        self.shown = next;
                    }
                    self.stage = LabelStage::FadingIn;
                }
            }
            LabelStage::FadingIn => {
                self.opacity += dt / LABEL_FADE_IN;
                if self.opacity >= 1.0 {
                    self.opacity = 1.0;
                    self.stage = LabelStage::Steady;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathingState {
    Idle,
    Holding,
    Breathing,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathingEvent {
    None,
    Started,
    PhaseChanged(BreathPhase),
    Finished,
}

// --- Timer ---

/// Hold-to-begin button plus the timed breathing session it unlocks.
#[derive(Debug, Clone)]
pub struct BreathingTimer {
    state: BreathingState,
    held: Duration,
    since_sample: Duration,
    ring: f32,
    ring_reset_from: f32,
    ring_reset_t: f32,
    elapsed: Duration,
    label: InstructionLabel,
    button_opacity: f32,
    overlay_opacity: f32,
}

impl Default for BreathingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathingTimer {
    pub fn new() -> Self {
        Self {
            state: BreathingState::Idle,
            held: Duration::ZERO,
            since_sample: Duration::ZERO,
            ring: 0.0,
            ring_reset_from: 0.0,
            ring_reset_t: 1.0,
            elapsed: Duration::ZERO,
            label: InstructionLabel::new(BreathPhase::Inhale),
            button_opacity: 1.0,
            overlay_opacity: 0.0,
        }
    }

    pub fn state(&self) -> BreathingState {
        self.state
    }

    pub fn ring(&self) -> f32 {
        self.ring
    }

    pub fn session_progress(&self) -> f32 {
        match self.state {
            BreathingState::Breathing => {
                (self.elapsed.as_secs_f32() * 1000.0 / BREATHING_DURATION_MS as f32).min(1.0)
            }
            BreathingState::Stopped => 1.0,
            _ => 0.0,
        }
    }

    pub fn label(&self) -> &InstructionLabel {
        &self.label
    }

    pub fn button_opacity(&self) -> f32 {
        self.button_opacity
    }

    pub fn overlay_opacity(&self) -> f32 {
        self.overlay_opacity
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_opacity > 0.0
    }

    pub fn press(&mut self) -> bool {
        match self.state {
            BreathingState::Idle | BreathingState::Stopped => {
                self.state = BreathingState::Holding;
                self.held = Duration::ZERO;
                self.since_sample = Duration::ZERO;
                self.ring = 0.0;
                self.ring_reset_t = 1.0;
                self.button_opacity = 1.0;
                tracing::debug!("hold started");
                true
            }
            BreathingState::Holding | BreathingState::Breathing => false,
        }
    }

    // Only matters mid-hold
    pub fn release(&mut self) -> bool {
        if self.state != BreathingState::Holding {
            return false;
        }
        self.state = BreathingState::Idle;
        self.ring_reset_from = self.ring;
        self.ring_reset_t = 0.0;
        tracing::debug!(held_ms = self.held.as_millis() as u64, "hold released early");
        true
    }

    pub fn update(&mut self, dt: Duration) -> BreathingEvent {
        let secs = dt.as_secs_f32();
        match self.state {
            BreathingState::Idle => {
                self.animate_ring_reset(secs);
                BreathingEvent::None
            }
            BreathingState::Holding => self.update_hold(dt),
            BreathingState::Breathing => self.update_session(dt),
            BreathingState::Stopped => {
                // Overlay goes away, the hold button comes back for another round
                self.overlay_opacity = (self.overlay_opacity - secs / OVERLAY_FADE_OUT).max(0.0);
                self.button_opacity = (self.button_opacity + secs / OVERLAY_FADE_OUT).min(1.0);
                BreathingEvent::None
            }
        }
    }

    fn animate_ring_reset(&mut self, secs: f32) {
        if self.ring_reset_t < 1.0 {
            self.ring_reset_t = (self.ring_reset_t + secs / RING_RESET).min(1.0);
            self.ring = self.ring_reset_from * (1.0 - self.ring_reset_t);
        }
    }

    fn update_hold(&mut self, dt: Duration) -> BreathingEvent {
        let sample = Duration::from_millis(HOLD_SAMPLE_MS);
        self.held += dt;
        self.since_sample += dt;

        if self.since_sample < sample {
            return BreathingEvent::None;
        }
        self.since_sample = Duration::ZERO;

        let progress = (self.held.as_secs_f32() * 1000.0 / HOLD_DURATION_MS as f32).min(1.0);
        self.ring = progress;

        if self.held >= Duration::from_millis(HOLD_DURATION_MS) {
            self.state = BreathingState::Breathing;
            self.elapsed = Duration::ZERO;
            self.label = InstructionLabel::new(BreathPhase::Inhale);
            return BreathingEvent::Started;
        }
        BreathingEvent::None
    }

    fn update_session(&mut self, dt: Duration) -> BreathingEvent {
        let secs = dt.as_secs_f32();

        // Button fades away first, the session clock starts once it is gone
        if self.button_opacity > 0.0 {
            self.button_opacity = (self.button_opacity - secs / BUTTON_FADE_OUT).max(0.0);
            return BreathingEvent::None;
        }

        self.elapsed += dt;
        self.overlay_opacity = (self.overlay_opacity + secs / OVERLAY_FADE_IN).min(1.0);
        self.label.update(dt);

        if self.elapsed >= Duration::from_millis(BREATHING_DURATION_MS) {
            self.state = BreathingState::Stopped;
            self.ring = 0.0;
            return BreathingEvent::Finished;
        }

        let phase = BreathPhase::at(self.elapsed);
        if self.label.request(phase) {
            return BreathingEvent::PhaseChanged(phase);
        }
        BreathingEvent::None
    }
}
