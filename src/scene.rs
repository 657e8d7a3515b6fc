use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use raylib::prelude::*;

use crate::breathing::{BreathingEvent, BreathingState, BreathingTimer};
use crate::config::{ControlAction, ExperienceConfig, SceneConfig};
use crate::constants::*;
use crate::engine::Engine;
use crate::error::SceneResult;
use crate::frames::{draw_frame, FrameLoader, FrameSource, GatedControl, LoadEvent, ScrollMapper, VisibilityGate};
use crate::input::{InputFrame, ScrollJump};
use crate::particles::ParticleOverlay;
use crate::route::Route;
use crate::state::PlayerState;
use crate::texture_loader::upload_frame;
use crate::viewport::Viewport;
use crate::widgets::{draw_centered_text, with_alpha, LoadingScreen, RoundButton, FOREST_GREEN, MIST, SHADE};

struct SceneControl {
    id: String,
    button: RoundButton,
    action: ControlAction,
    target: Option<Route>,
}

/// One scroll-scrubbed scene: frame sequence, gated controls, pointer trail
/// and, when configured, the breathing exercise.
pub struct ScenePlayer {
    config: SceneConfig,
    viewport: Viewport,
    state: PlayerState,
    clock: Duration,
    loading_started: Duration,
    ready_at: Option<Duration>,
    layer_opacity: f32,

    loader: FrameLoader<Texture2D>,
    mapper: ScrollMapper,
    gate: VisibilityGate,
    controls: Vec<SceneControl>,
    particles: ParticleOverlay,
    breathing: Option<BreathingTimer>,
    loading: LoadingScreen,
}

impl ScenePlayer {
    pub fn new(
        experience: &ExperienceConfig,
        index: usize,
        asset_root: PathBuf,
        pool: Arc<rayon::ThreadPool>,
        viewport: Viewport,
    ) -> Option<Self> {
        let config = experience.scenes.get(index)?.clone();

        let source = FrameSource {
            root: asset_root,
            prefix: config.prefix.clone(),
            device: viewport.device_class(),
            extension: config.extension.clone(),
        };

        let mut gate = VisibilityGate::new();
        let mut controls = Vec::with_capacity(config.controls.len());
        for control in &config.controls {
            let [start, end] = control.zone;
            gate.register(
                control.id.clone(),
                GatedControl::new(start..=end, Duration::from_millis(control.fade_ms)),
                control.hides.clone(),
            );

            let target = match &control.action {
                ControlAction::Navigate { target } => Some(Route::resolve(target, experience)),
                ControlAction::HoldToBegin => None,
            };
            controls.push(SceneControl {
                id: control.id.clone(),
                button: RoundButton::new(control.label.clone(), 90.0, FOREST_GREEN),
                action: control.action.clone(),
                target,
            });
        }

        let breathing = config.has_breathing().then(BreathingTimer::new);

        let mut player = Self {
            loader: FrameLoader::new(source, config.frame_count, pool),
            mapper: ScrollMapper::new(config.frame_count, viewport.height as f32),
            gate,
            controls,
            particles: ParticleOverlay::new(),
            breathing,
            loading: LoadingScreen::new(experience.title.clone()),
            viewport,
            state: PlayerState::Loading,
            clock: Duration::ZERO,
            loading_started: Duration::ZERO,
            ready_at: None,
            layer_opacity: 0.0,
            config,
        };
        player.layout_controls();
        Some(player)
    }

    // --- Lifecycle ---

    fn begin(&mut self) {
        self.loader.start();
        self.mapper.attach();
        if self.config.particles {
            self.particles.start();
        }
        self.state = PlayerState::Loading;
        self.loading_started = self.clock;
        self.ready_at = None;
        tracing::info!(scene = %self.config.name, "scene mounted");
    }

    fn layout_controls(&mut self) {
        let (cx, _) = self.viewport.center();
        let radius = (self.viewport.width as f32 * 0.2).min(90.0);
        for control in self.controls.iter_mut() {
            control.button.center = Vector2::new(cx, self.viewport.height as f32 * 0.72);
            control.button.radius = radius;
        }
    }

    // Loader leaves once every frame settled, never before the minimum time
    fn reveal_at(&self, ready_at: Duration) -> Duration {
        ready_at.max(self.loading_started + Duration::from_millis(self.config.min_loader_ms))
    }

    // --- Input ---

    fn on_frame(&mut self) {
        if matches!(self.state, PlayerState::Revealing | PlayerState::Playing | PlayerState::Leaving(_)) {
            self.gate.evaluate(self.mapper.frame(), self.clock);
        }
    }

    fn scroll(&mut self, input: &InputFrame) {
        if !self.mapper.is_attached() {
            return;
        }
        let mut changed = match input.jump {
            Some(ScrollJump::Start) => self.mapper.scroll_to(0.0).is_some(),
            Some(ScrollJump::End) => self.mapper.scroll_to(self.mapper.region()).is_some(),
            None => false,
        };
        if input.scroll != 0.0 {
            changed |= self.mapper.scroll_by(input.scroll).is_some();
        }
        if changed {
            self.on_frame();
        }
    }

    fn handle_controls(&mut self, input: &InputFrame) -> Option<Route> {
        for control in &self.controls {
            let shown = self.gate.get(&control.id).is_some_and(GatedControl::is_shown);
            let over = control.button.contains(input.pointer);

            match &control.action {
                ControlAction::Navigate { .. } => {
                    if shown && ((input.pressed && over) || input.confirm) {
                        if let Some(target) = &control.target {
                            tracing::info!(scene = %self.config.name, control = %control.id, ?target, "navigating");
                            return Some(target.clone());
                        }
                    }
                }
                ControlAction::HoldToBegin => {
                    let Some(timer) = self.breathing.as_mut() else {
                        continue;
                    };
                    match timer.state() {
                        BreathingState::Idle | BreathingState::Stopped => {
                            if shown && input.pressed && over {
                                timer.press();
                            }
                        }
                        BreathingState::Holding => {
                            if !shown || input.released || !input.down || !over {
                                timer.release();
                            }
                        }
                        BreathingState::Breathing => {}
                    }
                }
            }
        }
        None
    }

    fn release_hold(&mut self) {
        if let Some(timer) = self.breathing.as_mut() {
            timer.release();
        }
    }

    // --- Update ---

    /// Everything in a tick that does not touch the GPU.
    fn advance(&mut self, dt: Duration, input: &InputFrame) -> Option<Route> {
        if self.state == PlayerState::Closed {
            return None;
        }
        let secs = dt.as_secs_f32();
        self.clock += dt;

        self.loading.update(secs);

        if input.pointer_moved {
            self.particles.pointer_moved(input.pointer);
        }
        self.particles.tick();

        self.scroll(input);

        let mut navigate = None;
        match self.state.clone() {
            PlayerState::Loading => {
                if let Some(ready_at) = self.ready_at {
                    if self.clock >= self.reveal_at(ready_at) {
                        self.state = PlayerState::Revealing;
                        // First draw of the loaded sequence
                        self.on_frame();
                    }
                }
            }
            PlayerState::Revealing => {
                if self.loading.opacity > 0.0 {
                    let fade = self.config.loader_fade_ms as f32 / 1000.0;
                    self.loading.opacity = if fade > 0.0 { self.loading.opacity - secs / fade } else { 0.0 };
                } else {
                    self.layer_opacity = (self.layer_opacity + secs / CANVAS_FADE_IN).min(1.0);
                    if self.layer_opacity >= 1.0 {
                        self.state = PlayerState::Playing;
                    }
                }
            }
            PlayerState::Playing => {
                if let Some(route) = self.handle_controls(input) {
                    self.state = PlayerState::Leaving(route);
                }
            }
            PlayerState::Leaving(route) => {
                self.layer_opacity = (self.layer_opacity - secs / CANVAS_FADE_OUT).max(0.0);
                if self.layer_opacity <= 0.0 {
                    navigate = Some(route);
                }
            }
            PlayerState::Closed => {}
        }

        // A hold only progresses while someone can be pressing it
        if self.state != PlayerState::Playing {
            self.release_hold();
        }

        self.gate.tick(self.mapper.frame(), self.clock, dt);
        if let Some(timer) = self.breathing.as_mut() {
            match timer.update(dt) {
                BreathingEvent::Started => tracing::info!(scene = %self.config.name, "breathing session started"),
                BreathingEvent::PhaseChanged(phase) => tracing::debug!(scene = %self.config.name, ?phase, "breath phase"),
                BreathingEvent::Finished => tracing::info!(scene = %self.config.name, "breathing session finished"),
                BreathingEvent::None => {}
            }
        }
        navigate
    }

    // --- Drawing ---

    fn draw_breathing(&self, d: &mut RaylibDrawHandle, timer: &BreathingTimer) {
        let alpha = timer.overlay_opacity();
        let (cx, cy) = self.viewport.center();
        let center = Vector2::new(cx, cy);
        let t = self.clock.as_secs_f32();

        d.draw_rectangle(0, 0, self.viewport.width, self.viewport.height, with_alpha(Color::BLACK, 0.3 * alpha));

        for i in 0..3 {
            let radius = 112.0 + i as f32 * 22.0 + 6.0 * (t * 1.5 + i as f32).sin();
            d.draw_circle_lines(cx as i32, cy as i32, radius, with_alpha(MIST, 0.25 * alpha));
        }

        d.draw_ring(center, 96.0, 100.0, 0.0, 360.0, 64, with_alpha(SHADE, alpha));
        d.draw_ring(
            center,
            96.0,
            100.0,
            -90.0,
            -90.0 + 360.0 * timer.session_progress(),
            64,
            with_alpha(FOREST_GREEN, alpha),
        );
        d.draw_circle_v(center, 90.0, with_alpha(FOREST_GREEN, 0.35 * alpha));

        draw_centered_text(d, "BREATHE", cx, cy - 32.0, 28, with_alpha(Color::WHITE, alpha));

        let label = timer.label();
        let rise = 15.0 * (1.0 - label.opacity());
        draw_centered_text(d, label.text(), cx, cy + 8.0 - rise, 22, with_alpha(MIST, alpha * label.opacity()));
    }
}

impl Engine for ScenePlayer {
    fn initialize(&mut self, _rl: &mut RaylibHandle, _thread: &RaylibThread, viewport: Viewport) -> SceneResult<()> {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.loader.restart(viewport.device_class());
            self.mapper.reinitialize(viewport.height as f32);
            self.layout_controls();
        }
        self.begin();
        Ok(())
    }

    fn update(&mut self, dt: f32, input: &InputFrame, rl: &mut RaylibHandle, thread: &RaylibThread) -> Option<Route> {
        if self.state == PlayerState::Loading && self.loader.is_loading() {
            match self.loader.pump(UPLOADS_PER_TICK, |_, frame| upload_frame(rl, thread, &frame)) {
                LoadEvent::Progressed { percent } => self.loading.percent = percent,
                LoadEvent::Ready => {
                    self.loading.percent = self.loader.progress().percent();
                    self.ready_at = Some(self.clock);
                }
                LoadEvent::Idle => {}
            }
        }
        self.advance(Duration::from_secs_f32(dt.max(0.0)), input)
    }

    fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        let previous = self.loader.source().device;
        self.viewport = viewport;
        self.layout_controls();

        if self.mapper.reinitialize(viewport.height as f32).is_some() {
            self.on_frame();
        }
        tracing::debug!(
            scene = %self.config.name,
            width = viewport.width,
            height = viewport.height,
            offset = self.mapper.offset(),
            "scene resized"
        );

        // Already fading out towards another view: let the navigation finish
        if matches!(self.state, PlayerState::Leaving(_) | PlayerState::Closed) {
            return;
        }

        if viewport.device_class() != previous {
            self.release_hold();
            self.loader.restart(viewport.device_class());
            self.state = PlayerState::Loading;
            self.loading.reset();
            self.layer_opacity = 0.0;
            self.loading_started = self.clock;
            self.ready_at = None;
            self.gate.hide_all();
        }
    }

    fn render_frame(&mut self, d: &mut RaylibDrawHandle) {
        if self.state == PlayerState::Closed {
            return;
        }

        if self.state != PlayerState::Loading {
            let frame = self.mapper.frame();
            if !draw_frame(d, self.loader.frames(), frame, self.layer_opacity) {
                tracing::trace!(frame, "frame not drawable");
            }
        }

        for control in &self.controls {
            let Some(gated) = self.gate.get(&control.id) else {
                continue;
            };
            if !gated.is_shown() {
                continue;
            }
            let mut opacity = gated.opacity() * self.layer_opacity;
            let mut ring = None;
            if control.action == ControlAction::HoldToBegin {
                if let Some(timer) = &self.breathing {
                    opacity *= timer.button_opacity();
                    ring = Some(timer.ring());
                }
            }
            control.button.draw(d, opacity, ring);
        }

        if let Some(timer) = &self.breathing {
            if timer.overlay_visible() {
                self.draw_breathing(d, timer);
            }
        }

        self.particles.draw(d);

        if matches!(self.state, PlayerState::Loading | PlayerState::Revealing) {
            self.loading.draw(d, self.viewport);
        }
    }

    fn teardown(&mut self) {
        if self.state == PlayerState::Closed {
            return;
        }
        self.particles.stop();
        self.mapper.detach();
        self.loader.cancel();
        self.gate.hide_all();
        self.state = PlayerState::Closed;
        tracing::info!(scene = %self.config.name, "scene torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::DeviceClass;

    const TICK: Duration = Duration::from_millis(16);

    fn pool() -> Arc<rayon::ThreadPool> {
        Arc::new(rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap())
    }

    fn scene(index: usize) -> ScenePlayer {
        let dir = std::env::temp_dir().join("forest_scenes_missing_assets");
        let mut player =
            ScenePlayer::new(&ExperienceConfig::builtin(), index, dir, pool(), Viewport::new(1280, 720)).unwrap();
        player.begin();
        player
    }

    fn idle() -> InputFrame {
        InputFrame::default()
    }

    fn run(player: &mut ScenePlayer, ticks: usize, input: &InputFrame) -> Option<Route> {
        let mut route = None;
        for _ in 0..ticks {
            route = route.or(player.advance(TICK, input));
        }
        route
    }

    fn until_playing(player: &mut ScenePlayer) {
        player.ready_at = Some(player.clock);
        for _ in 0..1000 {
            if player.state == PlayerState::Playing {
                return;
            }
            player.advance(TICK, &idle());
        }
        panic!("scene never started playing");
    }

    fn scroll_to_frame(player: &mut ScenePlayer, frame: usize) {
        let offset = player.mapper.region() * frame as f32 / (player.config.frame_count - 1) as f32;
        let input = InputFrame {
            scroll: offset - player.mapper.offset(),
            ..InputFrame::default()
        };
        player.advance(TICK, &input);
        assert_eq!(player.mapper.frame(), frame);
    }

    fn press_at(point: Vector2) -> InputFrame {
        InputFrame {
            pointer: point,
            pressed: true,
            down: true,
            ..InputFrame::default()
        }
    }

    #[test]
    fn loader_stays_up_for_minimum_time() {
        let mut player = scene(1);
        run(&mut player, 30, &idle());
        player.ready_at = Some(player.clock);

        // 3000ms minimum, counted from mount
        while player.clock + TICK < Duration::from_millis(3000) {
            player.advance(TICK, &idle());
            assert_eq!(player.state, PlayerState::Loading);
        }
        run(&mut player, 2, &idle());
        assert_eq!(player.state, PlayerState::Revealing);
    }

    #[test]
    fn reveal_fades_loader_then_frames() {
        let mut player = scene(0);
        player.ready_at = Some(Duration::ZERO);
        player.advance(TICK, &idle());
        assert_eq!(player.state, PlayerState::Revealing);

        run(&mut player, 20, &idle());
        assert!(player.loading.opacity < 1.0);
        assert_eq!(player.layer_opacity, 0.0);

        until_playing(&mut player);
        assert_eq!(player.layer_opacity, 1.0);
    }

    #[test]
    fn next_button_navigates_after_fade_out() {
        let mut player = scene(0);
        until_playing(&mut player);

        let center = player.controls[0].button.center;
        assert!(player.advance(TICK, &press_at(center)).is_none());
        assert_eq!(player.state, PlayerState::Playing, "button is hidden before frame 160");

        scroll_to_frame(&mut player, 180);
        assert!(player.gate.get("next").unwrap().is_shown());

        assert!(player.advance(TICK, &press_at(center)).is_none());
        assert_eq!(player.state, PlayerState::Leaving(Route::Scene(1)));

        let route = run(&mut player, 40, &idle());
        assert_eq!(route, Some(Route::Scene(1)));
    }

    #[test]
    fn holding_in_zone_starts_breathing() {
        let mut player = scene(1);
        until_playing(&mut player);
        scroll_to_frame(&mut player, 115);
        assert!(player.gate.get("hold").unwrap().is_shown());

        let center = player.controls[0].button.center;
        player.advance(TICK, &press_at(center));
        assert_eq!(player.breathing.as_ref().unwrap().state(), BreathingState::Holding);

        let holding = InputFrame {
            pointer: center,
            down: true,
            ..InputFrame::default()
        };
        run(&mut player, 130, &holding);
        assert_eq!(player.breathing.as_ref().unwrap().state(), BreathingState::Breathing);
    }

    #[test]
    fn pointer_leaving_cancels_the_hold() {
        let mut player = scene(1);
        until_playing(&mut player);
        scroll_to_frame(&mut player, 100);

        let center = player.controls[0].button.center;
        player.advance(TICK, &press_at(center));
        let away = InputFrame {
            pointer: Vector2::new(0.0, 0.0),
            pointer_moved: true,
            down: true,
            ..InputFrame::default()
        };
        player.advance(TICK, &away);
        assert_eq!(player.breathing.as_ref().unwrap().state(), BreathingState::Idle);
    }

    #[test]
    fn crossing_the_breakpoint_reloads_frames() {
        let mut player = scene(0);
        until_playing(&mut player);
        assert_eq!(player.loader.source().device, DeviceClass::Desktop);

        player.resize(Viewport::new(700, 900));
        assert_eq!(player.loader.source().device, DeviceClass::Mobile);
        assert_eq!(player.loader.progress().percent(), 0);
        assert_eq!(player.state, PlayerState::Loading);
        assert_eq!(player.layer_opacity, 0.0);

        // same class, only the height changed: no reload
        player.ready_at = Some(player.clock);
        player.advance(TICK, &idle());
        player.resize(Viewport::new(640, 400));
        assert_eq!(player.state, PlayerState::Revealing);
    }

    #[test]
    fn device_reload_drops_a_running_hold() {
        let mut player = scene(1);
        until_playing(&mut player);
        scroll_to_frame(&mut player, 115);

        let center = player.controls[0].button.center;
        player.advance(TICK, &press_at(center));
        assert_eq!(player.breathing.as_ref().unwrap().state(), BreathingState::Holding);

        player.resize(Viewport::new(700, 900));
        assert_eq!(player.state, PlayerState::Loading);

        // still pressing, but the button is gone until the reload finishes
        let holding = InputFrame {
            pointer: center,
            down: true,
            ..InputFrame::default()
        };
        run(&mut player, 130, &holding);
        assert_eq!(player.breathing.as_ref().unwrap().state(), BreathingState::Idle);
    }

    #[test]
    fn navigation_survives_a_device_change() {
        let mut player = scene(0);
        until_playing(&mut player);
        scroll_to_frame(&mut player, 180);

        let center = player.controls[0].button.center;
        player.advance(TICK, &press_at(center));
        assert_eq!(player.state, PlayerState::Leaving(Route::Scene(1)));

        player.resize(Viewport::new(700, 900));
        assert_eq!(player.state, PlayerState::Leaving(Route::Scene(1)));
        assert_eq!(player.loader.source().device, DeviceClass::Desktop);

        assert_eq!(run(&mut player, 40, &idle()), Some(Route::Scene(1)));
    }

    #[test]
    fn pointer_trail_follows_moves() {
        let mut player = scene(0);
        let moved = InputFrame {
            pointer: Vector2::new(20.0, 20.0),
            pointer_moved: true,
            ..InputFrame::default()
        };
        player.advance(TICK, &moved);
        assert_eq!(player.particles.len(), 3);

        // the third scene has no trail
        let mut quiet = scene(2);
        quiet.advance(TICK, &moved);
        assert_eq!(quiet.particles.len(), 0);
    }

    #[test]
    fn teardown_runs_once() {
        let mut player = scene(0);
        player.teardown();
        assert_eq!(player.state, PlayerState::Closed);
        assert!(!player.mapper.is_attached());
        assert_eq!(player.particles.pointer_moved(Vector2::zero()), 0);

        player.teardown();
        let input = InputFrame {
            scroll: 500.0,
            ..InputFrame::default()
        };
        assert!(player.advance(TICK, &input).is_none());
        assert_eq!(player.mapper.frame(), 0);
    }
}
