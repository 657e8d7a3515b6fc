use raylib::prelude::*;

use crate::error::SceneResult;
use crate::input::InputFrame;
use crate::route::Route;
use crate::viewport::Viewport;

/// A full-window view driven by the main loop: home, a scene, or not-found.
///
/// The loop calls `initialize` once, then `update` and `render_frame` every
/// tick, `resize` whenever the window changes size, and `teardown` exactly
/// once before the view is dropped.
pub trait Engine {
    fn initialize(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread, viewport: Viewport) -> SceneResult<()>;

    /// Advances the view by `dt` seconds. Returns a route to navigate away.
    fn update(&mut self, dt: f32, input: &InputFrame, rl: &mut RaylibHandle, thread: &RaylibThread) -> Option<Route>;

    fn resize(&mut self, viewport: Viewport);

    fn render_frame(&mut self, d: &mut RaylibDrawHandle);

    fn teardown(&mut self);
}
