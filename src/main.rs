use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use raylib::prelude::*;
use tracing_subscriber::EnvFilter;

mod breathing;
mod config;
mod constants;
mod engine;
mod error;
mod frames;
mod home;
mod input;
mod not_found;
mod particles;
mod route;
mod scene;
mod state;
mod texture_loader;
mod viewport;
mod widgets;

use crate::config::ExperienceConfig;
use crate::constants::*;
use crate::engine::Engine;
use crate::home::HomeView;
use crate::input::InputFrame;
use crate::not_found::NotFoundView;
use crate::route::Route;
use crate::scene::ScenePlayer;
use crate::viewport::Viewport;

#[derive(Parser, Debug)]
#[command(name = "forest-scenes", version)]
struct Cli {
    /// Directory holding the `{Prefix}_{PC|MO}` frame folders.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Route to open first.
    #[arg(long, default_value = "/")]
    route: String,

    /// TOML file replacing the built-in scene table.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = WINDOW_WIDTH)]
    width: i32,

    #[arg(long, default_value_t = WINDOW_HEIGHT)]
    height: i32,

    #[arg(long, default_value_t = FPS)]
    fps: u32,
}

struct Views<'a> {
    experience: &'a ExperienceConfig,
    assets: &'a Path,
    pool: Arc<rayon::ThreadPool>,
}

impl Views<'_> {
    fn make(&self, route: &Route, viewport: Viewport) -> Box<dyn Engine> {
        match route {
            Route::Home => Box::new(HomeView::new(viewport)),
            Route::Scene(index) => {
                match ScenePlayer::new(self.experience, *index, self.assets.to_path_buf(), self.pool.clone(), viewport) {
                    Some(scene) => Box::new(scene),
                    None => Box::new(NotFoundView::new(route.path(self.experience), viewport)),
                }
            }
            Route::NotFound(path) => Box::new(NotFoundView::new(path.clone(), viewport)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("forest_scenes=info")))
        .init();

    let cli = Cli::parse();

    let experience = match &cli.config {
        Some(path) => ExperienceConfig::load(path)
            .with_context(|| format!("failed to load scene config {}", path.display()))?,
        None => ExperienceConfig::builtin(),
    };
    experience.validate().context("invalid scene config")?;

    let assets = cli
        .assets
        .clone()
        .or_else(|| experience.asset_root.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    tracing::info!(assets = %assets.display(), scenes = experience.scenes.len(), "starting");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(LOAD_WORKERS)
        .thread_name(|i| format!("frame-loader-{i}"))
        .build()
        .context("failed to build frame loader pool")?;

    let views = Views {
        experience: &experience,
        assets: &assets,
        pool: Arc::new(pool),
    };

    let (mut rl, thread) = raylib::init()
        .size(cli.width, cli.height)
        .title(&experience.title)
        .vsync()
        .resizable()
        .build();
    rl.set_target_fps(cli.fps);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);

    let mut viewport = Viewport::new(rl.get_screen_width(), rl.get_screen_height());
    let mut route = Route::resolve(&cli.route, &experience);
    let mut view = views.make(&route, viewport);
    view.initialize(&mut rl, &thread, viewport)
        .with_context(|| format!("failed to open {}", route.path(&experience)))?;

    let mut input = InputFrame::default();

    // --- Main Loop ---
    while !rl.window_should_close() {
        let dt = rl.get_frame_time();

        if rl.is_window_resized() {
            viewport = Viewport::new(rl.get_screen_width(), rl.get_screen_height());
            tracing::debug!(width = viewport.width, height = viewport.height, "window resized");
            view.resize(viewport);
        }

        input = InputFrame::capture(&rl, &input, viewport.height as f32);

        if let Some(next) = view.update(dt, &input, &mut rl, &thread) {
            tracing::info!(from = %route.path(&experience), to = %next.path(&experience), "navigate");
            view.teardown();
            route = next;
            view = views.make(&route, viewport);
            view.initialize(&mut rl, &thread, viewport)
                .with_context(|| format!("failed to open {}", route.path(&experience)))?;
        }

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::BLACK);
        view.render_frame(&mut d);
    }

    view.teardown();
    Ok(())
}
