pub const WINDOW_WIDTH: i32 = 1280;           // Default window width
pub const WINDOW_HEIGHT: i32 = 720;           // Default window height
pub const FPS: u32 = 60;                      // Frames per second

pub const FRAME_COUNT: usize = 200;           // Frames per scene sequence
pub const MOBILE_BREAKPOINT: i32 = 768;       // Widths at or below this use the mobile frames
pub const PINNED_VIEWPORTS: f32 = 2.0;        // Scroll region length, in viewport heights
pub const SCROLL_STEP: f32 = 100.0;           // Pixels scrolled per wheel notch
pub const KEY_SCROLL_STEP: f32 = 40.0;        // Pixels scrolled per arrow key press

pub const LOAD_WORKERS: usize = 4;            // Frame decoding threads
pub const UPLOADS_PER_TICK: usize = 12;       // Decoded frames turned into textures per tick

pub const CANVAS_FADE_IN: f32 = 0.8;          // Frame layers fade-in after loading (seconds)
pub const CANVAS_FADE_OUT: f32 = 0.5;         // Frame layers fade-out before navigating (seconds)

pub const MAX_PARTICLES: usize = 80;          // Pointer trail population cap
pub const PARTICLES_PER_EVENT: usize = 3;     // Pointer trail particles per move event
pub const PARTICLE_DECAY: f32 = 0.015;        // Life lost per tick

pub const MAX_SPARKLES: usize = 20;           // Ambient button sparkle cap
pub const SPARKLE_SPAWN_CHANCE: f64 = 0.3;    // Spawn probability per tick

pub const HOLD_DURATION_MS: u64 = 2000;       // Press-and-hold time to start breathing
pub const HOLD_SAMPLE_MS: u64 = 16;           // Hold ring sampling interval
pub const RING_RESET: f32 = 0.3;              // Hold ring reset animation (seconds)
pub const BREATHING_DURATION_MS: u64 = 36_000; // Breathing session length
pub const BREATH_CYCLE_MS: u64 = 12_000;      // One inhale/hold/exhale cycle
pub const BREATH_PHASE_MS: u64 = 4_000;       // Each phase of the cycle
pub const LABEL_FADE_OUT: f32 = 0.3;          // Instruction label fade-out (seconds)
pub const LABEL_FADE_IN: f32 = 0.5;           // Instruction label fade-in (seconds)
pub const BUTTON_FADE_OUT: f32 = 0.8;         // Hold button fade-out once the hold completes
pub const OVERLAY_FADE_IN: f32 = 1.0;         // Breathing overlay fade-in (seconds)
pub const OVERLAY_FADE_OUT: f32 = 0.8;        // Breathing overlay fade-out (seconds)
