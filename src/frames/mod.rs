//! The scroll-scrubbed frame-sequence player: loading, scroll mapping,
//! drawing and frame-gated controls.

pub mod gate;
pub mod loader;
pub mod renderer;
pub mod scrub;

pub use gate::{GatedControl, VisibilityGate};
pub use loader::{FrameLoader, FrameSource, LoadEvent};
pub use renderer::draw_frame;
pub use scrub::ScrollMapper;
