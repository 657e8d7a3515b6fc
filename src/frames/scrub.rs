use crate::constants::PINNED_VIEWPORTS;

/// Frame shown at `progress` through the pinned region, snapped to the nearest frame.
pub fn frame_for_progress(progress: f32, frame_count: usize) -> usize {
    if frame_count == 0 {
        return 0;
    }
    let last = frame_count - 1;
    let frame = (progress.clamp(0.0, 1.0) * last as f32).round() as usize;
    frame.min(last)
}

// --- Mapper ---

/// Binds a scroll offset inside the pinned region to the playback position.
#[derive(Debug)]
pub struct ScrollMapper {
    frame_count: usize,
    viewport_height: f32,
    offset: f32,
    frame: usize,
    attached: bool,
}

impl ScrollMapper {
    pub fn new(frame_count: usize, viewport_height: f32) -> Self {
        Self {
            frame_count,
            viewport_height: viewport_height.max(0.0),
            offset: 0.0,
            frame: 0,
            attached: false,
        }
    }

    pub fn region(&self) -> f32 {
        self.viewport_height * PINNED_VIEWPORTS
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn progress(&self) -> f32 {
        let region = self.region();
        if region <= 0.0 {
            return 0.0;
        }
        (self.offset / region).clamp(0.0, 1.0)
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn attach(&mut self) -> bool {
        if self.attached {
            return false;
        }
        self.attached = true;
        tracing::debug!(region = self.region(), "scroll binding attached");
        true
    }

    // False when nothing was attached
    pub fn detach(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.attached = false;
        tracing::debug!("scroll binding detached");
        true
    }

    /// Returns the new frame when the snapped index changed.
    pub fn scroll_by(&mut self, delta: f32) -> Option<usize> {
        self.scroll_to(self.offset + delta)
    }

    pub fn scroll_to(&mut self, offset: f32) -> Option<usize> {
        if !self.attached {
            return None;
        }
        self.offset = offset.clamp(0.0, self.region());
        self.resample()
    }

    // Pixel offset is kept and clamped to the new region
    pub fn reinitialize(&mut self, viewport_height: f32) -> Option<usize> {
        self.viewport_height = viewport_height.max(0.0);
        self.offset = self.offset.clamp(0.0, self.region());
        self.resample()
    }

    fn resample(&mut self) -> Option<usize> {
        let frame = frame_for_progress(self.progress(), self.frame_count);
        if frame == self.frame {
            return None;
        }
        self.frame = frame;
        Some(frame)
    }
}
