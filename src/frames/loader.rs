use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use crate::error::SceneResult;
use crate::texture_loader::{decode_frame, DecodedFrame};
use crate::viewport::DeviceClass;

#[derive(Debug)]
pub enum FrameSlot<T> {
    Pending,
    Loaded(T),
    Failed,
}

/// Ordered frames of one scene, indexed `0..len`.
#[derive(Debug)]
pub struct FrameSet<T> {
    slots: Vec<FrameSlot<T>>,
}

impl<T> FrameSet<T> {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| FrameSlot::Pending).collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_slots(slots: Vec<FrameSlot<T>>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&FrameSlot<T>> {
        self.slots.get(index)
    }

    pub fn loaded(&self, index: usize) -> Option<&T> {
        match self.slots.get(index) {
            Some(FrameSlot::Loaded(frame)) => Some(frame),
            _ => None,
        }
    }

    fn settle(&mut self, index: usize, slot: FrameSlot<T>) -> bool {
        match self.slots.get_mut(index) {
            Some(current) if matches!(current, FrameSlot::Pending) => {
                *current = slot;
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = FrameSlot::Pending;
        }
    }
}

// --- Source ---

/// `{root}/{prefix}_{PC|MO}/{index + 1}.{extension}`
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSource {
    pub root: PathBuf,
    pub prefix: String,
    pub device: DeviceClass,
    pub extension: String,
}

impl FrameSource {
    pub fn path(&self, index: usize) -> PathBuf {
        self.root
            .join(format!("{}_{}", self.prefix, self.device.suffix()))
            .join(format!("{}.{}", index + 1, self.extension))
    }
}

// Failed attempts count as completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    completed: usize,
    total: usize,
}

impl LoadProgress {
    pub fn new(total: usize) -> Self {
        Self { completed: 0, total }
    }

    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        (self.completed * 100 / self.total) as u32
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }

    fn record(&mut self) {
        if self.completed < self.total {
            self.completed += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEvent {
    Idle,
    Progressed { percent: u32 },
    Ready, // once per load
}

type Completion = (usize, SceneResult<DecodedFrame>);

// --- Loader ---

/// Fetches a scene's frames on a shared worker pool and settles them on the
/// caller's thread.
pub struct FrameLoader<T> {
    source: FrameSource,
    frames: FrameSet<T>,
    progress: LoadProgress,
    pool: Arc<rayon::ThreadPool>,
    completions: Option<Receiver<Completion>>,
    cancelled: Arc<AtomicBool>,
    ready_sent: bool,
}

impl<T> FrameLoader<T> {
    pub fn new(source: FrameSource, frame_count: usize, pool: Arc<rayon::ThreadPool>) -> Self {
        Self {
            source,
            frames: FrameSet::new(frame_count),
            progress: LoadProgress::new(frame_count),
            pool,
            completions: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            ready_sent: false,
        }
    }

    pub fn source(&self) -> &FrameSource {
        &self.source
    }

    pub fn frames(&self) -> &FrameSet<T> {
        &self.frames
    }

    pub fn progress(&self) -> LoadProgress {
        self.progress
    }

    pub fn is_loading(&self) -> bool {
        self.completions.is_some() && !self.ready_sent
    }

    #[tracing::instrument(skip(self), fields(prefix = %self.source.prefix, device = ?self.source.device))]
    pub fn start(&mut self) {
        self.cancel();

        let (sender, receiver) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));

        for index in 0..self.frames.len() {
            let path = self.source.path(index);
            let sender = sender.clone();
            let cancelled = Arc::clone(&cancelled);
            self.pool.spawn(move || {
                if cancelled.load(Ordering::Relaxed) {
                    return;
                }
                let result = decode_frame(&path);
                // Receiver is gone once the load was cancelled
                let _ = sender.send((index, result));
            });
        }

        tracing::info!(frames = self.frames.len(), root = %self.source.root.display(), "frame load started");

        self.completions = Some(receiver);
        self.cancelled = cancelled;
    }

    #[tracing::instrument(skip(self), fields(prefix = %self.source.prefix))]
    pub fn restart(&mut self, device: DeviceClass) {
        tracing::info!(from = ?self.source.device, to = ?device, "reloading frames for new device class");
        self.source.device = device;
        self.start();
    }

    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.completions = None;
        self.frames.reset();
        self.progress = LoadProgress::new(self.frames.len());
        self.ready_sent = false;
    }

    /// Settles at most `budget` finished fetches. An `upload` error marks the slot failed.
    pub fn pump<F>(&mut self, budget: usize, mut upload: F) -> LoadEvent
    where
        F: FnMut(usize, DecodedFrame) -> SceneResult<T>,
    {
        if self.ready_sent {
            return LoadEvent::Idle;
        }

        // Nothing to fetch at all is ready as soon as it starts
        if self.completions.is_some() && self.progress.is_complete() {
            self.ready_sent = true;
            return LoadEvent::Ready;
        }

        let Some(receiver) = self.completions.as_ref() else {
            return LoadEvent::Idle;
        };

        let mut settled = 0;
        while settled < budget {
            let (index, result) = match receiver.try_recv() {
                Ok(completion) => completion,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            };

            let slot = match result.and_then(|frame| upload(index, frame)) {
                Ok(frame) => FrameSlot::Loaded(frame),
                Err(e) => {
                    tracing::debug!(index, error = %e, "frame unavailable");
                    FrameSlot::Failed
                }
            };

            if self.frames.settle(index, slot) {
                self.progress.record();
                settled += 1;
            }
        }

        if self.progress.is_complete() {
            self.ready_sent = true;
            let failed = (0..self.frames.len())
                .filter(|&i| matches!(self.frames.slot(i), Some(FrameSlot::Failed)))
                .count();
            tracing::info!(frames = self.frames.len(), failed, "frames ready");
            LoadEvent::Ready
        } else if settled > 0 {
            LoadEvent::Progressed { percent: self.progress.percent() }
        } else {
            LoadEvent::Idle
        }
    }
}

impl<T> Drop for FrameLoader<T> {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::{Duration, Instant};

    use image::RgbaImage;

    fn pool() -> Arc<rayon::ThreadPool> {
        Arc::new(rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap())
    }

    fn write_frames(root: &Path, prefix: &str, device: DeviceClass, indices: &[usize], width: u32) {
        let dir = root.join(format!("{prefix}_{}", device.suffix()));
        std::fs::create_dir_all(&dir).unwrap();
        for &i in indices {
            let img = RgbaImage::from_pixel(width, 2, image::Rgba([0, 0, 0, 255]));
            img.save(dir.join(format!("{}.png", i + 1))).unwrap();
        }
    }

    fn source(root: &Path, device: DeviceClass) -> FrameSource {
        FrameSource {
            root: root.to_path_buf(),
            prefix: "Scene1".to_string(),
            device,
            extension: "png".to_string(),
        }
    }

    /// Pumps one completion at a time until ready, collecting every percent seen.
    fn pump_until_ready(loader: &mut FrameLoader<u32>) -> Vec<u32> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut seen = Vec::new();
        loop {
            match loader.pump(1, |_, frame| Ok(frame.width)) {
                LoadEvent::Ready => {
                    seen.push(loader.progress().percent());
                    return seen;
                }
                LoadEvent::Progressed { percent } => seen.push(percent),
                LoadEvent::Idle => std::thread::sleep(Duration::from_millis(1)),
            }
            assert!(Instant::now() < deadline, "load never completed");
        }
    }

    #[test]
    fn path_template_uses_one_based_indices() {
        let src = FrameSource {
            root: PathBuf::from("assets"),
            prefix: "Scene2".to_string(),
            device: DeviceClass::Mobile,
            extension: "webp".to_string(),
        };
        assert_eq!(src.path(0), PathBuf::from("assets/Scene2_MO/1.webp"));
        assert_eq!(src.path(199), PathBuf::from("assets/Scene2_MO/200.webp"));
    }

    #[test]
    fn percent_is_floored() {
        let mut progress = LoadProgress::new(3);
        progress.record();
        assert_eq!(progress.percent(), 33);
        progress.record();
        assert_eq!(progress.percent(), 66);
        progress.record();
        assert_eq!(progress.percent(), 100);
        progress.record();
        assert_eq!(progress.completed, 3);
    }

    #[test]
    fn failures_count_toward_completion() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), "Scene1", DeviceClass::Desktop, &[0, 1, 3, 5, 6], 7);

        let mut loader = FrameLoader::new(source(dir.path(), DeviceClass::Desktop), 8, pool());
        loader.start();
        let seen = pump_until_ready(&mut loader);

        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {seen:?}");
        assert_eq!(*seen.last().unwrap(), 100);
        assert_eq!(loader.progress().completed, 8);

        assert_eq!(loader.frames().loaded(0), Some(&7));
        assert!(matches!(loader.frames().slot(2), Some(FrameSlot::Failed)));
        assert!(matches!(loader.frames().slot(7), Some(FrameSlot::Failed)));
    }

    #[test]
    fn ready_is_signalled_once() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), "Scene1", DeviceClass::Desktop, &[0, 1], 3);

        let mut loader = FrameLoader::new(source(dir.path(), DeviceClass::Desktop), 2, pool());
        loader.start();
        pump_until_ready(&mut loader);
        assert_eq!(loader.pump(8, |_, f| Ok(f.width)), LoadEvent::Idle);
        assert!(!loader.is_loading());
    }

    #[test]
    fn upload_errors_mark_the_slot_failed() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), "Scene1", DeviceClass::Desktop, &[0, 1, 2], 3);

        let mut loader = FrameLoader::new(source(dir.path(), DeviceClass::Desktop), 3, pool());
        loader.start();
        let deadline = Instant::now() + Duration::from_secs(10);
        while loader.pump(3, |i, f| {
            if i == 1 {
                Err(crate::error::SceneError::load("gpu refused"))
            } else {
                Ok(f.width)
            }
        }) != LoadEvent::Ready
        {
            assert!(Instant::now() < deadline);
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(matches!(loader.frames().slot(1), Some(FrameSlot::Failed)));
        assert_eq!(loader.frames().loaded(2), Some(&3));
    }

    #[test]
    fn device_change_restarts_from_zero() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), "Scene1", DeviceClass::Desktop, &[0, 1, 2, 3], 9);
        write_frames(dir.path(), "Scene1", DeviceClass::Mobile, &[0, 1, 2, 3], 4);

        let mut loader = FrameLoader::new(source(dir.path(), DeviceClass::Desktop), 4, pool());
        loader.start();
        pump_until_ready(&mut loader);
        assert_eq!(loader.frames().loaded(0), Some(&9));

        loader.restart(DeviceClass::Mobile);
        assert_eq!(loader.progress().completed, 0);
        assert_eq!(loader.progress().percent(), 0);
        assert!(loader.frames().loaded(0).is_none());
        assert_eq!(loader.source().path(0), dir.path().join("Scene1_MO/1.png"));

        pump_until_ready(&mut loader);
        assert_eq!(loader.frames().loaded(3), Some(&4));
    }

    #[test]
    fn empty_sequence_is_ready_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader: FrameLoader<u32> =
            FrameLoader::new(source(dir.path(), DeviceClass::Desktop), 0, pool());
        loader.start();
        assert_eq!(loader.pump(1, |_, f| Ok(f.width)), LoadEvent::Ready);
    }
}
