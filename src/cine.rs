//! Cine playback: a single timer walking the stack.
//!
//! The scheduler does not own a clock. It hands out a [`TimerHandle`] and the
//! host runs exactly one periodic timer for whatever [`CineScheduler::active_timer`]
//! returns, feeding each expiry back through [`CineScheduler::tick`]. Ticks
//! carrying a retired handle id are ignored, so a restart can never leave two
//! timers advancing the stack.

use std::time::Duration;

use crate::adapter::Viewport;

pub const DEFAULT_FPS: u32 = 12;
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 30;
pub const MIN_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    pub id: u64,
    pub interval: Duration,
}

/// `max(min_interval, round(1000 / fps))` milliseconds.
pub fn frame_interval(fps: u32, min_interval: Duration) -> Duration {
    let fps = fps.clamp(MIN_FPS, MAX_FPS);
    let millis = (1000.0 / f64::from(fps)).round() as u64;
    Duration::from_millis(millis).max(min_interval)
}

#[derive(Debug)]
pub struct CineScheduler {
    playing: bool,
    fps: u32,
    min_interval: Duration,
    timer: Option<TimerHandle>,
    next_id: u64,
}

impl Default for CineScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FPS, MIN_INTERVAL)
    }
}

impl CineScheduler {
    pub fn new(fps: u32, min_interval: Duration) -> Self {
        Self {
            playing: false,
            fps: fps.clamp(MIN_FPS, MAX_FPS),
            min_interval,
            timer: None,
            next_id: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn interval(&self) -> Duration {
        frame_interval(self.fps, self.min_interval)
    }

    pub fn active_timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    /// Begins playback. Refuses an empty stack.
    pub fn start(&mut self, viewport: &Viewport<'_>) -> bool {
        if viewport.stack_size() == 0 {
            log::warn!("Cine: no stack loaded");
            return false;
        }
        self.playing = true;
        self.arm();
        log::info!("Cine playing at {} fps", self.fps);
        true
    }

    pub fn stop(&mut self) {
        if self.playing {
            log::info!("Cine stopped");
        }
        self.playing = false;
        self.timer = None;
    }

    pub fn toggle(&mut self, viewport: &Viewport<'_>) -> bool {
        if self.playing {
            self.stop();
            false
        } else {
            self.start(viewport)
        }
    }

    /// Clamps to 1..=30 and, when playing, re-arms with the new interval.
    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.clamp(MIN_FPS, MAX_FPS);
        if self.playing {
            self.arm();
        }
    }

    /// Advances one slice if `timer_id` is the live handle.
    pub fn tick(&mut self, timer_id: u64, viewport: &mut Viewport<'_>) -> bool {
        if self.timer.map(|timer| timer.id) != Some(timer_id) {
            log::debug!("Cine: dropping tick from retired timer {timer_id}");
            return false;
        }

        let size = viewport.stack_size();
        if size == 0 {
            self.stop();
            return false;
        }
        let next = (viewport.current_index() + 1) % size;
        viewport.set_index(next)
    }

    pub fn step_forward(&self, viewport: &mut Viewport<'_>) -> bool {
        step(viewport, 1)
    }

    pub fn step_backward(&self, viewport: &mut Viewport<'_>) -> bool {
        step(viewport, -1)
    }

    fn arm(&mut self) {
        self.next_id += 1;
        self.timer = Some(TimerHandle {
            id: self.next_id,
            interval: self.interval(),
        });
    }
}

fn step(viewport: &mut Viewport<'_>, delta: isize) -> bool {
    let size = viewport.stack_size();
    if size == 0 {
        return false;
    }
    let current = viewport.current_index().min(size - 1) as isize;
    let next = (current + delta).rem_euclid(size as isize) as usize;
    viewport.set_index(next)
}
