use std::time::{Duration, Instant};

/// Length of a chart transition in UI frames (~500ms at 60fps)
pub const TRANSITION_FRAMES: u64 = 30;

/// Wall-clock length of one UI frame
pub const FRAME_DURATION: Duration = Duration::from_micros(16_667);

/// Turns wall-clock time into whole UI frames, independent of how often the
/// loop wakes up
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self { last: now }
    }

    /// Frames completed since the previous call; the remainder carries over
    pub fn advance(&mut self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.last);
        let frames = (elapsed.as_micros() / FRAME_DURATION.as_micros()) as u64;
        self.last += FRAME_DURATION * frames as u32;
        frames
    }
}

/// Cubic in-out easing over `t` in `[0, 1]`
#[inline(always)]
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// A value animating from `from` to `to`, started at a given frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start_frame: u64,
}

impl Tween {
    pub fn new(from: f64, to: f64, start_frame: u64) -> Self {
        Self {
            from,
            to,
            start_frame,
        }
    }

    /// Eased progress in `[0, 1]` at `frame`
    pub fn progress(&self, frame: u64) -> f64 {
        let elapsed = frame.saturating_sub(self.start_frame);
        ease_cubic_in_out(elapsed as f64 / TRANSITION_FRAMES as f64)
    }

    /// Value shown at `frame`
    pub fn value(&self, frame: u64) -> f64 {
        self.from + (self.to - self.from) * self.progress(frame)
    }

    pub fn is_done(&self, frame: u64) -> bool {
        self.from == self.to || frame >= self.start_frame + TRANSITION_FRAMES
    }

    /// Restart toward `to` from whatever is on screen at `frame`
    pub fn retarget(&mut self, to: f64, frame: u64) {
        self.from = self.value(frame);
        self.to = to;
        self.start_frame = frame;
    }
}
