use std::time::Instant;

use crate::Sec;

/// The playback surface the engine consumes. `duration` is NaN until the
/// host has loaded media metadata; position computations degrade to 0 in
/// that state.
pub trait PlaybackHost {
    fn duration(&self) -> f64;
    fn current_time(&self) -> Sec;
    fn seek(&mut self, t: Sec);
    fn play(&mut self);
    fn pause(&mut self);
    fn paused(&self) -> bool;
}

/// Offline playback clock for hosts without a media engine: time advances
/// from an anchor instant while playing and freezes while paused.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    duration: f64,
    playing: bool,
    rate: f64,
    anchor_instant: Option<Instant>,
    anchor_timeline_sec: f64,
}

impl PlaybackClock {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            playing: false,
            rate: 1.0,
            anchor_instant: None,
            anchor_timeline_sec: 0.0,
        }
    }

    pub fn set_rate(&mut self, rate: f64) {
        // re-anchor to avoid jumps
        self.anchor_timeline_sec = self.now();
        if self.playing {
            self.anchor_instant = Some(Instant::now());
        }
        self.rate = rate;
    }

    fn now(&self) -> f64 {
        match (self.playing, self.anchor_instant) {
            (true, Some(anchor)) => {
                self.anchor_timeline_sec + anchor.elapsed().as_secs_f64() * self.rate
            }
            _ => self.anchor_timeline_sec,
        }
    }
}

impl PlaybackHost for PlaybackClock {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn current_time(&self) -> Sec {
        self.now()
    }

    fn seek(&mut self, t: Sec) {
        self.anchor_timeline_sec = t;
        if self.playing {
            self.anchor_instant = Some(Instant::now());
        }
    }

    fn play(&mut self) {
        self.anchor_timeline_sec = self.now();
        self.playing = true;
        self.anchor_instant = Some(Instant::now());
    }

    fn pause(&mut self) {
        self.anchor_timeline_sec = self.now();
        self.playing = false;
        self.anchor_instant = None;
    }

    fn paused(&self) -> bool {
        !self.playing
    }
}
