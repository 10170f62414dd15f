//! Event-driven facade over the registry, resolver, drag state machines,
//! looping, and navigation, bound to one playback host.
//!
//! Everything runs synchronously inside the host's pointer and playback
//! callbacks; the event channel is a notification mailbox, not a thread
//! boundary.

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::events::event_channel;
use crate::{
    nav, resolve, DragMode, DragSession, Edge, LoopSpan, PlaybackHost, Range, RangeDescriptor,
    RangeError, RangeEvent, RangeId, RangeSet, RangeSpan, RangesConfig, Sec, TrackGeometry,
};

/// Seek target for `goto_range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeTarget {
    First,
    Last,
    Id(RangeId),
}

pub struct RangesSession<P: PlaybackHost> {
    player: P,
    set: RangeSet,
    track: TrackGeometry,
    drag: Option<DragSession>,
    loop_span: Option<LoopSpan>,
    tx_events: Sender<RangeEvent>,
}

impl<P: PlaybackHost> RangesSession<P> {
    pub fn new(player: P, track: TrackGeometry) -> (Self, Receiver<RangeEvent>) {
        let (tx_events, rx_events) = event_channel();
        (
            Self {
                player,
                set: RangeSet::new(),
                track,
                drag: None,
                loop_span: None,
                tx_events,
            },
            rx_events,
        )
    }

    /// Build a session from configuration. Each descriptor is applied
    /// independently; invalid ones are logged and skipped.
    pub fn with_config(
        player: P,
        track: TrackGeometry,
        config: &RangesConfig,
    ) -> (Self, Receiver<RangeEvent>) {
        let (mut session, rx_events) = Self::new(player, track);
        for descriptor in &config.ranges {
            if let Err(err) = session.add_range(descriptor) {
                warn!(%err, "skipping invalid range descriptor");
            }
        }
        (session, rx_events)
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn registry(&self) -> &RangeSet {
        &self.set
    }

    pub fn ranges(&self) -> impl Iterator<Item = &Range> {
        self.set.iter()
    }

    pub fn set_track_geometry(&mut self, track: TrackGeometry) {
        self.track = track;
    }

    pub fn add_range(&mut self, descriptor: &RangeDescriptor) -> Result<RangeId, RangeError> {
        self.set.add(descriptor.validate()?)
    }

    /// Remove the given ranges; unknown ids warn and are skipped. Returns
    /// how many were actually removed.
    pub fn remove_ranges(&mut self, ids: &[RangeId]) -> usize {
        ids.iter().filter(|id| self.set.remove(id)).count()
    }

    pub fn remove_all(&mut self) {
        self.set.clear();
    }

    /// Seek forward to the next range and return it.
    pub fn next(&mut self) -> Option<RangeId> {
        let current = self.player.current_time();
        let range = nav::next_range(&self.set, current)?;
        let (id, start) = (range.id, range.span.start);
        self.player.seek(start);
        Some(id)
    }

    /// Seek back to the previous range and return it.
    pub fn previous(&mut self) -> Option<RangeId> {
        let current = self.player.current_time();
        let range = nav::previous_range(&self.set, current)?;
        let (id, start) = (range.id, range.span.start);
        self.player.seek(start);
        Some(id)
    }

    /// Seek to a range's start by id or position.
    pub fn goto_range(&mut self, target: RangeTarget) -> Option<RangeId> {
        let range = match target {
            RangeTarget::First => self.set.sorted_by_start().into_iter().next(),
            RangeTarget::Last => self.set.sorted_by_start().into_iter().last(),
            RangeTarget::Id(id) => self.set.get(&id),
        }?;
        let (id, start) = (range.id, range.span.start);
        self.player.seek(start);
        Some(id)
    }

    /// Snapshot a range's bounds and keep playback inside them. Returns
    /// `false` (with a warning) for unknown ids.
    pub fn arm_loop(&mut self, id: RangeId) -> bool {
        let Some(range) = self.set.get(&id) else {
            warn!(%id, "cannot loop unknown range");
            return false;
        };
        let span = LoopSpan::from(range.span);
        self.loop_span = Some(span);
        self.player.seek(span.start);
        true
    }

    pub fn disarm_loop(&mut self) {
        self.loop_span = None;
    }

    pub fn loop_span(&self) -> Option<LoopSpan> {
        self.loop_span
    }

    pub fn dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Last resolved span of the active drag, for rendering. May be
    /// degenerate in ways the registry never commits.
    pub fn drag_visual(&self) -> Option<(RangeId, RangeSpan)> {
        self.drag.as_ref().map(|d| (d.range_id, d.visual))
    }

    /// Pointer-down on a range's start or end handle.
    pub fn begin_edge_drag(&mut self, id: RangeId, edge: Edge) -> bool {
        let mode = match edge {
            Edge::Start => DragMode::TrimStart,
            Edge::End => DragMode::TrimEnd,
        };
        self.begin_drag(id, mode, 0.0)
    }

    /// Pointer-down on a range's body. `page_x` anchors the grab point so
    /// the body stays stable under the cursor.
    pub fn begin_body_drag(&mut self, id: RangeId, page_x: f64) -> bool {
        let Some(range) = self.set.get(&id) else {
            warn!(%id, "cannot drag unknown range");
            return false;
        };
        let duration = self.player.duration();
        let frac = if duration.is_finite() && duration > 0.0 {
            range.span.start / duration
        } else {
            0.0
        };
        let pixel_correction = page_x - self.track.position_px(frac);
        self.begin_drag(id, DragMode::Move, pixel_correction)
    }

    fn begin_drag(&mut self, id: RangeId, mode: DragMode, pixel_correction: f64) -> bool {
        if self.drag.is_some() {
            // one session at a time; a second pointer-down is ignored
            debug!(%id, "ignoring pointer-down during an active drag");
            return false;
        }
        let Some(range) = self.set.get(&id) else {
            warn!(%id, "cannot drag unknown range");
            return false;
        };
        if !range.editable {
            debug!(%id, "range is not editable");
            return false;
        }
        let visual = range.span;
        let captured_time = self.player.current_time();
        let was_playing = !self.player.paused();
        if was_playing {
            self.player.pause();
        }
        self.drag = Some(DragSession {
            mode,
            range_id: id,
            captured_time,
            was_playing,
            pixel_correction,
            visual,
        });
        self.emit(RangeEvent::MoveStarted { id });
        true
    }

    /// Pointer-move during an active drag. Resolves the proposal against the
    /// latest registry state and commits the corrected position; without an
    /// active drag this is a no-op.
    pub fn pointer_move(&mut self, page_x: f64) {
        let Some(d) = self.drag.as_ref() else { return };
        let (mode, id, captured, correction) = (d.mode, d.range_id, d.captured_time, d.pixel_correction);
        let duration = self.player.duration();
        match mode {
            DragMode::TrimStart | DragMode::TrimEnd => {
                // the play head stays pinned while a handle is dragged
                self.player.seek(captured);
                let edge = match mode {
                    DragMode::TrimStart => Edge::Start,
                    _ => Edge::End,
                };
                let frac = self.track.fraction_at(page_x, 0.0);
                let Ok(corrected) = resolve::resolve_edge(&self.set, id, edge, frac, duration)
                else {
                    return self.abandon_drag(id);
                };
                let Some(current) = self.set.get(&id).map(|r| r.span) else {
                    return self.abandon_drag(id);
                };
                let span = match edge {
                    Edge::Start => RangeSpan::new(corrected, current.end),
                    Edge::End => RangeSpan::new(current.start, corrected),
                };
                if let Some(d) = self.drag.as_mut() {
                    d.visual = span;
                }
                // a collapsed span renders but is never committed
                if span.start < span.end && span != current {
                    let _ = self.set.update(&id, span);
                }
            }
            DragMode::Move => {
                let frac = self.track.fraction_at(page_x, correction);
                let Ok(span) = resolve::resolve_body(&self.set, id, frac, duration) else {
                    return self.abandon_drag(id);
                };
                if let Some(d) = self.drag.as_mut() {
                    d.visual = span;
                }
                let _ = self.set.update(&id, span);
                self.emit(RangeEvent::Moving { id });
            }
        }
    }

    /// Pointer-up: restore playback and notify. A stray pointer-up with no
    /// matching pointer-down is a defensive no-op.
    pub fn pointer_up(&mut self) {
        let Some(d) = self.drag.take() else {
            debug!("pointer-up without an active drag");
            return;
        };
        if d.was_playing {
            self.player.play();
        }
        self.emit(RangeEvent::Moved { id: d.range_id });
    }

    /// Programmatic whole-range move to a start position in seconds,
    /// resolved through the same collision rules as a drag.
    pub fn move_body_to(&mut self, id: RangeId, to_sec: Sec) -> Result<RangeSpan, RangeError> {
        let duration = self.player.duration();
        let frac = to_fraction(to_sec, duration);
        let span = resolve::resolve_body(&self.set, id, frac, duration)?;
        self.set.update(&id, span)?;
        self.emit(RangeEvent::Moved { id });
        Ok(span)
    }

    /// Programmatic single-edge move to a position in seconds. A resolution
    /// that collapses the range is reported but not committed.
    pub fn move_edge_to(&mut self, id: RangeId, edge: Edge, to_sec: Sec) -> Result<Sec, RangeError> {
        let duration = self.player.duration();
        let frac = to_fraction(to_sec, duration);
        let corrected = resolve::resolve_edge(&self.set, id, edge, frac, duration)?;
        let current = self
            .set
            .get(&id)
            .map(|r| r.span)
            .ok_or(RangeError::RangeNotFound(id))?;
        let span = match edge {
            Edge::Start => RangeSpan::new(corrected, current.end),
            Edge::End => RangeSpan::new(current.start, corrected),
        };
        if span.start < span.end && span != current {
            self.set.update(&id, span)?;
            self.emit(RangeEvent::Moved { id });
        }
        Ok(corrected)
    }

    /// Periodic time-advance signal from the playback host.
    pub fn on_time_advance(&mut self) {
        if let Some(looped) = self.loop_span {
            if let Some(target) = looped.wrap_target(self.player.current_time()) {
                self.player.seek(target);
            }
        }
    }

    /// A seek initiated by the playback host or the user. During a body
    /// drag the seek is reverted; an armed loop breaks when the seek lands
    /// past its end.
    pub fn on_seek_attempted(&mut self) {
        if let Some(d) = &self.drag {
            if d.mode == DragMode::Move {
                let captured = d.captured_time;
                self.player.seek(captured);
                return;
            }
        }
        if let Some(looped) = self.loop_span {
            if looped.breaks_on_seek(self.player.current_time()) {
                self.disarm_loop();
            }
        }
    }

    /// Playback paused: an armed loop disarms.
    pub fn on_pause(&mut self) {
        if self.loop_span.is_some() {
            self.disarm_loop();
        }
    }

    fn abandon_drag(&mut self, id: RangeId) {
        warn!(%id, "drag target disappeared, ending session");
        self.drag = None;
    }

    fn emit(&self, event: RangeEvent) {
        // the host may have dropped the receiver; notifications are lossy
        let _ = self.tx_events.send(event);
    }
}

fn to_fraction(sec: Sec, duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        sec / duration
    } else {
        0.0
    }
}
