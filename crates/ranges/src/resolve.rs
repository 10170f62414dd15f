//! Collision resolution for edge and whole-range moves.
//!
//! Pure decisions over a registry snapshot: given a proposed position for a
//! range (or one of its edges), either accept it or compute the nearest legal
//! position, cascading through chains of abutting ranges where a single snap
//! would land inside the next neighbor.

use std::collections::HashSet;

use crate::{RangeError, RangeId, RangeSet, RangeSpan, Sec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// Which way a blocked body move settles: `Forward` keeps snapping the
/// mover's start to blocker ends (walking toward the domain end),
/// `Backward` keeps snapping the mover's end to blocker starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Travel {
    Forward,
    Backward,
}

/// Convert a fractional track position to seconds, clamped to the domain.
/// Before media metadata is known the duration is NaN and every position
/// computation degrades to 0.
pub fn seconds(frac: f64, duration: f64) -> Sec {
    if !duration.is_finite() || duration <= 0.0 || !frac.is_finite() {
        return 0.0;
    }
    (frac * duration).clamp(0.0, duration)
}

/// Resolve a proposed position for one edge of a range.
///
/// Returns the corrected value for that edge. A move past the range's own
/// opposite edge degenerates to that edge's position (zero width, which the
/// registry will not accept as a committed state). A move into or across
/// another range snaps to the blocker's near boundary. The first violating
/// range in registry iteration order is the blocker; only one blocker is
/// resolved per call.
pub fn resolve_edge(
    set: &RangeSet,
    id: RangeId,
    edge: Edge,
    frac: f64,
    duration: f64,
) -> Result<Sec, RangeError> {
    let mover = set.get(&id).ok_or(RangeError::RangeNotFound(id))?;
    let span = mover.span;
    let sec = seconds(frac, duration);

    for other in set.iter() {
        if other.id == id {
            match edge {
                Edge::Start if sec > span.end => return Ok(span.end),
                Edge::End if sec < span.start => return Ok(span.start),
                _ => {}
            }
            continue;
        }
        let o = other.span;
        let collides = match edge {
            // the span [sec, span.end) would intersect `o`: the proposal is
            // strictly inside it, or the new start would swallow it whole
            Edge::Start => sec < o.end && o.start < span.end,
            Edge::End => o.start < sec && span.start < o.end,
        };
        if collides {
            return Ok(match edge {
                Edge::Start => o.end,
                Edge::End => o.start,
            });
        }
    }
    Ok(sec)
}

/// Resolve a proposed start position for a whole-range move, preserving the
/// mover's width.
///
/// In priority order: domain overflow clamps flush against the domain
/// boundary; an overlapping range snaps the mover flush against it on the
/// far side of its travel direction; otherwise the proposal is accepted
/// verbatim. Every snap (domain clamps included) then settles through the
/// cascade: if the snapped position lands inside the next neighbor, the
/// mover snaps against that neighbor instead, transitively, guarded by a
/// visited set so no range is considered twice.
pub fn resolve_body(
    set: &RangeSet,
    id: RangeId,
    frac: f64,
    duration: f64,
) -> Result<RangeSpan, RangeError> {
    let mover = set.get(&id).ok_or(RangeError::RangeNotFound(id))?;
    let span = mover.span;
    if !duration.is_finite() || duration <= 0.0 {
        // domain unknown: dragging is meaningless, hold position
        return Ok(span);
    }
    let width = span.width();
    let new_start = seconds(frac, duration);
    let new_end = new_start + width;

    if new_end > duration {
        let clamped = RangeSpan::new(duration - width, duration);
        return Ok(settle(set, id, span, clamped, Travel::Backward, duration));
    }
    if new_start <= 0.0 {
        let clamped = RangeSpan::new(0.0, width);
        return Ok(settle(set, id, span, clamped, Travel::Forward, duration));
    }

    let proposed = RangeSpan::new(new_start, new_end);
    for other in set.iter() {
        if other.id == id || !other.span.overlaps(&proposed) {
            continue;
        }
        // classify by where the blocker sits relative to the mover's
        // current span: ahead means their end blocks our start, behind
        // means their start blocks our end
        let (first, travel) = if other.span.start >= span.end {
            (flush_after(other.span, width), Travel::Forward)
        } else {
            (flush_before(other.span, width), Travel::Backward)
        };
        return Ok(settle(set, id, span, first, travel, duration));
    }
    Ok(proposed)
}

fn flush_after(blocker: RangeSpan, width: Sec) -> RangeSpan {
    RangeSpan::new(blocker.end, blocker.end + width)
}

fn flush_before(blocker: RangeSpan, width: Sec) -> RangeSpan {
    RangeSpan::new(blocker.start - width, blocker.start)
}

/// Walk the chain of ranges violated in turn by each snapped position.
/// Terminates because every step consumes an unvisited range; if the chain
/// exhausts the domain without finding a legal slot, the mover keeps its
/// current position.
fn settle(
    set: &RangeSet,
    id: RangeId,
    current: RangeSpan,
    first: RangeSpan,
    travel: Travel,
    duration: f64,
) -> RangeSpan {
    let width = current.width();
    let mut visited: HashSet<RangeId> = HashSet::new();
    let mut pos = first;
    loop {
        let blocker = set
            .iter()
            .find(|r| r.id != id && !visited.contains(&r.id) && r.span.overlaps(&pos));
        let Some(blocker) = blocker else { break };
        visited.insert(blocker.id);
        pos = match travel {
            Travel::Forward => flush_after(blocker.span, width),
            Travel::Backward => flush_before(blocker.span, width),
        };
    }
    let legal = pos.start >= 0.0
        && pos.end <= duration
        && !set.iter().any(|r| r.id != id && r.span.overlaps(&pos));
    if legal {
        pos
    } else {
        current
    }
}
