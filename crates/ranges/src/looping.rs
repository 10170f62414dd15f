use crate::{RangeSpan, Sec};

/// Playback is wrapped (or the loop broken) once the play head crosses this
/// guard band before the loop's end, so the wrap lands before the media can
/// run past the range.
pub const LOOP_GUARD_SEC: f64 = 0.2;

/// Snapshot of a range's bounds at the moment looping was armed. Moving the
/// source range afterwards does not follow; the loop keeps these bounds
/// until re-armed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSpan {
    pub start: Sec,
    pub end: Sec,
}

impl From<RangeSpan> for LoopSpan {
    fn from(span: RangeSpan) -> Self {
        Self {
            start: span.start,
            end: span.end,
        }
    }
}

impl LoopSpan {
    /// Where a periodic time advance should wrap back to, if anywhere.
    pub fn wrap_target(&self, current: Sec) -> Option<Sec> {
        (current > self.end - LOOP_GUARD_SEC).then_some(self.start)
    }

    /// A user seek landing past the guard band breaks the loop.
    pub fn breaks_on_seek(&self, current: Sec) -> bool {
        current > self.end - LOOP_GUARD_SEC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_inside_the_guard_band() {
        let l = LoopSpan { start: 10.0, end: 20.0 };
        assert_eq!(l.wrap_target(19.85), Some(10.0));
        assert_eq!(l.wrap_target(19.8), None);
        assert_eq!(l.wrap_target(15.0), None);
    }

    #[test]
    fn seek_past_the_guard_band_breaks() {
        let l = LoopSpan { start: 10.0, end: 20.0 };
        assert!(l.breaks_on_seek(19.9));
        assert!(!l.breaks_on_seek(19.5));
    }
}
