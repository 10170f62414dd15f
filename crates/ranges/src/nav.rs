//! Next/previous range selection relative to the current playback time.

use crate::{Range, RangeSet, Sec};

/// `previous` skips any range starting within this window before the
/// current time, so repeated invocations step backward through ranges
/// instead of re-selecting the one just landed on.
pub const PREVIOUS_HYSTERESIS_SEC: f64 = 0.5;

/// First range, sorted by start ascending, beginning strictly after
/// `current`.
pub fn next_range(set: &RangeSet, current: Sec) -> Option<&Range> {
    set.sorted_by_start()
        .into_iter()
        .find(|r| r.span.start > current)
}

/// Last range beginning more than the hysteresis window before `current`.
pub fn previous_range(set: &RangeSet, current: Sec) -> Option<&Range> {
    set.sorted_by_start()
        .into_iter()
        .rev()
        .find(|r| r.span.start + PREVIOUS_HYSTERESIS_SEC < current)
}
