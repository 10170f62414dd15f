use std::collections::HashMap;

use tracing::{error, warn};

use crate::{Range, RangeError, RangeId, RangeSpan};

/// The authoritative collection of non-overlapping ranges.
///
/// Iteration order is insertion order, kept in a separate id vector; this is
/// the order collision tie-breaks are resolved in.
#[derive(Debug, Clone, Default)]
pub struct RangeSet {
    ranges: HashMap<RangeId, Range>,
    order: Vec<RangeId>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a range. Rejects inverted or non-finite bounds and any overlap
    /// with an existing member; a rejected insert leaves the set untouched.
    pub fn add(&mut self, range: Range) -> Result<RangeId, RangeError> {
        let span = range.span;
        if !span.start.is_finite() || !span.end.is_finite() || span.start < 0.0 || span.start >= span.end {
            return Err(RangeError::InvalidBounds {
                start: span.start,
                end: span.end,
            });
        }
        if self.ranges.contains_key(&range.id) {
            return Err(RangeError::RangeExists(range.id));
        }
        if let Some(other) = self.iter().find(|r| r.span.overlaps(&span)) {
            return Err(RangeError::Overlaps {
                start: span.start,
                end: span.end,
                other: other.id,
            });
        }
        let id = range.id;
        self.ranges.insert(id, range);
        self.order.push(id);
        Ok(id)
    }

    /// Remove a range. Unknown ids are a recoverable no-op.
    pub fn remove(&mut self, id: &RangeId) -> bool {
        if self.ranges.remove(id).is_none() {
            warn!(%id, "cannot remove range: not in the registry");
            return false;
        }
        self.order.retain(|r| r != id);
        true
    }

    pub fn get(&self, id: &RangeId) -> Option<&Range> {
        self.ranges.get(id)
    }

    pub fn contains(&self, id: &RangeId) -> bool {
        self.ranges.contains_key(id)
    }

    /// Ranges in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Range> {
        self.order.iter().filter_map(|id| self.ranges.get(id))
    }

    /// Ranges sorted by start ascending, stable over insertion order.
    pub fn sorted_by_start(&self) -> Vec<&Range> {
        let mut ranges: Vec<_> = self.iter().collect();
        ranges.sort_by(|a, b| {
            a.span
                .start
                .partial_cmp(&b.span.start)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranges
    }

    pub fn ids(&self) -> &[RangeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
        self.order.clear();
    }

    /// Replace a range's bounds. The caller is expected to have resolved
    /// collisions already; this re-checks inversion and overlap and refuses
    /// inconsistent writes, which indicate a bug upstream.
    pub fn update(&mut self, id: &RangeId, span: RangeSpan) -> Result<(), RangeError> {
        if !self.ranges.contains_key(id) {
            return Err(RangeError::RangeNotFound(*id));
        }
        if !span.start.is_finite() || !span.end.is_finite() || span.start >= span.end {
            error!(%id, start = span.start, end = span.end, "refusing inverted range write");
            return Err(RangeError::InvariantViolation(format!(
                "inverted bounds {}..{} for range {id}",
                span.start, span.end
            )));
        }
        if let Some(other) = self.iter().find(|r| r.id != *id && r.span.overlaps(&span)) {
            let other = other.id;
            error!(%id, %other, start = span.start, end = span.end, "refusing overlapping range write");
            return Err(RangeError::InvariantViolation(format!(
                "range {id} would overlap {other} at {}..{}",
                span.start, span.end
            )));
        }
        if let Some(range) = self.ranges.get_mut(id) {
            range.span = span;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RangeDescriptor;

    fn range(start: f64, end: f64) -> Range {
        RangeDescriptor::new(start, end).validate().unwrap()
    }

    #[test]
    fn add_rejects_overlap_but_allows_touching() {
        let mut set = RangeSet::new();
        set.add(range(10.0, 20.0)).unwrap();
        set.add(range(20.0, 30.0)).unwrap();
        assert!(matches!(
            set.add(range(15.0, 25.0)),
            Err(RangeError::Overlaps { .. })
        ));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn remove_missing_is_a_noop() {
        let mut set = RangeSet::new();
        let id = set.add(range(0.0, 1.0)).unwrap();
        assert!(set.remove(&id));
        assert!(!set.remove(&id));
        assert!(set.is_empty());
    }

    #[test]
    fn update_refuses_overlap_and_inversion() {
        let mut set = RangeSet::new();
        let a = set.add(range(10.0, 20.0)).unwrap();
        set.add(range(30.0, 40.0)).unwrap();

        assert!(matches!(
            set.update(&a, RangeSpan::new(25.0, 35.0)),
            Err(RangeError::InvariantViolation(_))
        ));
        assert!(matches!(
            set.update(&a, RangeSpan::new(12.0, 12.0)),
            Err(RangeError::InvariantViolation(_))
        ));
        // rejected writes leave the original span in place
        assert_eq!(set.get(&a).unwrap().span, RangeSpan::new(10.0, 20.0));

        set.update(&a, RangeSpan::new(20.0, 30.0)).unwrap();
        assert_eq!(set.get(&a).unwrap().span, RangeSpan::new(20.0, 30.0));
    }

    #[test]
    fn iteration_is_insertion_ordered() {
        let mut set = RangeSet::new();
        set.add(range(30.0, 40.0)).unwrap();
        set.add(range(0.0, 10.0)).unwrap();
        set.add(range(15.0, 25.0)).unwrap();
        let starts: Vec<f64> = set.iter().map(|r| r.span.start).collect();
        assert_eq!(starts, vec![30.0, 0.0, 15.0]);
        let sorted: Vec<f64> = set.sorted_by_start().iter().map(|r| r.span.start).collect();
        assert_eq!(sorted, vec![0.0, 15.0, 30.0]);
    }
}
