//! Boundary scans over an enriched flight
//!
//! Every phase boundary is the first index at or after a starting point that
//! satisfies a predicate. `None` means the data ran out first, which ends the
//! flight's analysis and is not an error.
//!
//! Predicates compare optional values (a sample with no nearby airport has no
//! distance and possibly no AGL). A comparison against a missing value is
//! always false.

use std::ops::Range;

/// First index `i >= from` with `pred(&items[i])`
pub(crate) fn scan_forward<T>(items: &[T], from: usize, pred: impl Fn(&T) -> bool) -> Option<usize> {
    items
        .get(from..)?
        .iter()
        .position(pred)
        .map(|offset| from + offset)
}

/// Last index inside `range` with `pred(&items[i])`
pub(crate) fn last_in<T>(items: &[T], range: Range<usize>, pred: impl Fn(&T) -> bool) -> Option<usize> {
    let start = range.start;
    items
        .get(range)?
        .iter()
        .rposition(pred)
        .map(|offset| start + offset)
}

pub(crate) fn below(value: Option<f64>, limit: f64) -> bool {
    value.is_some_and(|v| v < limit)
}

pub(crate) fn above(value: Option<f64>, limit: f64) -> bool {
    value.is_some_and(|v| v > limit)
}

pub(crate) fn at_least(value: Option<f64>, limit: f64) -> bool {
    value.is_some_and(|v| v >= limit)
}

/// `low <= value <= high`
pub(crate) fn within(value: Option<f64>, low: f64, high: f64) -> bool {
    value.is_some_and(|v| low <= v && v <= high)
}

/// `low < value < high`
pub(crate) fn strictly_within(value: Option<f64>, low: f64, high: f64) -> bool {
    value.is_some_and(|v| low < v && v < high)
}

/// Group sorted indices into contiguous half-open ranges
pub(crate) fn contiguous_ranges(indices: impl IntoIterator<Item = usize>) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for i in indices {
        match ranges.last_mut() {
            Some(last) if last.end == i => last.end = i + 1,
            _ => ranges.push(i..i + 1),
        }
    }
    ranges
}
