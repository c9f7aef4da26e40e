//! Splits a scaled interval into digit-aligned blocks.
//!
//! Every block produced here has two bounds that, written with the same number
//! of digits, agree on a leading prefix and differ in exactly the shape
//! `[a-b][0-9]...[0-9]`. That is what lets the regex renderer emit one
//! character class per differing position.

use crate::core::fixed_point::{digit_width, from_digits, to_digits};

/// A block of scaled values, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScaledRange {
    pub start: u64,
    pub end: u64,
}

impl ScaledRange {
    /// Panics if `start > end`.
    pub fn new(start: u64, end: u64) -> Self {
        assert!(start <= end, "range start {start} is past its end {end}");
        Self { start, end }
    }

    pub fn point(value: u64) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    /// The block that begins at `start` and ends at the next all-nines
    /// boundary of the coarsest alignment `start` allows.
    pub fn from_start(start: u64, width: usize) -> Self {
        let end = from_digits(&round_up(&to_digits(start, width)));
        Self::new(start, end)
    }

    /// The block that ends at `end` and begins at the matching all-zeros
    /// boundary.
    pub fn from_end(end: u64, width: usize) -> Self {
        let start = from_digits(&round_down(&to_digits(end, width)));
        Self::new(start, end)
    }

    pub fn contains(&self, value: u64) -> bool {
        self.start <= value && value <= self.end
    }

    pub fn overlaps(&self, other: &ScaledRange) -> bool {
        self.end > other.start && other.end > self.start
    }

    /// Spans from the start of `self` to the end of `other`.
    pub fn join(&self, other: &ScaledRange) -> Self {
        Self::new(self.start, other.end)
    }
}

/// Turns trailing zeros into nines, then the first non-zero digit too.
pub fn round_up(digits: &[u8]) -> Vec<u8> {
    let mut out = digits.to_vec();
    for digit in out.iter_mut().rev() {
        let was_zero = *digit == 0;
        *digit = 9;
        if !was_zero {
            break;
        }
    }
    out
}

/// Turns trailing nines into zeros, then the first non-nine digit too.
pub fn round_down(digits: &[u8]) -> Vec<u8> {
    let mut out = digits.to_vec();
    for digit in out.iter_mut().rev() {
        let was_nine = *digit == 9;
        *digit = 0;
        if !was_nine {
            break;
        }
    }
    out
}

/// Walks up from `start`, one increasingly coarse block at a time, until a
/// block reaches `end`. The last block may overshoot `end`.
pub fn round_up_sweep(start: u64, end: u64, width: usize) -> Vec<ScaledRange> {
    let mut ranges = Vec::new();
    let mut cursor = start;

    while cursor < end {
        let range = ScaledRange::from_start(cursor, width);
        cursor = range.end + 1;
        ranges.push(range);
    }

    ranges
}

/// Walks down from `end` while the blocks still begin above `lower`.
/// Returned in ascending order.
pub fn round_down_sweep(lower: u64, end: u64, width: usize) -> Vec<ScaledRange> {
    let mut ranges = Vec::new();
    let mut cursor = end;

    while lower < cursor {
        let range = ScaledRange::from_end(cursor, width);
        ranges.push(range);
        match range.start.checked_sub(1) {
            Some(previous) => cursor = previous,
            None => break,
        }
    }

    ranges.reverse();
    ranges
}

/// Folds neighbouring blocks that overlap into one.
///
/// The output of [`decompose`] never overlaps, so folding it again returns it
/// unchanged.
pub fn merge_overlapping(ranges: impl IntoIterator<Item = ScaledRange>) -> Vec<ScaledRange> {
    let mut merged: Vec<ScaledRange> = Vec::new();

    for range in ranges {
        match merged.last_mut() {
            Some(previous) if previous.overlaps(&range) => *previous = previous.join(&range),
            _ => merged.push(range),
        }
    }

    merged
}

/// Stitches the two sweeps together where they meet.
///
/// `last_left` is the final round-up block and `right` the round-down sweep
/// bounded below by `last_left.start`. The two innermost blocks are merged when
/// they overlap.
pub fn merge_boundary(
    mut left: Vec<ScaledRange>,
    last_left: ScaledRange,
    right: &[ScaledRange],
) -> Vec<ScaledRange> {
    let Some((first_right, rest)) = right.split_first() else {
        left.push(last_left);
        return left;
    };

    left.extend(merge_overlapping([last_left, *first_right]));
    left.extend_from_slice(rest);
    left
}

/// Decomposes `[start, end]` using the digit width of `end`.
pub fn decompose(start: u64, end: u64) -> Vec<ScaledRange> {
    decompose_with_width(start, end, digit_width(end))
}

/// Decomposes `[start, end]` into ordered, contiguous, digit-aligned blocks.
///
/// Panics if `start > end` or if `end` needs more than `width` digits.
pub fn decompose_with_width(start: u64, end: u64, width: usize) -> Vec<ScaledRange> {
    assert!(start <= end, "interval start {start} is past its end {end}");

    let mut left = round_up_sweep(start, end, width);

    match left.pop() {
        Some(last_left) => {
            let right = round_down_sweep(last_left.start, end, width);
            merge_boundary(left, last_left, &right)
        }
        // start == end: nothing to sweep
        None => vec![ScaledRange::point(start)],
    }
}
