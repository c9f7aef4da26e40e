//! Renders decomposed intervals as regular expressions over the canonical
//! coordinate text, for stores that can only filter tags by regex.

use crate::core::decompose::{ScaledRange, decompose_with_width};
use crate::core::fixed_point::{format, format_width, to_digits, to_scaled};
use crate::util::error::MapperError;

impl ScaledRange {
    /// Regex fragment matching the formatted values of this block.
    ///
    /// Only valid for blocks produced by [`decompose_with_width`] whose bounds
    /// share a formatting width. For an arbitrary range the per-position
    /// classes over- or under-match.
    pub fn pattern(&self) -> String {
        let start = format(self.start);
        let end = format(self.end);
        debug_assert_eq!(
            start.len(),
            end.len(),
            "bounds of {self:?} format to different widths"
        );

        render_text(&start, &end)
    }

    /// Same as [`ScaledRange::pattern`] but over the bare digits, zero padded
    /// to `width`.
    pub fn digit_pattern(&self, width: usize) -> String {
        render_digits(&to_digits(self.start, width), &to_digits(self.end, width))
    }
}

/// One literal or `[a-b]` class per digit position.
///
/// Panics if the slices differ in length.
pub fn render_digits(start: &[u8], end: &[u8]) -> String {
    assert_eq!(start.len(), end.len(), "digit arrays differ in width");

    let as_text = |digits: &[u8]| -> String {
        digits.iter().map(|&d| char::from(b'0' + d)).collect()
    };
    render_text(&as_text(start), &as_text(end))
}

fn render_text(start: &str, end: &str) -> String {
    let mut pattern = String::with_capacity(start.len() * 5);

    for (a, b) in start.chars().zip(end.chars()) {
        if a == b {
            if a == '.' {
                pattern.push('\\');
            }
            pattern.push(a);
        } else {
            pattern.push('[');
            pattern.push(a);
            pattern.push('-');
            pattern.push(b);
            pattern.push(']');
        }
    }

    pattern
}

/// Joins the fragments of all blocks with alternation.
pub fn render(ranges: &[ScaledRange]) -> String {
    ranges
        .iter()
        .map(ScaledRange::pattern)
        .collect::<Vec<_>>()
        .join("|")
}

/// Splits `[start, end]` where the formatted length changes
/// (`9.9999` → `10.0000`, `99.9999` → `100.0000`, ...).
fn format_bands(start: u64, end: u64) -> Vec<(u64, u64, usize)> {
    let mut bands = Vec::new();
    let mut low = start;

    loop {
        let width = format_width(low);
        let band_end = 10u64.checked_pow(width as u32).map_or(u64::MAX, |p| p - 1);
        let high = end.min(band_end);
        bands.push((low, high, width));
        if high == end {
            break;
        }
        low = high + 1;
    }

    bands
}

/// Compiles a scaled interval to an alternation matching exactly the
/// formatted values inside it.
///
/// Panics if `start > end`.
pub fn compile_scaled(start: u64, end: u64) -> String {
    assert!(start <= end, "interval start {start} is past its end {end}");

    format_bands(start, end)
        .into_iter()
        .map(|(low, high, width)| render(&decompose_with_width(low, high, width)))
        .collect::<Vec<_>>()
        .join("|")
}

/// Compiles a band of decimal degrees, truncated to four decimals.
///
/// Both bounds must lie in `[0, 180]`.
pub fn compile(lower: f64, upper: f64) -> Result<String, MapperError> {
    let start = to_scaled(lower)?;
    let end = to_scaled(upper)?;

    if start > end {
        return Err(MapperError::InvalidCoordinate(format!(
            "interval [{lower}, {upper}] is reversed"
        )));
    }

    Ok(compile_scaled(start, end))
}

/// Anchors an alternation so a substring regex match becomes a full match.
pub fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}
