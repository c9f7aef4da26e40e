use crate::core::constants::{FRACTION_DIGITS, MAX_DEGREES, MIN_FORMAT_WIDTH, PRECISION};
use crate::util::error::MapperError;

/// Converts decimal degrees to a fixed-point integer with four decimals.
///
/// The value is floored, never rounded, so `50.86099` becomes `508609`. Importer
/// tags use the same truncation, which keeps stored tags and compiled
/// patterns in agreement. Only `[0, 180]` degrees is accepted.
pub fn to_scaled(x: f64) -> Result<u64, MapperError> {
    if !x.is_finite() || !(0.0..=MAX_DEGREES).contains(&x) {
        return Err(MapperError::InvalidCoordinate(x.to_string()));
    }

    Ok((x * PRECISION as f64).floor() as u64)
}

pub fn from_scaled(n: u64) -> f64 {
    n as f64 / PRECISION as f64
}

/// Canonical text form of a scaled value: minimal integer part, exactly four
/// fractional digits (`50860928` → `"5086.0928"`, `123` → `"0.0123"`).
pub fn format(n: u64) -> String {
    format!(
        "{}.{:0width$}",
        n / PRECISION,
        n % PRECISION,
        width = FRACTION_DIGITS
    )
}

/// Same as [`format`] but keeps the sign of a truncated importer coordinate.
pub fn format_signed(n: i64) -> String {
    let magnitude = format(n.unsigned_abs());
    if n < 0 {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

/// Number of decimal digits in `n`.
pub fn digit_width(n: u64) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}

/// Digits [`format`] prints for `n`, ignoring the decimal point.
///
/// Every value in `[10^(w-1), 10^w - 1]` shares the same width `w`, and
/// everything below `100000` shares the width of `"0.0000"`.
pub fn format_width(n: u64) -> usize {
    digit_width(n).max(MIN_FORMAT_WIDTH)
}

/// Splits `n` into `width` digits, most significant first, zero padded.
///
/// Panics if `n` needs more than `width` digits.
pub fn to_digits(n: u64, width: usize) -> Vec<u8> {
    assert!(
        digit_width(n) <= width,
        "{n} does not fit in {width} digits"
    );

    let mut digits = vec![0u8; width];
    let mut rest = n;
    for slot in digits.iter_mut().rev() {
        *slot = (rest % 10) as u8;
        rest /= 10;
    }
    digits
}

/// Reassembles digits produced by [`to_digits`].
///
/// Panics if the digits spell a number above `u64::MAX`.
pub fn from_digits(digits: &[u8]) -> u64 {
    digits
        .iter()
        .try_fold(0u64, |acc, &d| acc.checked_mul(10)?.checked_add(u64::from(d)))
        .unwrap_or_else(|| panic!("{digits:?} does not fit in a u64"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_scaled_truncates() -> Result<(), MapperError> {
        assert_eq!(to_scaled(50.86092)?, 508609);
        assert_eq!(to_scaled(4.68189)?, 46818);
        assert_eq!(to_scaled(0.0)?, 0);
        Ok(())
    }

    #[test]
    fn test_to_scaled_rejects_negative_and_nan() {
        assert!(matches!(
            to_scaled(-0.5),
            Err(MapperError::InvalidCoordinate(_))
        ));
        assert!(to_scaled(f64::NAN).is_err());
        assert!(to_scaled(f64::INFINITY).is_err());
    }

    #[test]
    fn test_to_scaled_degree_domain() -> Result<(), MapperError> {
        assert_eq!(to_scaled(180.0)?, 1_800_000);
        assert!(matches!(
            to_scaled(180.0001),
            Err(MapperError::InvalidCoordinate(_))
        ));
        assert!(to_scaled(1e15).is_err());
        assert!(to_scaled(1e300).is_err());
        Ok(())
    }

    #[test]
    fn test_from_scaled() {
        assert!((from_scaled(508609) - 50.8609).abs() < 1e-9);
    }

    #[test]
    fn test_format() {
        assert_eq!(format(50860928), "5086.0928");
        assert_eq!(format(5086092810), "508609.2810");
        assert_eq!(format(508609), "50.8609");
        assert_eq!(format(123), "0.0123");
        assert_eq!(format(0), "0.0000");
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(format_signed(-46818), "-4.6818");
        assert_eq!(format_signed(46818), "4.6818");
    }

    #[test]
    fn test_digit_width() {
        assert_eq!(digit_width(0), 1);
        assert_eq!(digit_width(9), 1);
        assert_eq!(digit_width(10), 2);
        assert_eq!(digit_width(5086092810), 10);
    }

    #[test]
    fn test_format_width_matches_formatted_length() {
        for n in [0, 7, 99_999, 100_000, 508_609, 999_999, 1_000_000, 5_086_092_810] {
            assert_eq!(format(n).len(), format_width(n) + 1, "n = {n}");
        }
    }

    #[test]
    fn test_digits_round_trip() {
        let digits = to_digits(123, 5);
        assert_eq!(digits, vec![0, 0, 1, 2, 3]);
        assert_eq!(from_digits(&digits), 123);
    }

    #[test]
    fn test_from_digits_widest() {
        assert_eq!(from_digits(&to_digits(u64::MAX, 20)), u64::MAX);
    }

    #[test]
    #[should_panic(expected = "does not fit in a u64")]
    fn test_from_digits_overflow() {
        from_digits(&[9; 20]);
    }

    #[test]
    #[should_panic]
    fn test_to_digits_too_narrow() {
        to_digits(12345, 3);
    }
}
