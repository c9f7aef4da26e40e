/// Fixed-point scale: coordinates keep four decimal places
pub const PRECISION: u64 = 10_000;

/// Number of fractional digits kept by the fixed-point codec
pub const FRACTION_DIGITS: usize = 4;

/// Digits in the first formatting band: `0.0000` through `9.9999`
pub(crate) const MIN_FORMAT_WIDTH: usize = FRACTION_DIGITS + 1;

/// Largest magnitude of a coordinate in degrees
pub const MAX_DEGREES: f64 = 180.0;

/// Length of one arc-minute of latitude in meters
pub const LATITUDE_MINUTE_IN_METERS: f64 = 1853.0;

/// Length of one degree of latitude in meters
pub const METERS_PER_DEGREE_LATITUDE: f64 = LATITUDE_MINUTE_IN_METERS * 60.0;

/// Search radius used when none (or a non-positive one) is configured
pub const DEFAULT_RADIUS: f64 = 100.0;

/// Measurement holding the coverage scans
pub const DEFAULT_MEASUREMENT: &str = "coverage";

/// Fastest spreading factor
pub const MIN_SPREADING_FACTOR: u8 = 7;

/// Slowest spreading factor, also the answer when nothing was measured nearby
pub const MAX_SPREADING_FACTOR: u8 = 12;

/// Channel bandwidth in kHz
pub const DEFAULT_BANDWIDTH: u16 = 125;
