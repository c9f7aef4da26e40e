pub mod bounds;
pub mod constants;
pub mod decompose;
pub mod fixed_point;
pub mod pattern;

pub use bounds::{BoundingBox, bounding_box};
pub use constants::{
    DEFAULT_BANDWIDTH, DEFAULT_MEASUREMENT, DEFAULT_RADIUS, MAX_SPREADING_FACTOR,
    METERS_PER_DEGREE_LATITUDE, MIN_SPREADING_FACTOR, PRECISION,
};
pub use decompose::{ScaledRange, decompose, decompose_with_width, merge_overlapping};
pub use fixed_point::{format, from_scaled, to_scaled};
pub use pattern::{anchored, compile, compile_scaled, render};
