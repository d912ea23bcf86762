pub mod segment_3d;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Parametric tolerance for "near an endpoint" tests on segment
/// parameters normalized to `[0, 1]`.
pub const PARAM_TOLERANCE: f64 = 1e-3;

/// Returns `true` when a normalized segment parameter lies at or near
/// an endpoint of its segment.
#[must_use]
pub fn near_endpoint(t: f64) -> bool {
    t.abs() < PARAM_TOLERANCE || (1.0 - t).abs() < PARAM_TOLERANCE
}
