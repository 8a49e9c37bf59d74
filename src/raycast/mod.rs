//! Grid ray marching (DDA).
//!
//! Two entry points share one algorithm: [`cast_single_ray`] for gameplay
//! queries (hitscan weapons, line-of-sight) and [`RayBatch::march`] which
//! evaluates one ray per view-buffer column over struct-of-arrays state.
//! The batch performs the exact same per-column arithmetic as the scalar
//! path, so the two are numerically interchangeable; the tests pin that
//! down column by column.

mod batch;
mod ray;

pub use batch::{ColumnHit, RayBatch, column_delta};
pub use ray::{RayHit, cast_single_ray};

/// Which kind of grid line the ray crossed last. A `Vertical` boundary is
/// a constant-x line, so the texture coordinate comes from the hit's
/// world-y (and vice versa).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Vertical,
    Horizontal,
}

/// Direction components below this magnitude are snapped to it (signed)
/// before the reciprocal, so axis-aligned rays never divide by zero.
pub(crate) const DIR_EPSILON: f32 = 1e-6;

/// Step budget per ray, as a multiple of the max view depth. Rays that
/// exhaust it report a miss; it only exists to bound pathological marches.
pub(crate) const STEP_BUDGET_FACTOR: f32 = 1.5;

#[inline]
pub(crate) fn guard_dir(v: f32) -> f32 {
    if v.abs() < DIR_EPSILON {
        DIR_EPSILON.copysign(v)
    } else {
        v
    }
}

#[inline]
pub(crate) fn step_budget(max_depth: f32) -> u32 {
    (max_depth * STEP_BUDGET_FACTOR).ceil() as u32
}
