//! Timing helpers:
//! - progress (elapsed fraction clamped to [0, 1])
//! - ease_out_cubic (fast start, slow finish)
//! - eased_value (integer counter value for an eased fraction)

/// Elapsed fraction of a progression, clamped to [0, 1].
/// A zero-length progression is complete immediately.
#[inline]
pub fn progress(elapsed_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    let p = elapsed_ms / duration_ms;
    if p.is_nan() {
        return 0.0;
    }
    p.clamp(0.0, 1.0)
}

/// Cubic ease-out: `1 - (1 - p)^3`.
#[inline]
pub fn ease_out_cubic(p: f64) -> f64 {
    let inv = 1.0 - p.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Displayed counter value for an eased fraction: `floor(e * target)`.
/// `e == 1` yields exactly `target`.
#[inline]
pub fn eased_value(target: u64, eased: f64) -> u64 {
    if eased >= 1.0 {
        return target;
    }
    let v = (eased.max(0.0) * target as f64).floor() as u64;
    v.min(target)
}
