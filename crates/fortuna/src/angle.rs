//! Wraparound-safe degree arithmetic.
//!
//! Every position handled by the engine lives on the 360° circle. These
//! helpers are the only place where modulo arithmetic happens; the search
//! modules never reduce angles by hand.

/// Degrees in a full circle.
pub const FULL_CIRCLE: f64 = 360.0;

/// Normalize an angle to [0, 360).
pub fn normalize(deg: f64) -> f64 {
    let d = deg.rem_euclid(FULL_CIRCLE);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= FULL_CIRCLE {
        0.0
    } else {
        d
    }
}

/// Normalize an angle to (-180, +180].
pub fn normalize_signed(deg: f64) -> f64 {
    let d = normalize(deg);
    if d > 180.0 {
        d - FULL_CIRCLE
    } else {
        d
    }
}

/// Shortest distance between two positions, in [0, 180].
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = normalize(a - b);
    if d > 180.0 {
        FULL_CIRCLE - d
    } else {
        d
    }
}

/// Distance travelled going counter-clockwise (increasing longitude) from
/// `from` to `to`, in [0, 360).
pub fn forward_distance(from: f64, to: f64) -> f64 {
    normalize(to - from)
}

/// Distance travelled going clockwise (decreasing longitude) from `from`
/// to `to`, in [0, 360).
pub fn backward_distance(from: f64, to: f64) -> f64 {
    normalize(from - to)
}

/// Distance a point moving with `signed_delta` degrees per step must cover
/// to reach `to`. Positive deltas travel forward, negative ones backward.
pub fn distance_along_motion(from: f64, to: f64, signed_delta: f64) -> f64 {
    if signed_delta >= 0.0 {
        forward_distance(from, to)
    } else {
        backward_distance(from, to)
    }
}

/// Whether `pos` lies inside the arc that starts at `low` and runs forward
/// to `high`. Arcs may wrap through 0°.
pub fn in_arc(pos: f64, low: f64, high: f64) -> bool {
    forward_distance(low, pos) <= forward_distance(low, high)
}
