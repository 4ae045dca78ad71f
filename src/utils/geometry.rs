/// Angle helpers shared by the alignment tests and arc grouping
use std::f64::consts::PI;

/// Difference between two undirected angles, in [0, π/2]
pub fn undirected_angle_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(PI);
    d.min(PI - d)
}

/// Whether the gradient `(gx, gy)` is perpendicular to a line at `angle`,
/// within `tolerance`. A zero gradient is never aligned.
pub fn gradient_aligned_with_line(gx: f64, gy: f64, angle: f64, tolerance: f64) -> bool {
    if gx == 0.0 && gy == 0.0 {
        return false;
    }
    let tangent = gy.atan2(gx) + PI / 2.0;
    undirected_angle_diff(tangent, angle) <= tolerance
}

/// Whether the gradient `(gx, gy)` points along `normal` or against it,
/// within `tolerance`. A zero gradient is never aligned.
pub fn gradient_aligned_with_normal(gx: f64, gy: f64, normal: f64, tolerance: f64) -> bool {
    if gx == 0.0 && gy == 0.0 {
        return false;
    }
    undirected_angle_diff(gy.atan2(gx), normal) <= tolerance
}

/// Unsigned turn between two direction vectors in degrees, with the sign of
/// the turn (-1, 0 or 1) from the cross product
pub fn turn_between(u: (f64, f64), v: (f64, f64)) -> (f64, i8) {
    let norm = (u.0.hypot(u.1)) * (v.0.hypot(v.1));
    if norm == 0.0 {
        return (0.0, 0);
    }
    let cos = ((u.0 * v.0 + u.1 * v.1) / norm).clamp(-1.0, 1.0);
    let cross = u.0 * v.1 - u.1 * v.0;
    let sign = if cross > 0.0 {
        1
    } else if cross < 0.0 {
        -1
    } else {
        0
    };
    (cos.acos().to_degrees(), sign)
}
