//! Hermite-Interpolation, Quaternion-Blending, Bounds und Arc-Length.
//!
//! Alle Funktionen arbeiten auf einem einzelnen Segment mit normiertem
//! Parameter `t` in `[0, 1]`. Die Kurvenform ist kubisches Hermite mit
//! expliziten Tangenten an beiden Enden.

use glam::{Mat3, Quat, Vec3};
use std::ops::{Add, Mul, Sub};

use crate::shared::Bounds;

/// Wertetyp, der sich kubisch interpolieren lässt (f32, Vec3).
pub trait Interpolatable:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self>
{
}

impl Interpolatable for f32 {}
impl Interpolatable for Vec3 {}

/// Stützstellen der 5-Punkt Gauß-Legendre-Quadratur auf `[-1, 1]`.
const GAUSS_LEGENDRE: [(f32, f32); 5] = [
    (0.0, 0.568_888_9),
    (-0.538_469_3, 0.478_628_67),
    (0.538_469_3, 0.478_628_67),
    (-0.906_179_85, 0.236_926_88),
    (0.906_179_85, 0.236_926_88),
];

/// Kubisches Hermite-Polynom, ausgewertet per Horner-Schema.
pub fn interpolate_position<T: Interpolatable>(p0: T, m0: T, p1: T, m1: T, t: f32) -> T {
    let a = p0 * 2.0 + m0 - p1 * 2.0 + m1;
    let b = p0 * -3.0 - m0 * 2.0 + p1 * 3.0 - m1;
    let c = m0;
    let d = p0;
    (a * t + b) * t * t + c * t + d
}

/// Erste Ableitung des Hermite-Polynoms.
pub fn interpolate_tangent<T: Interpolatable>(p0: T, m0: T, p1: T, m1: T, t: f32) -> T {
    let a = p0 * 6.0 + m0 * 3.0 + m1 * 3.0 - p1 * 6.0;
    let b = p0 * -6.0 - m0 * 4.0 - m1 * 2.0 + p1 * 6.0;
    let c = m0;
    (a * t + b) * t + c
}

/// Normierte Tangentenrichtung; Nullvektor bei degenerierter Tangente.
pub fn interpolate_direction(p0: Vec3, m0: Vec3, p1: Vec3, m1: Vec3, t: f32) -> Vec3 {
    interpolate_tangent(p0, m0, p1, m1, t).normalize_or_zero()
}

/// Rotations-Interpolation: Slerp der Endpunkte, überblendet mit dem
/// Slerp der Tangenten-Quaternionen. Das Tangenten-Gewicht `2t(1-t)`
/// verschwindet an beiden Segmentenden.
pub fn interpolate_rotation(p0: Quat, m0: Quat, p1: Quat, m1: Quat, t: f32) -> Quat {
    let base = p0.slerp(p1, t);
    let tangent = slerp_full_path(m0, m1, t);
    let weight = 2.0 * t * (1.0 - t);
    let blended = slerp_full_path(base, tangent, weight);
    if blended.length_squared() > f32::EPSILON {
        blended.normalize()
    } else {
        Quat::IDENTITY
    }
}

/// Slerp ohne Kürzester-Weg-Korrektur: der Bogen zwischen `q1` und `q2`
/// wird so durchlaufen wie gegeben, auch über 180 Grad hinaus.
pub fn slerp_full_path(q1: Quat, q2: Quat, t: f32) -> Quat {
    let dot = q1.dot(q2).clamp(-1.0, 1.0);
    let angle = dot.acos();
    if angle.abs() < 1e-4 {
        return q1;
    }
    let sin_total = angle.sin();
    let w1 = ((1.0 - t) * angle).sin() / sin_total;
    let w2 = (t * angle).sin() / sin_total;
    Quat::from_xyzw(
        q1.x * w1 + q2.x * w2,
        q1.y * w1 + q2.y * w2,
        q1.z * w1 + q2.z * w2,
        q1.w * w1 + q2.w * w2,
    )
}

/// Catmull-Rom-Tangente mit Spannungsfaktor.
pub fn compute_tangent<T: Interpolatable>(prev: T, current: T, next: T, tension: f32) -> T {
    ((current - prev) + (next - current)) * (1.0 - tension)
}

/// Catmull-Rom-Äquivalent für Rotationen über die Log/Exp-Abbildung
/// der Einheitsquaternionen.
pub fn compute_rotation_tangent(prev: Quat, current: Quat, next: Quat) -> Quat {
    let inv = current.inverse();
    let sum = quat_log(inv * prev) + quat_log(inv * next);
    current * quat_exp(sum * -0.5)
}

fn quat_log(q: Quat) -> Quat {
    let v = q.xyz();
    let v_len = v.length();
    if v_len < 1e-12 {
        return Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
    }
    let angle = v_len.atan2(q.w);
    let scaled = v * (angle / v_len);
    Quat::from_xyzw(scaled.x, scaled.y, scaled.z, 0.0)
}

fn quat_exp(q: Quat) -> Quat {
    let v = q.xyz();
    let angle = v.length();
    if angle < 1e-12 {
        return Quat::IDENTITY;
    }
    let axis = v / angle;
    let (sin, cos) = angle.sin_cos();
    let scaled = axis * sin;
    Quat::from_xyzw(scaled.x, scaled.y, scaled.z, cos)
}

/// Rotation, deren Z-Achse `forward` und deren Y-Achse möglichst `up` ist.
/// Identität, falls die Eingaben degeneriert oder kollinear sind.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let z = forward.normalize_or_zero();
    if z == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let x = up.cross(z).normalize_or_zero();
    if x == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z))
}

/// Achsen-parallele Bounds eines einzelnen Hermite-Segments.
///
/// Extrema liegen an den Segmentenden oder an den Nullstellen der
/// Ableitung, die pro Achse als quadratische Gleichung gelöst werden.
pub fn compute_bounds(p0: Vec3, m0: Vec3, p1: Vec3, m1: Vec3) -> Bounds {
    let mut bounds = Bounds::from_points(p0, p1);
    for axis in 0..3 {
        let (lo, hi) = axis_bounds(p0[axis], m0[axis], p1[axis], m1[axis]);
        bounds.min[axis] = bounds.min[axis].min(lo);
        bounds.max[axis] = bounds.max[axis].max(hi);
    }
    bounds
}

fn axis_bounds(p0: f32, m0: f32, p1: f32, m1: f32) -> (f32, f32) {
    let mut lo = p0.min(p1);
    let mut hi = p0.max(p1);

    // Ableitungskoeffizienten: 3a·t² + 2b·t + c = 0
    let a = 6.0 * p0 + 3.0 * m0 + 3.0 * m1 - 6.0 * p1;
    let b = -6.0 * p0 - 4.0 * m0 - 2.0 * m1 + 6.0 * p1;
    let c = m0;

    let b2_ac = b * b - 4.0 * a * c;
    if !(b2_ac > 0.0) || !(a.abs() > f32::EPSILON) {
        return (lo, hi);
    }

    let sqrt = b2_ac.sqrt();
    for root in [(-b + sqrt) / (2.0 * a), (-b - sqrt) / (2.0 * a)] {
        if (0.0..=1.0).contains(&root) {
            let v = interpolate_position(p0, m0, p1, m1, root);
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    (lo, hi)
}

/// Bogenlänge eines Hermite-Segments von `0` bis `t` über 5-Punkt
/// Gauß-Legendre-Quadratur, mit achsenweiser Skalierung der Ableitung.
pub fn compute_arc_length(p0: Vec3, m0: Vec3, p1: Vec3, m1: Vec3, t: f32, scale: Vec3) -> f32 {
    // Koeffizienten der Hermite-Ableitung.
    let c0 = m0;
    let c1 = 6.0 * (p1 - p0) - 4.0 * m0 - 2.0 * m1;
    let c2 = 6.0 * (p0 - p1) + 3.0 * (m0 + m1);

    let half = t * 0.5;
    let mut length = 0.0;
    for (abscissa, weight) in GAUSS_LEGENDRE {
        // Intervallwechsel von [-1, 1] nach [0, t].
        let t2 = half * (1.0 + abscissa);
        let derivative = c0 + t2 * (c1 + t2 * c2);
        length += (derivative * scale).length() * weight;
    }
    length * half
}
