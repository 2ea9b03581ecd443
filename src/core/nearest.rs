//! Nächster-Punkt-Suche auf Positionskurven.
//!
//! Pro Segment läuft eine Newton-Iteration mit drei Startwerten; das
//! beste Segment gewinnt. Die Schrittweite wird pro Iteration gedämpft,
//! damit die Suche auch auf stark gekrümmten Segmenten stabil bleibt.

use glam::Vec3;

use super::curve::{Curve, TangentMode};
use super::curve_math;

const NEWTON_SEEDS: [f32; 3] = [0.0, 0.5, 1.0];
const NEWTON_ITERATIONS: usize = 3;
const NEWTON_DAMPING: f32 = 0.75;

/// Ergebnis einer Nächster-Punkt-Abfrage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestHit {
    /// Spline-Input-Key des nächstgelegenen Kurvenpunkts.
    pub key: f32,
    /// Quadrierter Abstand zum Abfragepunkt.
    pub distance_sq: f32,
    /// Segment-Index, in dem der Treffer liegt.
    pub segment: usize,
}

impl Curve<Vec3> {
    /// Sucht den Key des Kurvenpunkts mit minimalem Abstand zu
    /// `position` (im lokalen Kurvenraum). `None` bei leerer Kurve.
    ///
    /// Die Segment-Arithmetik setzt das Key-Raster des Spline-Aggregats
    /// voraus: Keyframe `i` liegt bei Key `i`.
    pub fn find_nearest_key(&self, position: Vec3) -> Option<NearestHit> {
        let count = self.len();
        if count == 0 {
            return None;
        }
        if count == 1 {
            return Some(NearestHit {
                key: self[0].key,
                distance_sq: (position - self[0].value).length_squared(),
                segment: 0,
            });
        }

        let segment_count = if self.looped() { count } else { count - 1 };
        let (mut best_key, mut best_distance_sq) = self.nearest_on_segment(position, 0);
        let mut best_segment = 0;

        for segment in 1..segment_count {
            let (key, distance_sq) = self.nearest_on_segment(position, segment);
            if distance_sq < best_distance_sq {
                best_key = key;
                best_distance_sq = distance_sq;
                best_segment = segment;
            }
        }

        Some(NearestHit {
            key: best_key,
            distance_sq: best_distance_sq,
            segment: best_segment,
        })
    }

    /// Nächster Key auf einem einzelnen Segment, als `(key, distance_sq)`.
    fn nearest_on_segment(&self, position: Vec3, pt_idx: usize) -> (f32, f32) {
        let last = self.len() - 1;
        let wraps = self.looped() && pt_idx == last;
        let next_idx = if wraps { 0 } else { pt_idx + 1 };
        let next_in_val = if wraps {
            (last + 1) as f32
        } else {
            next_idx as f32
        };

        let left = self[pt_idx];
        let right = self[next_idx];

        // Treppensegment: der gehaltene linke Wert ist der einzige
        // Kandidat, gemeldet wird er unter dem rechten Key.
        if left.mode == TangentMode::Constant {
            return (next_in_val, (left.value - position).length_squared());
        }

        let diff = next_in_val - pt_idx as f32;

        if left.mode == TangentMode::Linear {
            let span = right.value - left.value;
            let a = (left.value - position).dot(span);
            let b = span.length_squared();
            if b <= f32::EPSILON {
                return (left.key, (left.value - position).length_squared());
            }
            let v = (-a / b).clamp(0.0, 1.0);
            let nearest = left.value.lerp(right.value, v);
            return (
                v * diff + left.key,
                (nearest - position).length_squared(),
            );
        }

        let m0 = left.out_tangent * diff;
        let m1 = right.in_tangent * diff;

        let mut values_t = NEWTON_SEEDS;
        let mut points = [
            left.value,
            curve_math::interpolate_position(left.value, m0, right.value, m1, 0.5),
            right.value,
        ];
        let mut distances_sq = [0.0f32; 3];

        for point in 0..3 {
            let mut last_move = 1.0f32;
            for _ in 0..NEWTON_ITERATIONS {
                let tangent = curve_math::interpolate_tangent(
                    left.value,
                    m0,
                    right.value,
                    m1,
                    values_t[point],
                );
                let tangent_len_sq = tangent.length_squared();
                if tangent_len_sq <= f32::EPSILON {
                    break;
                }
                let delta = position - points[point];
                let step = tangent.dot(delta) / tangent_len_sq;
                let step = step.clamp(-last_move * NEWTON_DAMPING, last_move * NEWTON_DAMPING);
                values_t[point] = (values_t[point] + step).clamp(0.0, 1.0);
                last_move = step.abs();
                points[point] = curve_math::interpolate_position(
                    left.value,
                    m0,
                    right.value,
                    m1,
                    values_t[point],
                );
            }
            distances_sq[point] = (points[point] - position).length_squared();
            values_t[point] = values_t[point] * diff + pt_idx as f32;
        }

        if distances_sq[0] <= distances_sq[1] && distances_sq[0] <= distances_sq[2] {
            (values_t[0], distances_sq[0])
        } else if distances_sq[1] <= distances_sq[2] {
            (values_t[1], distances_sq[1])
        } else {
            (values_t[2], distances_sq[2])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::curve::Keyframe;
    use approx::assert_relative_eq;

    fn straight_curve() -> Curve<Vec3> {
        // Gerade entlang X, Keyframes bei 0 und 10 mit passenden Tangenten.
        let mut curve = Curve::new();
        let tangent = Vec3::new(10.0, 0.0, 0.0);
        let mut a = Keyframe::new(0.0, Vec3::ZERO);
        a.in_tangent = tangent;
        a.out_tangent = tangent;
        let mut b = Keyframe::new(1.0, Vec3::new(10.0, 0.0, 0.0));
        b.in_tangent = tangent;
        b.out_tangent = tangent;
        curve.add(a);
        curve.add(b);
        curve
    }

    #[test]
    fn test_nearest_on_straight_segment() {
        let curve = straight_curve();
        let hit = curve.find_nearest_key(Vec3::new(3.0, 4.0, 0.0)).unwrap();
        assert_relative_eq!(hit.key, 0.3, epsilon = 2e-2);
        assert_relative_eq!(hit.distance_sq, 16.0, epsilon = 0.5);
        assert_eq!(hit.segment, 0);
    }

    #[test]
    fn test_nearest_clamps_to_segment_ends() {
        let curve = straight_curve();
        let hit = curve.find_nearest_key(Vec3::new(-5.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(hit.key, 0.0, epsilon = 1e-5);
        let hit = curve.find_nearest_key(Vec3::new(50.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(hit.key, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_nearest_single_point() {
        let mut curve = Curve::new();
        curve.add(Keyframe::new(0.0, Vec3::new(1.0, 2.0, 3.0)));
        let hit = curve.find_nearest_key(Vec3::ZERO).unwrap();
        assert_eq!(hit.key, 0.0);
        assert_relative_eq!(hit.distance_sq, 14.0, epsilon = 1e-5);
    }

    #[test]
    fn test_nearest_empty_curve() {
        let curve: Curve<Vec3> = Curve::new();
        assert!(curve.find_nearest_key(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_nearest_linear_segment_projects() {
        let mut curve = Curve::new();
        let mut a = Keyframe::new(0.0, Vec3::ZERO);
        a.mode = TangentMode::Linear;
        curve.add(a);
        curve.add(Keyframe::new(1.0, Vec3::new(4.0, 0.0, 0.0)));
        let hit = curve.find_nearest_key(Vec3::new(1.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(hit.key, 0.25, epsilon = 1e-5);
        assert_relative_eq!(hit.distance_sq, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_nearest_picks_closest_segment() {
        // Drei kollineare Punkte, Abfrage nahe am zweiten Segment.
        let mut curve = Curve::new();
        for i in 0..3 {
            let mut k = Keyframe::new(i as f32, Vec3::new(i as f32 * 10.0, 0.0, 0.0));
            k.mode = TangentMode::Linear;
            curve.add(k);
        }
        let hit = curve.find_nearest_key(Vec3::new(15.0, 1.0, 0.0)).unwrap();
        assert_eq!(hit.segment, 1);
        assert_relative_eq!(hit.key, 1.5, epsilon = 1e-5);
    }

    #[test]
    fn test_nearest_loop_wrap_segment() {
        // Quadrat-Ring, Abfrage neben dem Wrap-Segment (3 -> 0).
        let mut curve = Curve::new();
        let corners = [
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, 10.0),
        ];
        for (i, c) in corners.into_iter().enumerate() {
            let mut k = Keyframe::new(i as f32, c);
            k.mode = TangentMode::Linear;
            curve.add(k);
        }
        curve.set_loop_key(4.0);
        let hit = curve.find_nearest_key(Vec3::new(-1.0, 0.0, 5.0)).unwrap();
        assert_eq!(hit.segment, 3);
        assert_relative_eq!(hit.key, 3.5, epsilon = 1e-5);
    }
}
