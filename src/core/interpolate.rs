//! Auswertungs-Schicht: Kurven-Evaluation pro Wertetyp.
//!
//! Die Segment-Interpolation hängt vom Wertetyp ab — Skalare und
//! Vektoren laufen über das Hermite-Polynom, Rotationen über
//! Quaternion-Slerp-Blending. [`CurveValue`] kapselt diesen Unterschied,
//! [`CurveTangentValue`] die Ableitung (nur für f32 und Vec3 sinnvoll).

use glam::{Quat, Vec3};

use super::curve::{Curve, Keyframe, TangentMode};
use super::curve_math;

/// Wertetyp, den eine [`Curve`] auswerten kann.
pub trait CurveValue: Copy + Default {
    /// Interpoliert innerhalb eines Segments. `dx` ist die Key-Breite
    /// des Segments, `t` der normierte Parameter in `[0, 1]`.
    fn interpolate_segment(left: &Keyframe<Self>, right: &Keyframe<Self>, dx: f32, t: f32)
        -> Self;

    /// Catmull-Rom-Tangente aus den Nachbarwerten, normiert auf die
    /// Key-Spanne `dt`.
    fn auto_tangent(prev: Self, current: Self, next: Self, dt: f32) -> Self;
}

/// Wertetyp mit auswertbarer erster Ableitung.
pub trait CurveTangentValue: CurveValue {
    fn interpolate_segment_tangent(
        left: &Keyframe<Self>,
        right: &Keyframe<Self>,
        dx: f32,
        t: f32,
    ) -> Self;
}

impl CurveValue for f32 {
    fn interpolate_segment(left: &Keyframe<f32>, right: &Keyframe<f32>, dx: f32, t: f32) -> f32 {
        let m0 = left.out_tangent * dx;
        let m1 = right.in_tangent * dx;
        match left.mode {
            TangentMode::Free | TangentMode::Auto | TangentMode::ClampedAuto => {
                curve_math::interpolate_position(left.value, m0, right.value, m1, t)
            }
            TangentMode::Linear => left.value + (right.value - left.value) * t,
            TangentMode::Constant => left.value,
        }
    }

    fn auto_tangent(prev: f32, current: f32, next: f32, dt: f32) -> f32 {
        curve_math::compute_tangent(prev, current, next, 0.0) / dt
    }
}

impl CurveValue for Vec3 {
    fn interpolate_segment(
        left: &Keyframe<Vec3>,
        right: &Keyframe<Vec3>,
        dx: f32,
        t: f32,
    ) -> Vec3 {
        let m0 = left.out_tangent * dx;
        let m1 = right.in_tangent * dx;
        match left.mode {
            TangentMode::Free | TangentMode::Auto | TangentMode::ClampedAuto => {
                curve_math::interpolate_position(left.value, m0, right.value, m1, t)
            }
            TangentMode::Linear => left.value.lerp(right.value, t),
            TangentMode::Constant => left.value,
        }
    }

    fn auto_tangent(prev: Vec3, current: Vec3, next: Vec3, dt: f32) -> Vec3 {
        curve_math::compute_tangent(prev, current, next, 0.0) / dt
    }
}

impl CurveValue for Quat {
    /// Rotationssegmente lesen beide Tangenten aus `out_tangent` — die
    /// Log/Exp-Tangente eines Keyframes ist auf beiden Seiten dieselbe.
    fn interpolate_segment(
        left: &Keyframe<Quat>,
        right: &Keyframe<Quat>,
        dx: f32,
        t: f32,
    ) -> Quat {
        let m0 = left.out_tangent * dx;
        let m1 = right.out_tangent * dx;
        match left.mode {
            TangentMode::Free | TangentMode::Auto | TangentMode::ClampedAuto => {
                curve_math::interpolate_rotation(left.value, m0, right.value, m1, t)
            }
            TangentMode::Linear => left.value.lerp(right.value, t),
            TangentMode::Constant => left.value,
        }
    }

    fn auto_tangent(prev: Quat, current: Quat, next: Quat, dt: f32) -> Quat {
        curve_math::compute_rotation_tangent(prev, current, next) * (1.0 / dt)
    }
}

impl CurveTangentValue for f32 {
    fn interpolate_segment_tangent(
        left: &Keyframe<f32>,
        right: &Keyframe<f32>,
        dx: f32,
        t: f32,
    ) -> f32 {
        let m0 = left.out_tangent * dx;
        let m1 = right.in_tangent * dx;
        curve_math::interpolate_tangent(left.value, m0, right.value, m1, t)
    }
}

impl CurveTangentValue for Vec3 {
    fn interpolate_segment_tangent(
        left: &Keyframe<Vec3>,
        right: &Keyframe<Vec3>,
        dx: f32,
        t: f32,
    ) -> Vec3 {
        let m0 = left.out_tangent * dx;
        let m1 = right.in_tangent * dx;
        curve_math::interpolate_tangent(left.value, m0, right.value, m1, t)
    }
}

impl<T: CurveValue> Curve<T> {
    /// Wertet die Kurve am gegebenen Key aus.
    ///
    /// Leere Kurven liefern `T::default()`; Keys außerhalb des
    /// Key-Bereichs klemmen auf den jeweiligen Randwert.
    pub fn evaluate(&self, key: f32) -> T {
        let Some(bracket) = self.find_bracket(key) else {
            return T::default();
        };
        if bracket.lhs == bracket.rhs {
            return self.keyframes[bracket.lhs].value;
        }
        let dx = bracket.right_key - bracket.left_key;
        if dx <= 0.0 {
            return self.keyframes[bracket.lhs].value;
        }
        let t = ((key - bracket.left_key) / dx).clamp(0.0, 1.0);
        T::interpolate_segment(&self.keyframes[bracket.lhs], &self.keyframes[bracket.rhs], dx, t)
    }

    /// Berechnet für alle Keyframes im `Auto`-Modus die Tangenten per
    /// Catmull-Rom aus den Nachbarn. Bei geschlossenen Kurven wird über
    /// das Wrap-Segment hinweg verkettet; die virtuellen Nachbar-Keys
    /// liegen dabei eine Key-Einheit vor bzw. hinter dem Randpunkt.
    pub fn compute_auto_tangents(&mut self) {
        let count = self.keyframes.len();
        if count == 0 {
            return;
        }
        let last = count - 1;
        let looped = self.looped();

        for index in 0..count {
            if self.keyframes[index].mode != TangentMode::Auto {
                continue;
            }

            let prev_index = if index == 0 {
                if looped {
                    last
                } else {
                    0
                }
            } else {
                index - 1
            };
            let next_index = if index == last {
                if looped {
                    0
                } else {
                    last
                }
            } else {
                index + 1
            };

            let prev = self.keyframes[prev_index];
            let next = self.keyframes[next_index];
            let this = self.keyframes[index];

            let prev_time = if looped && index == 0 {
                this.key - 1.0
            } else {
                prev.key
            };
            let next_time = if looped && index == last {
                this.key + 1.0
            } else {
                next.key
            };

            let dt = (next_time - prev_time).max(f32::MIN_POSITIVE);
            let tangent = T::auto_tangent(prev.value, this.value, next.value, dt);

            let this = &mut self.keyframes[index];
            this.in_tangent = tangent;
            this.out_tangent = tangent;
        }

        self.touch();
    }
}

impl<T: CurveTangentValue> Curve<T> {
    /// Wertet die erste Ableitung der Kurve am gegebenen Key aus.
    ///
    /// An den geklemmten Rändern liefert die Abfrage die gespeicherte
    /// Randtangente statt einer Segment-Ableitung.
    pub fn evaluate_tangent(&self, key: f32) -> T {
        let Some(bracket) = self.find_bracket(key) else {
            return T::default();
        };
        if bracket.lhs == bracket.rhs {
            return if bracket.lhs == 0 {
                self.keyframes[0].in_tangent
            } else {
                self.keyframes[bracket.lhs].out_tangent
            };
        }
        let dx = bracket.right_key - bracket.left_key;
        if dx <= 0.0 {
            return self.keyframes[bracket.lhs].out_tangent;
        }
        let t = ((key - bracket.left_key) / dx).clamp(0.0, 1.0);
        T::interpolate_segment_tangent(
            &self.keyframes[bracket.lhs],
            &self.keyframes[bracket.rhs],
            dx,
            t,
        )
    }
}
