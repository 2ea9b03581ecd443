//! Keyframe-basierte Hermite-Spline-Engine.
//!
//! Drei parallele Kurven (Position, Rotation, Skalierung) teilen sich einen
//! Key-Satz; eine abgeleitete Length-Cache-Kurve bildet Bogenlänge auf den
//! parametrischen Key ab und erlaubt Abfragen mit konstanter Geschwindigkeit.
//! Die Engine ist reine Berechnung: kein Rendering, keine Persistenz-Formate,
//! keine Nebenläufigkeit.

pub mod core;
pub mod shared;

pub use crate::core::curve_math;
pub use crate::core::{
    Curve, CurveCache, CurveTangentValue, CurveValue, KeyBracket, Keyframe, NearestHit, Spline,
    SplineEvent, SplinePoint, TangentMode,
};
pub use crate::shared::{AxisMask, Bounds, Space, Transform};
