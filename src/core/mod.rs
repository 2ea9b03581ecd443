//! Kern der Spline-Engine: Interpolationsmathematik, Kurven-Container,
//! Auswertungs-Schicht und das Spline-Aggregat.

pub mod curve;
pub mod curve_math;
pub mod interpolate;
pub mod nearest;
pub mod spline;

pub use curve::{Curve, CurveCache, KeyBracket, Keyframe, TangentMode};
pub use interpolate::{CurveTangentValue, CurveValue};
pub use nearest::NearestHit;
pub use spline::{Spline, SplineEvent, SplinePoint};
