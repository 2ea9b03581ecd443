//! Lokal/Welt-Raumwahl für Abfragen und Mutationen.
//!
//! Die Engine besitzt selbst keinen Transform — der Host reicht seinen
//! Transform pro Aufruf über [`Space::World`] herein.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Transform des Host-Objekts: Translation, Rotation, Skalierung.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Lokaler Punkt → Welt (Skalierung, Rotation, Translation).
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }

    /// Welt-Punkt → lokal. Null-Skalierung auf einer Achse ergibt 0 statt NaN.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        let rotated = self.rotation.inverse() * (point - self.translation);
        Vec3::new(
            rotated.x * safe_recip(self.scale.x),
            rotated.y * safe_recip(self.scale.y),
            rotated.z * safe_recip(self.scale.z),
        )
    }

    /// Richtungen werden nur rotiert, nie skaliert.
    pub fn transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }

    pub fn inverse_transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation.inverse() * direction
    }

    pub fn transform_rotation(&self, rotation: Quat) -> Quat {
        self.rotation * rotation
    }

    pub fn inverse_transform_rotation(&self, rotation: Quat) -> Quat {
        self.rotation.inverse() * rotation
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn safe_recip(value: f32) -> f32 {
    if value.abs() > f32::EPSILON {
        1.0 / value
    } else {
        0.0
    }
}

/// Raum, in dem Ein- und Ausgabewerte einer Spline-Operation interpretiert werden.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Space {
    /// Lokaler Spline-Raum — Werte gehen unverändert durch.
    #[default]
    Local,
    /// Welt-Raum relativ zum übergebenen Host-Transform.
    World(Transform),
}

impl Space {
    /// Lokaler Punkt → Ausgaberaum.
    pub fn point(&self, local: Vec3) -> Vec3 {
        match self {
            Space::Local => local,
            Space::World(transform) => transform.transform_point(local),
        }
    }

    /// Eingabepunkt → lokaler Spline-Raum.
    pub fn inverse_point(&self, point: Vec3) -> Vec3 {
        match self {
            Space::Local => point,
            Space::World(transform) => transform.inverse_transform_point(point),
        }
    }

    /// Lokale Richtung → Ausgaberaum (nur Rotation).
    pub fn direction(&self, local: Vec3) -> Vec3 {
        match self {
            Space::Local => local,
            Space::World(transform) => transform.transform_direction(local),
        }
    }

    /// Eingaberichtung → lokaler Spline-Raum.
    pub fn inverse_direction(&self, direction: Vec3) -> Vec3 {
        match self {
            Space::Local => direction,
            Space::World(transform) => transform.inverse_transform_direction(direction),
        }
    }

    /// Lokale Rotation → Ausgaberaum.
    pub fn rotation(&self, local: Quat) -> Quat {
        match self {
            Space::Local => local,
            Space::World(transform) => transform.transform_rotation(local),
        }
    }

    /// Eingaberotation → lokaler Spline-Raum.
    pub fn inverse_rotation(&self, rotation: Quat) -> Quat {
        match self {
            Space::Local => rotation,
            Space::World(transform) => transform.inverse_transform_rotation(rotation),
        }
    }
}
