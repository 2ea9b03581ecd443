//! Achsen-parallele Bounding-Box im 3D-Raum.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Achsen-parallele Box, definiert über Min- und Max-Ecke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Box aus zwei beliebigen Eckpunkten (Reihenfolge egal).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Erweitert die Box so, dass sie `other` vollständig enthält.
    pub fn encapsulate(&mut self, other: &Bounds) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Erweitert die Box so, dass sie den Punkt enthält.
    pub fn encapsulate_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }
}
