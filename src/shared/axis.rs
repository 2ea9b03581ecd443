//! Achsen-Maske für Splines, die auf eine Ebene oder Linie beschränkt sind.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Bestimmt welche Achsen eines Splines aktiv sind.
///
/// Maskierte (inaktive) Achsen werden bei jedem Rebuild auf den
/// Positions-Keyframes genullt — Werte und Tangenten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMask {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisMask {
    /// Alle drei Achsen aktiv.
    pub const ALL: Self = Self {
        x: true,
        y: true,
        z: true,
    };

    pub fn is_all(&self) -> bool {
        self.x && self.y && self.z
    }

    /// Nullt die maskierten Komponenten eines Vektors.
    pub fn apply(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            if self.x { v.x } else { 0.0 },
            if self.y { v.y } else { 0.0 },
            if self.z { v.z } else { 0.0 },
        )
    }
}

impl Default for AxisMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_masks_components() {
        let mask = AxisMask {
            x: true,
            y: false,
            z: true,
        };
        let v = mask.apply(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(v, Vec3::new(1.0, 0.0, 3.0));
    }

    #[test]
    fn test_default_is_all() {
        assert!(AxisMask::default().is_all());
    }
}
