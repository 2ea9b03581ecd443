//! Spline-Aggregat: drei synchron laufende Kurven (Position, Rotation,
//! Skalierung) plus Arc-Length-Cache für distanzbasierte Abfragen.
//!
//! Alle Punkte liegen auf einem ganzzahligen Key-Raster: Punkt `i` hat
//! den Spline-Input-Key `i`. Mutationen markieren den Spline als
//! veraltet; [`Spline::update_spline`] baut Auto-Tangenten und den
//! Längen-Cache neu auf. Abfragen auf veraltetem Zustand schlagen in
//! Debug-Builds per Assertion fehl.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::curve::{Curve, Keyframe, TangentMode};
use super::curve_math;
use super::nearest::NearestHit;
use crate::shared::{AxisMask, Bounds, Space};

/// Mindestdauer, damit zeitbasierte Abfragen nicht durch Null teilen.
const MIN_DURATION: f32 = 1e-4;

/// Strukturänderung am Spline, abholbar über [`Spline::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineEvent {
    /// `update_spline` ist durchgelaufen.
    Updated,
    /// Punkt am Index wurde eingefügt.
    PointAdded(usize),
    /// Punkt am Index wurde entfernt.
    PointRemoved(usize),
}

/// Vollständiger Zustand eines Spline-Punkts über alle drei Kanäle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplinePoint {
    pub key: f32,
    pub position: Vec3,
    pub in_tangent: Vec3,
    pub out_tangent: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub mode: TangentMode,
}

/// Stückweise Hermite-Kurve mit Positions-, Rotations- und
/// Skalierungskanal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spline {
    position_curve: Curve<Vec3>,
    rotation_curve: Curve<Quat>,
    scale_curve: Curve<Vec3>,
    /// Reparametrisierung Distanz -> Spline-Input-Key. Die Distanz
    /// steht im `key`-Feld der Einträge, der Input-Key im `value`.
    length_cache: Curve<f32>,
    axis: AxisMask,
    closed: bool,
    duration: f32,
    cache_steps_per_segment: usize,
    default_up_direction: Vec3,
    local_scale: Vec3,
    version: u64,
    #[serde(skip)]
    needs_rebuild: bool,
    #[serde(skip)]
    events: Vec<SplineEvent>,
}

impl Default for Spline {
    fn default() -> Self {
        Self {
            position_curve: Curve::new(),
            rotation_curve: Curve::new(),
            scale_curve: Curve::new(),
            length_cache: Curve::new(),
            axis: AxisMask::ALL,
            closed: false,
            duration: 1.0,
            cache_steps_per_segment: 10,
            default_up_direction: Vec3::Y,
            local_scale: Vec3::ONE,
            version: 0,
            needs_rebuild: false,
            events: Vec::new(),
        }
    }
}

impl Spline {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Zustand ──

    pub fn position_curve(&self) -> &Curve<Vec3> {
        &self.position_curve
    }

    pub fn rotation_curve(&self) -> &Curve<Quat> {
        &self.rotation_curve
    }

    pub fn scale_curve(&self) -> &Curve<Vec3> {
        &self.scale_curve
    }

    pub fn point_count(&self) -> usize {
        self.position_curve.len()
    }

    /// Segmentanzahl; offene Splines mit weniger als zwei Punkten
    /// melden ein degeneriertes Einzelsegment.
    pub fn segment_count(&self) -> usize {
        if self.closed {
            self.position_curve.len()
        } else {
            self.position_curve.len().saturating_sub(1).max(1)
        }
    }

    /// Gesamtlänge laut Arc-Length-Cache.
    pub fn spline_length(&self) -> f32 {
        self.length_cache.last().map_or(0.0, |k| k.key)
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn axis(&self) -> AxisMask {
        self.axis
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn cache_steps_per_segment(&self) -> usize {
        self.cache_steps_per_segment
    }

    pub fn default_up_direction(&self) -> Vec3 {
        self.default_up_direction
    }

    pub fn local_scale(&self) -> Vec3 {
        self.local_scale
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Ob seit dem letzten [`update_spline`](Self::update_spline) eine
    /// Mutation stattgefunden hat.
    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    /// Zieht die aufgelaufenen Ereignisse ab.
    pub fn take_events(&mut self) -> Vec<SplineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_axis(&mut self, axis: AxisMask) {
        self.axis = axis;
        self.mark_dirty();
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(MIN_DURATION);
    }

    pub fn set_cache_steps_per_segment(&mut self, steps: usize) {
        self.cache_steps_per_segment = steps.max(1);
        self.mark_dirty();
    }

    pub fn set_default_up_direction(&mut self, up: Vec3) {
        let up = up.normalize_or_zero();
        self.default_up_direction = if up == Vec3::ZERO { Vec3::Y } else { up };
    }

    pub fn set_local_scale(&mut self, scale: Vec3) {
        self.local_scale = scale;
        self.mark_dirty();
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
        self.version = self.version.wrapping_add(1);
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.needs_rebuild = true;
    }

    fn assert_fresh(&self) {
        debug_assert!(
            !self.needs_rebuild,
            "Spline-Abfrage auf veraltetem Zustand, update_spline() fehlt"
        );
    }

    // ── Rebuild ──

    /// Baut Loop-Keys, Auto-Tangenten, Achsen-Maskierung und den
    /// Arc-Length-Cache neu auf. Muss nach Mutationen laufen, bevor
    /// wieder abgefragt wird.
    pub fn update_spline(&mut self) {
        if self.closed {
            let last_key = self.position_curve.last().map_or(0.0, |k| k.key);
            let loop_key = last_key + 1.0;
            self.position_curve.set_loop_key(loop_key);
            self.rotation_curve.set_loop_key(loop_key);
            self.scale_curve.set_loop_key(loop_key);
        } else {
            self.position_curve.clear_loop_key();
            self.rotation_curve.clear_loop_key();
            self.scale_curve.clear_loop_key();
        }

        self.position_curve.compute_auto_tangents();
        self.rotation_curve.compute_auto_tangents();
        self.scale_curve.compute_auto_tangents();

        if !self.axis.is_all() {
            let mask = self.axis;
            for keyframe in &mut self.position_curve.keyframes {
                keyframe.value = mask.apply(keyframe.value);
                keyframe.in_tangent = mask.apply(keyframe.in_tangent);
                keyframe.out_tangent = mask.apply(keyframe.out_tangent);
            }
            self.position_curve.touch();
        }

        self.rebuild_length_cache();

        self.version = self.version.wrapping_add(1);
        self.needs_rebuild = false;
        self.events.push(SplineEvent::Updated);
        log::debug!(
            "Spline aktualisiert: {} Punkte, Länge {:.3}",
            self.point_count(),
            self.spline_length()
        );
    }

    fn rebuild_length_cache(&mut self) {
        self.length_cache.clear();

        let point_count = self.position_curve.len();
        if point_count == 0 {
            return;
        }
        if point_count == 1 {
            // Ein einzelner Punkt hat keine Ausdehnung; die Tabelle
            // bildet jede Distanz auf Key 0 ab.
            self.length_cache.add(Keyframe {
                key: 0.0,
                value: 0.0,
                in_tangent: 0.0,
                out_tangent: 0.0,
                mode: TangentMode::Linear,
            });
            return;
        }

        let last_point = point_count - 1;
        let segment_count = self.segment_count();
        let steps = self.cache_steps_per_segment.max(1);
        let mut accumulated = 0.0f32;

        for segment in 0..segment_count {
            let this_point = self.position_curve[segment];
            let next_index = if segment == last_point { 0 } else { segment + 1 };
            let next_point = self.position_curve[next_index];

            for step in 0..steps {
                let t = step as f32 / steps as f32;
                let segment_length = match this_point.mode {
                    TangentMode::Linear => {
                        ((next_point.value - this_point.value) * self.local_scale).length() * t
                    }
                    TangentMode::Constant => 0.0,
                    _ => {
                        if step == 0 {
                            0.0
                        } else {
                            curve_math::compute_arc_length(
                                this_point.value,
                                this_point.out_tangent,
                                next_point.value,
                                next_point.in_tangent,
                                t,
                                self.local_scale,
                            )
                        }
                    }
                };

                self.length_cache.add(Keyframe {
                    key: segment_length + accumulated,
                    value: segment as f32 + t,
                    in_tangent: 0.0,
                    out_tangent: 0.0,
                    mode: TangentMode::Linear,
                });
            }

            // Segmentlänge immer über das volle Hermite-Integral,
            // unabhängig vom Tangentenmodus.
            accumulated += curve_math::compute_arc_length(
                this_point.value,
                this_point.out_tangent,
                next_point.value,
                next_point.in_tangent,
                1.0,
                self.local_scale,
            );
        }

        self.length_cache.add(Keyframe {
            key: accumulated,
            value: segment_count as f32,
            in_tangent: 0.0,
            out_tangent: 0.0,
            mode: TangentMode::Linear,
        });
    }

    // ── Mutationen ──

    /// Hängt einen Punkt ans Ende an; alle drei Kanäle bekommen einen
    /// Keyframe auf dem nächsten Rasterplatz.
    pub fn add_point(&mut self, position: Vec3, space: Space) {
        let local = space.inverse_point(position);
        let key = self.position_curve.last().map_or(0.0, |k| k.key + 1.0);

        let mut position_key = Keyframe::new(key, local);
        position_key.mode = TangentMode::Auto;
        self.position_curve.add(position_key);

        let mut rotation_key = Keyframe::new(key, Quat::IDENTITY);
        rotation_key.in_tangent = Quat::IDENTITY;
        rotation_key.out_tangent = Quat::IDENTITY;
        rotation_key.mode = TangentMode::Auto;
        self.rotation_curve.add(rotation_key);

        let mut scale_key = Keyframe::new(key, Vec3::ONE);
        scale_key.mode = TangentMode::Auto;
        self.scale_curve.add(scale_key);

        self.version = self.version.wrapping_add(1);
        self.events
            .push(SplineEvent::PointAdded(self.position_curve.len() - 1));
        self.mark_dirty();
    }

    /// Fügt einen Punkt am Index ein und rückt die Keys der
    /// nachfolgenden Punkte auf allen drei Kanälen um eins auf.
    pub fn insert_point_at_index(&mut self, index: usize, position: Vec3, space: Space) {
        if index > self.point_count() {
            log::warn!("insert_point_at_index: Index {index} außerhalb des Bereichs");
            return;
        }

        let local = space.inverse_point(position);
        let key = if index == 0 {
            0.0
        } else {
            self.position_curve[index - 1].key + 1.0
        };

        let mut position_key = Keyframe::new(key, local);
        position_key.mode = TangentMode::Auto;
        self.position_curve.insert(index, position_key);

        let mut rotation_key = Keyframe::new(key, Quat::IDENTITY);
        rotation_key.in_tangent = Quat::IDENTITY;
        rotation_key.out_tangent = Quat::IDENTITY;
        rotation_key.mode = TangentMode::Auto;
        self.rotation_curve.insert(index, rotation_key);

        let mut scale_key = Keyframe::new(key, Vec3::ONE);
        scale_key.mode = TangentMode::Auto;
        self.scale_curve.insert(index, scale_key);

        self.shift_keys_from(index + 1, 1.0);

        self.version = self.version.wrapping_add(1);
        self.events.push(SplineEvent::PointAdded(index));
        self.mark_dirty();
    }

    /// Entfernt den Punkt am Index aus allen drei Kanälen und schließt
    /// die entstandene Lücke im Key-Raster.
    pub fn remove_point_at_index(&mut self, index: usize) {
        if index >= self.point_count() {
            log::warn!("remove_point_at_index: Index {index} außerhalb des Bereichs");
            return;
        }

        self.position_curve.remove_at(index);
        self.rotation_curve.remove_at(index);
        self.scale_curve.remove_at(index);

        self.shift_keys_from(index, -1.0);

        self.version = self.version.wrapping_add(1);
        self.events.push(SplineEvent::PointRemoved(index));
        self.mark_dirty();
    }

    fn shift_keys_from(&mut self, start: usize, delta: f32) {
        for i in start..self.position_curve.len() {
            if let Some(k) = self.position_curve.get_mut(i) {
                k.key += delta;
            }
            if let Some(k) = self.rotation_curve.get_mut(i) {
                k.key += delta;
            }
            if let Some(k) = self.scale_curve.get_mut(i) {
                k.key += delta;
            }
        }
    }

    /// Entfernt alle Punkte und den Längen-Cache.
    pub fn clear(&mut self) {
        self.position_curve.clear();
        self.rotation_curve.clear();
        self.scale_curve.clear();
        self.length_cache.clear();
        self.version = self.version.wrapping_add(1);
        self.mark_dirty();
    }

    /// Kehrt die Durchlaufrichtung aller drei Kanäle um.
    pub fn reverse(&mut self) {
        self.position_curve.reverse();
        self.rotation_curve.reverse();
        self.scale_curve.reverse();
        self.version = self.version.wrapping_add(1);
        self.mark_dirty();
    }

    pub fn set_position_at_index(&mut self, index: usize, position: Vec3, space: Space) {
        if index >= self.point_count() {
            log::warn!("set_position_at_index: Index {index} außerhalb des Bereichs");
            return;
        }
        let local = space.inverse_point(position);
        if let Some(k) = self.position_curve.get_mut(index) {
            k.value = local;
        }
        self.version = self.version.wrapping_add(1);
        self.mark_dirty();
    }

    /// Setzt beide Tangenten symmetrisch und nimmt den Punkt aus der
    /// Auto-Tangenten-Berechnung heraus.
    pub fn set_tangent_at_index(&mut self, index: usize, tangent: Vec3, space: Space) {
        self.set_tangents_at_index(index, tangent, tangent, space);
    }

    pub fn set_tangents_at_index(
        &mut self,
        index: usize,
        tangent_in: Vec3,
        tangent_out: Vec3,
        space: Space,
    ) {
        if index >= self.point_count() {
            log::warn!("set_tangents_at_index: Index {index} außerhalb des Bereichs");
            return;
        }
        let local_in = space.inverse_direction(tangent_in);
        let local_out = space.inverse_direction(tangent_out);
        if let Some(k) = self.position_curve.get_mut(index) {
            k.in_tangent = local_in;
            k.out_tangent = local_out;
            k.mode = TangentMode::Free;
        }
        self.version = self.version.wrapping_add(1);
        self.mark_dirty();
    }

    /// Richtet den Rotationskanal so aus, dass die Up-Richtung des
    /// Punkts dem gegebenen Vektor entspricht.
    pub fn set_up_vector_at_index(&mut self, index: usize, up: Vec3, space: Space) {
        if index >= self.point_count() {
            log::warn!("set_up_vector_at_index: Index {index} außerhalb des Bereichs");
            return;
        }
        let local_up = space.inverse_direction(up).normalize_or_zero();
        if local_up == Vec3::ZERO {
            log::warn!("set_up_vector_at_index: degenerierter Up-Vektor");
            return;
        }
        let rotation = Quat::from_rotation_arc(self.default_up_direction, local_up);
        if let Some(k) = self.rotation_curve.get_mut(index) {
            k.value = rotation;
        }
        self.version = self.version.wrapping_add(1);
        self.mark_dirty();
    }

    pub fn set_quaternion_at_index(&mut self, index: usize, rotation: Quat, space: Space) {
        if index >= self.point_count() {
            log::warn!("set_quaternion_at_index: Index {index} außerhalb des Bereichs");
            return;
        }
        let local = space.inverse_rotation(rotation);
        if let Some(k) = self.rotation_curve.get_mut(index) {
            k.value = local;
        }
        self.version = self.version.wrapping_add(1);
        self.mark_dirty();
    }

    pub fn set_local_scale_at_index(&mut self, index: usize, scale: Vec3) {
        if index >= self.point_count() {
            log::warn!("set_local_scale_at_index: Index {index} außerhalb des Bereichs");
            return;
        }
        if let Some(k) = self.scale_curve.get_mut(index) {
            k.value = scale;
        }
        self.version = self.version.wrapping_add(1);
        self.mark_dirty();
    }

    /// Setzt den Tangentenmodus auf allen drei Kanälen.
    pub fn set_tangent_mode_at_index(&mut self, index: usize, mode: TangentMode) {
        if index >= self.point_count() {
            log::warn!("set_tangent_mode_at_index: Index {index} außerhalb des Bereichs");
            return;
        }
        if let Some(k) = self.position_curve.get_mut(index) {
            k.mode = mode;
        }
        if let Some(k) = self.rotation_curve.get_mut(index) {
            k.mode = mode;
        }
        if let Some(k) = self.scale_curve.get_mut(index) {
            k.mode = mode;
        }
        self.version = self.version.wrapping_add(1);
        self.mark_dirty();
    }

    // ── Index-Abfragen ──

    fn position_safe(&self, index: usize) -> Keyframe<Vec3> {
        if self.position_curve.is_empty() {
            return Keyframe {
                key: 0.0,
                value: Vec3::ZERO,
                in_tangent: Vec3::Z,
                out_tangent: Vec3::Z,
                mode: TangentMode::Constant,
            };
        }
        self.position_curve[self.clamp_index(index)]
    }

    fn rotation_safe(&self, index: usize) -> Keyframe<Quat> {
        if self.rotation_curve.is_empty() {
            return Keyframe::new(0.0, Quat::IDENTITY);
        }
        self.rotation_curve[self.clamp_index(index)]
    }

    fn scale_safe(&self, index: usize) -> Keyframe<Vec3> {
        if self.scale_curve.is_empty() {
            return Keyframe::new(0.0, Vec3::ONE);
        }
        self.scale_curve[self.clamp_index(index)]
    }

    /// Geschlossene Splines behandeln `index == point_count` als
    /// Rücksprung auf den ersten Punkt.
    fn clamp_index(&self, index: usize) -> usize {
        let count = self.position_curve.len();
        if self.closed && index >= count {
            0
        } else {
            index.min(count.saturating_sub(1))
        }
    }

    pub fn get_position_at_index(&self, index: usize, space: Space) -> Vec3 {
        space.point(self.position_safe(index).value)
    }

    pub fn get_key_at_index(&self, index: usize) -> f32 {
        self.position_safe(index).key
    }

    pub fn get_in_tangent_at_index(&self, index: usize, space: Space) -> Vec3 {
        space.direction(self.position_safe(index).in_tangent)
    }

    pub fn get_out_tangent_at_index(&self, index: usize, space: Space) -> Vec3 {
        space.direction(self.position_safe(index).out_tangent)
    }

    pub fn get_tangent_at_index(&self, index: usize, space: Space) -> Vec3 {
        self.get_out_tangent_at_index(index, space)
    }

    pub fn get_forward_at_index(&self, index: usize, space: Space) -> Vec3 {
        self.get_out_tangent_at_index(index, space).normalize_or_zero()
    }

    /// Roh-Quaternion des Rotationskanals, ohne Bahnausrichtung.
    pub fn get_quaternion_at_index(&self, index: usize, space: Space) -> Quat {
        space.rotation(self.rotation_safe(index).value)
    }

    /// Tatsächliche Bahn-Rotation am Punkt (Blickrichtung + Up-Twist).
    pub fn get_rotation_at_index(&self, index: usize, space: Space) -> Quat {
        self.get_rotation_at_key(self.rotation_safe(index).key, space)
    }

    pub fn get_up_at_index(&self, index: usize, space: Space) -> Vec3 {
        self.get_up_at_key(self.rotation_safe(index).key, space)
    }

    pub fn get_right_at_index(&self, index: usize, space: Space) -> Vec3 {
        self.get_right_at_key(self.rotation_safe(index).key, space)
    }

    pub fn get_roll_at_index(&self, index: usize, space: Space) -> f32 {
        self.get_roll_at_key(self.rotation_safe(index).key, space)
    }

    pub fn get_scale_at_index(&self, index: usize) -> Vec3 {
        self.scale_safe(index).value
    }

    pub fn get_tangent_mode_at_index(&self, index: usize) -> TangentMode {
        self.position_safe(index).mode
    }

    /// Distanz vom Spline-Anfang bis zum Punkt, laut Längen-Cache.
    pub fn get_distance_along_spline_at_index(&self, index: usize) -> f32 {
        self.assert_fresh();
        if index > self.segment_count() {
            return 0.0;
        }
        let entry = index * self.cache_steps_per_segment.max(1);
        match self.length_cache.get(entry) {
            Some(keyframe) => keyframe.key,
            None => 0.0,
        }
    }

    pub fn get_spline_point_at_index(&self, index: usize, space: Space) -> SplinePoint {
        SplinePoint {
            key: if self.point_count() > 0 {
                self.position_safe(index).key
            } else {
                index as f32
            },
            position: self.get_position_at_index(index, space),
            in_tangent: self.get_in_tangent_at_index(index, space),
            out_tangent: self.get_out_tangent_at_index(index, space),
            rotation: self.get_rotation_at_index(index, space),
            scale: self.get_scale_at_index(index),
            mode: self.get_tangent_mode_at_index(index),
        }
    }

    // ── Key-Abfragen ──

    pub fn get_position_at_key(&self, key: f32, space: Space) -> Vec3 {
        self.assert_fresh();
        space.point(self.position_curve.evaluate(key))
    }

    pub fn get_tangent_at_key(&self, key: f32, space: Space) -> Vec3 {
        self.assert_fresh();
        space.direction(self.position_curve.evaluate_tangent(key))
    }

    pub fn get_forward_at_key(&self, key: f32, space: Space) -> Vec3 {
        self.get_tangent_at_key(key, space).normalize_or_zero()
    }

    /// Bahn-Rotation am Key: Blickrichtung entlang der Kurve, Up-Vektor
    /// aus dem Rotationskanal gedreht.
    pub fn get_rotation_at_key(&self, key: f32, space: Space) -> Quat {
        self.assert_fresh();
        let curve_rotation = self.rotation_curve.evaluate(key);
        let direction = self.position_curve.evaluate_tangent(key).normalize_or_zero();
        let up = curve_rotation * self.default_up_direction;
        space.rotation(curve_math::look_rotation(direction, up))
    }

    pub fn get_up_at_key(&self, key: f32, space: Space) -> Vec3 {
        let rotation = self.get_rotation_at_key(key, Space::Local);
        space.direction(rotation * Vec3::Y)
    }

    pub fn get_right_at_key(&self, key: f32, space: Space) -> Vec3 {
        let rotation = self.get_rotation_at_key(key, Space::Local);
        space.direction(rotation * Vec3::X)
    }

    /// Roll-Winkel (Rotation um die Blickrichtung) in Radiant.
    pub fn get_roll_at_key(&self, key: f32, space: Space) -> f32 {
        let rotation = self.get_rotation_at_key(key, space);
        rotation.to_euler(EulerRot::YXZ).2
    }

    pub fn get_scale_at_key(&self, key: f32) -> Vec3 {
        self.assert_fresh();
        if self.point_count() < 1 {
            return Vec3::ONE;
        }
        self.scale_curve.evaluate(key)
    }

    // ── Distanz-Abfragen ──

    /// Distanz vom Spline-Anfang zum gegebenen Spline-Input-Key. Die
    /// Cache-Einträge werden dazwischen linear interpoliert.
    pub fn get_distance_at_spline_input_key(&self, key: f32) -> f32 {
        self.assert_fresh();
        let segment_count = self.segment_count() as f32;
        if key >= segment_count {
            return self.spline_length();
        }
        if key < 0.0 {
            return 0.0;
        }

        let steps = self.cache_steps_per_segment.max(1) as f32;
        let scaled = key * steps;
        let prev_index = scaled as usize;
        let alpha = scaled - prev_index as f32;

        let (Some(prev), Some(next)) = (
            self.length_cache.get(prev_index),
            self.length_cache.get(prev_index + 1),
        ) else {
            return 0.0;
        };

        prev.key + (next.key - prev.key) * alpha
    }

    /// Spline-Input-Key an einer Distanz vom Anfang.
    pub fn get_key_at_distance(&self, distance: f32) -> f32 {
        self.assert_fresh();
        self.length_cache.evaluate(distance)
    }

    pub fn get_position_at_distance(&self, distance: f32, space: Space) -> Vec3 {
        self.get_position_at_key(self.get_key_at_distance(distance), space)
    }

    pub fn get_tangent_at_distance(&self, distance: f32, space: Space) -> Vec3 {
        self.get_tangent_at_key(self.get_key_at_distance(distance), space)
    }

    pub fn get_forward_at_distance(&self, distance: f32, space: Space) -> Vec3 {
        self.get_forward_at_key(self.get_key_at_distance(distance), space)
    }

    pub fn get_rotation_at_distance(&self, distance: f32, space: Space) -> Quat {
        self.get_rotation_at_key(self.get_key_at_distance(distance), space)
    }

    pub fn get_up_at_distance(&self, distance: f32, space: Space) -> Vec3 {
        self.get_up_at_key(self.get_key_at_distance(distance), space)
    }

    pub fn get_right_at_distance(&self, distance: f32, space: Space) -> Vec3 {
        self.get_right_at_key(self.get_key_at_distance(distance), space)
    }

    pub fn get_roll_at_distance(&self, distance: f32, space: Space) -> f32 {
        self.get_roll_at_key(self.get_key_at_distance(distance), space)
    }

    pub fn get_scale_at_distance(&self, distance: f32) -> Vec3 {
        self.get_scale_at_key(self.get_key_at_distance(distance))
    }

    // ── Zeit-Abfragen ──

    fn time_to_key(&self, time: f32) -> f32 {
        time * self.segment_count() as f32 / self.duration
    }

    fn time_to_distance(&self, time: f32) -> f32 {
        time / self.duration * self.spline_length()
    }

    pub fn get_position_at_time(&self, time: f32, space: Space, uniform_velocity: bool) -> Vec3 {
        if self.duration <= 0.0 {
            return Vec3::ZERO;
        }
        if uniform_velocity {
            self.get_position_at_distance(self.time_to_distance(time), space)
        } else {
            self.get_position_at_key(self.time_to_key(time), space)
        }
    }

    pub fn get_tangent_at_time(&self, time: f32, space: Space, uniform_velocity: bool) -> Vec3 {
        if self.duration <= 0.0 {
            return Vec3::ZERO;
        }
        if uniform_velocity {
            self.get_tangent_at_distance(self.time_to_distance(time), space)
        } else {
            self.get_tangent_at_key(self.time_to_key(time), space)
        }
    }

    pub fn get_forward_at_time(&self, time: f32, space: Space, uniform_velocity: bool) -> Vec3 {
        if self.duration <= 0.0 {
            return Vec3::ZERO;
        }
        if uniform_velocity {
            self.get_forward_at_distance(self.time_to_distance(time), space)
        } else {
            self.get_forward_at_key(self.time_to_key(time), space)
        }
    }

    pub fn get_rotation_at_time(&self, time: f32, space: Space, uniform_velocity: bool) -> Quat {
        if self.duration <= 0.0 {
            return Quat::IDENTITY;
        }
        if uniform_velocity {
            self.get_rotation_at_distance(self.time_to_distance(time), space)
        } else {
            self.get_rotation_at_key(self.time_to_key(time), space)
        }
    }

    pub fn get_up_at_time(&self, time: f32, space: Space, uniform_velocity: bool) -> Vec3 {
        if self.duration <= 0.0 {
            return Vec3::ZERO;
        }
        if uniform_velocity {
            self.get_up_at_distance(self.time_to_distance(time), space)
        } else {
            self.get_up_at_key(self.time_to_key(time), space)
        }
    }

    pub fn get_right_at_time(&self, time: f32, space: Space, uniform_velocity: bool) -> Vec3 {
        if self.duration <= 0.0 {
            return Vec3::ZERO;
        }
        if uniform_velocity {
            self.get_right_at_distance(self.time_to_distance(time), space)
        } else {
            self.get_right_at_key(self.time_to_key(time), space)
        }
    }

    pub fn get_scale_at_time(&self, time: f32, uniform_velocity: bool) -> Vec3 {
        if self.duration <= 0.0 {
            return Vec3::ONE;
        }
        if uniform_velocity {
            self.get_scale_at_distance(self.time_to_distance(time))
        } else {
            self.get_scale_at_key(self.time_to_key(time))
        }
    }

    // ── Nächster-Punkt-Abfragen ──

    /// Spline-Input-Key des Kurvenpunkts mit minimalem Abstand zum
    /// Abfragepunkt; `0.0` bei leerem Spline.
    pub fn find_key_closest_to_point(&self, point: Vec3, space: Space) -> f32 {
        self.assert_fresh();
        let local = space.inverse_point(point);
        self.position_curve
            .find_nearest_key(local)
            .map_or(0.0, |hit| hit.key)
    }

    /// Vollständiges Suchergebnis inklusive Abstand und Segment.
    pub fn find_nearest(&self, point: Vec3, space: Space) -> Option<NearestHit> {
        self.assert_fresh();
        let local = space.inverse_point(point);
        self.position_curve.find_nearest_key(local)
    }

    pub fn find_distance_closest_to_point(&self, point: Vec3, space: Space) -> f32 {
        self.get_distance_at_spline_input_key(self.find_key_closest_to_point(point, space))
    }

    pub fn find_position_closest_to_point(&self, point: Vec3, space: Space) -> Vec3 {
        self.get_position_at_key(self.find_key_closest_to_point(point, space), space)
    }

    pub fn find_rotation_closest_to_point(&self, point: Vec3, space: Space) -> Quat {
        self.get_rotation_at_key(self.find_key_closest_to_point(point, space), space)
    }

    pub fn find_forward_closest_to_point(&self, point: Vec3, space: Space) -> Vec3 {
        self.get_forward_at_key(self.find_key_closest_to_point(point, space), space)
    }

    pub fn find_up_closest_to_point(&self, point: Vec3, space: Space) -> Vec3 {
        self.get_up_at_key(self.find_key_closest_to_point(point, space), space)
    }

    pub fn find_right_closest_to_point(&self, point: Vec3, space: Space) -> Vec3 {
        self.get_right_at_key(self.find_key_closest_to_point(point, space), space)
    }

    pub fn find_roll_closest_to_point(&self, point: Vec3, space: Space) -> f32 {
        self.get_roll_at_key(self.find_key_closest_to_point(point, space), space)
    }

    pub fn find_scale_closest_to_point(&self, point: Vec3, space: Space) -> Vec3 {
        self.get_scale_at_key(self.find_key_closest_to_point(point, space))
    }

    // ── Bounds ──

    /// Achsen-parallele Bounds über alle Segmente; `None` mit weniger
    /// als zwei Punkten. Im Welt-Raum werden die Eckpunkte der lokalen
    /// Box transformiert, das Ergebnis bleibt achsen-parallel.
    pub fn compute_bounds(&self, space: Space) -> Option<Bounds> {
        self.assert_fresh();
        let count = self.point_count();
        if count < 2 {
            return None;
        }

        let mut bounds: Option<Bounds> = None;
        for segment in 0..self.segment_count() {
            let this_point = self.position_curve[segment];
            let next_index = if self.closed && segment == count - 1 {
                0
            } else {
                segment + 1
            };
            let next_point = self.position_curve[next_index];

            let segment_bounds = curve_math::compute_bounds(
                this_point.value,
                this_point.out_tangent,
                next_point.value,
                next_point.in_tangent,
            );
            match &mut bounds {
                Some(b) => b.encapsulate(&segment_bounds),
                None => bounds = Some(segment_bounds),
            }
        }

        bounds.map(|b| match space {
            Space::Local => b,
            Space::World(transform) => Bounds::from_points(
                transform.transform_point(b.min),
                transform.transform_point(b.max),
            ),
        })
    }
}
