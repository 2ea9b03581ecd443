//! Generischer Keyframe-Container mit Segment-Cache und Loop-Unterstützung.
//!
//! Eine [`Curve`] hält ihre Keyframes aufsteigend nach `key` sortiert.
//! Der [`CurveCache`] merkt sich das zuletzt getroffene Segment, damit
//! aufeinanderfolgende Abfragen mit ähnlichen Keys in O(1) auflösen.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::ops::{Index, Neg};

/// Interpolationsmodus eines Keyframes für das Segment rechts von ihm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TangentMode {
    /// Tangenten werden vom Aufrufer gesetzt und nicht angefasst.
    #[default]
    Free,
    /// Tangenten werden beim Rebuild per Catmull-Rom aus den Nachbarn berechnet.
    Auto,
    /// Lineares Segment, Tangenten werden ignoriert.
    Linear,
    /// Treppenstufe: der Wert springt erst am rechten Keyframe um.
    Constant,
    /// Wie `Auto`, aber ohne Überschwingen über die Nachbarwerte hinaus.
    ClampedAuto,
}

/// Ein einzelner Stützpunkt einer Kurve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// Position auf der Kurvenachse (Spline-Input-Key).
    pub key: f32,
    pub value: T,
    pub in_tangent: T,
    pub out_tangent: T,
    pub mode: TangentMode,
}

impl<T: Copy + Default> Keyframe<T> {
    pub fn new(key: f32, value: T) -> Self {
        Self {
            key,
            value,
            in_tangent: T::default(),
            out_tangent: T::default(),
            mode: TangentMode::default(),
        }
    }
}

/// Zuletzt aufgelöstes Segment einer Kurve.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurveCache {
    pub lhs_index: usize,
    pub rhs_index: usize,
    pub loop_segment: bool,
}

/// Aufgelöstes Segment für einen Abfrage-Key.
///
/// `right_key` ist bei einem Loop-Segment bereits um den Loop-Offset
/// verschoben, so dass `left_key <= key <= right_key` gilt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyBracket {
    pub lhs: usize,
    pub rhs: usize,
    pub loop_segment: bool,
    pub left_key: f32,
    pub right_key: f32,
}

/// Keyframe-Kurve über einem beliebigen Wertetyp.
///
/// Der Segment-Cache macht `Curve` absichtlich `!Sync`; geteilte
/// Auswertung über Threads hinweg braucht eine Kopie pro Thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curve<T> {
    pub(crate) keyframes: Vec<Keyframe<T>>,
    looped: bool,
    loop_key_offset: f32,
    #[serde(skip)]
    cache: Cell<CurveCache>,
    version: u64,
}

impl<T> Default for Curve<T> {
    fn default() -> Self {
        Self {
            keyframes: Vec::new(),
            looped: false,
            loop_key_offset: 0.0,
            cache: Cell::new(CurveCache::default()),
            version: 0,
        }
    }
}

impl<T> Curve<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keyframes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.keyframes.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.keyframes.reserve(additional);
    }

    pub fn get(&self, index: usize) -> Option<&Keyframe<T>> {
        self.keyframes.get(index)
    }

    /// Mutabler Zugriff invalidiert den Segment-Cache und zählt die
    /// Version hoch, da der Aufrufer Keys und Werte ändern kann.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Keyframe<T>> {
        self.cache.set(CurveCache::default());
        self.version = self.version.wrapping_add(1);
        self.keyframes.get_mut(index)
    }

    pub fn last(&self) -> Option<&Keyframe<T>> {
        self.keyframes.last()
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    /// Hängt einen Keyframe ans Ende an. Der Aufrufer garantiert die
    /// Key-Ordnung.
    pub fn add(&mut self, keyframe: Keyframe<T>) {
        self.keyframes.push(keyframe);
        self.version = self.version.wrapping_add(1);
    }

    /// Fügt einen Keyframe an `index` ein, nachfolgende rücken auf.
    pub fn insert(&mut self, index: usize, keyframe: Keyframe<T>) {
        self.keyframes.insert(index, keyframe);
        self.cache.set(CurveCache::default());
        self.version = self.version.wrapping_add(1);
    }

    pub fn remove_at(&mut self, index: usize) -> Keyframe<T> {
        let removed = self.keyframes.remove(index);
        self.cache.set(CurveCache::default());
        self.version = self.version.wrapping_add(1);
        removed
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
        self.looped = false;
        self.loop_key_offset = 0.0;
        self.cache.set(CurveCache::default());
        self.version = self.version.wrapping_add(1);
    }

    pub fn clear_cache(&self) {
        self.cache.set(CurveCache::default());
    }

    pub fn looped(&self) -> bool {
        self.looped
    }

    /// Key-Distanz vom letzten Keyframe zurück zum ersten.
    pub fn loop_key_offset(&self) -> f32 {
        self.loop_key_offset
    }

    /// Aktiviert das Wrap-Segment vom letzten zurück zum ersten Keyframe.
    ///
    /// `loop_key` ist die absolute Key-Position, an der die Kurve wieder
    /// den ersten Keyframe erreicht. Liegt sie nicht hinter dem letzten
    /// Keyframe, wird das Looping stattdessen deaktiviert.
    pub fn set_loop_key(&mut self, loop_key: f32) {
        match self.keyframes.last() {
            Some(last) if loop_key > last.key => {
                self.looped = true;
                self.loop_key_offset = loop_key - last.key;
            }
            _ => self.looped = false,
        }
        self.cache.set(CurveCache::default());
        self.version = self.version.wrapping_add(1);
    }

    pub fn clear_loop_key(&mut self) {
        self.looped = false;
        self.loop_key_offset = 0.0;
        self.cache.set(CurveCache::default());
        self.version = self.version.wrapping_add(1);
    }

    /// Zähler, der bei jeder strukturellen Änderung hochgezählt wird.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Markiert die Kurve nach einer internen Mutation als geändert.
    pub(crate) fn touch(&mut self) {
        self.cache.set(CurveCache::default());
        self.version = self.version.wrapping_add(1);
    }
}

impl<T: Copy + Neg<Output = T>> Curve<T> {
    /// Kehrt die Keyframe-Reihenfolge um und behält dabei das
    /// Key-Raster bei. Tangenten wechseln Seite und Vorzeichen, damit
    /// die Rückrichtung dieselbe Bahn abfährt.
    pub fn reverse(&mut self) {
        let count = self.keyframes.len();
        if count < 2 {
            return;
        }
        let keys: Vec<f32> = self.keyframes.iter().map(|k| k.key).collect();
        self.keyframes.reverse();
        for (i, keyframe) in self.keyframes.iter_mut().enumerate() {
            keyframe.key = keys[i];
            let in_tangent = keyframe.in_tangent;
            keyframe.in_tangent = -keyframe.out_tangent;
            keyframe.out_tangent = -in_tangent;
        }
        self.cache.set(CurveCache::default());
        self.version = self.version.wrapping_add(1);
    }
}

impl<T: Copy> Curve<T> {
    /// Index des letzten Keyframes mit `keyframe.key <= key`.
    ///
    /// `None` für leere Kurven und Keys vor dem ersten Keyframe.
    pub fn find_index_for_key(&self, key: f32) -> Option<usize> {
        if self.keyframes.is_empty() || key < self.keyframes[0].key {
            return None;
        }
        let mut lo = 0;
        let mut hi = self.keyframes.len();
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.keyframes[mid].key <= key {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(lo)
    }

    /// Löst den Abfrage-Key zu einem Segment auf.
    ///
    /// Der Cache-Treffer vermeidet die binäre Suche, wenn der Key im
    /// zuletzt getroffenen Segment liegt. `None` nur bei leerer Kurve.
    pub fn find_bracket(&self, key: f32) -> Option<KeyBracket> {
        let count = self.keyframes.len();
        if count == 0 {
            return None;
        }

        let cached = self.cache.get();
        // Wrap-Segmente nehmen nie den Schnellpfad, deren Key-Intervall
        // ist nicht monoton. Die Obergrenze ist strikt: ein Key exakt auf
        // einem Keyframe gehört zum rechts anschließenden Segment, sonst
        // hinge das Ergebnis vom Cache-Zustand ab.
        if !cached.loop_segment && cached.lhs_index != cached.rhs_index && cached.rhs_index < count
        {
            let left_key = self.keyframes[cached.lhs_index].key;
            let right_key = self.keyframes[cached.rhs_index].key;
            if left_key <= key && key < right_key {
                return Some(KeyBracket {
                    lhs: cached.lhs_index,
                    rhs: cached.rhs_index,
                    loop_segment: false,
                    left_key,
                    right_key,
                });
            }
        }

        let bracket = self.resolve_bracket(key, count);
        self.cache.set(CurveCache {
            lhs_index: bracket.lhs,
            rhs_index: bracket.rhs,
            loop_segment: bracket.loop_segment,
        });
        Some(bracket)
    }

    fn resolve_bracket(&self, key: f32, count: usize) -> KeyBracket {
        let last = count - 1;
        let index = match self.find_index_for_key(key) {
            // Vor dem ersten Keyframe: auf den Anfang klemmen.
            None => {
                let k = self.keyframes[0].key;
                return KeyBracket {
                    lhs: 0,
                    rhs: 0,
                    loop_segment: false,
                    left_key: k,
                    right_key: k,
                };
            }
            Some(i) => i,
        };

        if index >= last {
            if !self.looped {
                let k = self.keyframes[last].key;
                return KeyBracket {
                    lhs: last,
                    rhs: last,
                    loop_segment: false,
                    left_key: k,
                    right_key: k,
                };
            }
            let wrap_end = self.keyframes[last].key + self.loop_key_offset;
            if key >= wrap_end {
                // Hinter dem Loop-Ende: auf den Anfang klemmen.
                let k = self.keyframes[0].key;
                return KeyBracket {
                    lhs: 0,
                    rhs: 0,
                    loop_segment: false,
                    left_key: k,
                    right_key: k,
                };
            }
            return KeyBracket {
                lhs: last,
                rhs: 0,
                loop_segment: true,
                left_key: self.keyframes[last].key,
                right_key: wrap_end,
            };
        }

        KeyBracket {
            lhs: index,
            rhs: index + 1,
            loop_segment: false,
            left_key: self.keyframes[index].key,
            right_key: self.keyframes[index + 1].key,
        }
    }

    /// Normierter Segment-Parameter `t` für einen aufgelösten Bracket.
    pub fn find_bracket_t(&self, bracket: &KeyBracket, key: f32) -> f32 {
        let dx = bracket.right_key - bracket.left_key;
        if dx <= 0.0 {
            return 0.0;
        }
        ((key - bracket.left_key) / dx).clamp(0.0, 1.0)
    }
}

impl<T> Index<usize> for Curve<T> {
    type Output = Keyframe<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.keyframes[index]
    }
}

#[cfg(test)]
#[path = "curve/tests.rs"]
mod tests;
