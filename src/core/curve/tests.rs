use super::*;

fn ramp(count: usize) -> Curve<f32> {
    let mut curve = Curve::new();
    for i in 0..count {
        curve.add(Keyframe::new(i as f32, i as f32 * 10.0));
    }
    curve
}

// ── Bracket-Auflösung ──

#[test]
fn test_bracket_inside_segment() {
    let curve = ramp(4);
    let bracket = curve.find_bracket(1.5).unwrap();
    assert_eq!(bracket.lhs, 1);
    assert_eq!(bracket.rhs, 2);
    assert!(!bracket.loop_segment);
    assert_eq!(curve.find_bracket_t(&bracket, 1.5), 0.5);
}

#[test]
fn test_bracket_clamps_before_first() {
    let curve = ramp(3);
    let bracket = curve.find_bracket(-2.0).unwrap();
    assert_eq!(bracket.lhs, 0);
    assert_eq!(bracket.rhs, 0);
    assert_eq!(curve.find_bracket_t(&bracket, -2.0), 0.0);
}

#[test]
fn test_bracket_clamps_after_last_when_open() {
    let curve = ramp(3);
    let bracket = curve.find_bracket(10.0).unwrap();
    assert_eq!(bracket.lhs, 2);
    assert_eq!(bracket.rhs, 2);
}

#[test]
fn test_bracket_empty_curve() {
    let curve: Curve<f32> = Curve::new();
    assert!(curve.find_bracket(0.0).is_none());
}

#[test]
fn test_bracket_exact_key_hit() {
    let curve = ramp(4);
    let bracket = curve.find_bracket(2.0).unwrap();
    assert_eq!(bracket.lhs, 2);
    assert_eq!(bracket.rhs, 3);
    assert_eq!(curve.find_bracket_t(&bracket, 2.0), 0.0);
}

// ── Loop ──

#[test]
fn test_loop_wrap_segment() {
    let mut curve = ramp(3);
    curve.set_loop_key(3.0);
    let bracket = curve.find_bracket(2.5).unwrap();
    assert_eq!(bracket.lhs, 2);
    assert_eq!(bracket.rhs, 0);
    assert!(bracket.loop_segment);
    assert_eq!(bracket.left_key, 2.0);
    assert_eq!(bracket.right_key, 3.0);
    assert_eq!(curve.find_bracket_t(&bracket, 2.5), 0.5);
}

#[test]
fn test_loop_key_past_wrap_end_clamps_to_start() {
    let mut curve = ramp(3);
    curve.set_loop_key(3.0);
    let bracket = curve.find_bracket(3.0).unwrap();
    assert_eq!(bracket.lhs, 0);
    assert_eq!(bracket.rhs, 0);
}

#[test]
fn test_clear_loop_key() {
    let mut curve = ramp(3);
    curve.set_loop_key(3.0);
    curve.clear_loop_key();
    assert!(!curve.looped());
    let bracket = curve.find_bracket(2.5).unwrap();
    assert_eq!(bracket.lhs, 2);
    assert_eq!(bracket.rhs, 2);
}

// ── Cache ──

#[test]
fn test_cache_survives_repeated_queries() {
    let curve = ramp(5);
    for _ in 0..3 {
        let bracket = curve.find_bracket(2.2).unwrap();
        assert_eq!(bracket.lhs, 2);
        assert_eq!(bracket.rhs, 3);
    }
}

#[test]
fn test_insert_resets_cache() {
    let mut curve = ramp(3);
    let _ = curve.find_bracket(1.5);
    curve.insert(1, Keyframe::new(0.5, 5.0));
    // Nach dem Insert zeigt der alte Cache-Index auf ein anderes Segment.
    let bracket = curve.find_bracket(0.7).unwrap();
    assert_eq!(bracket.lhs, 1);
    assert_eq!(bracket.rhs, 2);
}

#[test]
fn test_warm_cache_resolves_exact_key_like_cold_path() {
    let curve = ramp(4);
    let _ = curve.find_bracket(1.5);
    // Key exakt auf Keyframe 2: gehört zum Segment [2, 3], nicht zum
    // noch gecachten Segment [1, 2].
    let bracket = curve.find_bracket(2.0).unwrap();
    assert_eq!(bracket.lhs, 2);
    assert_eq!(bracket.rhs, 3);
    assert_eq!(curve.find_bracket_t(&bracket, 2.0), 0.0);
}

#[test]
fn test_get_mut_bumps_version_and_resets_cache() {
    let mut curve = ramp(3);
    let before = curve.version();
    let _ = curve.find_bracket(1.5);
    if let Some(k) = curve.get_mut(1) {
        k.key = 1.7;
    }
    assert!(curve.version() > before);
    let bracket = curve.find_bracket(1.5).unwrap();
    assert_eq!(bracket.lhs, 0);
    assert_eq!(bracket.rhs, 1);
}

// ── Mutationen ──

#[test]
fn test_remove_at_returns_keyframe() {
    let mut curve = ramp(3);
    let removed = curve.remove_at(1);
    assert_eq!(removed.value, 10.0);
    assert_eq!(curve.len(), 2);
}

#[test]
fn test_reverse_keeps_key_schedule() {
    let mut curve: Curve<f32> = Curve::new();
    let mut a = Keyframe::new(0.0, 1.0);
    a.in_tangent = -1.0;
    a.out_tangent = 2.0;
    let b = Keyframe::new(1.0, 5.0);
    let c = Keyframe::new(2.0, 9.0);
    curve.add(a);
    curve.add(b);
    curve.add(c);
    curve.reverse();
    assert_eq!(curve[0].key, 0.0);
    assert_eq!(curve[0].value, 9.0);
    assert_eq!(curve[2].key, 2.0);
    assert_eq!(curve[2].value, 1.0);
    // Tangenten haben Seite und Vorzeichen gewechselt.
    assert_eq!(curve[2].in_tangent, -2.0);
    assert_eq!(curve[2].out_tangent, 1.0);
}

#[test]
fn test_find_index_for_key() {
    let curve = ramp(4);
    assert_eq!(curve.find_index_for_key(-0.1), None);
    assert_eq!(curve.find_index_for_key(0.0), Some(0));
    assert_eq!(curve.find_index_for_key(2.9), Some(2));
    assert_eq!(curve.find_index_for_key(99.0), Some(3));
}

// ── Serde ──

#[test]
fn test_serde_roundtrip_skips_cache() {
    let mut curve = ramp(3);
    curve.set_loop_key(3.0);
    let _ = curve.find_bracket(2.5);
    let json = serde_json::to_string(&curve).unwrap();
    let restored: Curve<f32> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.len(), 3);
    assert!(restored.looped());
    assert_eq!(restored.loop_key_offset(), 1.0);
    // Frischer Cache nach Deserialisierung, Abfragen bleiben korrekt.
    let bracket = restored.find_bracket(1.5).unwrap();
    assert_eq!(bracket.lhs, 1);
    assert_eq!(bracket.rhs, 2);
}
