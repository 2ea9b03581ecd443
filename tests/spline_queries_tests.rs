//! End-to-End-Tests über die öffentliche Spline-API.

use approx::assert_relative_eq;
use glam::{Quat, Vec3};
use spline_engine::{Space, Spline, SplineEvent, Transform};

fn closed_ring(radius: f32, segments: usize) -> Spline {
    let mut spline = Spline::new();
    for i in 0..segments {
        let angle = std::f32::consts::TAU * i as f32 / segments as f32;
        spline.add_point(
            Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin()),
            Space::Local,
        );
    }
    spline.set_closed(true);
    spline.update_spline();
    spline
}

#[test]
fn test_ring_length_approximates_circumference() {
    let spline = closed_ring(10.0, 16);
    let circumference = std::f32::consts::TAU * 10.0;
    let error = (spline.spline_length() - circumference).abs() / circumference;
    assert!(error < 0.02, "Längenfehler {error}");
}

#[test]
fn test_distance_walk_stays_on_ring() {
    let spline = closed_ring(10.0, 16);
    let total = spline.spline_length();
    for step in 0..32 {
        let distance = total * step as f32 / 32.0;
        let p = spline.get_position_at_distance(distance, Space::Local);
        assert_relative_eq!(p.length(), 10.0, epsilon = 0.2);
    }
}

#[test]
fn test_uniform_time_walk_has_constant_speed() {
    let mut spline = closed_ring(10.0, 16);
    spline.set_duration(2.0);
    spline.update_spline();

    let mut previous = spline.get_position_at_time(0.0, Space::Local, true);
    let mut step_lengths = Vec::new();
    for step in 1..=20 {
        let time = 2.0 * step as f32 / 20.0;
        let p = spline.get_position_at_time(time, Space::Local, true);
        step_lengths.push((p - previous).length());
        previous = p;
    }
    let min = step_lengths.iter().cloned().fold(f32::MAX, f32::min);
    let max = step_lengths.iter().cloned().fold(0.0f32, f32::max);
    assert!(max - min < 0.5, "Schrittweiten schwanken: {min}..{max}");
}

#[test]
fn test_nearest_point_from_world_space() {
    let spline = closed_ring(10.0, 16);
    let host = Transform {
        translation: Vec3::new(500.0, 0.0, 0.0),
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };
    // Punkt knapp außerhalb des Rings bei Winkel 0.
    let world_query = Vec3::new(512.0, 0.0, 0.0);
    let nearest = spline.find_position_closest_to_point(world_query, Space::World(host));
    assert_relative_eq!(nearest.x, 510.0, epsilon = 0.3);
    assert_relative_eq!(nearest.z, 0.0, epsilon = 0.3);
}

#[test]
fn test_reverse_preserves_total_length() {
    let mut spline = closed_ring(10.0, 16);
    let before = spline.spline_length();
    spline.reverse();
    spline.update_spline();
    assert_relative_eq!(spline.spline_length(), before, epsilon = 1e-2);
}

#[test]
fn test_editing_session_event_stream() {
    let mut spline = Spline::new();
    spline.add_point(Vec3::ZERO, Space::Local);
    spline.add_point(Vec3::new(10.0, 0.0, 0.0), Space::Local);
    spline.update_spline();
    spline.take_events();

    spline.insert_point_at_index(1, Vec3::new(5.0, 0.0, 2.0), Space::Local);
    spline.remove_point_at_index(0);
    spline.update_spline();

    assert_eq!(
        spline.take_events(),
        vec![
            SplineEvent::PointAdded(1),
            SplineEvent::PointRemoved(0),
            SplineEvent::Updated
        ]
    );
    assert_eq!(spline.point_count(), 2);
    assert_eq!(spline.get_key_at_index(0), 0.0);
}

#[test]
fn test_forward_and_up_frames_on_ring() {
    let spline = closed_ring(10.0, 16);
    let total = spline.spline_length();
    for step in 0..16 {
        let distance = total * step as f32 / 16.0;
        let forward = spline.get_forward_at_distance(distance, Space::Local);
        let up = spline.get_up_at_distance(distance, Space::Local);
        // Ring liegt in der XZ-Ebene, Up zeigt stets nach oben.
        assert_relative_eq!(forward.length(), 1.0, epsilon = 1e-3);
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-2);
    }
}
