//! End-to-end derby scenarios.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

use crate::collision::PairingMode;
use crate::config::DerbyConfig;
use crate::entity::{EntityId, VehicleKind};
use crate::error::DerbyError;
use crate::event::DerbyEvent;
use crate::render::{Easing, RenderBackend};
use crate::simulation::Derby;

use super::helpers::{
    collision_count, failing_derby, position_of, run_script, seeded_derby, spawn_one_of_each,
};

// =============================================================================
// Movement
// =============================================================================

#[test]
fn sedan_reappears_at_left_overhang() {
    let mut derby = seeded_derby(1);
    let sedan = derby
        .spawn_at(VehicleKind::Sedan, Vec2::new(0.0, 300.0))
        .unwrap();

    derby.advance(4_999);
    assert!(position_of(&derby, sedan).x < 800.0);

    derby.advance(1);
    assert_eq!(position_of(&derby, sedan), Vec2::new(-50.0, 300.0));

    // Second lap covers the full width plus the overhang in the same time.
    derby.advance(2_500);
    assert_eq!(position_of(&derby, sedan).x, 375.0);
}

#[test]
fn police_car_wraps_to_top() {
    let mut derby = seeded_derby(1);
    let cop = derby
        .spawn_at(VehicleKind::PoliceCar, Vec2::new(300.0, 300.0))
        .unwrap();

    derby.advance(5_000);
    assert_eq!(position_of(&derby, cop), Vec2::new(300.0, 0.0));
}

#[test]
fn motorcycle_wraps_both_axes() {
    let mut derby = seeded_derby(1);
    let moto = derby
        .spawn_at(VehicleKind::Motorcycle, Vec2::new(400.0, 300.0))
        .unwrap();

    derby.advance(2_500);
    assert_eq!(position_of(&derby, moto), Vec2::new(-50.0, 0.0));
}

#[test]
fn tank_wraps_to_bottom_right() {
    let mut derby = seeded_derby(1);
    let tank = derby
        .spawn_at(VehicleKind::Tank, Vec2::new(400.0, 300.0))
        .unwrap();

    derby.advance(10_000);
    assert_eq!(position_of(&derby, tank), Vec2::new(800.0, 600.0));
}

#[test]
fn swing_easing_reaches_the_same_edges() {
    let config = DerbyConfig {
        easing: Easing::Swing,
        ..DerbyConfig::default()
    };
    let mut derby = Derby::new(config).unwrap();
    let sedan = derby
        .spawn_at(VehicleKind::Sedan, Vec2::new(0.0, 0.0))
        .unwrap();

    derby.advance(1_000);
    // Swing starts slower than linear (160 px after 1s).
    assert!(position_of(&derby, sedan).x < 160.0);

    derby.advance(4_000);
    assert_eq!(position_of(&derby, sedan).x, -50.0);
}

#[test]
fn positions_stay_inside_overhang_band() {
    let mut derby = seeded_derby(9);
    spawn_one_of_each(&mut derby);
    spawn_one_of_each(&mut derby);

    for _ in 0..60 {
        derby.advance(500);
        for vehicle in derby.snapshot().vehicles {
            let bounds = vehicle.bounds.unwrap();
            assert!((-50.0..=800.0).contains(&bounds.left), "{vehicle:?}");
            assert!((-50.0..=600.0).contains(&bounds.top), "{vehicle:?}");
        }
    }
}

// =============================================================================
// Collisions and damage
// =============================================================================

#[test]
fn two_collisions_destroy_a_sedan_and_no_third_follows() {
    let mut derby = Derby::new(DerbyConfig {
        pairing: PairingMode::Unordered,
        ..DerbyConfig::default()
    })
    .unwrap();
    let sedan = derby
        .spawn_at(VehicleKind::Sedan, Vec2::new(100.0, 100.0))
        .unwrap();
    let tank = derby
        .spawn_at(VehicleKind::Tank, Vec2::new(110.0, 100.0))
        .unwrap();
    derby.drain_events();

    derby.tick();
    derby.tick();
    derby.tick();

    let events = derby.drain_events();
    assert_eq!(collision_count(&events), 2);
    let destroyed: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            DerbyEvent::Destroyed { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(destroyed, vec![sedan]);
    assert_eq!(derby.arena().get(tank).unwrap().damage_points(), 2);
}

#[test]
fn damage_is_monotone_and_destruction_happens_once() {
    let mut derby = seeded_derby(3);
    for _ in 0..4 {
        spawn_one_of_each(&mut derby);
    }
    derby.advance(60_000);

    let mut last_points: BTreeMap<EntityId, u32> = BTreeMap::new();
    let mut destroyed: BTreeSet<EntityId> = BTreeSet::new();
    for event in derby.drain_events() {
        match event {
            DerbyEvent::Damaged { id, points, .. } => {
                assert!(!destroyed.contains(&id), "{id} damaged after destruction");
                let previous = last_points.insert(id, points).unwrap_or(0);
                assert_eq!(points, previous + 1);
            }
            DerbyEvent::Destroyed {
                id, damage_points, kind, ..
            } => {
                assert!(destroyed.insert(id), "{id} destroyed twice");
                assert_eq!(damage_points, kind.profile().damage_tolerance);
            }
            DerbyEvent::Collision { first, second, .. } => {
                assert!(!destroyed.contains(&first));
                assert!(!destroyed.contains(&second));
            }
            _ => {}
        }
    }

    for vehicle in derby.arena().vehicles() {
        assert!(vehicle.damage_points() < vehicle.damage_tolerance());
        assert!(!destroyed.contains(&vehicle.id()));
    }
    assert_eq!(
        derby.renderer().visual_count(),
        derby.arena().len(),
        "every destroyed vehicle releases its visual"
    );
}

#[test]
fn coincident_tanks_ride_together_unharmed() {
    let mut derby = seeded_derby(1);
    let a = derby
        .spawn_at(VehicleKind::Tank, Vec2::new(250.0, 250.0))
        .unwrap();
    let b = derby
        .spawn_at(VehicleKind::Tank, Vec2::new(250.0, 250.0))
        .unwrap();

    derby.advance(30_000);

    assert_eq!(collision_count(&derby.drain_events()), 0);
    assert_eq!(position_of(&derby, a), position_of(&derby, b));
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn toggling_sirens_twice_restores_quiet() {
    let mut derby = seeded_derby(2);
    let ids = spawn_one_of_each(&mut derby);

    derby.toggle_sirens();
    derby.advance(1_000);
    derby.toggle_sirens();

    let snapshot = derby.snapshot();
    assert!(!snapshot.sirens_blinking);
    assert!(snapshot.vehicles.iter().all(|v| !v.siren_on));
    let toggles = derby
        .drain_events()
        .iter()
        .filter(|e| matches!(e, DerbyEvent::SirensToggled { .. }))
        .count();
    assert_eq!(toggles, 2);
    assert_eq!(ids.len(), 4);
}

#[test]
fn shifting_gears_twice_resumes_forward_travel() {
    let mut derby = seeded_derby(2);
    let sedan = derby
        .spawn_at(VehicleKind::Sedan, Vec2::new(400.0, 100.0))
        .unwrap();

    derby.shift_gears();
    derby.advance(1_000);
    let reversed_at = position_of(&derby, sedan).x;
    assert!(reversed_at < 400.0);

    derby.shift_gears();
    derby.advance(1_000);
    assert!(position_of(&derby, sedan).x > reversed_at);
    assert!(!derby.arena().get(sedan).unwrap().is_reversed());
}

#[test]
fn removed_vehicle_stale_completion_never_rearms() {
    let mut derby = seeded_derby(4);
    let moto = derby
        .spawn_at(VehicleKind::Motorcycle, Vec2::new(10.0, 10.0))
        .unwrap();
    let sedan = derby
        .spawn_at(VehicleKind::Sedan, Vec2::new(500.0, 500.0))
        .unwrap();

    derby.advance(2_000);
    derby.remove(moto);
    derby.advance(20_000);

    assert!(!derby.arena().contains(moto));
    assert!(derby.arena().contains(sedan));
    assert_eq!(derby.renderer().visual_count(), 1);
}

// =============================================================================
// Backend failures
// =============================================================================

#[test]
fn failed_create_leaves_arena_unchanged() {
    let mut derby = failing_derby();
    derby.renderer_mut().fail_create = true;
    let next = derby.arena().next_id();

    let err = derby.spawn(VehicleKind::Sedan).unwrap_err();

    assert!(matches!(err, DerbyError::Render(_)));
    assert!(derby.arena().is_empty());
    assert_eq!(derby.arena().next_id(), next);
    assert!(derby.drain_events().is_empty());
}

#[test]
fn failed_first_animation_discards_visual() {
    let mut derby = failing_derby();
    // Motorcycle needs two animations; the second is refused.
    derby.renderer_mut().animate_budget = Some(1);

    let err = derby
        .spawn_at(VehicleKind::Motorcycle, Vec2::new(10.0, 10.0))
        .unwrap_err();

    assert!(matches!(err, DerbyError::Render(_)));
    assert!(derby.arena().is_empty());
    assert_eq!(derby.renderer().inner.visual_count(), 0);
    assert_eq!(derby.renderer().next_completion(), None);

    // The ID was never consumed.
    derby.renderer_mut().animate_budget = None;
    let id = derby.spawn(VehicleKind::Tank).unwrap();
    assert_eq!(id, EntityId::new(0));
}

#[test]
fn failed_siren_style_rejects_police_spawn() {
    let mut derby = failing_derby();
    derby.toggle_sirens();
    derby.renderer_mut().fail_style = true;

    assert!(derby.spawn(VehicleKind::PoliceCar).is_err());
    assert!(derby.arena().is_empty());
    assert_eq!(derby.renderer().inner.visual_count(), 0);

    // Kinds without a siren are unaffected.
    assert!(derby.spawn(VehicleKind::Sedan).is_ok());
}

#[test]
fn failed_rearm_stops_that_loop_only() {
    let mut derby = failing_derby();
    let sedan = derby
        .spawn_at(VehicleKind::Sedan, Vec2::new(100.0, 100.0))
        .unwrap();
    derby.renderer_mut().animate_budget = Some(0);

    derby.advance(6_000);

    assert!(derby.arena().contains(sedan));
    assert_eq!(position_of(&derby, sedan).x, -50.0);
    assert_eq!(derby.renderer().next_completion(), None);
    assert_eq!(derby.tick_count(), 8);
}

#[test]
fn scripted_run_on_failing_backend_matches_headless() {
    let mut headless = seeded_derby(0);
    let mut wrapped = failing_derby();

    run_script(&mut headless);
    run_script(&mut wrapped);

    assert_eq!(headless.snapshot(), wrapped.snapshot());
}

#[test]
fn undelivered_completion_does_not_stall_ticks() {
    let mut derby = failing_derby();
    derby.renderer_mut().phantom_completion = Some(100);

    derby.run_until(7_500);

    assert_eq!(derby.tick_count(), 10);
    assert_eq!(derby.now_ms(), 7_500);
}

#[test]
fn undelivered_completion_keeps_real_traversals_running() {
    let mut derby = failing_derby();
    let sedan = derby
        .spawn_at(VehicleKind::Sedan, Vec2::new(0.0, 300.0))
        .unwrap();
    derby.renderer_mut().phantom_completion = Some(100);

    derby.advance(5_000);

    assert_eq!(position_of(&derby, sedan), Vec2::new(-50.0, 300.0));
    assert_eq!(derby.tick_count(), 6);
}
