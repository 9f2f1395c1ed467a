use rand::rngs::StdRng;
use rand::SeedableRng;

use wave_shooter::config::{EnemyConfig, RunConfig, WaveConfig};
use wave_shooter::enemy::*;
use wave_shooter::entities::*;
use wave_shooter::run::new_run;
use wave_shooter::spawner::*;

fn active(mode: GameMode) -> RunState {
    RunState {
        phase: Phase::Active,
        ..new_run(mode, &RunConfig::default())
    }
}

fn make_enemy(kind: EnemyKind) -> Enemy {
    Enemy {
        id: 1,
        x: 10.0,
        y: 5.0,
        kind,
        speed: 3.0,
        status: EnemyStatus::Alive,
    }
}

// ── Spawner ──────────────────────────────────────────────────────────────────

#[test]
fn forced_points_are_always_special() {
    let mut rng = StdRng::seed_from_u64(42);
    for mode in [GameMode::Timed, GameMode::Survival] {
        for _ in 0..100 {
            assert!(resolve_kind(mode, true, 0.0, &mut rng).is_special());
        }
    }
}

#[test]
fn forced_points_yield_both_special_kinds() {
    let mut rng = StdRng::seed_from_u64(42);
    let kinds: Vec<EnemyKind> = (0..100)
        .map(|_| resolve_kind(GameMode::Timed, true, 0.0, &mut rng))
        .collect();
    assert!(kinds.contains(&EnemyKind::TimeAdd));
    assert!(kinds.contains(&EnemyKind::TimeSubtract));
}

#[test]
fn survival_rolls_only_normal_enemies() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        assert_eq!(resolve_kind(GameMode::Survival, false, 1.0, &mut rng), EnemyKind::Normal);
    }
}

#[test]
fn timed_chance_extremes() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        assert_eq!(resolve_kind(GameMode::Timed, false, 0.0, &mut rng), EnemyKind::Normal);
        assert!(resolve_kind(GameMode::Timed, false, 1.0, &mut rng).is_special());
    }
}

#[test]
fn timed_chance_is_roughly_a_fifth() {
    let mut rng = StdRng::seed_from_u64(42);
    let specials = (0..10_000)
        .filter(|_| resolve_kind(GameMode::Timed, false, 0.2, &mut rng).is_special())
        .count();
    assert!((1_500..2_500).contains(&specials), "{} specials", specials);
}

#[test]
fn spawned_enemy_takes_event_position_and_config_speed() {
    let mut rng = StdRng::seed_from_u64(42);
    let event = SpawnEvent { x: 12.0, y: 3.0, force_special: false };
    let e = spawn_enemy(
        7,
        &event,
        GameMode::Survival,
        &WaveConfig::default(),
        &EnemyConfig::default(),
        &mut rng,
    );
    assert_eq!(e.id, 7);
    assert_eq!((e.x, e.y), (12.0, 3.0));
    assert_eq!(e.speed, 3.0);
    assert_eq!(e.kind, EnemyKind::Normal);
    assert!(is_alive(&e));
}

// ── Movement ─────────────────────────────────────────────────────────────────

#[test]
fn enemies_drift_straight_down() {
    let e = move_enemy(&make_enemy(EnemyKind::Normal), 0.5);
    assert_eq!(e.x, 10.0);
    assert_eq!(e.y, 6.5);
}

// ── Shot down ────────────────────────────────────────────────────────────────

#[test]
fn normal_hit_scores_and_destroys() {
    let (run, e) = take_hit(&active(GameMode::Timed), &make_enemy(EnemyKind::Normal), &EnemyConfig::default());
    assert_eq!(run.score, 100);
    assert_eq!(run.clock, 45.0);
    assert_eq!(e.status, EnemyStatus::Destroyed);
}

#[test]
fn time_add_hit_scenario() {
    let run = RunState { clock: 10.0, ..active(GameMode::Timed) };
    let (run, _) = take_hit(&run, &make_enemy(EnemyKind::TimeAdd), &EnemyConfig::default());
    assert_eq!(run.clock, 15.0);
    assert_eq!(run.score, 100);
    assert!(run.is_active());
}

#[test]
fn time_subtract_hit_costs_time() {
    let run = RunState { clock: 10.0, ..active(GameMode::Timed) };
    let (run, _) = take_hit(&run, &make_enemy(EnemyKind::TimeSubtract), &EnemyConfig::default());
    assert_eq!(run.clock, 7.0);
    assert_eq!(run.score, 100);
}

#[test]
fn time_enemy_hit_in_survival_only_scores() {
    let run = RunState { clock: 12.0, ..active(GameMode::Survival) };
    let (run, _) = take_hit(&run, &make_enemy(EnemyKind::TimeAdd), &EnemyConfig::default());
    assert_eq!(run.clock, 12.0);
    assert_eq!(run.score, 100);
}

#[test]
fn second_hit_on_a_dead_enemy_is_ignored() {
    let cfg = EnemyConfig::default();
    let (run, e) = take_hit(&active(GameMode::Timed), &make_enemy(EnemyKind::Normal), &cfg);
    let (run2, e2) = take_hit(&run, &e, &cfg);
    assert_eq!(run2, run);
    assert_eq!(e2, e);
}

// ── Reaching the ship ────────────────────────────────────────────────────────

#[test]
fn ramming_normal_in_timed_ends_the_run() {
    let (run, e) = reach_player(&active(GameMode::Timed), &make_enemy(EnemyKind::Normal));
    assert_eq!(run.phase, Phase::Ended { reason: EndReason::GameOver });
    assert_eq!(e.status, EnemyStatus::Destroyed);
}

#[test]
fn ramming_time_enemy_in_timed_is_harmless() {
    let start = active(GameMode::Timed);
    let (run, e) = reach_player(&start, &make_enemy(EnemyKind::TimeSubtract));
    assert_eq!(run, start);
    assert_eq!(e.status, EnemyStatus::Destroyed);
}

#[test]
fn ramming_in_survival_costs_a_life() {
    let (run, _) = reach_player(&active(GameMode::Survival), &make_enemy(EnemyKind::TimeAdd));
    assert_eq!(run.lives, 2);
    assert!(run.is_active());
}

// ── Danger line ──────────────────────────────────────────────────────────────

#[test]
fn normal_enemy_slipping_past_ends_the_run() {
    for mode in [GameMode::Timed, GameMode::Survival] {
        let (run, e) = reach_boundary(&active(mode), &make_enemy(EnemyKind::Normal));
        assert_eq!(run.phase, Phase::Ended { reason: EndReason::EnemyPassed });
        assert_eq!(e.status, EnemyStatus::Escaped);
    }
}

#[test]
fn special_enemy_slipping_past_is_just_removed() {
    let start = active(GameMode::Timed);
    let (run, e) = reach_boundary(&start, &make_enemy(EnemyKind::TimeAdd));
    assert_eq!(run, start);
    assert_eq!(e.status, EnemyStatus::Escaped);
}

#[test]
fn danger_line_and_field_edges() {
    let b = FieldBounds::for_terminal(40, 20);
    let at = |x: f32, y: f32| Enemy { x, y, ..make_enemy(EnemyKind::Normal) };

    assert!(!crossed_danger_line(&at(10.0, 16.9), &b));
    assert!(crossed_danger_line(&at(10.0, 17.0), &b));

    assert!(!out_of_field(&at(10.0, 5.0), &b));
    assert!(out_of_field(&at(50.0, 5.0), &b));
    assert!(out_of_field(&at(0.5, 5.0), &b));
    assert!(out_of_field(&at(10.0, 18.5), &b));
}
