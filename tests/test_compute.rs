use wave_shooter::compute::*;
use wave_shooter::config::GameConfig;
use wave_shooter::entities::*;
use wave_shooter::scheduler::Stage;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// An active 40x20 world with the wave scheduler switched off, so only the
/// enemies a test places are in play.
fn make_state(mode: GameMode) -> World {
    let mut s = init_world(mode, &GameConfig::default(), 40, 20);
    s.run.phase = Phase::Active;
    s.wave.stage = Stage::Stopped;
    s
}

fn make_enemy(kind: EnemyKind, x: f32, y: f32) -> Enemy {
    Enemy {
        id: 0,
        x,
        y,
        kind,
        speed: 3.0,
        status: EnemyStatus::Alive,
    }
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn step(s: &World) -> World {
    tick(s, &GameConfig::default(), 0.05, &mut seeded_rng())
}

// ── init_world ────────────────────────────────────────────────────────────────

#[test]
fn init_world_player_position() {
    let s = init_world(GameMode::Timed, &GameConfig::default(), 40, 20);
    assert_eq!(s.player.x, 20.0); // centre of the field
    assert_eq!(s.player.y, 15.0); // height - 5
}

#[test]
fn init_world_starts_in_countdown_with_nothing_on_screen() {
    let s = init_world(GameMode::Survival, &GameConfig::default(), 40, 20);
    assert!(s.enemies.is_empty());
    assert!(s.lasers.is_empty());
    assert!(s.explosions.is_empty());
    assert!(matches!(s.run.phase, Phase::Countdown { .. }));
    assert_eq!(s.run.lives, 3);
    assert!(!s.wave.started());
}

#[test]
fn tiny_terminal_is_clamped_to_a_playable_field() {
    let s = init_world(GameMode::Timed, &GameConfig::default(), 5, 5);
    assert_eq!(s.bounds.term_width, 20);
    assert_eq!(s.bounds.term_height, 12);
    assert!(s.bounds.min_x < s.bounds.max_x);
    assert!(s.bounds.spawn_y < s.bounds.player_max_y);
}

// ── move_player ──────────────────────────────────────────────────────────────

#[test]
fn ship_is_frozen_during_countdown() {
    let s = init_world(GameMode::Timed, &GameConfig::default(), 40, 20);
    let s2 = move_player(&s, -3.0, 0.0);
    assert_eq!(s2.player, s.player);
}

#[test]
fn move_left_and_right() {
    let s = make_state(GameMode::Timed);
    assert_eq!(move_player(&s, -1.0, 0.0).player.x, 19.0);
    assert_eq!(move_player(&s, 1.0, 0.0).player.x, 21.0);
}

#[test]
fn movement_is_clamped_to_the_field() {
    let s = make_state(GameMode::Timed);
    assert_eq!(move_player(&s, -100.0, 0.0).player.x, 2.0);
    assert_eq!(move_player(&s, 100.0, 0.0).player.x, 37.0);
    assert_eq!(move_player(&s, 0.0, 10.0).player.y, 15.0);
    assert_eq!(move_player(&s, 0.0, -100.0).player.y, 4.0);
}

#[test]
fn move_player_does_not_mutate_original() {
    let s = make_state(GameMode::Timed);
    let _ = move_player(&s, -1.0, 0.0);
    assert_eq!(s.player.x, 20.0);
}

// ── fire ─────────────────────────────────────────────────────────────────────

#[test]
fn fire_spawns_laser_above_ship() {
    let s = fire(&make_state(GameMode::Timed), &GameConfig::default());
    assert_eq!(s.lasers.len(), 1);
    assert_eq!(s.lasers[0].x, 20.0);
    assert_eq!(s.lasers[0].y, 14.0);
    assert_eq!(s.lasers[0].ttl, 3.0);
    assert_eq!(s.fire_cooldown, 0.15);
}

#[test]
fn fire_respects_cooldown() {
    let cfg = GameConfig::default();
    let s = fire(&fire(&make_state(GameMode::Timed), &cfg), &cfg);
    assert_eq!(s.lasers.len(), 1);

    let mut s = s;
    for _ in 0..4 {
        s = step(&s);
    }
    assert_eq!(s.fire_cooldown, 0.0);
    assert_eq!(fire(&s, &cfg).lasers.len(), 2);
}

#[test]
fn cannot_fire_before_play_starts() {
    let s = init_world(GameMode::Timed, &GameConfig::default(), 40, 20);
    assert!(fire(&s, &GameConfig::default()).lasers.is_empty());
}

// ── tick: countdown and spawning ─────────────────────────────────────────────

#[test]
fn no_enemies_until_the_countdown_ends() {
    let cfg = GameConfig::default();
    let mut rng = seeded_rng();
    let mut s = init_world(GameMode::Timed, &cfg, 40, 20);
    for _ in 0..6 {
        s = tick(&s, &cfg, 0.5, &mut rng);
        assert!(s.enemies.is_empty());
        assert_eq!(s.run.clock, 45.0);
    }
    s = tick(&s, &cfg, 0.5, &mut rng);
    assert!(s.run.is_active());
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.run.clock, 44.5);
}

#[test]
fn spawned_enemies_get_unique_ids() {
    let cfg = GameConfig::default();
    let mut rng = seeded_rng();
    let mut s = init_world(GameMode::Survival, &cfg, 80, 24);
    s.run.phase = Phase::Active;
    for _ in 0..20 {
        s = tick(&s, &cfg, 0.1, &mut rng);
    }
    let mut ids: Vec<u32> = s.enemies.iter().map(|e| e.id).collect();
    let count = ids.len();
    ids.dedup();
    assert!(count > 1);
    assert_eq!(ids.len(), count);
}

#[test]
fn same_seed_same_world() {
    let cfg = GameConfig::default();
    let run = || {
        let mut rng = seeded_rng();
        let mut s = init_world(GameMode::Timed, &cfg, 80, 24);
        for _ in 0..150 {
            s = tick(&s, &cfg, 0.05, &mut rng);
        }
        s
    };
    let (a, b) = (run(), run());
    assert_eq!(a.enemies, b.enemies);
    assert_eq!(a.run, b.run);
}

// ── tick: lasers and enemies ─────────────────────────────────────────────────

#[test]
fn laser_shoots_down_enemy() {
    let mut s = make_state(GameMode::Timed);
    s.enemies.push(make_enemy(EnemyKind::Normal, 10.0, 5.0));
    s.lasers.push(Laser { x: 10.0, y: 6.5, ttl: 3.0 });

    let s = step(&s);
    assert!(s.enemies.is_empty());
    assert!(s.lasers.is_empty());
    assert_eq!(s.explosions.len(), 1);
    assert_eq!(s.run.score, 100);
}

#[test]
fn laser_cannot_skip_past_enemy_on_a_slow_frame() {
    // At 0.1s per frame the laser covers 3 rows and ends up past the sprite.
    let cfg = GameConfig::default();
    let mut rng = seeded_rng();
    let mut s = make_state(GameMode::Timed);
    s.enemies.push(make_enemy(EnemyKind::Normal, 20.0, 8.0));
    s.lasers.push(Laser { x: 20.0, y: 10.5, ttl: 3.0 });

    for _ in 0..3 {
        s = tick(&s, &cfg, 0.1, &mut rng);
    }
    assert_eq!(s.run.score, 100);
    assert!(s.enemies.is_empty());
    assert!(s.lasers.is_empty());
    assert_eq!(s.explosions.len(), 1);
}

#[test]
fn laser_already_above_enemy_does_not_hit() {
    let mut s = make_state(GameMode::Timed);
    s.enemies.push(make_enemy(EnemyKind::Normal, 10.0, 8.0));
    s.lasers.push(Laser { x: 10.0, y: 7.0, ttl: 3.0 });

    let s = tick(&s, &GameConfig::default(), 0.1, &mut seeded_rng());
    assert_eq!(s.run.score, 0);
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.lasers.len(), 1);
}

#[test]
fn two_lasers_on_one_enemy_score_once() {
    let mut s = make_state(GameMode::Timed);
    s.enemies.push(make_enemy(EnemyKind::Normal, 10.0, 5.0));
    s.lasers.push(Laser { x: 10.0, y: 6.5, ttl: 3.0 });
    s.lasers.push(Laser { x: 10.0, y: 6.6, ttl: 3.0 });

    let s = step(&s);
    assert_eq!(s.run.score, 100);
    assert_eq!(s.lasers.len(), 1);
    assert_eq!(s.explosions.len(), 1);
}

#[test]
fn laser_misses_enemy_in_another_column() {
    let mut s = make_state(GameMode::Timed);
    s.enemies.push(make_enemy(EnemyKind::Normal, 10.0, 5.0));
    s.lasers.push(Laser { x: 14.0, y: 6.5, ttl: 3.0 });

    let s = step(&s);
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.lasers.len(), 1);
    assert_eq!(s.run.score, 0);
}

#[test]
fn shooting_time_add_enemy_extends_clock() {
    let mut s = make_state(GameMode::Timed);
    s.run.clock = 10.0;
    s.enemies.push(make_enemy(EnemyKind::TimeAdd, 10.0, 5.0));
    s.lasers.push(Laser { x: 10.0, y: 6.5, ttl: 3.0 });

    let s = step(&s);
    assert!((s.run.clock - 14.95).abs() < 1e-4);
    assert!(s.run.is_active());
}

#[test]
fn laser_burns_out() {
    let mut s = make_state(GameMode::Timed);
    s.lasers.push(Laser { x: 10.0, y: 10.0, ttl: 0.04 });
    assert!(step(&s).lasers.is_empty());
}

#[test]
fn laser_leaves_the_top_of_the_field() {
    let mut s = make_state(GameMode::Timed);
    s.lasers.push(Laser { x: 10.0, y: 1.5, ttl: 3.0 });
    assert!(step(&s).lasers.is_empty());
}

#[test]
fn explosions_fade() {
    let mut s = make_state(GameMode::Timed);
    s.explosions.push(Explosion { x: 5.0, y: 5.0, ttl: 0.03 });
    s.explosions.push(Explosion { x: 6.0, y: 5.0, ttl: 0.3 });
    let s = step(&s);
    assert_eq!(s.explosions.len(), 1);
    assert_eq!(s.explosions[0].x, 6.0);
}

// ── tick: enemies reaching the ship ──────────────────────────────────────────

#[test]
fn rammed_by_normal_in_timed_is_game_over() {
    let mut s = make_state(GameMode::Timed);
    s.enemies.push(make_enemy(EnemyKind::Normal, 20.0, 14.0));
    let s = step(&s);
    assert_eq!(s.run.phase, Phase::Ended { reason: EndReason::GameOver });
    assert!(s.enemies.is_empty());
}

#[test]
fn rammed_by_time_enemy_in_timed_is_harmless() {
    let mut s = make_state(GameMode::Timed);
    s.enemies.push(make_enemy(EnemyKind::TimeAdd, 20.0, 14.0));
    let s = step(&s);
    assert!(s.run.is_active());
    assert!(s.enemies.is_empty());
}

#[test]
fn rammed_in_survival_costs_a_life() {
    let mut s = make_state(GameMode::Survival);
    s.enemies.push(make_enemy(EnemyKind::Normal, 20.0, 14.0));
    let s = step(&s);
    assert_eq!(s.run.lives, 2);
    assert!(s.run.is_active());
    assert!(s.enemies.is_empty());
}

// ── tick: danger line and cleanup ────────────────────────────────────────────

#[test]
fn normal_enemy_slipping_past_ends_run() {
    let mut s = make_state(GameMode::Survival);
    s.enemies.push(make_enemy(EnemyKind::Normal, 5.0, 16.9));
    let s = step(&s);
    assert_eq!(s.run.phase, Phase::Ended { reason: EndReason::EnemyPassed });
    assert_eq!(s.run.lives, 3);
    assert!(s.enemies.is_empty());
}

#[test]
fn special_enemy_slipping_past_is_removed_quietly() {
    let mut s = make_state(GameMode::Timed);
    s.enemies.push(make_enemy(EnemyKind::TimeSubtract, 5.0, 16.9));
    let s = step(&s);
    assert!(s.run.is_active());
    assert!(s.enemies.is_empty());
}

#[test]
fn enemies_outside_the_field_are_dropped() {
    let mut s = make_state(GameMode::Timed);
    s.enemies.push(make_enemy(EnemyKind::Normal, 50.0, 5.0));
    s.enemies.push(make_enemy(EnemyKind::Normal, 10.0, 5.0));
    let s = step(&s);
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.enemies[0].x, 10.0);
    assert!(s.run.is_active());
}

#[test]
fn ended_world_stops_scheduling() {
    let cfg = GameConfig::default();
    let mut rng = seeded_rng();
    let mut s = make_state(GameMode::Timed);
    s.wave.stage = Stage::Idle;
    s = tick(&s, &cfg, 0.05, &mut rng);
    assert!(s.wave.started());

    s.run.phase = Phase::Ended { reason: EndReason::GameOver };
    s.enemies.clear();
    for _ in 0..100 {
        s = tick(&s, &cfg, 0.5, &mut rng);
    }
    assert!(s.wave.is_stopped());
    assert!(s.enemies.is_empty());
}
