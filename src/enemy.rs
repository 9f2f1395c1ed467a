/// Enemy lifecycle: spawned, then shot down, rammed into the ship, or slipped
/// past the danger line.  Every transition only applies to a living enemy, so
/// overlapping collisions in one frame count once.

use tracing::trace;

use crate::config::EnemyConfig;
use crate::entities::{Enemy, EnemyKind, EnemyStatus, FieldBounds, RunState};
use crate::run;

pub fn is_alive(enemy: &Enemy) -> bool {
    enemy.status == EnemyStatus::Alive
}

pub fn move_enemy(enemy: &Enemy, dt: f32) -> Enemy {
    Enemy {
        y: enemy.y + enemy.speed * dt,
        ..enemy.clone()
    }
}

/// Shot by a laser: score, clock adjustment for time enemies, destroyed.
pub fn take_hit(run_state: &RunState, enemy: &Enemy, cfg: &EnemyConfig) -> (RunState, Enemy) {
    if !is_alive(enemy) {
        return (run_state.clone(), enemy.clone());
    }
    trace!(id = enemy.id, kind = ?enemy.kind, "Enemy shot down");

    let scored = run::add_score(run_state, cfg.score_value);
    let next = match enemy.kind {
        EnemyKind::Normal => scored,
        EnemyKind::TimeAdd => run::adjust_time(&scored, cfg.time_to_add),
        EnemyKind::TimeSubtract => run::adjust_time(&scored, -cfg.time_to_subtract),
    };
    let destroyed = Enemy {
        status: EnemyStatus::Destroyed,
        ..enemy.clone()
    };
    (next, destroyed)
}

/// Collided with the ship.  Whatever the kind, the ship decides what it means.
pub fn reach_player(run_state: &RunState, enemy: &Enemy) -> (RunState, Enemy) {
    if !is_alive(enemy) {
        return (run_state.clone(), enemy.clone());
    }
    trace!(id = enemy.id, kind = ?enemy.kind, "Enemy rammed the ship");

    let next = run::player_hit(run_state, enemy.kind);
    let destroyed = Enemy {
        status: EnemyStatus::Destroyed,
        ..enemy.clone()
    };
    (next, destroyed)
}

/// Crossed the danger line.  Every kind is removed; only a Normal one ends
/// the run.
pub fn reach_boundary(run_state: &RunState, enemy: &Enemy) -> (RunState, Enemy) {
    if !is_alive(enemy) {
        return (run_state.clone(), enemy.clone());
    }
    trace!(id = enemy.id, kind = ?enemy.kind, "Enemy crossed the danger line");

    let next = if enemy.kind == EnemyKind::Normal {
        run::enemy_passed(run_state)
    } else {
        run_state.clone()
    };
    let escaped = Enemy {
        status: EnemyStatus::Escaped,
        ..enemy.clone()
    };
    (next, escaped)
}

pub fn crossed_danger_line(enemy: &Enemy, bounds: &FieldBounds) -> bool {
    enemy.y >= bounds.danger_y
}

/// Outside the visible field.  Cleanup only, not a gameplay event.
pub fn out_of_field(enemy: &Enemy, bounds: &FieldBounds) -> bool {
    enemy.x < bounds.min_x - 1.0
        || enemy.x > bounds.max_x + 1.0
        || enemy.y < 0.0
        || enemy.y > bounds.danger_y + 1.0
}
