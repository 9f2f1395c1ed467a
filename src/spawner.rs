/// Entity spawner: turns a spawn request into an enemy.

use rand::Rng;
use tracing::trace;

use crate::config::{EnemyConfig, WaveConfig};
use crate::entities::{Enemy, EnemyKind, EnemyStatus, GameMode, SpawnEvent};

/// Decide what kind of enemy a spawn point produces.
///
/// Forced points are always a time enemy.  Otherwise Timed mode rolls
/// `chance` for one and Survival mode only spawns Normal enemies.
pub fn resolve_kind(
    mode: GameMode,
    force_special: bool,
    chance: f32,
    rng: &mut impl Rng,
) -> EnemyKind {
    let special = force_special || (mode == GameMode::Timed && rng.gen::<f32>() < chance);
    if !special {
        return EnemyKind::Normal;
    }
    if rng.gen_bool(0.5) {
        EnemyKind::TimeAdd
    } else {
        EnemyKind::TimeSubtract
    }
}

pub fn spawn_enemy(
    id: u32,
    event: &SpawnEvent,
    mode: GameMode,
    waves: &WaveConfig,
    cfg: &EnemyConfig,
    rng: &mut impl Rng,
) -> Enemy {
    let kind = resolve_kind(mode, event.force_special, waves.time_enemy_chance, rng);
    trace!(id, ?kind, x = event.x, y = event.y, "Enemy spawned");
    Enemy {
        id,
        x: event.x,
        y: event.y,
        kind,
        speed: cfg.speed,
        status: EnemyStatus::Alive,
    }
}
