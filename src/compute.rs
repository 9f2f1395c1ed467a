/// World simulation: one pure step per frame.
///
/// Every public function takes an immutable reference to the current `World`
/// (and, where needed, the config and an RNG handle) and returns a brand-new
/// `World`.  Side effects are limited to the injected RNG.

use rand::Rng;

use crate::config::GameConfig;
use crate::enemy;
use crate::entities::{Enemy, EnemyStatus, Explosion, FieldBounds, GameMode, Laser, Player, World};
use crate::run;
use crate::scheduler::{WaveContext, WaveState};
use crate::spawner;

// ── Hit boxes ─────────────────────────────────────────────────────────────────

/// Enemy sprites are 3 columns wide and 2 rows tall, anchored top-centre.
const ENEMY_HALF_WIDTH: f32 = 1.5;
const ENEMY_HEIGHT: f32 = 2.0;
/// Ship sprite is the same size as an enemy.
const SHIP_HALF_WIDTH: f32 = 1.5;
const SHIP_HEIGHT: f32 = 2.0;

/// Swept test: the laser's path over the last `dt` seconds, measured from
/// the enemy, overlaps the enemy's box.  A long frame can't tunnel through.
fn laser_hits(from_y: f32, laser: &Laser, enemy: &Enemy, dt: f32) -> bool {
    let start = from_y - (enemy.y - enemy.speed * dt);
    let end = laser.y - enemy.y;
    (laser.x - enemy.x).abs() <= ENEMY_HALF_WIDTH
        && start.max(end) >= -0.5
        && start.min(end) < ENEMY_HEIGHT
}

fn touches_ship(enemy: &Enemy, player: &Player) -> bool {
    (enemy.x - player.x).abs() < ENEMY_HALF_WIDTH + SHIP_HALF_WIDTH
        && enemy.y + ENEMY_HEIGHT > player.y
        && enemy.y < player.y + SHIP_HEIGHT
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the world for a fresh run in a terminal of the given size.
pub fn init_world(mode: GameMode, cfg: &GameConfig, width: u16, height: u16) -> World {
    let bounds = FieldBounds::for_terminal(width, height);
    World {
        player: Player {
            x: bounds.center_x().round(),
            y: bounds.player_max_y,
        },
        enemies: Vec::new(),
        lasers: Vec::new(),
        explosions: Vec::new(),
        run: run::new_run(mode, &cfg.run),
        wave: WaveState::new(cfg.waves.wave_delay),
        bounds,
        fire_cooldown: 0.0,
        next_enemy_id: 0,
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Nudge the ship, clamped to the field.  The ship is frozen outside play.
pub fn move_player(state: &World, dx: f32, dy: f32) -> World {
    if !state.run.is_active() {
        return state.clone();
    }
    let b = &state.bounds;
    let player = Player {
        x: (state.player.x + dx).clamp(b.min_x, b.max_x),
        y: (state.player.y + dy).clamp(b.spawn_y + ENEMY_HEIGHT, b.player_max_y),
    };
    World {
        player,
        ..state.clone()
    }
}

/// Fire a laser from the ship's nose, at most once per `fire_rate` seconds.
pub fn fire(state: &World, cfg: &GameConfig) -> World {
    if !state.run.is_active() || state.fire_cooldown > 0.0 {
        return state.clone();
    }
    let mut lasers = state.lasers.clone();
    lasers.push(Laser {
        x: state.player.x,
        y: state.player.y - 1.0,
        ttl: cfg.player.laser_lifetime,
    });
    World {
        lasers,
        fire_cooldown: cfg.player.fire_rate,
        ..state.clone()
    }
}

// ── Per-frame tick (nearly pure — RNG is injected) ──────────────────────────

/// Advance the simulation by `dt` seconds.  All randomness comes through
/// `rng` so callers control determinism (useful for tests with a seeded RNG).
pub fn tick(state: &World, cfg: &GameConfig, dt: f32, rng: &mut impl Rng) -> World {
    // ── 1. Run clock ─────────────────────────────────────────────────────────
    let mut run_state = run::advance(&state.run, dt, &cfg.run);

    // ── 2. Wave scheduler ────────────────────────────────────────────────────
    let mut wave = state.wave.clone();
    let ctx = WaveContext {
        bounds: &state.bounds,
        waves: &cfg.waves,
        geometry: &cfg.formations,
    };
    let spawn = wave.advance(dt, run_state.is_active(), run_state.mode, &ctx, rng);

    // ── 3. Move enemies, then spawn ──────────────────────────────────────────
    let mut next_enemy_id = state.next_enemy_id;
    let mut enemies: Vec<Enemy> = state
        .enemies
        .iter()
        .map(|e| enemy::move_enemy(e, dt))
        .collect();
    if let Some(event) = spawn {
        enemies.push(spawner::spawn_enemy(
            next_enemy_id,
            &event,
            run_state.mode,
            &cfg.waves,
            &cfg.enemy,
            rng,
        ));
        next_enemy_id += 1;
    }

    // ── 4. Move lasers, age explosions ───────────────────────────────────────
    // Each laser keeps the row it started the frame on for the swept test.
    let lasers: Vec<(f32, Laser)> = state
        .lasers
        .iter()
        .map(|l| {
            let moved = Laser {
                y: l.y - cfg.player.laser_speed * dt,
                ttl: l.ttl - dt,
                ..l.clone()
            };
            (l.y, moved)
        })
        .filter(|(_, l)| l.ttl > 0.0)
        .collect();

    let mut explosions: Vec<Explosion> = state
        .explosions
        .iter()
        .map(|x| Explosion {
            ttl: x.ttl - dt,
            ..x.clone()
        })
        .filter(|x| x.ttl > 0.0)
        .collect();

    // ── 5. Collision: lasers ↔ enemies ───────────────────────────────────────
    let mut used_lasers: Vec<usize> = Vec::new();
    for (li, (from_y, laser)) in lasers.iter().enumerate() {
        let Some(target) = enemies
            .iter_mut()
            .find(|e| enemy::is_alive(e) && laser_hits(*from_y, laser, e, dt))
        else {
            continue;
        };
        let (next_run, hit) = enemy::take_hit(&run_state, target, &cfg.enemy);
        run_state = next_run;
        explosions.push(Explosion {
            x: hit.x,
            y: hit.y,
            ttl: cfg.enemy.explosion_lifetime,
        });
        *target = hit;
        used_lasers.push(li);
    }

    let top = state.bounds.spawn_y - 1.0;
    let lasers: Vec<Laser> = lasers
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !used_lasers.contains(i))
        .map(|(_, (_, l))| l)
        .filter(|l| l.y >= top)
        .collect();

    // ── 6. Collision: enemies ↔ ship, enemies ↔ danger line ──────────────────
    for e in enemies.iter_mut() {
        if !enemy::is_alive(e) {
            continue;
        }
        let (next_run, next_enemy) = if touches_ship(e, &state.player) {
            enemy::reach_player(&run_state, e)
        } else if enemy::crossed_danger_line(e, &state.bounds) {
            enemy::reach_boundary(&run_state, e)
        } else {
            continue;
        };
        run_state = next_run;
        *e = next_enemy;
    }

    // ── 7. Cleanup ───────────────────────────────────────────────────────────
    let enemies: Vec<Enemy> = enemies
        .into_iter()
        .filter(|e| e.status == EnemyStatus::Alive && !enemy::out_of_field(e, &state.bounds))
        .collect();

    World {
        enemies,
        lasers,
        explosions,
        run: run_state,
        wave,
        fire_cooldown: (state.fire_cooldown - dt).max(0.0),
        next_enemy_id,
        ..state.clone()
    }
}
