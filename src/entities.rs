/// Simulation data types.  Only small accessors live here; behaviour is in
/// `run`, `enemy`, `scheduler` and `compute`.

use serde::{Deserialize, Serialize};

use crate::scheduler::WaveState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Beat the clock; a Normal enemy touching the ship ends the run.
    Timed,
    /// Three lives, no clock; pacing tightens every wave.
    Survival,
}

impl GameMode {
    pub fn display_name(self) -> &'static str {
        match self {
            GameMode::Timed => "Timed Mode",
            GameMode::Survival => "Survival Mode",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Normal,
    /// Adds time to the Timed-mode clock when shot.
    TimeAdd,
    /// Takes time off the Timed-mode clock when shot.
    TimeSubtract,
}

impl EnemyKind {
    pub fn is_special(self) -> bool {
        !matches!(self, EnemyKind::Normal)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyStatus {
    Alive,
    /// Shot down or rammed into the ship.
    Destroyed,
    /// Crossed the danger line or left the field.
    Escaped,
}

// ── Run state ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TimeUp,
    GameOver,
    EnemyPassed,
}

impl EndReason {
    pub fn message(self) -> &'static str {
        match self {
            EndReason::TimeUp => "Time's Up!",
            EndReason::GameOver => "Game Over!",
            EndReason::EnemyPassed => "An enemy got past!",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    Countdown { remaining: f32 },
    Active,
    Ended { reason: EndReason },
}

/// Score, clock and lives for one run.  Owned by the mode state machine.
#[derive(Clone, Debug, PartialEq)]
pub struct RunState {
    pub mode: GameMode,
    pub score: u32,
    /// Remaining seconds in Timed mode, elapsed seconds in Survival mode.
    pub clock: f32,
    /// Only meaningful in Survival mode.
    pub lives: u32,
    pub phase: Phase,
    /// Seconds left on the "GO!" banner shown after the countdown.
    pub go_banner: f32,
}

impl RunState {
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended { .. })
    }
}

/// What a finished run reports to persistence and the results screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    pub mode: GameMode,
    pub score: u32,
    pub coins: u32,
    pub reason: EndReason,
}

// ── Play field ────────────────────────────────────────────────────────────────

/// Play-field geometry in terminal cells.  `y` grows downward.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldBounds {
    pub min_x: f32,
    pub max_x: f32,
    /// Row new formations hang from.
    pub spawn_y: f32,
    /// Enemies at or below this row have slipped past the ship.
    pub danger_y: f32,
    /// Lowest row the ship may occupy.
    pub player_max_y: f32,
    pub term_width: u16,
    pub term_height: u16,
}

impl FieldBounds {
    /// Layout for a terminal of the given size: HUD on row 0, border on
    /// rows 1 and `height - 2`, controls hint on the last row.
    pub fn for_terminal(width: u16, height: u16) -> FieldBounds {
        let term_width = width.max(20);
        let term_height = height.max(12);
        FieldBounds {
            min_x: 2.0,
            max_x: term_width as f32 - 3.0,
            spawn_y: 2.0,
            danger_y: term_height as f32 - 3.0,
            player_max_y: term_height as f32 - 5.0,
            term_width,
            term_height,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn center_x(&self) -> f32 {
        (self.min_x + self.max_x) / 2.0
    }
}

/// One spawn request produced by the wave scheduler.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnEvent {
    pub x: f32,
    pub y: f32,
    pub force_special: bool,
}

// ── Projectiles & feedback ────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Laser {
    pub x: f32,
    pub y: f32,
    /// Seconds until the laser burns out on its own.
    pub ttl: f32,
}

/// Short-lived blast left where an enemy was shot down.
#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub ttl: f32,
}

// ── Player & enemy ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub kind: EnemyKind,
    /// Rows per second, always downward.
    pub speed: f32,
    pub status: EnemyStatus,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire state of one run.  Cloneable so the per-frame update can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct World {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub lasers: Vec<Laser>,
    pub explosions: Vec<Explosion>,
    pub run: RunState,
    pub wave: WaveState,
    pub bounds: FieldBounds,
    /// Seconds until the ship may fire again.
    pub fire_cooldown: f32,
    pub next_enemy_id: u32,
}
