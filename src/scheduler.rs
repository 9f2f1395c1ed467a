/// Wave scheduler.
///
/// An explicit state machine advanced once per frame.  It sits idle until the
/// run first goes active, then plays formations back to back with a rest in
/// between.  The active flag is polled on every call; the first inactive call
/// after waves have started stops the scheduler for good.

use rand::Rng;
use tracing::debug;

use crate::config::{FormationConfig, WaveConfig};
use crate::entities::{FieldBounds, GameMode, SpawnEvent};
use crate::formation::{Formation, SpawnPoint};

#[derive(Clone, Debug, PartialEq)]
pub enum Stage {
    /// Waiting for the countdown to finish.
    Idle,
    /// Playing out a formation.  `wait` counts down the pause after the
    /// last emitted point; `next` indexes the point to emit when it elapses.
    Spawning {
        formation: Formation,
        points: Vec<SpawnPoint>,
        next: usize,
        wait: f32,
    },
    /// Resting between waves.
    Resting { wait: f32 },
    Stopped,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaveState {
    pub wave_delay: f32,
    pub completed_waves: u32,
    pub stage: Stage,
}

/// Everything a wave needs to know about the world it spawns into.
pub struct WaveContext<'a> {
    pub bounds: &'a FieldBounds,
    pub waves: &'a WaveConfig,
    pub geometry: &'a FormationConfig,
}

enum Resume {
    BeginWave,
    Rest,
    NextWave,
}

impl From<SpawnPoint> for SpawnEvent {
    fn from(point: SpawnPoint) -> SpawnEvent {
        SpawnEvent {
            x: point.x,
            y: point.y,
            force_special: point.force_special,
        }
    }
}

impl WaveState {
    pub fn new(wave_delay: f32) -> WaveState {
        WaveState {
            wave_delay,
            completed_waves: 0,
            stage: Stage::Idle,
        }
    }

    pub fn started(&self) -> bool {
        self.stage != Stage::Idle
    }

    pub fn is_stopped(&self) -> bool {
        self.stage == Stage::Stopped
    }

    /// Advance by `dt` seconds.  Emits at most one spawn per call; time left
    /// over once a wait elapses is dropped, so a slow frame never makes the
    /// next spawns arrive faster.
    pub fn advance(
        &mut self,
        dt: f32,
        active: bool,
        mode: GameMode,
        ctx: &WaveContext,
        rng: &mut impl Rng,
    ) -> Option<SpawnEvent> {
        if !active {
            if self.started() && !self.is_stopped() {
                debug!(waves = self.completed_waves, "Wave scheduler stopped");
                self.stage = Stage::Stopped;
            }
            return None;
        }

        let resume = match &mut self.stage {
            Stage::Stopped => return None,
            Stage::Idle => Resume::BeginWave,
            Stage::Spawning { points, next, wait, .. } => {
                *wait -= dt;
                if *wait > 0.0 {
                    return None;
                }
                match points.get(*next).cloned() {
                    Some(point) => {
                        *next += 1;
                        *wait = point.delay_after;
                        return Some(point.into());
                    }
                    None => Resume::Rest,
                }
            }
            Stage::Resting { wait } => {
                *wait -= dt;
                if *wait > 0.0 {
                    return None;
                }
                Resume::NextWave
            }
        };

        match resume {
            Resume::BeginWave => self.begin_wave(ctx, rng),
            Resume::Rest => {
                self.stage = Stage::Resting { wait: self.wave_delay };
                None
            }
            Resume::NextWave => {
                self.complete_wave(mode, ctx.waves);
                self.begin_wave(ctx, rng)
            }
        }
    }

    fn begin_wave(&mut self, ctx: &WaveContext, rng: &mut impl Rng) -> Option<SpawnEvent> {
        let formation = Formation::pick(rng);
        let points = formation.expand(ctx.bounds, ctx.waves.spawn_in_wave_delay, ctx.geometry, rng);
        let Some(first) = points.first().cloned() else {
            self.stage = Stage::Resting { wait: self.wave_delay };
            return None;
        };
        debug!(?formation, wave = self.completed_waves + 1, "Wave started");

        self.stage = Stage::Spawning {
            formation,
            points,
            next: 1,
            wait: first.delay_after,
        };
        Some(first.into())
    }

    fn complete_wave(&mut self, mode: GameMode, waves: &WaveConfig) {
        self.completed_waves += 1;
        if mode == GameMode::Survival {
            self.wave_delay = (self.wave_delay * waves.survival_decay).max(waves.min_wave_delay);
        }
    }
}
