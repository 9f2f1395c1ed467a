/// One run from scene entry to the results screen.
///
/// The session owns the world and the gateway the run reports to.  The
/// first frame on which the run has ended, it pays out coins, submits the
/// score and records the results, exactly once, before asking to leave the
/// game scene.

use rand::Rng;
use tracing::{info, warn};

use crate::compute;
use crate::config::GameConfig;
use crate::entities::{GameMode, RunOutcome, World};
use crate::persistence::ScoreGateway;
use crate::run;

/// Named scenes the front-end switches between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scene {
    Game,
    End(RunOutcome),
}

impl Scene {
    pub fn name(&self) -> &'static str {
        match self {
            Scene::Game => "Game",
            Scene::End(_) => "End",
        }
    }
}

pub struct Session<G: ScoreGateway> {
    world: World,
    config: GameConfig,
    gateway: G,
    flushed: bool,
}

impl<G: ScoreGateway> Session<G> {
    pub fn start(mode: GameMode, config: GameConfig, gateway: G, width: u16, height: u16) -> Self {
        info!(?mode, width, height, "Entering {}", Scene::Game.name());
        let world = compute::init_world(mode, &config, width, height);
        Self::from_world(world, config, gateway)
    }

    /// Resume from an existing world, e.g. one built by hand in a test.
    pub fn from_world(world: World, config: GameConfig, gateway: G) -> Self {
        Self {
            world,
            config,
            gateway,
            flushed: false,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn move_player(&mut self, dx: f32, dy: f32) {
        self.world = compute::move_player(&self.world, dx, dy);
    }

    pub fn fire(&mut self) {
        self.world = compute::fire(&self.world, &self.config);
    }

    /// Advance one frame.  Returns the scene to switch to, at most once.
    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng) -> Option<Scene> {
        self.world = compute::tick(&self.world, &self.config, dt, rng);
        self.finish_if_ended()
    }

    fn finish_if_ended(&mut self) -> Option<Scene> {
        if self.flushed {
            return None;
        }
        let outcome = run::outcome(&self.world.run, self.config.run.score_per_coin)?;
        self.flushed = true;
        report(&mut self.gateway, &outcome);
        let next = Scene::End(outcome);
        info!("Entering {}", next.name());
        Some(next)
    }
}

/// Hand a finished run to the gateway.  Each step is attempted even if an
/// earlier one failed; failures are logged and otherwise ignored.
pub fn report(gateway: &mut impl ScoreGateway, outcome: &RunOutcome) {
    if let Err(e) = gateway.add_coins(outcome.coins) {
        warn!("Could not save {} coins: {}", outcome.coins, e);
    }
    if let Err(e) = gateway.submit_score(outcome.mode, outcome.score) {
        warn!("Could not save score {}: {}", outcome.score, e);
    }
    if let Err(e) = gateway.record_last_run(outcome) {
        warn!("Could not save run results: {}", e);
    }
}
