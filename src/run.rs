/// Mode state machine: countdown, active play, end of run.
///
/// Same shape as the rest of the core: each function takes the current
/// `RunState` and returns a new one.  Calls that make no sense in the current
/// phase hand back an unchanged copy.

use tracing::info;

use crate::config::RunConfig;
use crate::entities::{EndReason, EnemyKind, GameMode, Phase, RunOutcome, RunState};

/// The countdown stops ticking once this much is left; that frame play begins.
const ACTIVATION_THRESHOLD: f32 = 0.5;

pub fn new_run(mode: GameMode, cfg: &RunConfig) -> RunState {
    let (clock, lives) = match mode {
        GameMode::Timed => (cfg.timed_duration, 0),
        GameMode::Survival => (0.0, cfg.starting_lives),
    };
    RunState {
        mode,
        score: 0,
        clock,
        lives,
        phase: Phase::Countdown { remaining: cfg.start_delay },
        go_banner: 0.0,
    }
}

/// Advance the run clock by `dt` seconds.
pub fn advance(run: &RunState, dt: f32, cfg: &RunConfig) -> RunState {
    let mut next = run.clone();

    match run.phase {
        Phase::Ended { .. } => return next,
        Phase::Countdown { remaining } if remaining > ACTIVATION_THRESHOLD => {
            next.phase = Phase::Countdown { remaining: remaining - dt };
            return next;
        }
        Phase::Countdown { .. } => {
            info!(mode = ?run.mode, "Run active");
            next.phase = Phase::Active;
            next.go_banner = cfg.go_banner;
        }
        Phase::Active => {
            next.go_banner = (run.go_banner - dt).max(0.0);
        }
    }

    match next.mode {
        GameMode::Timed => {
            next.clock -= dt;
            if next.clock <= 0.0 {
                next.clock = 0.0;
                return end_run(&next, EndReason::TimeUp);
            }
        }
        GameMode::Survival => next.clock += dt,
    }
    next
}

/// The ship was touched by an enemy of `kind`.
pub fn player_hit(run: &RunState, kind: EnemyKind) -> RunState {
    if !run.is_active() {
        return run.clone();
    }
    match run.mode {
        GameMode::Survival => {
            let lives = run.lives.saturating_sub(1);
            let next = RunState { lives, ..run.clone() };
            if lives == 0 {
                end_run(&next, EndReason::GameOver)
            } else {
                next
            }
        }
        // Time enemies bounce off the ship in Timed mode.
        GameMode::Timed if kind == EnemyKind::Normal => end_run(run, EndReason::GameOver),
        GameMode::Timed => run.clone(),
    }
}

/// A Normal enemy slipped past the danger line.  Separate from
/// [`player_hit`]: this ends the run in either mode.
pub fn enemy_passed(run: &RunState) -> RunState {
    end_run(run, EndReason::EnemyPassed)
}

pub fn add_score(run: &RunState, amount: u32) -> RunState {
    if !run.is_active() {
        return run.clone();
    }
    RunState {
        score: run.score.saturating_add(amount),
        ..run.clone()
    }
}

/// Shift the Timed-mode clock.  `amount` may be negative.
pub fn adjust_time(run: &RunState, amount: f32) -> RunState {
    if !run.is_active() || run.mode != GameMode::Timed {
        return run.clone();
    }
    RunState {
        clock: run.clock + amount,
        ..run.clone()
    }
}

/// Move an active run to `Ended`.  Any other phase is left alone, so a run
/// can only end once.
pub fn end_run(run: &RunState, reason: EndReason) -> RunState {
    if !run.is_active() {
        return run.clone();
    }
    info!(mode = ?run.mode, score = run.score, reason = reason.message(), "Run ended");
    RunState {
        phase: Phase::Ended { reason },
        go_banner: 0.0,
        ..run.clone()
    }
}

pub fn coins_for(score: u32, score_per_coin: u32) -> u32 {
    score.checked_div(score_per_coin).unwrap_or(0)
}

/// The result to persist, once the run has ended.
pub fn outcome(run: &RunState, score_per_coin: u32) -> Option<RunOutcome> {
    match run.phase {
        Phase::Ended { reason } => Some(RunOutcome {
            mode: run.mode,
            score: run.score,
            coins: coins_for(run.score, score_per_coin),
            reason,
        }),
        _ => None,
    }
}

// ── Labels ────────────────────────────────────────────────────────────────────

/// Big centre text: the countdown number, then "GO!" for a moment.
pub fn countdown_label(run: &RunState) -> Option<String> {
    match run.phase {
        Phase::Countdown { remaining } => {
            let shown = (remaining - ACTIVATION_THRESHOLD).ceil().max(0.0) as u32;
            Some(shown.to_string())
        }
        Phase::Active if run.go_banner > 0.0 => Some("GO!".to_string()),
        _ => None,
    }
}

/// `MM:SS`, both parts floored.
pub fn timer_label(clock: f32) -> String {
    let clock = clock.max(0.0);
    let minutes = (clock / 60.0).floor() as u32;
    let seconds = (clock % 60.0).floor() as u32;
    format!("{:02}:{:02}", minutes, seconds)
}
