/// Local persistence: a flat key-value preferences file plus the profile
/// (coins, leaderboards, last run) stored in it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::entities::{GameMode, RunOutcome};
use crate::error::PersistenceError;

/// Top scores kept per mode.
pub const LEADERBOARD_LEN: usize = 5;

const KEY_TOTAL_COINS: &str = "TotalCoins";
const KEY_LAST_SCORE: &str = "LastScore";
const KEY_LAST_COINS: &str = "LastCoins";
const KEY_END_MESSAGE: &str = "EndMessage";

fn score_key(mode: GameMode, rank: usize) -> String {
    match mode {
        GameMode::Timed => format!("TimedScore_{}", rank),
        GameMode::Survival => format!("SurvivalScore_{}", rank),
    }
}

fn unlock_key(item: &str) -> String {
    format!("Unlocked_{}", item)
}

// ── Key-value store ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Int(i64),
    Text(String),
}

/// Flat preferences map, optionally backed by a JSON file.
#[derive(Clone, Debug, Default)]
pub struct Prefs {
    values: BTreeMap<String, PrefValue>,
    path: Option<PathBuf>,
}

impl Prefs {
    /// Preferences that are never written anywhere.
    pub fn in_memory() -> Prefs {
        Prefs::default()
    }

    /// Empty preferences that will be saved to `path`.
    pub fn empty_at(path: &Path) -> Prefs {
        Prefs {
            values: BTreeMap::new(),
            path: Some(path.to_path_buf()),
        }
    }

    /// Read preferences from `path`.  A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Prefs, PersistenceError> {
        if !path.exists() {
            return Ok(Prefs::empty_at(path));
        }
        let json = std::fs::read_to_string(path).map_err(|source| PersistenceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let values: BTreeMap<String, PrefValue> =
            serde_json::from_str(&json).map_err(|source| PersistenceError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Prefs {
            values,
            path: Some(path.to_path_buf()),
        })
    }

    /// Like [`Prefs::load`], but an unreadable file is logged and replaced by
    /// an empty store bound to the same path.
    pub fn load_or_empty(path: &Path) -> Prefs {
        match Prefs::load(path) {
            Ok(prefs) => {
                info!("Loaded preferences from {:?}", path);
                prefs
            }
            Err(e) => {
                warn!("{}. Starting fresh.", e);
                Prefs::empty_at(path)
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(PrefValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), PrefValue::Int(value));
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(PrefValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_string(), PrefValue::Text(value.to_string()));
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Write the whole map out.  In-memory stores have nothing to do.
    pub fn save(&self) -> Result<(), PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PersistenceError::Write {
                path: path.clone(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(path, json).map_err(|source| PersistenceError::Write {
            path: path.clone(),
            source,
        })?;
        debug!("Preferences saved to {:?}", path);
        Ok(())
    }
}

// ── Leaderboards ──────────────────────────────────────────────────────────────

/// Insert `score` into a top list: sorted high to low, at most
/// [`LEADERBOARD_LEN`] long.
pub fn submit_to_leaderboard(scores: &[u32], score: u32) -> Vec<u32> {
    let mut next = scores.to_vec();
    next.push(score);
    next.sort_by(|a, b| b.cmp(a));
    next.truncate(LEADERBOARD_LEN);
    next
}

// ── Gateway ───────────────────────────────────────────────────────────────────

/// Where finished runs are reported.
pub trait ScoreGateway {
    fn add_coins(&mut self, amount: u32) -> Result<(), PersistenceError>;
    fn submit_score(&mut self, mode: GameMode, score: u32) -> Result<(), PersistenceError>;
    fn leaderboard(&self, mode: GameMode) -> Vec<u32>;
    /// Remember the run for the results screen.
    fn record_last_run(&mut self, outcome: &RunOutcome) -> Result<(), PersistenceError>;
    fn last_run(&self) -> Option<LastRun>;
}

impl<G: ScoreGateway + ?Sized> ScoreGateway for &mut G {
    fn add_coins(&mut self, amount: u32) -> Result<(), PersistenceError> {
        (**self).add_coins(amount)
    }

    fn submit_score(&mut self, mode: GameMode, score: u32) -> Result<(), PersistenceError> {
        (**self).submit_score(mode, score)
    }

    fn leaderboard(&self, mode: GameMode) -> Vec<u32> {
        (**self).leaderboard(mode)
    }

    fn record_last_run(&mut self, outcome: &RunOutcome) -> Result<(), PersistenceError> {
        (**self).record_last_run(outcome)
    }

    fn last_run(&self) -> Option<LastRun> {
        (**self).last_run()
    }
}

/// Results of the most recent run, as shown on the end screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastRun {
    pub score: u32,
    pub coins: u32,
    pub message: String,
}

/// The player's saved progress.  In-memory values are the source of truth;
/// every change is written through to the prefs file.
#[derive(Clone, Debug)]
pub struct Profile {
    prefs: Prefs,
    total_coins: u32,
    timed_scores: Vec<u32>,
    survival_scores: Vec<u32>,
}

fn read_u32(prefs: &Prefs, key: &str) -> Option<u32> {
    prefs.get_int(key).and_then(|v| u32::try_from(v).ok())
}

fn read_leaderboard(prefs: &Prefs, mode: GameMode) -> Vec<u32> {
    let mut scores: Vec<u32> = (0..LEADERBOARD_LEN)
        .map_while(|rank| read_u32(prefs, &score_key(mode, rank)))
        .collect();
    scores.sort_by(|a, b| b.cmp(a));
    scores
}

impl Profile {
    pub fn load(prefs: Prefs) -> Profile {
        let total_coins = read_u32(&prefs, KEY_TOTAL_COINS).unwrap_or(0);
        let timed_scores = read_leaderboard(&prefs, GameMode::Timed);
        let survival_scores = read_leaderboard(&prefs, GameMode::Survival);
        Profile {
            prefs,
            total_coins,
            timed_scores,
            survival_scores,
        }
    }

    pub fn prefs(&self) -> &Prefs {
        &self.prefs
    }

    pub fn total_coins(&self) -> u32 {
        self.total_coins
    }

    /// Take `amount` coins off the balance, never below zero.
    pub fn spend_coins(&mut self, amount: u32) -> Result<(), PersistenceError> {
        self.total_coins = self.total_coins.saturating_sub(amount);
        self.save_coins()
    }

    pub fn is_unlocked(&self, item: &str) -> bool {
        self.prefs.get_int(&unlock_key(item)).unwrap_or(0) != 0
    }

    pub fn unlock(&mut self, item: &str) -> Result<(), PersistenceError> {
        self.prefs.set_int(&unlock_key(item), 1);
        self.prefs.save()
    }

    fn save_coins(&mut self) -> Result<(), PersistenceError> {
        self.prefs.set_int(KEY_TOTAL_COINS, i64::from(self.total_coins));
        self.prefs.save()
    }

    fn scores_mut(&mut self, mode: GameMode) -> &mut Vec<u32> {
        match mode {
            GameMode::Timed => &mut self.timed_scores,
            GameMode::Survival => &mut self.survival_scores,
        }
    }
}

impl ScoreGateway for Profile {
    fn add_coins(&mut self, amount: u32) -> Result<(), PersistenceError> {
        self.total_coins = self.total_coins.saturating_add(amount);
        self.save_coins()
    }

    fn submit_score(&mut self, mode: GameMode, score: u32) -> Result<(), PersistenceError> {
        let next = submit_to_leaderboard(&self.leaderboard(mode), score);
        for rank in 0..LEADERBOARD_LEN {
            let key = score_key(mode, rank);
            match next.get(rank) {
                Some(s) => self.prefs.set_int(&key, i64::from(*s)),
                None => self.prefs.remove(&key),
            }
        }
        *self.scores_mut(mode) = next;
        self.prefs.save()
    }

    fn leaderboard(&self, mode: GameMode) -> Vec<u32> {
        match mode {
            GameMode::Timed => self.timed_scores.clone(),
            GameMode::Survival => self.survival_scores.clone(),
        }
    }

    fn record_last_run(&mut self, outcome: &RunOutcome) -> Result<(), PersistenceError> {
        self.prefs.set_int(KEY_LAST_SCORE, i64::from(outcome.score));
        self.prefs.set_int(KEY_LAST_COINS, i64::from(outcome.coins));
        self.prefs.set_string(KEY_END_MESSAGE, outcome.reason.message());
        self.prefs.save()
    }

    fn last_run(&self) -> Option<LastRun> {
        Some(LastRun {
            score: read_u32(&self.prefs, KEY_LAST_SCORE)?,
            coins: read_u32(&self.prefs, KEY_LAST_COINS)?,
            message: self.prefs.get_string(KEY_END_MESSAGE)?.to_string(),
        })
    }
}
