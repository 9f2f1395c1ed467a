/// Game tunables — loaded from a JSON file, every field defaulted.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub run: RunConfig,
    pub waves: WaveConfig,
    pub enemy: EnemyConfig,
    pub player: PlayerConfig,
    pub formations: FormationConfig,
    pub store: StoreConfig,
}

/// Mode state machine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Length of a Timed-mode run in seconds.
    pub timed_duration: f32,
    pub score_per_coin: u32,
    /// Countdown before play starts.  The last half second is never shown.
    pub start_delay: f32,
    /// How long "GO!" stays up once play starts.
    pub go_banner: f32,
    pub starting_lives: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timed_duration: 45.0,
            score_per_coin: 100,
            start_delay: 3.5,
            go_banner: 1.0,
            starting_lives: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Rest between waves.
    pub wave_delay: f32,
    /// Gap between enemies inside one formation.
    pub spawn_in_wave_delay: f32,
    /// Chance a Timed-mode enemy is a time enemy.
    pub time_enemy_chance: f32,
    /// Multiplier applied to `wave_delay` after each Survival wave.
    pub survival_decay: f32,
    /// The Survival wave delay never shrinks below this.
    pub min_wave_delay: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            wave_delay: 4.0,
            spawn_in_wave_delay: 0.2,
            time_enemy_chance: 0.2,
            survival_decay: 0.98,
            min_wave_delay: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Rows per second.
    pub speed: f32,
    pub score_value: u32,
    pub time_to_add: f32,
    pub time_to_subtract: f32,
    pub explosion_lifetime: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 3.0,
            score_value: 100,
            time_to_add: 5.0,
            time_to_subtract: 3.0,
            explosion_lifetime: 0.4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Minimum seconds between shots.
    pub fire_rate: f32,
    /// Rows per second, always upward.
    pub laser_speed: f32,
    pub laser_lifetime: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            fire_rate: 0.15,
            laser_speed: 30.0,
            laser_lifetime: 3.0,
        }
    }
}

/// Formation geometry in terminal cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    /// Fraction of the field width the W spans.
    pub w_width_fraction: f32,
    pub w_height: f32,
    /// Horizontal gap between double-row enemies.
    pub column_spacing: f32,
    /// Vertical gap between formation rows.
    pub row_spacing: f32,
    /// Horizontal step between triangle rows.
    pub triangle_spacing: f32,
    /// Extra pause between the two rows of a double row.
    pub row_pause: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            w_width_fraction: 0.8,
            w_height: 4.0,
            column_spacing: 4.0,
            row_spacing: 2.0,
            triangle_spacing: 4.0,
            row_pause: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCategory {
    Spaceship,
    Powerup,
}

impl ItemCategory {
    /// Store tabs, in display order.
    pub const ALL: [ItemCategory; 2] = [ItemCategory::Spaceship, ItemCategory::Powerup];

    pub fn title(self) -> &'static str {
        match self {
            ItemCategory::Spaceship => "Spaceships",
            ItemCategory::Powerup => "Power-ups",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreItem {
    pub name: String,
    pub price: u32,
    pub category: ItemCategory,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub items: Vec<StoreItem>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let item = |name: &str, price, category| StoreItem {
            name: name.to_string(),
            price,
            category,
        };
        Self {
            items: vec![
                item("Falcon", 10, ItemCategory::Spaceship),
                item("Nova", 25, ItemCategory::Spaceship),
                item("Twin Laser", 5, ItemCategory::Powerup),
                item("Shield", 8, ItemCategory::Powerup),
            ],
        }
    }
}

impl GameConfig {
    /// Read a config file.  Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<GameConfig, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`GameConfig::load`], but a missing file means defaults and a
    /// broken one is logged and replaced by defaults.
    pub fn load_or_default(path: &Path) -> GameConfig {
        if !path.exists() {
            info!("No config at {:?}, using defaults", path);
            return GameConfig::default();
        }
        match GameConfig::load(path) {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("{}. Using defaults.", e);
                GameConfig::default()
            }
        }
    }
}
