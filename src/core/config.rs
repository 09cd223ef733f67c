//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. A TOML file may override any
//! subset of them; missing keys keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SkulkError};

/// Heuristic used by the A* grid search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Manhattan distance. Overestimates diagonal routes, so paths may be
    /// slightly longer than optimal, but the search expands fewer nodes.
    #[default]
    Manhattan,
    /// Octile distance. Admissible for 8-directional movement.
    Octile,
}

/// Top-level configuration for every subsystem
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub pathfinding: PathfindingConfig,
    pub agents: AgentConfig,
    pub player: PlayerConfig,
    pub frame: FrameConfig,
}

// === WORLD STREAMING ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of a square chunk (world units)
    ///
    /// Must comfortably contain a settlement footprint (~1200 units).
    pub chunk_size: f32,

    /// Chebyshev radius (in chunks) kept loaded around the player
    pub active_radius: i32,

    /// Seconds a chunk outside the active set survives before eviction
    pub eviction_idle_secs: f32,

    /// Probability that a chunk hosts a settlement
    pub settlement_probability: f32,

    /// Radius around the world origin kept free of trees and settlements
    pub spawn_clear_radius: f32,

    /// Number of candidate tree positions rolled per chunk
    pub tree_attempts_per_chunk: u32,

    /// Frequency of the biome noise (smaller = larger forests)
    pub tree_noise_scale: f32,

    /// Biome noise value above which a position counts as forest
    pub tree_noise_threshold: f32,

    /// Chance that a forest candidate actually grows a tree
    pub tree_density: f32,

    /// Minimum distance between two trees of the same chunk
    pub tree_min_spacing: f32,

    /// Margin around settlement bounds kept free of trees
    pub settlement_tree_margin: f32,

    /// Tile size used to roll decorations
    pub decoration_tile_size: f32,

    /// Flat chance per tile of spawning a decoration
    pub decoration_probability: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2048.0,
            active_radius: 1,
            eviction_idle_secs: 30.0,
            settlement_probability: 0.35,
            spawn_clear_radius: 400.0,
            tree_attempts_per_chunk: 60,
            tree_noise_scale: 0.0012,
            tree_noise_threshold: 0.1,
            tree_density: 0.75,
            tree_min_spacing: 80.0,
            settlement_tree_margin: 100.0,
            decoration_tile_size: 64.0,
            decoration_probability: 0.02,
        }
    }
}

// === PATHFINDING ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Cell size of the rasterised occupancy grid (world units)
    ///
    /// Should be at least the agent size so that a walkable cell can
    /// actually hold an agent.
    pub grid_size: f32,

    /// Extra cells searched around the start/end bounding box
    pub margin_cells: i32,

    /// Upper bound on grid cells per axis
    pub max_cells_per_axis: usize,

    /// Breadth-first depth used to relocate an unwalkable start or end
    pub unwalkable_search_depth: u32,

    /// Flat cost added for every floor transition (world units)
    pub stair_transition_penalty: f32,

    pub heuristic: Heuristic,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            grid_size: 32.0,
            margin_cells: 10,
            max_cells_per_axis: 256,
            unwalkable_search_depth: 5,
            stair_transition_penalty: 160.0,
            heuristic: Heuristic::Manhattan,
        }
    }
}

// === AGENT AI ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Distance at which an agent can notice the player
    pub detection_radius: f32,

    /// Full view cone angle (radians)
    pub field_of_view: f32,

    /// Multiplier on detection radius while the player sneaks
    pub sneak_detection_multiplier: f32,

    /// Randomised delay between path recomputations (seconds)
    pub path_cooldown_min: f32,
    pub path_cooldown_max: f32,

    /// Chase re-paths once the player moved this many grid cells
    pub repath_distance_cells: f32,

    /// Randomised idle time after a failed path request (seconds)
    pub idle_retry_min: f32,
    pub idle_retry_max: f32,

    /// Alert timers (seconds)
    pub seen_alert_secs: f32,
    pub lost_alert_secs: f32,
    pub alert_secs: f32,
    pub gunshot_alert_secs: f32,

    /// Jitter radius for investigation sub-points
    pub investigation_min_radius: f32,
    pub investigation_max_radius: f32,

    /// An alert further than this from the current investigation point
    /// replaces it
    pub investigation_redirect_distance: f32,

    /// Radius and strength of the anti-clumping repulsion
    pub separation_radius: f32,
    pub separation_strength: f32,

    /// Door-stuck recovery
    pub door_reach_factor: f32,
    pub door_alignment: f32,
    pub door_cooldown: f32,
    /// Fraction of expected displacement below which an agent counts as stuck
    pub stuck_progress_ratio: f32,

    /// Distance at which a waypoint counts as reached
    pub waypoint_reach_distance: f32,

    /// Randomised delay before the first shot after entering attack
    pub attack_delay_min: f32,
    pub attack_delay_max: f32,

    pub projectile_speed: f32,
    pub projectile_ttl: f32,

    /// Ally alert radii
    pub sighting_alert_radius: f32,
    pub gunfire_alert_radius: f32,
    pub death_alert_radius: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            detection_radius: 400.0,
            field_of_view: std::f32::consts::FRAC_PI_2,
            sneak_detection_multiplier: 0.6,
            path_cooldown_min: 0.3,
            path_cooldown_max: 0.5,
            repath_distance_cells: 2.0,
            idle_retry_min: 0.5,
            idle_retry_max: 1.5,
            seen_alert_secs: 15.0,
            lost_alert_secs: 12.0,
            alert_secs: 18.0,
            gunshot_alert_secs: 25.0,
            investigation_min_radius: 40.0,
            investigation_max_radius: 120.0,
            investigation_redirect_distance: 100.0,
            separation_radius: 40.0,
            separation_strength: 60.0,
            door_reach_factor: 1.5,
            door_alignment: 0.7,
            door_cooldown: 0.5,
            stuck_progress_ratio: 0.1,
            waypoint_reach_distance: 12.0,
            attack_delay_min: 0.2,
            attack_delay_max: 0.8,
            projectile_speed: 700.0,
            projectile_ttl: 2.0,
            sighting_alert_radius: 500.0,
            gunfire_alert_radius: 800.0,
            death_alert_radius: 600.0,
        }
    }
}

// === PLAYER ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f32,
    pub size: f32,
    pub max_health: f32,
    pub sneak_multiplier: f32,
    pub dash_multiplier: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    pub fire_cooldown: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    /// Radius within which the player's gunfire alerts agents
    pub gunshot_alert_radius: f32,
    /// Reach for doors, stairs and interactables
    pub interact_reach: f32,
    pub starting_ammo: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 160.0,
            size: 24.0,
            max_health: 100.0,
            sneak_multiplier: 0.5,
            dash_multiplier: 2.2,
            dash_duration: 0.25,
            dash_cooldown: 1.5,
            fire_cooldown: 0.35,
            projectile_speed: 900.0,
            projectile_damage: 34.0,
            gunshot_alert_radius: 900.0,
            interact_reach: 48.0,
            starting_ammo: 24,
        }
    }
}

// === FRAME ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Largest delta time accepted per step; longer frames are clamped to
    /// keep collision resolution stable on hitches
    pub max_dt: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { max_dt: 0.05 }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.pathfinding.grid_size <= 0.0 {
            return Err(SkulkError::Config("grid_size must be positive".into()));
        }

        // A settlement is ~1200 units across and must fit in one chunk
        if self.world.chunk_size < 1400.0 {
            return Err(SkulkError::Config(format!(
                "chunk_size ({}) is too small to hold a settlement",
                self.world.chunk_size
            )));
        }

        if self.world.active_radius < 0 {
            return Err(SkulkError::Config("active_radius must be >= 0".into()));
        }

        let agents = &self.agents;
        if agents.path_cooldown_min > agents.path_cooldown_max
            || agents.idle_retry_min > agents.idle_retry_max
            || agents.attack_delay_min > agents.attack_delay_max
            || agents.investigation_min_radius > agents.investigation_max_radius
        {
            return Err(SkulkError::Config("range minimum exceeds maximum".into()));
        }

        if !(0.0..=std::f32::consts::TAU).contains(&agents.field_of_view) {
            return Err(SkulkError::Config(format!(
                "field_of_view ({}) must be within [0, 2π]",
                agents.field_of_view
            )));
        }

        if self.frame.max_dt <= 0.0 {
            return Err(SkulkError::Config("max_dt must be positive".into()));
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<SimulationConfig> = OnceLock::new();

/// Get the global simulation config (initializes with defaults if not set)
pub fn config() -> &'static SimulationConfig {
    CONFIG.get_or_init(SimulationConfig::default)
}

/// Set the global simulation config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: SimulationConfig) -> std::result::Result<(), SimulationConfig> {
    CONFIG.set(config)
}
