//! Game tunables
//!
//! Every number the simulation consults lives here so a host can rebalance
//! without recompiling. Loaded from JSON by the binary; missing fields fall
//! back to the defaults in [`crate::consts`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Settings could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Grid extent and cell size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// World units per cell
    pub cell_size: f32,
    /// Valid cell indices are `[-half_cells, half_cells)` on both axes
    pub half_cells: i32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,
            half_cells: HALF_CELLS,
        }
    }
}

/// Prices, budgets and placement limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    /// Money available when building starts
    pub starting_money: u32,
    /// Money available once the attack phase starts
    pub attack_money: u32,

    // === Build costs (per unit block) ===
    pub wall_cost: u32,
    pub strong_cost: u32,
    pub house2_cost: u32,
    pub house4_cost: u32,
    pub house6_cost: u32,

    /// Houses of each size the player may place (None = unlimited)
    pub house_limit: Option<u32>,

    // === Ammunition ===
    pub base_shot_cost: u32,
    pub punch_shot_cost: u32,
    pub area_shot_cost: u32,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            starting_money: 120,
            attack_money: 60,

            wall_cost: 1,
            strong_cost: 3,
            house2_cost: 0,
            house4_cost: 0,
            house6_cost: 0,

            house_limit: Some(1),

            base_shot_cost: 1,
            punch_shot_cost: 10,
            area_shot_cost: 5,
        }
    }
}

/// Settling and projectile physics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub epsilon: f32,
    pub max_gravity_passes: u32,
    pub fall_speed: f32,
    pub gravity: f32,
    pub projectile_lifetime: f32,
    pub bounce_damping: f32,
    pub bounce_nudge: f32,
    pub build_area_radius: f32,
    pub ground_radius: f32,
    pub kill_y: f32,
    pub splash_radius: f32,
    pub punch_penetration: u32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            max_gravity_passes: MAX_GRAVITY_PASSES,
            fall_speed: FALL_SPEED,
            gravity: GRAVITY,
            projectile_lifetime: PROJECTILE_LIFETIME,
            bounce_damping: BOUNCE_DAMPING,
            bounce_nudge: BOUNCE_NUDGE,
            build_area_radius: BUILD_AREA_RADIUS,
            ground_radius: GROUND_RADIUS,
            kill_y: KILL_Y,
            splash_radius: SPLASH_RADIUS,
            punch_penetration: PUNCH_PENETRATION,
        }
    }
}

/// Cannon placement and handling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannonSettings {
    /// Muzzle pivot in world space
    pub position: Vec3,
    pub max_power: f32,
    pub min_power: f32,
    /// Power gained per second of charging
    pub charge_rate: f32,
    /// Launch speed per unit of power
    pub power_to_speed: f32,
    /// Aim speed (radians/s)
    pub aim_rate: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub muzzle_offset: f32,
}

impl Default for CannonSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 35.0),
            max_power: CANNON_MAX_POWER,
            min_power: CANNON_MIN_POWER,
            charge_rate: CANNON_CHARGE_RATE,
            power_to_speed: CANNON_POWER_TO_SPEED,
            aim_rate: CANNON_AIM_RATE,
            min_pitch: CANNON_MIN_PITCH,
            max_pitch: CANNON_MAX_PITCH,
            muzzle_offset: CANNON_MUZZLE_OFFSET,
        }
    }
}

/// All simulation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid: GridSettings,
    pub economy: EconomySettings,
    pub physics: PhysicsSettings,
    pub cannon: CannonSettings,
}

impl Settings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (self.grid.cell_size > 0.0, "grid.cell_size", "must be positive"),
            (self.grid.half_cells > 0, "grid.half_cells", "must be positive"),
            (self.physics.epsilon > 0.0, "physics.epsilon", "must be positive"),
            (
                self.physics.max_gravity_passes > 0,
                "physics.max_gravity_passes",
                "must be at least 1",
            ),
            (self.physics.fall_speed > 0.0, "physics.fall_speed", "must be positive"),
            (
                self.physics.bounce_damping > 0.0 && self.physics.bounce_damping <= 1.0,
                "physics.bounce_damping",
                "must be in (0, 1]",
            ),
            (
                self.physics.projectile_lifetime > 0.0,
                "physics.projectile_lifetime",
                "must be positive",
            ),
            (
                self.cannon.min_pitch <= self.cannon.max_pitch,
                "cannon.min_pitch",
                "must not exceed cannon.max_pitch",
            ),
        ];
        for (ok, field, reason) in checks {
            if !ok {
                return Err(ConfigError::Invalid { field, reason });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{ "economy": { "starting_money": 7 } }"#).unwrap();
        assert_eq!(settings.economy.starting_money, 7);
        assert_eq!(settings.economy.wall_cost, 1);
        assert_eq!(settings.physics.fall_speed, FALL_SPEED);
        assert_eq!(settings.grid.half_cells, HALF_CELLS);
    }

    #[test]
    fn test_written_json_loads_back() {
        let mut settings = Settings::default();
        settings.economy.house_limit = None;
        settings.physics.bounce_damping = 0.5;
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Settings::from_json(r#"{ "grid": { "cell_size": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "grid.cell_size", .. }));

        let err = Settings::from_json(r#"{ "physics": { "bounce_damping": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
