//! Village Defense - a grid building and siege simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (placement, support, gravity, projectiles)
//! - `settings`: Data-driven tunables (grid, economy, physics)
//!
//! Rendering, input devices and effects are left to the host. The host feeds
//! pointer rays and frame deltas in and drains [`sim::GameEvent`]s out.

pub mod settings;
pub mod sim;

pub use settings::{ConfigError, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed projectile timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted by the stepper (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Grid defaults: 40x40 unit cells centred on the origin
    pub const CELL_SIZE: f32 = 1.0;
    pub const HALF_CELLS: i32 = 20;

    /// Height comparisons (flatness, abutment, settling) use this tolerance
    pub const EPSILON: f32 = 0.01;

    /// Gravity resolver pass cap
    pub const MAX_GRAVITY_PASSES: u32 = 100;
    /// Falling block speed (units/s)
    pub const FALL_SPEED: f32 = 15.0;

    /// Projectile physics
    pub const GRAVITY: f32 = -9.8;
    pub const PROJECTILE_LIFETIME: f32 = 7.0;
    pub const BOUNCE_DAMPING: f32 = 0.75;
    /// Push-out distance along the bounce normal
    pub const BOUNCE_NUDGE: f32 = 0.1;
    /// Ground hits inside this radius bounce, outside they despawn
    pub const BUILD_AREA_RADIUS: f32 = 20.0;
    /// Radius of the ground platform; below y = 0 outside it the shot is lost
    pub const GROUND_RADIUS: f32 = 60.0;
    pub const KILL_Y: f32 = -10.0;

    /// Area shot splash radius
    pub const SPLASH_RADIUS: f32 = 2.5;
    /// Punch shot penetration budget
    pub const PUNCH_PENETRATION: u32 = 4;

    /// Cannon defaults
    pub const CANNON_MAX_POWER: f32 = 100.0;
    pub const CANNON_MIN_POWER: f32 = 5.0;
    pub const CANNON_CHARGE_RATE: f32 = 80.0;
    pub const CANNON_POWER_TO_SPEED: f32 = 0.6;
    pub const CANNON_AIM_RATE: f32 = 1.0;
    pub const CANNON_MIN_PITCH: f32 = -0.6;
    pub const CANNON_MAX_PITCH: f32 = std::f32::consts::FRAC_PI_6;
    pub const CANNON_MUZZLE_OFFSET: f32 = 2.0;
}

/// True when two heights are equal within [`consts::EPSILON`]
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= consts::EPSILON
}
