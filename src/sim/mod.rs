//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep for projectiles
//! - Stable iteration order (by object / projectile id)
//! - Height map always rebuilt from the scene, never patched
//! - No rendering or platform dependencies

pub mod cannon;
pub mod collision;
pub mod drag;
pub mod economy;
pub mod footprint;
pub mod gravity;
pub mod height_map;
pub mod placement;
pub mod projectile;
pub mod removal;
pub mod scene;
pub mod state;
pub mod support;
pub mod tick;

pub use cannon::{Cannon, Shot};
pub use collision::{Impact, ImpactQuery, ImpactTarget, SceneQuery, ray_aabb_intersect};
pub use drag::{
    BlockKind, Brush, Candidate, DragSession, DragState, GroundPlaneRaycaster, GroundRaycaster,
    Preview,
};
pub use economy::Economy;
pub use footprint::{CellCoord, Footprint, Grid};
pub use gravity::{FallTarget, FallingBlocks, GravityResolution, SettleStatus};
pub use height_map::{HeightEntry, HeightMap, SurfaceType};
pub use placement::{PlaceError, can_place, resting_y};
pub use projectile::{EffectKind, ImpactOutcome, Projectile, ProjectileFate, ProjectileKind};
pub use removal::RemoveError;
pub use scene::{HouseSize, Kind, ObjectId, PlacedObject, Scene};
pub use state::{GameEvent, GamePhase, GameState, PhaseError};
pub use support::is_supporting;
pub use tick::{FixedStepper, TickInput, advance, tick};
