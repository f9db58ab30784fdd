//! Game state, phases and the event queue
//!
//! Every mutation of the world goes through a method on [`GameState`]. The
//! host drains [`GameEvent`]s after each call or frame to drive rendering,
//! effects and UI.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::cannon::Cannon;
use super::drag::DragSession;
use super::economy::Economy;
use super::footprint::Grid;
use super::gravity::{self, FallingBlocks, SettleStatus};
use super::height_map::HeightMap;
use super::placement::PlaceError;
use super::projectile::{EffectKind, Projectile, ProjectileKind};
use super::removal::RemoveError;
use super::scene::{Kind, ObjectId, Scene};
use crate::settings::Settings;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Placing and removing blocks
    Building,
    /// Firing at the finished village
    Attacking,
    /// Every house is gone
    Victory,
}

/// Phase change refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    #[error("not in the building phase")]
    NotBuilding,
    #[error("finish or cancel the current drag first")]
    DragInProgress,
    #[error("structure is still settling")]
    Busy,
}

/// Notifications for the host
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Drag committed; one id per unit block (or the house)
    Placed { kind: Kind, ids: Vec<ObjectId> },
    PlacementCancelled { reason: PlaceError },
    /// Camera navigation must be disabled while a drag is live
    CameraLock(bool),
    Removed { id: ObjectId, kind: Kind, refund: u32 },
    RemovalRejected { id: ObjectId, reason: RemoveError },
    Damaged { id: ObjectId },
    Destroyed { id: ObjectId, kind: Kind },
    /// An object started (or was retargeted) falling
    Falling { id: ObjectId, target_y: f32 },
    Landed { id: ObjectId },
    Settled { passes: u32, status: SettleStatus },
    ProjectileFired { id: u32, kind: ProjectileKind },
    ShotRejected { kind: ProjectileKind, cost: u32 },
    Bounced { id: u32, position: Vec3 },
    ProjectileDespawned { id: u32 },
    Effect { kind: EffectKind, position: Vec3 },
    /// Money changed; refresh the UI
    EconomyChanged { money: u32 },
    PhaseChanged(GamePhase),
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub grid: Grid,
    pub phase: GamePhase,
    pub scene: Scene,
    /// Derived from `scene`; rebuilt after every structural change
    pub height_map: HeightMap,
    pub economy: Economy,
    /// Live drag, if any
    pub drag: Option<DragSession>,
    pub falling: FallingBlocks,
    /// Projectiles in flight (sorted by id)
    pub projectiles: Vec<Projectile>,
    pub cannon: Cannon,
    /// Fixed projectile steps taken
    pub time_ticks: u64,
    events: Vec<GameEvent>,
    next_projectile_id: u32,
}

impl GameState {
    pub fn new(settings: Settings) -> Self {
        let grid = Grid::from(&settings.grid);
        Self {
            grid,
            phase: GamePhase::Building,
            scene: Scene::new(),
            height_map: HeightMap::default(),
            economy: Economy::new(&settings.economy),
            drag: None,
            falling: FallingBlocks::default(),
            projectiles: Vec::new(),
            cannon: Cannon::new(&settings.cannon),
            time_ticks: 0,
            events: Vec::new(),
            next_projectile_id: 1,
            settings,
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Blocks are still falling into place
    pub fn is_settling(&self) -> bool {
        !self.falling.is_empty()
    }

    pub fn rebuild_height_map(&mut self) {
        self.height_map.rebuild(&self.scene, &self.grid);
    }

    pub(crate) fn next_projectile_id(&mut self) -> u32 {
        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        id
    }

    pub(crate) fn notify_economy(&mut self) {
        let money = self.economy.money;
        self.push_event(GameEvent::EconomyChanged { money });
    }

    /// Recompute resting heights and queue whatever has to fall
    pub fn settle(&mut self) -> SettleStatus {
        let physics = self.settings.physics;
        let bodies = gravity::snapshot(&self.scene, &self.grid, &self.falling);
        let resolution = gravity::resolve(&bodies, physics.epsilon, physics.max_gravity_passes);

        for target in &resolution.targets {
            self.falling.schedule(*target);
            self.events.push(GameEvent::Falling {
                id: target.id,
                target_y: target.target_y,
            });
        }

        match resolution.status {
            SettleStatus::Stable => log::info!(
                "Gravity settled in {} passes ({} falling)",
                resolution.passes,
                resolution.targets.len()
            ),
            SettleStatus::StabilizationIncomplete => log::warn!(
                "Gravity hit the {} pass cap; using best known heights",
                resolution.passes
            ),
        }
        self.push_event(GameEvent::Settled {
            passes: resolution.passes,
            status: resolution.status,
        });
        resolution.status
    }

    /// Lower falling blocks for one frame
    pub fn update_falling(&mut self, dt: f32) {
        let landed = self
            .falling
            .update(dt, self.settings.physics.fall_speed, &mut self.scene);
        if landed.is_empty() {
            return;
        }
        for id in landed {
            self.events.push(GameEvent::Landed { id });
        }
        self.rebuild_height_map();
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.push_event(GameEvent::PhaseChanged(phase));
        }
    }

    /// Leave the building phase; money is reset to the attack budget
    pub fn finish_building(&mut self) -> Result<(), PhaseError> {
        if self.phase != GamePhase::Building {
            return Err(PhaseError::NotBuilding);
        }
        if self.drag.is_some() {
            return Err(PhaseError::DragInProgress);
        }
        if self.is_settling() {
            return Err(PhaseError::Busy);
        }
        self.set_phase(GamePhase::Attacking);
        self.economy.set_money(self.settings.economy.attack_money);
        self.notify_economy();
        self.check_victory();
        Ok(())
    }

    /// Switch to victory once the last house is gone
    pub fn check_victory(&mut self) {
        if self.phase == GamePhase::Attacking && self.scene.houses_remaining() == 0 {
            self.set_phase(GamePhase::Victory);
        }
    }

    /// Fire the cannon's current charge
    ///
    /// Returns the projectile id, or None if the charge fizzled, the player
    /// cannot afford the selected ammunition, or the phase is wrong.
    pub fn fire(&mut self) -> Option<u32> {
        if self.phase != GamePhase::Attacking {
            self.cannon.power = 0.0;
            return None;
        }
        let shot = self.cannon.release()?;
        let cost = self.economy.ammo_cost(shot.kind);
        if !self.economy.spend(cost) {
            log::debug!("Cannot afford {} shot ({})", shot.kind.as_str(), cost);
            self.push_event(GameEvent::ShotRejected { kind: shot.kind, cost });
            return None;
        }
        self.notify_economy();

        let id = self.next_projectile_id();
        let projectile = Projectile::new(id, shot.kind, shot.origin, shot.velocity, &self.settings.physics);
        self.projectiles.push(projectile);
        self.push_event(GameEvent::ProjectileFired { id, kind: shot.kind });
        Some(id)
    }
}
