//! Fixed timestep simulation tick
//!
//! Projectiles advance in fixed steps fed by [`FixedStepper`]; falling blocks
//! advance once per frame on the real frame delta.

use super::collision::{ImpactQuery, SceneQuery};
use super::projectile::{EffectKind, ProjectileFate, ProjectileKind, resolve_impact};
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Input for one frame (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Cannon yaw axis (-1..=1)
    pub yaw_axis: f32,
    /// Cannon pitch axis (-1..=1)
    pub pitch_axis: f32,
    /// Trigger held: charge the cannon
    pub charging: bool,
    /// Trigger released this frame
    pub fire: bool,
    /// Ammunition picked this frame
    pub select: Option<ProjectileKind>,
}

/// Turns variable frame deltas into a whole number of fixed steps
#[derive(Debug, Clone, Default)]
pub struct FixedStepper {
    accumulator: f32,
}

impl FixedStepper {
    /// Add a frame delta and return how many fixed steps to run
    ///
    /// The delta is clamped to [`MAX_FRAME_DT`] and at most [`MAX_SUBSTEPS`]
    /// steps run per frame to prevent a spiral of death.
    pub fn steps(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Time carried over to the next frame
    pub fn remainder(&self) -> f32 {
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Advance the game by one frame
///
/// Returns the number of fixed steps taken.
pub fn advance(state: &mut GameState, stepper: &mut FixedStepper, input: &TickInput, frame_dt: f32) -> u32 {
    if let Some(kind) = input.select {
        state.cannon.selected = kind;
    }

    let steps = stepper.steps(frame_dt);
    for _ in 0..steps {
        tick(state, input, SIM_DT);
    }
    if input.fire {
        state.fire();
    }

    state.update_falling(frame_dt.clamp(0.0, MAX_FRAME_DT));
    steps
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.cannon.aim(input.yaw_axis, input.pitch_axis, dt);
    if input.charging {
        state.cannon.charge(dt);
    }
    step_projectiles(state, dt);
    state.time_ticks += 1;
}

/// Integrate every projectile and resolve at most one impact each
pub fn step_projectiles(state: &mut GameState, dt: f32) {
    let physics = state.settings.physics;
    let projectiles = std::mem::take(&mut state.projectiles);
    let mut survivors = Vec::with_capacity(projectiles.len());

    for mut projectile in projectiles {
        let from = projectile.position;
        projectile.integrate(physics.gravity, dt);

        let query = SceneQuery::new(&state.scene, &state.grid, physics.ground_radius);
        if let Some(impact) = query.first_hit(from, projectile.position) {
            let outcome = resolve_impact(&mut projectile, &impact, &state.scene, &physics);
            for (kind, position) in outcome.effects {
                state.push_event(GameEvent::Effect { kind, position });
            }
            state.damage_objects(&outcome.damaged);
            state.destroy_objects(&outcome.destroyed);

            match outcome.fate {
                ProjectileFate::Despawned => {
                    state.push_event(GameEvent::ProjectileDespawned { id: projectile.id });
                    continue;
                }
                ProjectileFate::Bounced => state.push_event(GameEvent::Bounced {
                    id: projectile.id,
                    position: projectile.position,
                }),
                ProjectileFate::Continue => {}
            }
        }

        if projectile.is_lost(&physics) {
            state.push_event(GameEvent::Effect {
                kind: EffectKind::Smoke,
                position: projectile.position,
            });
            state.push_event(GameEvent::ProjectileDespawned { id: projectile.id });
            continue;
        }
        survivors.push(projectile);
    }

    // Anything fired mid-step lands after the survivors; keep id order
    survivors.append(&mut state.projectiles);
    survivors.sort_by_key(|p| p.id);
    state.projectiles = survivors;
}
