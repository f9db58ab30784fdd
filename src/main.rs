//! Village Defense headless runner
//!
//! Builds a seeded village through the same drag API a UI would use, ends
//! the building phase and shells it until the houses are gone or the money
//! runs out.
//!
//! Usage: `village-defense [seed] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::Path;

    use anyhow::{Context, Result};
    use glam::{Vec2, Vec3};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use village_defense::Settings;
    use village_defense::sim::{
        BlockKind, Brush, Candidate, FixedStepper, GameEvent, GamePhase, GameState, HouseSize, Kind,
        ObjectId, PlaceError, ProjectileKind, TickInput, advance,
    };

    /// Frames per second of the simulated host
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up after this many frames (five minutes)
    const MAX_FRAMES: u32 = 60 * 300;

    pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Ok(Settings::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = Settings::from_json(&json)
            .with_context(|| format!("parsing settings from {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Drag a candidate to `at`, turn it, and let go
    fn drop_at(state: &mut GameState, candidate: Candidate, at: Vec3, turns: u8) -> Result<Vec<ObjectId>, PlaceError> {
        state.begin_drag(candidate)?;
        let pointer = move |_ndc: Vec2| Some(at);
        state.drag_pointer_moved(Vec2::ZERO, &pointer);
        for _ in 0..turns {
            state.rotate_drag();
        }
        state.release_drag()
    }

    /// Run frames with no input until nothing is falling
    fn wait_for_settling(state: &mut GameState, stepper: &mut FixedStepper) {
        let idle = TickInput::default();
        while state.is_settling() {
            advance(state, stepper, &idle, FRAME_DT);
        }
    }

    fn random_spot(rng: &mut Pcg32, min_radius: f32, max_radius: f32) -> Vec3 {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let radius = rng.random_range(min_radius..max_radius);
        Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
    }

    pub fn build_village(state: &mut GameState, rng: &mut Pcg32) {
        let mut stepper = FixedStepper::default();

        for size in HouseSize::ALL {
            let spot = random_spot(rng, 0.0, 8.0);
            // Half the houses sit on a strong plinth
            if rng.random_bool(0.5) {
                let plinth = Candidate::Block {
                    kind: BlockKind::Strong,
                    brush: Brush::new(2, 1, 2),
                };
                if let Err(err) = drop_at(state, plinth, spot, 0) {
                    log::debug!("Plinth at {spot:?} refused: {err}");
                }
            }
            match drop_at(state, Candidate::House(size), spot, 0) {
                Ok(ids) => log::info!("House {:?} placed as {:?}", size, ids),
                Err(err) => log::warn!("House {:?} at {spot:?} refused: {err}", size),
            }
        }

        for _ in 0..12 {
            let kind = if rng.random_bool(0.3) { BlockKind::Strong } else { BlockKind::Wall };
            let brush = Brush::new(rng.random_range(1..=3), rng.random_range(1..=2), 1);
            let spot = random_spot(rng, 9.0, 14.0);
            let turns = rng.random_range(0..4);
            if let Err(err) = drop_at(state, Candidate::Block { kind, brush }, spot, turns) {
                log::debug!("Wall at {spot:?} refused: {err}");
            }
        }

        // Change of heart: take one block back out
        let blocks: Vec<ObjectId> = state
            .scene
            .iter()
            .filter(|o| o.kind.supports_others())
            .map(|o| o.id)
            .collect();
        if !blocks.is_empty() {
            let id = blocks[rng.random_range(0..blocks.len())];
            match state.remove_object(id) {
                Ok(refund) => log::info!("Removed block {id} for {refund}"),
                Err(err) => log::info!("Could not remove block {id}: {err}"),
            }
            wait_for_settling(state, &mut stepper);
        }

        log::info!(
            "Village built: {} objects, {} houses, {} money left",
            state.scene.len(),
            state.scene.houses_remaining(),
            state.economy.money
        );
    }

    /// Cheapest ammunition first, but sometimes splurge
    fn pick_ammo(state: &GameState, rng: &mut Pcg32) -> Option<ProjectileKind> {
        let affordable: Vec<_> = ProjectileKind::ALL
            .into_iter()
            .filter(|&k| state.economy.ammo_cost(k) <= state.economy.money)
            .collect();
        match affordable.len() {
            0 => None,
            n => Some(affordable[rng.random_range(0..n)]),
        }
    }

    pub fn run_attack(state: &mut GameState, rng: &mut Pcg32) -> Result<()> {
        state.finish_building().context("ending the building phase")?;
        let mut stepper = FixedStepper::default();
        let idle = TickInput::default();
        let gravity = state.settings.physics.gravity;
        let mut shots = 0u32;
        let mut destroyed = 0u32;

        let mut frame = 0;
        while frame < MAX_FRAMES && state.phase == GamePhase::Attacking {
            if !state.projectiles.is_empty() || state.is_settling() {
                advance(state, &mut stepper, &idle, FRAME_DT);
                frame += 1;
            } else {
                let Some(kind) = pick_ammo(state, rng) else {
                    log::info!("Out of money");
                    break;
                };
                let Some(target) = state
                    .scene
                    .iter()
                    .filter(|o| o.kind.is_objective())
                    .map(|o| o.position)
                    .next()
                else {
                    break;
                };

                let speed = state.cannon.speed_for(state.settings.cannon.max_power);
                let scatter = Vec3::new(rng.random_range(-0.5..0.5), 0.0, rng.random_range(-0.5..0.5));
                if !state.cannon.aim_at(target + scatter, speed, gravity) {
                    log::warn!("Target {target:?} out of range");
                    break;
                }

                // Hold the trigger until fully charged, then release
                let charge = TickInput {
                    charging: true,
                    select: Some(kind),
                    ..Default::default()
                };
                while state.cannon.power < state.settings.cannon.max_power && frame < MAX_FRAMES {
                    advance(state, &mut stepper, &charge, FRAME_DT);
                    frame += 1;
                }
                let release = TickInput {
                    fire: true,
                    ..Default::default()
                };
                advance(state, &mut stepper, &release, FRAME_DT);
                frame += 1;
            }

            for event in state.drain_events() {
                match event {
                    GameEvent::ProjectileFired { id, kind } => {
                        shots += 1;
                        log::info!("Shot {id}: {}", kind.as_str());
                    }
                    GameEvent::Destroyed { id, kind } => {
                        destroyed += 1;
                        if let Kind::House(size) = kind {
                            log::info!("House {id} ({size:?}) destroyed");
                        }
                    }
                    other => log::debug!("{other:?}"),
                }
            }
        }

        log::info!(
            "Attack over after {:.1}s: {:?}, {} shots, {} objects destroyed, {} houses left, {} money left",
            frame as f32 * FRAME_DT,
            state.phase,
            shots,
            destroyed,
            state.scene.houses_remaining(),
            state.economy.money
        );
        Ok(())
    }

    pub fn run() -> Result<()> {
        let mut args = std::env::args().skip(1);
        let seed = args
            .next()
            .map(|s| s.parse::<u64>())
            .transpose()
            .context("seed must be an unsigned integer")?
            .unwrap_or(42);
        let settings_path = args.next();
        let settings = load_settings(settings_path.as_deref().map(Path::new))?;

        log::info!("Village Defense (headless) starting with seed {seed}");
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut state = GameState::new(settings);
        build_village(&mut state, &mut rng);
        state.drain_events();
        run_attack(&mut state, &mut rng)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the embedding host on the web
}
