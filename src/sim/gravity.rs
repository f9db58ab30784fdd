//! Gravity settling
//!
//! After a removal or destruction every object's resting height is
//! recomputed, bottom-up, until a full pass changes nothing. Objects that end
//! up lower than they stand are handed to [`FallingBlocks`], which lowers
//! them at a fixed speed over the following frames.

use serde::{Deserialize, Serialize};

use super::footprint::{CellCoord, Grid, cells_overlap};
use super::scene::{ObjectId, Scene};

/// Outcome of a settling run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettleStatus {
    /// A full pass changed nothing
    Stable,
    /// The pass cap was hit; targets are the best known so far
    StabilizationIncomplete,
}

/// New resting height for one object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallTarget {
    pub id: ObjectId,
    pub target_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GravityResolution {
    /// Objects whose resting height differs from where they stand now
    pub targets: Vec<FallTarget>,
    pub passes: u32,
    pub status: SettleStatus,
}

/// Resolver input for one object
#[derive(Debug, Clone)]
pub struct Body {
    pub id: ObjectId,
    /// Where the object is drawn right now
    pub live_y: f32,
    /// Where it will be once pending falls finish
    pub known_y: f32,
    pub height: f32,
    pub cells: Vec<CellCoord>,
}

/// Capture every object, counting pending fall targets as known positions
pub fn snapshot(scene: &Scene, grid: &Grid, falling: &FallingBlocks) -> Vec<Body> {
    scene
        .iter()
        .map(|object| Body {
            id: object.id,
            live_y: object.position.y,
            known_y: falling.target_of(object.id).unwrap_or(object.position.y),
            height: object.height(),
            cells: object.cells(grid),
        })
        .collect()
}

/// Highest support under body `i`, plus half its height
fn resting_height(bodies: &[Body], known: &[f32], i: usize, epsilon: f32) -> f32 {
    let body = &bodies[i];
    let bottom = known[i] - body.height / 2.0;
    let support = bodies
        .iter()
        .enumerate()
        .filter(|&(j, other)| j != i && cells_overlap(&body.cells, &other.cells))
        .map(|(j, other)| known[j] + other.height / 2.0)
        .filter(|&top| top <= bottom + epsilon)
        .fold(0.0f32, f32::max);
    support + body.height / 2.0
}

/// Iterate resting heights to a fixed point
///
/// # Arguments
/// * `bodies` - Every object in the scene (see [`snapshot`])
/// * `epsilon` - Changes at or below this are not movement
/// * `max_passes` - Pass cap; reaching it yields `StabilizationIncomplete`
pub fn resolve(bodies: &[Body], epsilon: f32, max_passes: u32) -> GravityResolution {
    let mut known: Vec<f32> = bodies.iter().map(|b| b.known_y).collect();
    let mut order: Vec<usize> = (0..bodies.len()).collect();
    let mut passes = 0;
    let mut status = SettleStatus::Stable;

    loop {
        if passes >= max_passes {
            status = SettleStatus::StabilizationIncomplete;
            break;
        }
        passes += 1;

        // Bottom-up; ties broken by id for determinism
        order.sort_by(|&a, &b| {
            known[a]
                .total_cmp(&known[b])
                .then(bodies[a].id.cmp(&bodies[b].id))
        });

        let mut dirty = false;
        for &i in &order {
            let target = resting_height(bodies, &known, i, epsilon);
            if (target - known[i]).abs() > epsilon {
                known[i] = target;
                dirty = true;
            }
        }
        if !dirty {
            break;
        }
    }

    let targets = bodies
        .iter()
        .zip(&known)
        .filter(|(body, y)| (body.live_y - **y).abs() > epsilon)
        .map(|(body, &target_y)| FallTarget {
            id: body.id,
            target_y,
        })
        .collect();

    GravityResolution {
        targets,
        passes,
        status,
    }
}

/// An object on its way down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallingBlock {
    pub id: ObjectId,
    pub target_y: f32,
}

/// Queue of falling objects, drained by [`FallingBlocks::update`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallingBlocks {
    records: Vec<FallingBlock>,
}

impl FallingBlocks {
    /// Add a record, or retarget the existing one for the same object
    pub fn schedule(&mut self, target: FallTarget) {
        match self.records.iter_mut().find(|r| r.id == target.id) {
            Some(record) => record.target_y = target.target_y,
            None => self.records.push(FallingBlock {
                id: target.id,
                target_y: target.target_y,
            }),
        }
    }

    pub fn target_of(&self, id: ObjectId) -> Option<f32> {
        self.records.iter().find(|r| r.id == id).map(|r| r.target_y)
    }

    pub fn forget(&mut self, id: ObjectId) {
        self.records.retain(|r| r.id != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FallingBlock> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lower every falling object by `speed * dt`; returns the ids that landed
    ///
    /// Records whose object no longer exists are dropped.
    pub fn update(&mut self, dt: f32, speed: f32, scene: &mut Scene) -> Vec<ObjectId> {
        let step = speed * dt;
        let mut landed = Vec::new();
        self.records.retain(|record| {
            let Some(object) = scene.get_mut(record.id) else {
                return false;
            };
            let remaining = object.position.y - record.target_y;
            if remaining > step {
                object.position.y -= step;
                true
            } else {
                object.position.y = record.target_y;
                landed.push(record.id);
                false
            }
        });
        landed
    }
}
