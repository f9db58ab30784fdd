//! Removal and destruction
//!
//! Voluntary removal during building is refused for load-bearing blocks.
//! Projectile destruction is not: whatever stood on the destroyed blocks is
//! left to the gravity pass.

use super::drag::{BlockKind, Candidate};
use super::placement::PlaceError;
use super::scene::{Kind, ObjectId};
use super::state::{GameEvent, GamePhase, GameState};
use super::support::{has_load, is_supporting};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RemoveError {
    #[error("no object with id {0}")]
    Unknown(ObjectId),
    #[error("object {0} holds up a house")]
    LoadBearing(ObjectId),
    #[error("object {0} has something stacked on it")]
    Covered(ObjectId),
    #[error("objects can only be removed while building")]
    WrongPhase,
    #[error("wait for the current drag or fall to finish")]
    Busy,
}

impl GameState {
    /// Remove one object, refund it, and let whatever it carried settle
    ///
    /// Returns the refund.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<u32, RemoveError> {
        let result = self.try_remove(id);
        if let Err(reason) = result {
            self.push_event(GameEvent::RemovalRejected { id, reason });
        }
        result
    }

    fn check_removable(&self, id: ObjectId) -> Result<(), RemoveError> {
        if self.phase != GamePhase::Building {
            return Err(RemoveError::WrongPhase);
        }
        if self.drag.is_some() || self.is_settling() {
            return Err(RemoveError::Busy);
        }
        if !self.scene.contains(id) {
            return Err(RemoveError::Unknown(id));
        }
        if is_supporting(&self.scene, &self.grid, id, self.settings.physics.epsilon) {
            log::warn!("Refusing to remove {id}: it holds up a house");
            return Err(RemoveError::LoadBearing(id));
        }
        Ok(())
    }

    fn try_remove(&mut self, id: ObjectId) -> Result<u32, RemoveError> {
        self.check_removable(id)?;
        let object = self.scene.remove(id).ok_or(RemoveError::Unknown(id))?;

        self.economy.refund(object.kind, object.refund);
        log::info!("Removed {} {} (+{})", object.kind.as_str(), id, object.refund);
        self.push_event(GameEvent::Removed {
            id,
            kind: object.kind,
            refund: object.refund,
        });
        self.notify_economy();

        self.settle();
        self.rebuild_height_map();
        Ok(object.refund)
    }

    /// Pick a block back up: remove it and start dragging the same kind
    ///
    /// Only blocks with nothing resting on them can be picked up.
    pub fn pick_up(&mut self, id: ObjectId) -> Result<Candidate, RemoveError> {
        let result = self.try_pick_up(id);
        if let Err(reason) = result {
            self.push_event(GameEvent::RemovalRejected { id, reason });
        }
        result
    }

    fn try_pick_up(&mut self, id: ObjectId) -> Result<Candidate, RemoveError> {
        self.check_removable(id)?;
        if has_load(&self.scene, &self.grid, id, self.settings.physics.epsilon) {
            return Err(RemoveError::Covered(id));
        }
        let candidate = match self.scene.get(id).map(|o| o.kind) {
            Some(Kind::Wall) => Candidate::block(BlockKind::Wall),
            Some(Kind::Strong) => Candidate::block(BlockKind::Strong),
            Some(Kind::House(size)) => Candidate::House(size),
            None => return Err(RemoveError::Unknown(id)),
        };

        self.try_remove(id)?;
        self.begin_drag(candidate).map_err(|err| match err {
            PlaceError::WrongPhase => RemoveError::WrongPhase,
            _ => RemoveError::Busy,
        })?;
        Ok(candidate)
    }

    /// Destroy objects hit by a projectile, then run one gravity pass
    ///
    /// Unknown ids are skipped. Returns the ids actually destroyed.
    pub fn destroy_objects(&mut self, ids: &[ObjectId]) -> Vec<ObjectId> {
        let mut destroyed = Vec::with_capacity(ids.len());
        for &id in ids {
            let Some(object) = self.scene.remove(id) else {
                continue;
            };
            self.falling.forget(id);
            log::info!("Destroyed {} {}", object.kind.as_str(), id);
            self.push_event(GameEvent::Destroyed { id, kind: object.kind });
            destroyed.push(id);
        }

        if !destroyed.is_empty() {
            self.settle();
            self.rebuild_height_map();
            self.check_victory();
        }
        destroyed
    }

    /// Mark strong blocks as damaged
    pub fn damage_objects(&mut self, ids: &[ObjectId]) {
        for &id in ids {
            let Some(object) = self.scene.get_mut(id) else {
                continue;
            };
            if object.kind == Kind::Strong && !object.damaged {
                object.damaged = true;
                self.push_event(GameEvent::Damaged { id });
            }
        }
    }
}
