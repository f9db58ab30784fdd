//! The attacker's cannon: aim, charge, release

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::projectile::ProjectileKind;
use crate::settings::CannonSettings;

/// Launch parameters for a new projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub kind: ProjectileKind,
    pub origin: Vec3,
    pub velocity: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cannon {
    /// Radians; 0 faces -Z (towards the village from the default position)
    pub yaw: f32,
    /// Radians above the horizon
    pub pitch: f32,
    /// Current charge (0..=max_power)
    pub power: f32,
    pub selected: ProjectileKind,
    config: CannonSettings,
}

impl Cannon {
    pub fn new(config: &CannonSettings) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            power: 0.0,
            selected: ProjectileKind::Base,
            config: *config,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.config.position
    }

    /// Turn by axis input (-1..=1 each) at the configured aim rate
    pub fn aim(&mut self, yaw_axis: f32, pitch_axis: f32, dt: f32) {
        let step = self.config.aim_rate * dt;
        self.yaw += yaw_axis.clamp(-1.0, 1.0) * step;
        self.pitch = (self.pitch + pitch_axis.clamp(-1.0, 1.0) * step)
            .clamp(self.config.min_pitch, self.config.max_pitch);
    }

    /// Point the barrel so a shot at `speed` lands on `target` (low arc)
    ///
    /// Returns false, leaving the aim untouched, if the target is out of range
    /// or needs a pitch outside the barrel's limits.
    pub fn aim_at(&mut self, target: Vec3, speed: f32, gravity: f32) -> bool {
        let offset = target - self.config.position;
        let distance = offset.x.hypot(offset.z);
        let Some(pitch) = launch_pitch(distance, offset.y, speed, gravity.abs()) else {
            return false;
        };
        if !(self.config.min_pitch..=self.config.max_pitch).contains(&pitch) {
            return false;
        }
        self.yaw = (-offset.x).atan2(-offset.z);
        self.pitch = pitch;
        true
    }

    /// Unit vector along the barrel
    pub fn direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    pub fn muzzle(&self) -> Vec3 {
        self.config.position + self.direction() * self.config.muzzle_offset
    }

    /// Hold to charge
    pub fn charge(&mut self, dt: f32) {
        self.power = (self.power + self.config.charge_rate * dt).min(self.config.max_power);
    }

    /// Launch speed for a given charge
    pub fn speed_for(&self, power: f32) -> f32 {
        power * self.config.power_to_speed
    }

    /// Let go of the trigger; a weak charge fizzles
    pub fn release(&mut self) -> Option<Shot> {
        let power = std::mem::take(&mut self.power);
        if power < self.config.min_power {
            return None;
        }
        Some(Shot {
            kind: self.selected,
            origin: self.muzzle(),
            velocity: self.direction() * self.speed_for(power),
        })
    }
}

/// Low-arc launch angle to cover `distance` horizontally and `height`
/// vertically at `speed` under gravity `g` (positive)
pub fn launch_pitch(distance: f32, height: f32, speed: f32, g: f32) -> Option<f32> {
    if distance <= f32::EPSILON || speed <= 0.0 || g <= 0.0 {
        return None;
    }
    let v2 = speed * speed;
    let disc = v2 * v2 - g * (g * distance * distance + 2.0 * height * v2);
    if disc < 0.0 {
        return None;
    }
    Some(((v2 - disc.sqrt()) / (g * distance)).atan())
}
