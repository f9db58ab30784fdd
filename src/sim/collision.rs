//! Collision queries for projectiles
//!
//! Objects are axis-aligned boxes on the grid, so a slab test against each
//! box plus a ground-plane test is all a projectile step needs.

use glam::Vec3;

use super::footprint::Grid;
use super::scene::{ObjectId, Scene};

/// What a projectile ran into
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImpactTarget {
    Ground,
    Object(ObjectId),
}

/// First contact along a projectile step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub point: Vec3,
    pub target: ImpactTarget,
    /// Fraction of the step travelled before contact (0..=1)
    pub fraction: f32,
}

/// First-hit collision collaborator
pub trait ImpactQuery {
    /// Closest contact on the segment `from -> to`, if any
    fn first_hit(&self, from: Vec3, to: Vec3) -> Option<Impact>;
}

/// Ray vs. axis-aligned box (slab method)
///
/// Returns the distance along `ray_dir` to the nearest intersection at or in
/// front of the origin. An origin inside the box reports 0.
pub fn ray_aabb_intersect(ray_origin: Vec3, ray_dir: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Option<f32> {
    let inv = |d: f32| if d.abs() > 1e-10 { 1.0 / d } else { f32::MAX * d.signum() };
    let inv_dir = Vec3::new(inv(ray_dir.x), inv(ray_dir.y), inv(ray_dir.z));

    let t1 = (aabb_min - ray_origin) * inv_dir;
    let t2 = (aabb_max - ray_origin) * inv_dir;

    let t_min = t1.min(t2).max_element();
    let t_max = t1.max(t2).min_element();

    if t_max >= t_min && t_max >= 0.0 {
        Some(t_min.max(0.0))
    } else {
        None
    }
}

/// Default query over the scene's boxes and a circular ground platform at y = 0
pub struct SceneQuery<'a> {
    pub scene: &'a Scene,
    pub grid: &'a Grid,
    pub ground_radius: f32,
}

impl<'a> SceneQuery<'a> {
    pub fn new(scene: &'a Scene, grid: &'a Grid, ground_radius: f32) -> Self {
        Self {
            scene,
            grid,
            ground_radius,
        }
    }

    fn ground_hit(&self, from: Vec3, to: Vec3) -> Option<Impact> {
        if from.y < 0.0 || to.y > 0.0 || from.y == to.y {
            return None;
        }
        let fraction = from.y / (from.y - to.y);
        let point = from.lerp(to, fraction);
        if point.x.hypot(point.z) > self.ground_radius {
            return None;
        }
        Some(Impact {
            point: Vec3::new(point.x, 0.0, point.z),
            target: ImpactTarget::Ground,
            fraction,
        })
    }
}

impl ImpactQuery for SceneQuery<'_> {
    fn first_hit(&self, from: Vec3, to: Vec3) -> Option<Impact> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }
        let dir = delta / length;

        let objects = self.scene.iter().filter_map(|object| {
            let (min, max) = object.bounds(self.grid);
            let t = ray_aabb_intersect(from, dir, min, max)?;
            (t <= length).then(|| Impact {
                point: from + dir * t,
                target: ImpactTarget::Object(object.id),
                fraction: t / length,
            })
        });

        objects
            .chain(self.ground_hit(from, to))
            .min_by(|a, b| a.fraction.total_cmp(&b.fraction))
    }
}
