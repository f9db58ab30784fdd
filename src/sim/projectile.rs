//! Projectiles and impact resolution
//!
//! Three ammunition types share one integrator and differ only in what an
//! impact does to the structure:
//! - Base: destroys walls and houses, needs two hits on a strong block
//! - Punch: destroys anything it touches until its penetration runs out
//! - Area: splash around the impact point; strong blocks are only damaged

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{Impact, ImpactTarget};
use super::scene::{Kind, ObjectId, Scene};
use crate::settings::PhysicsSettings;

/// Ammunition types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Base,
    Punch,
    Area,
}

impl ProjectileKind {
    pub const ALL: [ProjectileKind; 3] = [ProjectileKind::Base, ProjectileKind::Punch, ProjectileKind::Area];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectileKind::Base => "base",
            ProjectileKind::Punch => "punch",
            ProjectileKind::Area => "area",
        }
    }
}

/// Visual effect the host should spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Smoke,
    Fire,
}

/// A projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds left before it expires
    pub lifetime: f32,
    /// Punch only: blocks it can still break through
    pub penetration: u32,
    pub bounces: u32,
}

impl Projectile {
    pub fn new(id: u32, kind: ProjectileKind, position: Vec3, velocity: Vec3, physics: &PhysicsSettings) -> Self {
        Self {
            id,
            kind,
            position,
            velocity,
            lifetime: physics.projectile_lifetime,
            penetration: match kind {
                ProjectileKind::Punch => physics.punch_penetration,
                ProjectileKind::Base | ProjectileKind::Area => 0,
            },
            bounces: 0,
        }
    }

    /// Semi-implicit Euler step under gravity
    pub fn integrate(&mut self, gravity: f32, dt: f32) {
        self.velocity.y += gravity * dt;
        self.position += self.velocity * dt;
        self.lifetime -= dt;
    }

    /// Expired, fallen out of the world, or below the ground off the platform
    pub fn is_lost(&self, physics: &PhysicsSettings) -> bool {
        let p = self.position;
        p.y < physics.kill_y
            || self.lifetime <= 0.0
            || (p.y < 0.0 && p.x.hypot(p.z) > physics.ground_radius)
    }

    /// Reflect off a surface, lose energy, and step clear of it
    pub fn bounce(&mut self, normal: Vec3, physics: &PhysicsSettings) {
        self.velocity = reflect_velocity(self.velocity, normal) * physics.bounce_damping;
        self.position += normal * physics.bounce_nudge;
        self.bounces += 1;
    }
}

/// Reflect velocity off a surface with normal `n` (unit length)
#[inline]
pub fn reflect_velocity(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Normal for a bounce off an object: from its centre to the contact point
///
/// Falls back to straight up when the contact is at the centre.
pub fn bounce_normal(point: Vec3, center: Vec3) -> Vec3 {
    let n = point - center;
    if n.length_squared() < 1e-4 { Vec3::Y } else { n.normalize() }
}

/// What happens to the projectile after an impact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectileFate {
    /// Keeps flying on its current velocity (punch through)
    #[default]
    Continue,
    Bounced,
    Despawned,
}

/// Scene changes decided by one impact
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpactOutcome {
    pub destroyed: Vec<ObjectId>,
    pub damaged: Vec<ObjectId>,
    pub effects: Vec<(EffectKind, Vec3)>,
    pub fate: ProjectileFate,
}

impl ImpactOutcome {
    fn despawn(&mut self) {
        self.fate = ProjectileFate::Despawned;
    }
}

/// Apply an impact to the projectile and report what it does to the scene
///
/// The projectile is moved to the contact point and bounced, drained or
/// marked for despawn here; the caller applies `destroyed` and `damaged`.
pub fn resolve_impact(
    projectile: &mut Projectile,
    impact: &Impact,
    scene: &Scene,
    physics: &PhysicsSettings,
) -> ImpactOutcome {
    let mut outcome = ImpactOutcome::default();
    projectile.position = impact.point;

    let id = match impact.target {
        ImpactTarget::Ground => {
            let p = impact.point;
            if p.x.hypot(p.z) < physics.build_area_radius {
                projectile.bounce(Vec3::Y, physics);
                outcome.fate = ProjectileFate::Bounced;
            } else {
                let effect = match projectile.kind {
                    ProjectileKind::Punch => EffectKind::Fire,
                    ProjectileKind::Base | ProjectileKind::Area => EffectKind::Smoke,
                };
                outcome.effects.push((effect, p));
                outcome.despawn();
            }
            return outcome;
        }
        ImpactTarget::Object(id) => id,
    };

    let Some(target) = scene.get(id) else {
        return outcome;
    };
    let normal = bounce_normal(impact.point, target.position);

    match projectile.kind {
        ProjectileKind::Base => match target.kind {
            Kind::Strong if !target.damaged => {
                outcome.damaged.push(id);
                projectile.bounce(normal, physics);
                outcome.fate = ProjectileFate::Bounced;
            }
            Kind::Strong | Kind::Wall | Kind::House(_) => {
                outcome.effects.push((EffectKind::Smoke, target.position));
                outcome.destroyed.push(id);
                outcome.despawn();
            }
        },
        ProjectileKind::Punch => {
            outcome.effects.push((EffectKind::Fire, target.position));
            outcome.destroyed.push(id);
            projectile.penetration = match target.kind {
                Kind::Strong => 0,
                Kind::Wall | Kind::House(_) => projectile.penetration.saturating_sub(1),
            };
            if projectile.penetration == 0 {
                outcome.despawn();
            }
        }
        ProjectileKind::Area => {
            let radius_sq = physics.splash_radius * physics.splash_radius;
            let in_splash = scene
                .iter()
                .filter(|o| o.id == id || o.position.distance_squared(impact.point) <= radius_sq);
            for object in in_splash {
                match object.kind {
                    Kind::Strong => {
                        if !object.damaged {
                            outcome.damaged.push(object.id);
                        }
                    }
                    Kind::Wall | Kind::House(_) => {
                        outcome.effects.push((EffectKind::Smoke, object.position));
                        outcome.destroyed.push(object.id);
                    }
                }
            }
            if outcome.destroyed.is_empty() {
                projectile.bounce(normal, physics);
                outcome.fate = ProjectileFate::Bounced;
            } else {
                outcome.despawn();
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scene::HouseSize;
    use proptest::prelude::*;

    fn physics() -> PhysicsSettings {
        PhysicsSettings::default()
    }

    fn shot(kind: ProjectileKind, velocity: Vec3) -> Projectile {
        Projectile::new(1, kind, Vec3::new(0.0, 5.0, 0.0), velocity, &physics())
    }

    fn hit_object(id: ObjectId, point: Vec3) -> Impact {
        Impact {
            point,
            target: ImpactTarget::Object(id),
            fraction: 0.5,
        }
    }

    fn hit_ground(point: Vec3) -> Impact {
        Impact {
            point,
            target: ImpactTarget::Ground,
            fraction: 0.5,
        }
    }

    #[test]
    fn test_integrate_semi_implicit() {
        let mut p = shot(ProjectileKind::Base, Vec3::new(1.0, 0.0, 0.0));
        p.integrate(-10.0, 0.5);
        assert_eq!(p.velocity, Vec3::new(1.0, -5.0, 0.0));
        assert_eq!(p.position, Vec3::new(0.5, 2.5, 0.0));
        assert_eq!(p.lifetime, physics().projectile_lifetime - 0.5);
    }

    #[test]
    fn test_ground_bounce_inside_build_area() {
        let scene = Scene::new();
        let mut p = shot(ProjectileKind::Base, Vec3::new(3.0, -4.0, 0.0));
        let outcome = resolve_impact(&mut p, &hit_ground(Vec3::new(2.0, 0.0, 0.0)), &scene, &physics());

        assert_eq!(outcome.fate, ProjectileFate::Bounced);
        assert!((p.velocity - Vec3::new(2.25, 3.0, 0.0)).length() < 1e-5);
        assert!((p.velocity.length() - 0.75 * 5.0).abs() < 1e-5);
        assert!((p.position.y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_ground_outside_build_area_despawns() {
        let scene = Scene::new();
        let mut p = shot(ProjectileKind::Punch, Vec3::new(0.0, -4.0, 0.0));
        let point = Vec3::new(30.0, 0.0, 0.0);
        let outcome = resolve_impact(&mut p, &hit_ground(point), &scene, &physics());
        assert_eq!(outcome.fate, ProjectileFate::Despawned);
        assert_eq!(outcome.effects, vec![(EffectKind::Fire, point)]);
    }

    #[test]
    fn test_base_needs_two_hits_on_strong() {
        let mut scene = Scene::new();
        let id = scene.spawn(Kind::Strong, Vec3::new(0.5, 0.5, 0.5), 0, 3);
        let point = Vec3::new(0.0, 0.5, 0.5);

        let mut p = shot(ProjectileKind::Base, Vec3::new(5.0, 0.0, 0.0));
        let first = resolve_impact(&mut p, &hit_object(id, point), &scene, &physics());
        assert_eq!(first.damaged, vec![id]);
        assert!(first.destroyed.is_empty());
        assert_eq!(first.fate, ProjectileFate::Bounced);
        assert!(p.velocity.x < 0.0);

        if let Some(block) = scene.get_mut(id) {
            block.damaged = true;
        }
        let mut p = shot(ProjectileKind::Base, Vec3::new(5.0, 0.0, 0.0));
        let second = resolve_impact(&mut p, &hit_object(id, point), &scene, &physics());
        assert_eq!(second.destroyed, vec![id]);
        assert_eq!(second.fate, ProjectileFate::Despawned);
    }

    #[test]
    fn test_base_destroys_wall_and_house() {
        let mut scene = Scene::new();
        let wall = scene.spawn(Kind::Wall, Vec3::new(0.5, 0.5, 0.5), 0, 1);
        let house = scene.spawn(Kind::House(HouseSize::Two), Vec3::new(4.0, 1.0, 4.0), 0, 0);
        for id in [wall, house] {
            let mut p = shot(ProjectileKind::Base, Vec3::X);
            let point = scene.get(id).unwrap().position - Vec3::new(0.5, 0.0, 0.0);
            let outcome = resolve_impact(&mut p, &hit_object(id, point), &scene, &physics());
            assert_eq!(outcome.destroyed, vec![id]);
            assert_eq!(outcome.fate, ProjectileFate::Despawned);
        }
    }

    #[test]
    fn test_punch_penetration_budget() {
        let mut scene = Scene::new();
        let walls: Vec<_> = (0..4)
            .map(|i| scene.spawn(Kind::Wall, Vec3::new(i as f32 + 0.5, 0.5, 0.5), 0, 1))
            .collect();
        let mut p = shot(ProjectileKind::Punch, Vec3::X * 20.0);
        for (n, &id) in walls.iter().enumerate() {
            let point = Vec3::new(n as f32, 0.5, 0.5);
            let outcome = resolve_impact(&mut p, &hit_object(id, point), &scene, &physics());
            assert_eq!(outcome.destroyed, vec![id]);
            let expected = if n == 3 { ProjectileFate::Despawned } else { ProjectileFate::Continue };
            assert_eq!(outcome.fate, expected);
        }
        assert_eq!(p.penetration, 0);
        assert_eq!(p.velocity, Vec3::X * 20.0);
    }

    #[test]
    fn test_punch_spent_on_strong() {
        let mut scene = Scene::new();
        let id = scene.spawn(Kind::Strong, Vec3::new(0.5, 0.5, 0.5), 0, 3);
        let mut p = shot(ProjectileKind::Punch, Vec3::X);
        let outcome = resolve_impact(&mut p, &hit_object(id, Vec3::new(0.0, 0.5, 0.5)), &scene, &physics());
        assert_eq!(outcome.destroyed, vec![id]);
        assert_eq!(outcome.fate, ProjectileFate::Despawned);
    }

    #[test]
    fn test_area_splash() {
        let mut scene = Scene::new();
        let primary = scene.spawn(Kind::Wall, Vec3::new(0.5, 0.5, 0.5), 0, 1);
        let near = scene.spawn(Kind::Wall, Vec3::new(1.5, 0.5, 0.5), 0, 1);
        let strong = scene.spawn(Kind::Strong, Vec3::new(0.5, 0.5, 1.5), 0, 3);
        let far = scene.spawn(Kind::Wall, Vec3::new(6.5, 0.5, 0.5), 0, 1);

        let mut p = shot(ProjectileKind::Area, Vec3::X);
        let outcome = resolve_impact(&mut p, &hit_object(primary, Vec3::new(0.0, 0.5, 0.5)), &scene, &physics());
        assert_eq!(outcome.destroyed, vec![primary, near]);
        assert_eq!(outcome.damaged, vec![strong]);
        assert!(!outcome.destroyed.contains(&far));
        assert_eq!(outcome.fate, ProjectileFate::Despawned);
    }

    #[test]
    fn test_area_bounces_when_nothing_breaks() {
        let mut scene = Scene::new();
        let strong = scene.spawn(Kind::Strong, Vec3::new(0.5, 0.5, 0.5), 0, 3);
        let mut p = shot(ProjectileKind::Area, Vec3::X * 4.0);
        let outcome = resolve_impact(&mut p, &hit_object(strong, Vec3::new(0.0, 0.5, 0.5)), &scene, &physics());
        assert_eq!(outcome.damaged, vec![strong]);
        assert_eq!(outcome.fate, ProjectileFate::Bounced);
        assert!((p.velocity - Vec3::new(-3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_bounce_normal_degenerate() {
        assert_eq!(bounce_normal(Vec3::ONE, Vec3::ONE), Vec3::Y);
    }

    #[test]
    fn test_lost_projectiles() {
        let phys = physics();
        let mut p = shot(ProjectileKind::Base, Vec3::ZERO);
        assert!(!p.is_lost(&phys));
        p.position = Vec3::new(0.0, -11.0, 0.0);
        assert!(p.is_lost(&phys));
        p.position = Vec3::new(61.0, -0.5, 0.0);
        assert!(p.is_lost(&phys));
        p.position = Vec3::new(10.0, 2.0, 0.0);
        p.lifetime = 0.0;
        assert!(p.is_lost(&phys));
    }

    proptest! {
        /// N ground bounces leave 0.75^N of the speed
        #[test]
        fn prop_bounce_energy_decay(
            vx in -10.0f32..10.0,
            vy in -20.0f32..-1.0,
            vz in -10.0f32..10.0,
            n in 1u32..6,
        ) {
            let phys = physics();
            let mut p = shot(ProjectileKind::Base, Vec3::new(vx, vy, vz));
            let speed = p.velocity.length();
            for _ in 0..n {
                p.velocity.y = -p.velocity.y.abs();
                p.bounce(Vec3::Y, &phys);
            }
            let expected = speed * phys.bounce_damping.powi(n as i32);
            prop_assert!((p.velocity.length() - expected).abs() < 1e-3 * speed.max(1.0));
            prop_assert_eq!(p.bounces, n);
        }
    }
}
