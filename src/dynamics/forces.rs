use glam::Vec3;

use crate::config::{DEFAULT_GRAVITY, POINT_GRAVITY_MIN_DISTANCE};
use crate::core::particle::{ParticleId, ParticleSet};
use crate::utils::allocator::{Arena, SlotId};

/// Handle to a force generator owned by the [`ForceRegistry`].
pub type ForceId = SlotId;

/// Trait describing a force contributor applied to registered particles.
///
/// Generators receive the whole particle set so that pairwise laws (springs,
/// bungees) can read their other endpoint; they must only accumulate force on
/// `target`.
pub trait ForceGenerator: Send + Sync {
    fn update_force(&self, particles: &mut ParticleSet, target: ParticleId, duration: f32);
}

/// Constant gravity force scaled by particle mass.
pub struct Gravity {
    pub gravity: Vec3,
}

impl Gravity {
    pub fn new(gravity: Vec3) -> Self {
        Self { gravity }
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(Vec3::from(DEFAULT_GRAVITY))
    }
}

impl ForceGenerator for Gravity {
    fn update_force(&self, particles: &mut ParticleSet, target: ParticleId, _duration: f32) {
        let Some(particle) = particles.get_mut(target) else {
            return;
        };
        if !particle.has_finite_mass() {
            return;
        }
        let force = self.gravity * particle.mass();
        particle.add_force(force);
    }
}

/// Attraction toward a fixed point, falling off with distance^1.5.
pub struct PointGravity {
    pub gravity: f32,
    pub point: Vec3,
    /// Below this distance the pull is singular; the particle is parked
    /// instead of accelerated.
    pub min_distance: f32,
}

impl PointGravity {
    pub fn new(gravity: f32, point: Vec3) -> Self {
        Self {
            gravity,
            point,
            min_distance: POINT_GRAVITY_MIN_DISTANCE,
        }
    }
}

impl ForceGenerator for PointGravity {
    fn update_force(&self, particles: &mut ParticleSet, target: ParticleId, _duration: f32) {
        let Some(particle) = particles.get_mut(target) else {
            return;
        };
        if !particle.has_finite_mass() {
            return;
        }

        let offset = self.point - particle.position;
        let distance = offset.length();
        if distance < self.min_distance {
            log::debug!("point gravity clamp at distance {distance}");
            particle.velocity = Vec3::ZERO;
            return;
        }

        let force = (offset / distance) * self.gravity * particle.mass() / distance.powf(1.5);
        particle.add_force(force);
    }
}

/// Hookean spring connecting the target particle to another particle.
pub struct Spring {
    pub other: ParticleId,
    pub spring_constant: f32,
    pub rest_length: f32,
}

impl ForceGenerator for Spring {
    fn update_force(&self, particles: &mut ParticleSet, target: ParticleId, _duration: f32) {
        let Some(anchor) = particles.get(self.other).map(|p| p.position) else {
            return;
        };
        let Some(particle) = particles.get_mut(target) else {
            return;
        };

        let displacement = particle.position - anchor;
        let length = displacement.length();
        if length < 1e-6 {
            return;
        }

        let force = (displacement / length) * -(length - self.rest_length) * self.spring_constant;
        particle.add_force(force);
    }
}

/// Hookean spring connecting the target particle to a fixed anchor point.
pub struct AnchoredSpring {
    pub anchor: Vec3,
    pub spring_constant: f32,
    pub rest_length: f32,
}

impl ForceGenerator for AnchoredSpring {
    fn update_force(&self, particles: &mut ParticleSet, target: ParticleId, _duration: f32) {
        let Some(particle) = particles.get_mut(target) else {
            return;
        };

        let displacement = particle.position - self.anchor;
        let length = displacement.length();
        if length < 1e-6 {
            return;
        }

        let force = (displacement / length) * -(length - self.rest_length) * self.spring_constant;
        particle.add_force(force);
    }
}

/// One-sided spring: only pulls once extended past its rest length, never
/// pushes while slack.
pub struct Bungee {
    pub other: ParticleId,
    pub spring_constant: f32,
    pub rest_length: f32,
}

impl ForceGenerator for Bungee {
    fn update_force(&self, particles: &mut ParticleSet, target: ParticleId, _duration: f32) {
        let Some(anchor) = particles.get(self.other).map(|p| p.position) else {
            return;
        };
        let Some(particle) = particles.get_mut(target) else {
            return;
        };

        let displacement = particle.position - anchor;
        let length = displacement.length();
        if length <= self.rest_length || length < 1e-6 {
            return;
        }

        let force = (displacement / length) * -(length - self.rest_length) * self.spring_constant;
        particle.add_force(force);
    }
}

/// Vertical buoyancy against a horizontal water plane, linear in submersion
/// depth and saturating when the particle is fully under.
pub struct Buoyancy {
    /// Submersion depth at which the particle counts as fully under water.
    pub max_depth: f32,
    pub volume: f32,
    pub water_height: f32,
    pub liquid_density: f32,
}

impl Buoyancy {
    pub fn new(max_depth: f32, volume: f32, water_height: f32) -> Self {
        Self {
            max_depth,
            volume,
            water_height,
            liquid_density: 1000.0,
        }
    }
}

impl ForceGenerator for Buoyancy {
    fn update_force(&self, particles: &mut ParticleSet, target: ParticleId, _duration: f32) {
        let Some(particle) = particles.get_mut(target) else {
            return;
        };

        let depth = particle.position.y;
        if depth >= self.water_height + self.max_depth {
            return;
        }

        let force_y = if depth <= self.water_height - self.max_depth {
            self.liquid_density * self.volume
        } else {
            let submerged = (self.water_height + self.max_depth - depth) / (2.0 * self.max_depth);
            self.liquid_density * self.volume * submerged
        };
        particle.add_force(Vec3::new(0.0, force_y, 0.0));
    }
}

/// One (particle, generator) pairing tracked by the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Registration {
    particle: ParticleId,
    generator: ForceId,
}

/// Owns the force generators and the ordered list of particle pairings they
/// apply to each frame.
pub struct ForceRegistry {
    generators: Arena<Box<dyn ForceGenerator>>,
    registrations: Vec<Registration>,
}

impl Default for ForceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceRegistry {
    pub fn new() -> Self {
        Self {
            generators: Arena::new(),
            registrations: Vec::new(),
        }
    }

    /// Adds a generator to the registry and returns a handle for pairing it
    /// with particles.
    pub fn add_generator<F: ForceGenerator + 'static>(&mut self, generator: F) -> ForceId {
        self.generators.insert(Box::new(generator))
    }

    /// Removes a generator and every registration referring to it.
    pub fn remove_generator(&mut self, id: ForceId) {
        if self.generators.remove(id).is_some() {
            self.registrations.retain(|reg| reg.generator != id);
        }
    }

    /// Registers the generator to apply to the particle. Duplicate pairs are
    /// allowed and apply their force cumulatively.
    pub fn register(&mut self, particle: ParticleId, generator: ForceId) {
        self.registrations.push(Registration {
            particle,
            generator,
        });
    }

    /// Removes the first exact-match registration if present. Missing pairs
    /// are a silent no-op.
    pub fn deregister(&mut self, particle: ParticleId, generator: ForceId) {
        let target = Registration {
            particle,
            generator,
        };
        if let Some(position) = self.registrations.iter().position(|reg| *reg == target) {
            self.registrations.remove(position);
        }
    }

    /// Drops all registrations without touching the generators themselves.
    pub fn clear_registrations(&mut self) {
        self.registrations.clear();
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    /// Invokes every registered pair, in insertion order, accumulating force
    /// onto the particles.
    pub fn update_forces(&self, particles: &mut ParticleSet, duration: f32) {
        for registration in &self.registrations {
            if let Some(generator) = self.generators.get(registration.generator) {
                generator.update_force(particles, registration.particle, duration);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::Particle;
    use approx::assert_relative_eq;

    fn set_with_particle(particle: Particle) -> (ParticleSet, ParticleId) {
        let mut particles = ParticleSet::new();
        let id = particles.insert(particle);
        (particles, id)
    }

    #[test]
    fn gravity_scales_with_mass() {
        let mut particle = Particle::new(Vec3::ZERO);
        particle.set_mass(2.0);
        let (mut particles, id) = set_with_particle(particle);

        let gravity = Gravity::new(Vec3::new(0.0, -10.0, 0.0));
        gravity.update_force(&mut particles, id, 0.016);

        assert_relative_eq!(particles.get(id).unwrap().force_accum.y, -20.0);
    }

    #[test]
    fn default_gravity_is_earth_standard() {
        let (mut particles, id) = set_with_particle(Particle::new(Vec3::ZERO));

        Gravity::default().update_force(&mut particles, id, 0.016);

        assert_relative_eq!(particles.get(id).unwrap().force_accum.y, -9.81);
    }

    #[test]
    fn gravity_skips_immovable_particles() {
        let (mut particles, id) = set_with_particle(Particle::fixed(Vec3::ZERO));

        let gravity = Gravity::new(Vec3::new(0.0, -10.0, 0.0));
        gravity.update_force(&mut particles, id, 0.016);

        assert_eq!(particles.get(id).unwrap().force_accum, Vec3::ZERO);
    }

    #[test]
    fn point_gravity_parks_particles_inside_the_clamp_radius() {
        let mut particle = Particle::new(Vec3::new(0.05, 0.0, 0.0));
        particle.velocity = Vec3::new(3.0, 0.0, 0.0);
        let (mut particles, id) = set_with_particle(particle);

        let attractor = PointGravity::new(50.0, Vec3::ZERO);
        attractor.update_force(&mut particles, id, 0.016);

        let particle = particles.get(id).unwrap();
        assert_eq!(particle.velocity, Vec3::ZERO);
        assert_eq!(particle.force_accum, Vec3::ZERO);
    }

    #[test]
    fn bungee_is_slack_under_rest_length() {
        let mut particles = ParticleSet::new();
        let anchor = particles.insert(Particle::fixed(Vec3::ZERO));
        let near = particles.insert(Particle::new(Vec3::new(1.0, 0.0, 0.0)));
        let far = particles.insert(Particle::new(Vec3::new(5.0, 0.0, 0.0)));

        let bungee = Bungee {
            other: anchor,
            spring_constant: 2.0,
            rest_length: 2.0,
        };

        bungee.update_force(&mut particles, near, 0.016);
        assert_eq!(particles.get(near).unwrap().force_accum, Vec3::ZERO);

        bungee.update_force(&mut particles, far, 0.016);
        // Extension 3 at k = 2, pulling back toward the anchor.
        assert_relative_eq!(particles.get(far).unwrap().force_accum.x, -6.0);
    }

    #[test]
    fn anchored_spring_pulls_toward_rest_length() {
        let (mut particles, id) = set_with_particle(Particle::new(Vec3::new(0.0, 3.0, 0.0)));

        let spring = AnchoredSpring {
            anchor: Vec3::ZERO,
            spring_constant: 4.0,
            rest_length: 1.0,
        };
        spring.update_force(&mut particles, id, 0.016);

        assert_relative_eq!(particles.get(id).unwrap().force_accum.y, -8.0);
    }

    #[test]
    fn buoyancy_saturates_when_fully_submerged() {
        let buoyancy = Buoyancy {
            max_depth: 0.5,
            volume: 0.01,
            water_height: 0.0,
            liquid_density: 1000.0,
        };

        let (mut particles, deep) = set_with_particle(Particle::new(Vec3::new(0.0, -5.0, 0.0)));
        buoyancy.update_force(&mut particles, deep, 0.016);
        assert_relative_eq!(particles.get(deep).unwrap().force_accum.y, 10.0);

        let (mut particles, dry) = set_with_particle(Particle::new(Vec3::new(0.0, 2.0, 0.0)));
        buoyancy.update_force(&mut particles, dry, 0.016);
        assert_eq!(particles.get(dry).unwrap().force_accum, Vec3::ZERO);

        // At the waterline the force is half of the saturated value.
        let (mut particles, half) = set_with_particle(Particle::new(Vec3::ZERO));
        buoyancy.update_force(&mut particles, half, 0.016);
        assert_relative_eq!(particles.get(half).unwrap().force_accum.y, 5.0);
    }

    #[test]
    fn duplicate_registrations_apply_cumulatively() {
        let mut particle = Particle::new(Vec3::ZERO);
        particle.set_mass(1.0);
        let (mut particles, id) = set_with_particle(particle);

        let mut registry = ForceRegistry::new();
        let gravity = registry.add_generator(Gravity::new(Vec3::new(0.0, -10.0, 0.0)));
        registry.register(id, gravity);
        registry.register(id, gravity);

        registry.update_forces(&mut particles, 0.016);
        assert_relative_eq!(particles.get(id).unwrap().force_accum.y, -20.0);
    }

    #[test]
    fn deregister_removes_one_pair_and_tolerates_misses() {
        let (mut particles, id) = set_with_particle(Particle::new(Vec3::ZERO));

        let mut registry = ForceRegistry::new();
        let gravity = registry.add_generator(Gravity::new(Vec3::new(0.0, -10.0, 0.0)));
        registry.register(id, gravity);
        registry.register(id, gravity);

        registry.deregister(id, gravity);
        assert_eq!(registry.registration_count(), 1);

        // Removing a pair that is not registered is a no-op.
        let other = particles.insert(Particle::new(Vec3::ONE));
        registry.deregister(other, gravity);
        assert_eq!(registry.registration_count(), 1);
    }
}
