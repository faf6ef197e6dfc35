use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_DAMPING;
use crate::utils::allocator::{Arena, SlotId};

/// Handle to a particle stored in the world's arena.
pub type ParticleId = SlotId;

/// The particle collection owned by the world. Generators and contacts hold
/// [`ParticleId`]s into it rather than references.
pub type ParticleSet = Arena<Particle>;

/// A point mass: position, velocity, and a per-frame force accumulator, with
/// no orientation state.
///
/// Mass is stored inverted so that an immovable particle is the well-behaved
/// `inverse_mass == 0` case rather than an unstable zero mass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Constant acceleration, typically gravity.
    pub acceleration: Vec3,
    /// Forces gathered for the next integration step only.
    pub force_accum: Vec3,
    /// Velocity attenuation per second, in `[0, 1]`; removes energy the
    /// integrator adds through numerical error.
    pub damping: f32,
    inverse_mass: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            force_accum: Vec3::ZERO,
            damping: DEFAULT_DAMPING,
            inverse_mass: 1.0,
        }
    }
}

impl Particle {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Builds an immovable particle (infinite mass) at the given position.
    pub fn fixed(position: Vec3) -> Self {
        Self {
            position,
            inverse_mass: 0.0,
            ..Self::default()
        }
    }

    /// Sets the mass. A non-positive mass is rejected as a logged no-op;
    /// use [`Particle::set_inverse_mass`] with zero for an immovable particle.
    pub fn set_mass(&mut self, mass: f32) {
        if mass <= 0.0 {
            log::warn!("ignoring non-positive mass {mass}");
            return;
        }
        self.inverse_mass = 1.0 / mass;
    }

    pub fn mass(&self) -> f32 {
        if self.inverse_mass == 0.0 {
            f32::MAX
        } else {
            1.0 / self.inverse_mass
        }
    }

    /// Sets the inverse mass. Zero is legitimate and means infinite mass.
    pub fn set_inverse_mass(&mut self, inverse_mass: f32) {
        if inverse_mass < 0.0 {
            log::warn!("ignoring negative inverse mass {inverse_mass}");
            return;
        }
        self.inverse_mass = inverse_mass;
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    pub fn has_finite_mass(&self) -> bool {
        self.inverse_mass > 0.0
    }

    /// Adds a force to be applied at the next integration step only.
    pub fn add_force(&mut self, force: Vec3) {
        self.force_accum += force;
    }

    /// Zeroes the force accumulator. Called automatically by integration and
    /// by the world at the start of every frame.
    pub fn clear_accumulator(&mut self) {
        self.force_accum = Vec3::ZERO;
    }

    /// Integrates the particle forward in time by the given duration using
    /// Newton-Euler integration.
    ///
    /// Immovable particles never move, and non-positive durations leave the
    /// particle untouched. Whenever the step runs, the force accumulator is
    /// consumed and cleared.
    pub fn integrate(&mut self, duration: f32) {
        if self.inverse_mass <= 0.0 {
            return;
        }
        if duration <= 0.0 {
            return;
        }

        self.position += self.velocity * duration;

        let resulting_acceleration = self.acceleration + self.force_accum * self.inverse_mass;

        // powf keeps the attenuation stable across variable frame durations.
        self.velocity =
            self.velocity * self.damping.powf(duration) + resulting_acceleration * duration;

        self.clear_accumulator();
    }
}
