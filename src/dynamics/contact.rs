use glam::Vec3;

use crate::core::particle::{ParticleId, ParticleSet};

/// A detected violation between two particles, or between one particle and
/// immovable scenery (`particle_b == None`).
///
/// Contacts are transient: generators rebuild them every frame into the
/// world's fixed-capacity buffer. Generators fill the fields; resolution is
/// driven exclusively by the [`ContactResolver`](crate::dynamics::resolver::ContactResolver).
#[derive(Debug, Clone)]
pub struct ParticleContact {
    pub particle_a: ParticleId,
    pub particle_b: Option<ParticleId>,
    /// Unit direction along which separation is measured, pointing from
    /// particle A toward particle B (or toward the fixed surface).
    pub normal: Vec3,
    /// Rebound coefficient in `[0, 1]`; 0 is fully inelastic.
    pub restitution: f32,
    /// Overlap distance; only positive values are corrected.
    pub penetration: f32,
    /// How far each particle was moved during interpenetration resolution.
    /// Consumed by the resolver to update dependent contacts.
    pub movement: [Vec3; 2],
}

impl Default for ParticleContact {
    fn default() -> Self {
        Self {
            particle_a: ParticleId::default(),
            particle_b: None,
            normal: Vec3::ZERO,
            restitution: 0.0,
            penetration: 0.0,
            movement: [Vec3::ZERO; 2],
        }
    }
}

impl ParticleContact {
    /// Relative velocity of the pair projected onto the contact normal.
    /// Negative means the particles are closing.
    pub fn separating_velocity(&self, particles: &ParticleSet) -> f32 {
        let Some(particle_a) = particles.get(self.particle_a) else {
            return 0.0;
        };
        let mut relative_velocity = particle_a.velocity;
        if let Some(id_b) = self.particle_b {
            if let Some(particle_b) = particles.get(id_b) {
                relative_velocity -= particle_b.velocity;
            }
        }
        relative_velocity.dot(self.normal)
    }

    fn total_inverse_mass(&self, particles: &ParticleSet) -> f32 {
        let mut total = particles
            .get(self.particle_a)
            .map(|p| p.inverse_mass())
            .unwrap_or(0.0);
        if let Some(id_b) = self.particle_b {
            total += particles.get(id_b).map(|p| p.inverse_mass()).unwrap_or(0.0);
        }
        total
    }

    /// Resolves this contact for velocity first, then interpenetration.
    pub(crate) fn resolve(&mut self, particles: &mut ParticleSet, duration: f32) {
        self.resolve_velocity(particles, duration);
        self.resolve_interpenetration(particles);
    }

    fn resolve_velocity(&mut self, particles: &mut ParticleSet, duration: f32) {
        let separating_velocity = self.separating_velocity(particles);
        if separating_velocity > 0.0 {
            // Already separating or stationary; no impulse required.
            return;
        }

        let mut new_sep_velocity = -separating_velocity * self.restitution;

        // Closing velocity that built up purely from this step's acceleration
        // would make resting contacts gain energy every frame; take it back
        // out, but never past zero.
        let mut acc_velocity = particles
            .get(self.particle_a)
            .map(|p| p.acceleration)
            .unwrap_or(Vec3::ZERO);
        if let Some(id_b) = self.particle_b {
            if let Some(particle_b) = particles.get(id_b) {
                acc_velocity -= particle_b.acceleration;
            }
        }
        let acc_caused_sep_velocity = acc_velocity.dot(self.normal) * duration;
        if acc_caused_sep_velocity < 0.0 {
            new_sep_velocity += self.restitution * acc_caused_sep_velocity;
            if new_sep_velocity < 0.0 {
                new_sep_velocity = 0.0;
            }
        }

        let delta_velocity = new_sep_velocity - separating_velocity;

        let total_inverse_mass = self.total_inverse_mass(particles);
        if total_inverse_mass <= 0.0 {
            // Both participants are immovable; the contact is inert.
            return;
        }

        let impulse = delta_velocity / total_inverse_mass;
        let impulse_per_inverse_mass = self.normal * impulse;

        match self.particle_b {
            Some(id_b) => {
                if let Some((particle_a, particle_b)) =
                    particles.get2_mut(self.particle_a, id_b)
                {
                    particle_a.velocity += impulse_per_inverse_mass * particle_a.inverse_mass();
                    particle_b.velocity -= impulse_per_inverse_mass * particle_b.inverse_mass();
                } else if let Some(particle_a) = particles.get_mut(self.particle_a) {
                    // The other endpoint is gone; the survivor still takes
                    // its share of the impulse.
                    particle_a.velocity += impulse_per_inverse_mass * particle_a.inverse_mass();
                } else if let Some(particle_b) = particles.get_mut(id_b) {
                    particle_b.velocity -= impulse_per_inverse_mass * particle_b.inverse_mass();
                }
            }
            None => {
                if let Some(particle_a) = particles.get_mut(self.particle_a) {
                    particle_a.velocity += impulse_per_inverse_mass * particle_a.inverse_mass();
                }
            }
        }
    }

    fn resolve_interpenetration(&mut self, particles: &mut ParticleSet) {
        self.movement = [Vec3::ZERO; 2];

        if self.penetration <= 0.0 {
            return;
        }

        let total_inverse_mass = self.total_inverse_mass(particles);
        if total_inverse_mass <= 0.0 {
            return;
        }

        // Split the correction in proportion to inverse mass so that the
        // combined movement exactly removes the overlap.
        let move_per_inverse_mass = self.normal * (self.penetration / total_inverse_mass);

        match self.particle_b {
            Some(id_b) => {
                if let Some((particle_a, particle_b)) =
                    particles.get2_mut(self.particle_a, id_b)
                {
                    self.movement[0] = move_per_inverse_mass * particle_a.inverse_mass();
                    particle_a.position += self.movement[0];
                    self.movement[1] = -move_per_inverse_mass * particle_b.inverse_mass();
                    particle_b.position += self.movement[1];
                } else if let Some(particle_a) = particles.get_mut(self.particle_a) {
                    self.movement[0] = move_per_inverse_mass * particle_a.inverse_mass();
                    particle_a.position += self.movement[0];
                } else if let Some(particle_b) = particles.get_mut(id_b) {
                    self.movement[1] = -move_per_inverse_mass * particle_b.inverse_mass();
                    particle_b.position += self.movement[1];
                }
            }
            None => {
                if let Some(particle_a) = particles.get_mut(self.particle_a) {
                    self.movement[0] = move_per_inverse_mass * particle_a.inverse_mass();
                    particle_a.position += self.movement[0];
                }
            }
        }
    }
}
