use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::particle::{ParticleId, ParticleSet};
use crate::dynamics::contact::ParticleContact;
use crate::utils::allocator::SlotId;

/// Handle to a contact generator registered with the world.
pub type GeneratorId = SlotId;

/// Polymorphic producer of contacts, run once per frame.
///
/// Implementations write into the front of `contacts` (the remaining capacity
/// of the world's buffer) and return how many slots they filled. Zero means
/// no violation this frame.
pub trait ContactGenerator: Send + Sync {
    fn add_contacts(&self, particles: &ParticleSet, contacts: &mut [ParticleContact]) -> usize;
}

fn link_geometry(
    particles: &ParticleSet,
    particle_a: ParticleId,
    particle_b: ParticleId,
) -> Option<(f32, Vec3)> {
    let a = particles.get(particle_a)?.position;
    let b = particles.get(particle_b)?.position;
    let offset = b - a;
    let length = offset.length();
    if length < 1e-6 {
        return None;
    }
    Some((length, offset / length))
}

/// A rope between two particles: slack until it reaches `max_length`, then it
/// stops further separation without ever pushing the particles together.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cable {
    pub particle_a: ParticleId,
    pub particle_b: ParticleId,
    pub max_length: f32,
    pub restitution: f32,
}

impl Cable {
    pub fn current_length(&self, particles: &ParticleSet) -> f32 {
        link_geometry(particles, self.particle_a, self.particle_b)
            .map(|(length, _)| length)
            .unwrap_or(0.0)
    }
}

impl ContactGenerator for Cable {
    fn add_contacts(&self, particles: &ParticleSet, contacts: &mut [ParticleContact]) -> usize {
        let Some(slot) = contacts.first_mut() else {
            return 0;
        };
        let Some((length, normal)) = link_geometry(particles, self.particle_a, self.particle_b)
        else {
            return 0;
        };

        if length < self.max_length {
            return 0;
        }

        *slot = ParticleContact {
            particle_a: self.particle_a,
            particle_b: Some(self.particle_b),
            normal,
            restitution: self.restitution,
            penetration: length - self.max_length,
            movement: [Vec3::ZERO; 2],
        };
        1
    }
}

/// A rigid strut holding two particles at an exact distance. Both stretching
/// and compression are violations; restitution is always zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rod {
    pub particle_a: ParticleId,
    pub particle_b: ParticleId,
    pub length: f32,
}

impl Rod {
    pub fn current_length(&self, particles: &ParticleSet) -> f32 {
        link_geometry(particles, self.particle_a, self.particle_b)
            .map(|(length, _)| length)
            .unwrap_or(0.0)
    }
}

impl ContactGenerator for Rod {
    fn add_contacts(&self, particles: &ParticleSet, contacts: &mut [ParticleContact]) -> usize {
        let Some(slot) = contacts.first_mut() else {
            return 0;
        };
        let Some((current_length, normal)) =
            link_geometry(particles, self.particle_a, self.particle_b)
        else {
            return 0;
        };

        if current_length == self.length {
            return 0;
        }

        // Normal and penetration flip depending on stretch vs. compression.
        let (normal, penetration) = if current_length > self.length {
            (normal, current_length - self.length)
        } else {
            (-normal, self.length - current_length)
        };

        *slot = ParticleContact {
            particle_a: self.particle_a,
            particle_b: Some(self.particle_b),
            normal,
            restitution: 0.0,
            penetration,
            movement: [Vec3::ZERO; 2],
        };
        1
    }
}

/// Scenery generator: emits an upward contact for every particle that has
/// sunk below a horizontal plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GroundPlane {
    pub height: f32,
    pub restitution: f32,
}

impl GroundPlane {
    pub fn new(height: f32, restitution: f32) -> Self {
        Self {
            height,
            restitution,
        }
    }
}

impl ContactGenerator for GroundPlane {
    fn add_contacts(&self, particles: &ParticleSet, contacts: &mut [ParticleContact]) -> usize {
        let mut used = 0;
        for (id, particle) in particles.iter_with_ids() {
            if used >= contacts.len() {
                break;
            }
            let penetration = self.height - particle.position.y;
            if penetration <= 0.0 {
                continue;
            }
            contacts[used] = ParticleContact {
                particle_a: id,
                particle_b: None,
                normal: Vec3::Y,
                restitution: self.restitution,
                penetration,
                movement: [Vec3::ZERO; 2],
            };
            used += 1;
        }
        used
    }
}
