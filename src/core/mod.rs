//! Core types describing particles and the constraints between them.

pub mod constraints;
pub mod particle;

pub use constraints::{Cable, ContactGenerator, GeneratorId, GroundPlane, Rod};
pub use particle::{Particle, ParticleId, ParticleSet};
