//! Particle Dynamics – mass-aggregate physics engine for Rust.
//!
//! This crate advances point masses through time under accumulated forces
//! and enforces distance constraints (cables, rods) between them by
//! generating and resolving contacts. It targets interactive simulations
//! where fast, stable, approximate behaviour matters more than exact
//! rigid-body mechanics; there is no rotational state anywhere.
//!
//! A host drives the engine once per tick:
//!
//! ```
//! use particle_dynamics::*;
//!
//! let mut world = ParticleWorld::new(16, 0);
//! let mut particle = Particle::new(Vec3::new(0.0, 5.0, 0.0));
//! particle.acceleration = Vec3::new(0.0, -9.81, 0.0);
//! world.add_particle(particle);
//!
//! world.start_frame();
//! let summary = world.run_physics(1.0 / 60.0);
//! assert!(!summary.overflow);
//! ```

pub mod config;
pub mod core;
pub mod dynamics;
pub mod utils;
pub mod world;

pub use glam::Vec3;

pub use crate::core::{
    constraints::{Cable, ContactGenerator, GeneratorId, GroundPlane, Rod},
    particle::{Particle, ParticleId, ParticleSet},
};
pub use dynamics::{
    contact::ParticleContact,
    forces::{
        AnchoredSpring, Bungee, Buoyancy, ForceGenerator, ForceId, ForceRegistry, Gravity,
        PointGravity, Spring,
    },
    resolver::ContactResolver,
};
pub use utils::allocator::{Arena, GenerationalId, SlotId};
pub use world::{FrameSummary, ParticleWorld};
