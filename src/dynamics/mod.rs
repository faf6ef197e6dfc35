//! Simulation dynamics modules: force generation, contacts, and resolution.

pub mod contact;
pub mod forces;
pub mod resolver;

pub use contact::ParticleContact;
pub use forces::{
    AnchoredSpring, Bungee, Buoyancy, ForceGenerator, ForceId, ForceRegistry, Gravity,
    PointGravity, Spring,
};
pub use resolver::ContactResolver;
