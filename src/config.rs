//! Global configuration constants for the Particle Dynamics engine.

/// Default gravity vector applied in the particle world (Y-up).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];

/// Default damping applied to particle velocity per second.
pub const DEFAULT_DAMPING: f32 = 0.995;

/// Default capacity of the per-frame contact buffer.
pub const DEFAULT_MAX_CONTACTS: usize = 100;

/// Default resolver iteration budget. Zero means "derive as twice the
/// number of contacts generated that frame".
pub const DEFAULT_RESOLVER_ITERATIONS: u32 = 0;

/// Distance below which point gravity stops pulling and parks the particle.
pub const POINT_GRAVITY_MIN_DISTANCE: f32 = 0.1;
