use glam::Vec3;

use crate::{
    config::{DEFAULT_MAX_CONTACTS, DEFAULT_RESOLVER_ITERATIONS},
    core::{
        constraints::{ContactGenerator, GeneratorId},
        particle::{Particle, ParticleId, ParticleSet},
    },
    dynamics::{
        contact::ParticleContact,
        forces::{ForceGenerator, ForceId, ForceRegistry},
        resolver::ContactResolver,
    },
    utils::{allocator::Arena, logging::ScopedTimer},
};

/// What one `run_physics` call actually did: how much of the contact buffer
/// was used, whether generation hit the capacity ceiling, and how many
/// resolver iterations were spent. Hosts should treat `overflow` as a
/// capacity-planning signal and grow `max_contacts`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameSummary {
    pub contacts_generated: usize,
    pub overflow: bool,
    pub iterations_used: u32,
}

/// Central simulation container: owns the particles, the force registry, the
/// contact generators, the shared contact buffer, and the resolver.
pub struct ParticleWorld {
    particles: ParticleSet,
    registry: ForceRegistry,
    resolver: ContactResolver,
    generators: Arena<Box<dyn ContactGenerator>>,
    contacts: Vec<ParticleContact>,
    max_contacts: usize,
    /// Configured budget; zero means "derive as twice the contact count".
    iterations: u32,
    parallel_enabled: bool,
}

impl Default for ParticleWorld {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTACTS, DEFAULT_RESOLVER_ITERATIONS)
    }
}

impl ParticleWorld {
    /// Creates a world able to handle up to `max_contacts` contacts per
    /// frame. `iterations == 0` derives the resolver budget each frame as
    /// twice the number of generated contacts.
    pub fn new(max_contacts: usize, iterations: u32) -> Self {
        let capacity = if max_contacts == 0 {
            log::warn!("max_contacts of zero requested, using {}", DEFAULT_MAX_CONTACTS);
            DEFAULT_MAX_CONTACTS
        } else {
            max_contacts
        };

        Self {
            particles: ParticleSet::new(),
            registry: ForceRegistry::new(),
            resolver: ContactResolver::new(iterations),
            generators: Arena::new(),
            contacts: vec![ParticleContact::default(); capacity],
            max_contacts: capacity,
            iterations,
            parallel_enabled: false,
        }
    }

    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.parallel_enabled = enabled;
    }

    pub fn parallel_enabled(&self) -> bool {
        self.parallel_enabled
    }

    pub fn max_contacts(&self) -> usize {
        self.max_contacts
    }

    pub fn add_particle(&mut self, particle: Particle) -> ParticleId {
        self.particles.insert(particle)
    }

    pub fn remove_particle(&mut self, id: ParticleId) -> Option<Particle> {
        self.particles.remove(id)
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id)
    }

    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.get_mut(id)
    }

    /// Read access for an external renderer: every live particle with its id.
    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, &Particle)> + '_ {
        self.particles.iter_with_ids()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn add_force_generator<F: ForceGenerator + 'static>(&mut self, generator: F) -> ForceId {
        self.registry.add_generator(generator)
    }

    pub fn register_force(&mut self, particle: ParticleId, generator: ForceId) {
        self.registry.register(particle, generator);
    }

    pub fn deregister_force(&mut self, particle: ParticleId, generator: ForceId) {
        self.registry.deregister(particle, generator);
    }

    pub fn clear_force_registrations(&mut self) {
        self.registry.clear_registrations();
    }

    pub fn add_contact_generator<G: ContactGenerator + 'static>(
        &mut self,
        generator: G,
    ) -> GeneratorId {
        self.generators.insert(Box::new(generator))
    }

    pub fn remove_contact_generator(&mut self, id: GeneratorId) -> bool {
        self.generators.remove(id).is_some()
    }

    /// Initializes the world for a simulation frame by clearing every force
    /// accumulator. Call this before adding ad-hoc forces for the frame.
    pub fn start_frame(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.clear_accumulator();
        }
    }

    /// Runs all registered contact generators into the shared buffer.
    /// Returns the slots used and whether capacity was exhausted before
    /// every generator finished with room to spare.
    fn generate_contacts(&mut self) -> (usize, bool) {
        let mut used = 0;
        let mut overflow = false;

        for generator in self.generators.iter() {
            used += generator.add_contacts(&self.particles, &mut self.contacts[used..]);
            if used >= self.max_contacts {
                // The slice came back full: either generators are still
                // pending, or this one truncated its own output against the
                // remaining capacity. Both mean contacts may have been
                // dropped this frame.
                overflow = true;
                break;
            }
        }

        if overflow {
            log::warn!(
                "contact buffer overflow: all {} slots exhausted",
                self.max_contacts
            );
        }

        (used, overflow)
    }

    fn integrate(&mut self, duration: f32) {
        #[cfg(feature = "parallel")]
        if self.parallel_enabled {
            use rayon::prelude::*;
            self.particles
                .par_iter_mut()
                .for_each(|particle| particle.integrate(duration));
            return;
        }

        for particle in self.particles.iter_mut() {
            particle.integrate(duration);
        }
    }

    /// Processes one frame of physics: force generators, contact generation,
    /// integration, then contact resolution. `duration` is the wall-clock
    /// frame time in seconds; non-positive values are a no-op frame.
    pub fn run_physics(&mut self, duration: f32) -> FrameSummary {
        if duration <= 0.0 {
            log::debug!("skipping frame with non-positive duration {duration}");
            return FrameSummary::default();
        }

        {
            let _timer = ScopedTimer::new("forces::update");
            self.registry.update_forces(&mut self.particles, duration);
        }

        let (contacts_generated, overflow) = {
            let _timer = ScopedTimer::new("contacts::generate");
            self.generate_contacts()
        };

        {
            let _timer = ScopedTimer::new("integrator");
            self.integrate(duration);
        }

        let mut iterations_used = 0;
        if contacts_generated > 0 {
            let _timer = ScopedTimer::new("contacts::resolve");
            if self.iterations == 0 {
                self.resolver.set_iterations(contacts_generated as u32 * 2);
            }
            self.resolver.resolve_contacts(
                &mut self.particles,
                &mut self.contacts[..contacts_generated],
                duration,
            );
            iterations_used = self.resolver.iterations_used();
        }

        FrameSummary {
            contacts_generated,
            overflow,
            iterations_used,
        }
    }

    /// Convenience for scenes where every particle shares one constant
    /// acceleration (e.g. gravity) instead of a registered generator.
    pub fn set_global_acceleration(&mut self, acceleration: Vec3) {
        for particle in self.particles.iter_mut() {
            particle.acceleration = acceleration;
        }
    }
}
