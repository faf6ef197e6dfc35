use crate::core::particle::ParticleSet;
use crate::dynamics::contact::ParticleContact;

/// Iterative worst-first contact resolver.
///
/// Each pass re-scans the whole batch, resolves the contact with the most
/// negative separating velocity, then folds the positional corrections back
/// into the penetration of every contact sharing a particle. The budget
/// bounds worst-case cost at O(iterations × contacts); under a tight budget
/// some constraints may stay slightly violated, which is the accepted
/// trade-off for predictable frame cost.
pub struct ContactResolver {
    iterations: u32,
    iterations_used: u32,
}

impl ContactResolver {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations,
            iterations_used: 0,
        }
    }

    pub fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations;
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Iterations consumed by the most recent `resolve_contacts` call.
    pub fn iterations_used(&self) -> u32 {
        self.iterations_used
    }

    pub fn resolve_contacts(
        &mut self,
        particles: &mut ParticleSet,
        contacts: &mut [ParticleContact],
        duration: f32,
    ) {
        self.iterations_used = 0;

        while self.iterations_used < self.iterations {
            let Some(worst) = Self::find_worst(particles, contacts) else {
                break;
            };

            contacts[worst].resolve(particles, duration);

            Self::propagate_movement(contacts, worst);

            self.iterations_used += 1;
        }
    }

    /// Picks the contact with the most negative separating velocity among
    /// those still needing resolution, breaking ties by larger penetration.
    fn find_worst(particles: &ParticleSet, contacts: &[ParticleContact]) -> Option<usize> {
        let mut worst_sep = f32::MAX;
        let mut worst_penetration = f32::MIN;
        let mut worst = None;

        for (index, contact) in contacts.iter().enumerate() {
            let sep = contact.separating_velocity(particles);
            if sep >= 0.0 && contact.penetration <= 0.0 {
                continue;
            }
            if sep < worst_sep || (sep == worst_sep && contact.penetration > worst_penetration) {
                worst_sep = sep;
                worst_penetration = contact.penetration;
                worst = Some(index);
            }
        }

        worst
    }

    /// Moving the resolved contact's particles changed the geometry of every
    /// contact that shares one of them; fold the recorded movement into their
    /// penetration (the resolved contact itself ends up at roughly zero).
    fn propagate_movement(contacts: &mut [ParticleContact], resolved: usize) {
        let movement = contacts[resolved].movement;
        let particle_a = contacts[resolved].particle_a;
        let particle_b = contacts[resolved].particle_b;

        for contact in contacts.iter_mut() {
            if contact.particle_a == particle_a {
                contact.penetration -= movement[0].dot(contact.normal);
            } else if Some(contact.particle_a) == particle_b {
                contact.penetration -= movement[1].dot(contact.normal);
            }
            if let Some(own_b) = contact.particle_b {
                if own_b == particle_a {
                    contact.penetration += movement[0].dot(contact.normal);
                } else if Some(own_b) == particle_b {
                    contact.penetration += movement[1].dot(contact.normal);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::Particle;
    use approx::assert_relative_eq;
    use glam::Vec3;

    #[test]
    fn resolver_stops_once_nothing_needs_resolution() {
        let mut particles = ParticleSet::new();
        let a = particles.insert(Particle::new(Vec3::ZERO));
        let b = particles.insert(Particle::new(Vec3::new(2.0, 0.0, 0.0)));

        // Separating and not penetrating: nothing to do.
        let mut contacts = vec![ParticleContact {
            particle_a: a,
            particle_b: Some(b),
            normal: Vec3::X,
            restitution: 0.5,
            penetration: -0.1,
            movement: [Vec3::ZERO; 2],
        }];

        let mut resolver = ContactResolver::new(10);
        resolver.resolve_contacts(&mut particles, &mut contacts, 1.0 / 60.0);
        assert_eq!(resolver.iterations_used(), 0);
    }

    #[test]
    fn worst_closing_contact_is_resolved_first() {
        let mut particles = ParticleSet::new();

        let mut slow = Particle::new(Vec3::new(1.0, 0.0, 0.0));
        slow.velocity = Vec3::new(0.0, -1.0, 0.0);
        slow.damping = 1.0;
        let slow_id = particles.insert(slow);

        let mut fast = Particle::new(Vec3::new(2.0, 0.0, 0.0));
        fast.velocity = Vec3::new(0.0, -5.0, 0.0);
        fast.damping = 1.0;
        let fast_id = particles.insert(fast);

        let scenery = |id| ParticleContact {
            particle_a: id,
            particle_b: None,
            normal: Vec3::Y,
            restitution: 0.0,
            penetration: 0.0,
            movement: [Vec3::ZERO; 2],
        };
        let mut contacts = vec![scenery(slow_id), scenery(fast_id)];

        // One iteration only: the faster-closing contact must win the scan.
        let mut resolver = ContactResolver::new(1);
        resolver.resolve_contacts(&mut particles, &mut contacts, 1.0 / 60.0);

        assert_relative_eq!(particles.get(fast_id).unwrap().velocity.y, 0.0);
        assert_relative_eq!(particles.get(slow_id).unwrap().velocity.y, -1.0);
        assert_eq!(resolver.iterations_used(), 1);
    }

    #[test]
    fn movement_propagates_into_neighbouring_contacts() {
        let mut particles = ParticleSet::new();
        let shared = particles.insert(Particle::new(Vec3::ZERO));
        let anchor = particles.insert(Particle::fixed(Vec3::new(0.0, 2.0, 0.0)));

        // Ground contact pushes the shared particle up; the rod-style contact
        // against the anchor above must see its penetration shrink.
        let mut contacts = vec![
            ParticleContact {
                particle_a: shared,
                particle_b: None,
                normal: Vec3::Y,
                restitution: 0.0,
                penetration: 0.5,
                movement: [Vec3::ZERO; 2],
            },
            ParticleContact {
                particle_a: shared,
                particle_b: Some(anchor),
                normal: Vec3::Y,
                restitution: 0.0,
                penetration: 0.4,
                movement: [Vec3::ZERO; 2],
            },
        ];

        let mut resolver = ContactResolver::new(1);
        resolver.resolve_contacts(&mut particles, &mut contacts, 1.0 / 60.0);

        // The ground contact was resolved (larger penetration wins the tie on
        // separating velocity) and its own penetration folded back to zero.
        assert_relative_eq!(contacts[0].penetration, 0.0, epsilon = 1e-5);
        assert_relative_eq!(contacts[1].penetration, -0.1, epsilon = 1e-5);
        assert_relative_eq!(particles.get(shared).unwrap().position.y, 0.5);
    }

    #[test]
    fn budget_exhaustion_leaves_residual_violation() {
        let mut particles = ParticleSet::new();
        let mut a = Particle::new(Vec3::ZERO);
        a.velocity = Vec3::X;
        a.damping = 1.0;
        let a = particles.insert(a);

        let mut contacts = vec![ParticleContact {
            particle_a: a,
            particle_b: None,
            normal: Vec3::X,
            restitution: 0.0,
            penetration: 1.0,
            movement: [Vec3::ZERO; 2],
        }];

        let mut resolver = ContactResolver::new(0);
        resolver.resolve_contacts(&mut particles, &mut contacts, 1.0 / 60.0);

        assert_eq!(resolver.iterations_used(), 0);
        assert_relative_eq!(contacts[0].penetration, 1.0);
    }
}
