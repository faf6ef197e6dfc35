use particle_dynamics::*;

/// A small suspended walkway: deck particles held up by cables from two
/// fixed supports, with rods keeping the deck spacing rigid.
fn main() {
    let mut world = ParticleWorld::new(64, 0);
    let gravity = world.add_force_generator(Gravity::default());

    let left_support = world.add_particle(Particle::fixed(Vec3::new(0.0, 4.0, 0.0)));
    let right_support = world.add_particle(Particle::fixed(Vec3::new(6.0, 4.0, 0.0)));

    let mut deck = Vec::new();
    for i in 0..5 {
        let mut plank = Particle::new(Vec3::new(1.0 + i as f32, 2.0, 0.0));
        plank.set_mass(5.0);
        plank.damping = 0.9;
        let id = world.add_particle(plank);
        world.register_force(id, gravity);
        deck.push(id);
    }

    for (i, &plank) in deck.iter().enumerate() {
        let support = if i < 3 { left_support } else { right_support };
        world.add_contact_generator(Cable {
            particle_a: support,
            particle_b: plank,
            max_length: 3.2,
            restitution: 0.1,
        });
    }

    for pair in deck.windows(2) {
        world.add_contact_generator(Rod {
            particle_a: pair[0],
            particle_b: pair[1],
            length: 1.0,
        });
    }

    for frame in 0..300 {
        world.start_frame();
        let summary = world.run_physics(1.0 / 60.0);
        if summary.overflow {
            eprintln!("contact buffer overflowed at frame {frame}");
        }
    }

    for (i, &plank) in deck.iter().enumerate() {
        if let Some(particle) = world.particle(plank) {
            println!("plank {i}: {:?}", particle.position);
        }
    }
}
