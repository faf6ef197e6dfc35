use particle_dynamics::*;

fn main() {
    let mut world = ParticleWorld::new(16, 0);

    let mut shot = Particle::new(Vec3::new(0.0, 1.5, 0.0));
    shot.set_mass(2.0);
    shot.velocity = Vec3::new(35.0, 10.0, 0.0);
    shot.acceleration = Vec3::new(0.0, -9.81, 0.0);
    shot.damping = 0.99;
    let shot_id = world.add_particle(shot);

    world.add_contact_generator(GroundPlane::new(0.0, 0.4));

    for frame in 0..120 {
        world.start_frame();
        world.run_physics(1.0 / 60.0);

        if frame % 20 == 0 {
            if let Some(particle) = world.particle(shot_id) {
                println!(
                    "t={:.2}s position={:?}",
                    frame as f32 / 60.0,
                    particle.position
                );
            }
        }
    }
}
