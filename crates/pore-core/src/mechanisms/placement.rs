//! Where particles enter the channel, both at scene seeding and when they
//! re-enter from the left after drifting past the right edge.

use glam::Vec2;
use rand::Rng;

use super::{Layout, Spawn};
use crate::config::Mechanism;
use crate::math::{jitter, uniform};
use crate::particle::{
    OilState, Particle, ParticleClass, ParticleId, ParticleKind, SurfactantState, INITIAL_HEALTH,
};

/// Re-entry x for recycled particles.
pub const RECYCLE_X: f32 = -150.0;
/// Radius of emulsification blobs.
pub const LARGE_BLOB_RADIUS: f32 = 48.0;
pub const SURFACTANT_RADIUS: f32 = 2.5;
/// Margin kept between a pinned wettability blob and the canvas edges.
pub const PIN_MARGIN: f32 = 50.0;

/// Seed oil blob number `index`.
pub fn seed_oil<R: Rng + ?Sized>(id: ParticleId, index: usize, layout: &Layout<'_>, rng: &mut R) -> Particle {
    let mut particle = Particle::oil(id);
    particle.radius = 15.0 + uniform(rng, 5.0);
    particle.position.x = match layout.mechanism() {
        Mechanism::Tension => index as f32 * -150.0 + 50.0,
        Mechanism::Emulsification => -100.0 - index as f32 * 200.0,
        _ => uniform(rng, layout.width * 0.3),
    };
    place_oil(&mut particle, layout, rng);
    particle
}

pub fn seed_surfactant<R: Rng + ?Sized>(id: ParticleId, layout: &Layout<'_>, rng: &mut R) -> Particle {
    let mut particle = Particle::surfactant(id);
    let span = match layout.mechanism() {
        Mechanism::Tension => layout.width * 0.5,
        _ => layout.width,
    };
    particle.position = Vec2::new(uniform(rng, span), uniform(rng, layout.height));
    particle.velocity = Vec2::new(
        layout.flow_speed() * (0.8 + uniform(rng, 0.4)),
        jitter(rng, 1.0) * layout.config.turbulence * 10.0,
    );
    place_surfactant(&mut particle, layout, rng);
    particle
}

/// One emulsified droplet stripped from a blob of `parent_radius` at
/// `center`.
pub fn tiny_droplet<R: Rng + ?Sized>(center: Vec2, parent_radius: f32, layout: &Layout<'_>, rng: &mut R) -> Spawn {
    Spawn {
        position: center + Vec2::new(jitter(rng, parent_radius), jitter(rng, parent_radius)),
        velocity: Vec2::new(layout.flow_speed() * 0.8 + uniform(rng, 1.0), jitter(rng, 4.0)),
        radius: 3.0 + uniform(rng, 3.0),
    }
}

/// Send a particle that left through the right edge back in from the left,
/// with its transient state cleared and its kind re-seeded.
pub fn recycle<R: Rng + ?Sized>(particle: &mut Particle, layout: &Layout<'_>, rng: &mut R) {
    particle.position.x = RECYCLE_X;
    particle.dead = false;
    particle.epoch = particle.epoch.wrapping_add(1);

    match particle.class() {
        ParticleClass::Oil => {
            if let Some(oil) = particle.oil_state_mut() {
                *oil = OilState::default();
            }
            place_oil(particle, layout, rng);
        }
        ParticleClass::Surfactant => {
            // Scattered entry just left of the canvas.
            particle.position = Vec2::new(-(0.5 + uniform(rng, 49.5)), uniform(rng, layout.height));
            place_surfactant(particle, layout, rng);
        }
        ParticleClass::TinyOil => {}
    }
}

/// Mechanism-specific oil placement shared by seeding and recycling.
/// Expects `position.x` to hold the default entry x.
fn place_oil<R: Rng + ?Sized>(particle: &mut Particle, layout: &Layout<'_>, rng: &mut R) {
    let h = layout.height;
    let flow = layout.flow_speed();

    match layout.mechanism() {
        Mechanism::Wettability => {
            let x = PIN_MARGIN + uniform(rng, layout.width - 2.0 * PIN_MARGIN);
            particle.position = Vec2::new(x, layout.bottom.height_at(x) - particle.radius + 2.0);
            particle.velocity = Vec2::ZERO;
            set_stuck(particle, true);
        }
        Mechanism::Tension => {
            particle.radius = 30.0 + uniform(rng, 5.0);
            particle.position.y = h / 2.0;
            particle.velocity = Vec2::new(flow * 0.3, 0.0);
            set_stuck(particle, false);
        }
        Mechanism::Emulsification | Mechanism::General => {
            particle.radius = LARGE_BLOB_RADIUS;
            particle.position.y = h / 2.0 + jitter(rng, 40.0);
            particle.velocity = Vec2::new(flow * 0.1, 0.0);
            set_stuck(particle, false);
            if let Some(oil) = particle.oil_state_mut() {
                oil.health = INITIAL_HEALTH;
            }
        }
    }
}

fn place_surfactant<R: Rng + ?Sized>(particle: &mut Particle, layout: &Layout<'_>, rng: &mut R) {
    particle.radius = SURFACTANT_RADIUS;
    if let ParticleKind::Surfactant(surf) = &mut particle.kind {
        *surf = SurfactantState::default();
    }
    // Tight band mid-channel, clear of both walls.
    if layout.mechanism() == Mechanism::Wettability {
        particle.position.y = layout.height * 0.5 + jitter(rng, layout.height * 0.1);
        particle.velocity.y = jitter(rng, 4.0);
    }
}

fn set_stuck(particle: &mut Particle, stuck: bool) {
    if let Some(oil) = particle.oil_state_mut() {
        oil.stuck = stuck;
    }
}
