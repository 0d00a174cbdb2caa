use glam::Vec2;
use rand::Rng;

use super::FrameContext;
use crate::math::jitter;
use crate::particle::Particle;

/// Extra reach beyond the blob radius within which wall films count.
pub const FILM_REACH: f32 = 15.0;
/// More nearby films than this and the blob starts to tremble.
pub const JITTER_THRESHOLD: usize = 5;
/// More nearby films than this and the blob lets go of the rock.
pub const RELEASE_THRESHOLD: usize = 30;

/// Wall films within reach of `particle`'s x position.
pub fn nearby_films<R: ?Sized>(particle: &Particle, ctx: &FrameContext<'_, R>) -> usize {
    let reach = particle.radius + FILM_REACH;
    ctx.snapshot
        .wall_films()
        .filter(|film| (film.position.x - particle.position.x).abs() < reach)
        .count()
}

/// A pinned blob destabilizes as surfactant film accumulates around it and
/// eventually detaches to flow downstream.
pub fn update_oil<R: Rng + ?Sized>(particle: &mut Particle, ctx: &mut FrameContext<'_, R>) {
    if !particle.is_stuck() {
        return;
    }

    let films = nearby_films(particle, ctx);

    if films > JITTER_THRESHOLD {
        particle.position.x += jitter(ctx.rng, 2.0);
        particle.position.y += jitter(ctx.rng, 0.5);
    }

    if films > RELEASE_THRESHOLD {
        if let Some(oil) = particle.oil_state_mut() {
            oil.stuck = false;
        }
        particle.velocity = Vec2::new(ctx.layout.flow_speed() * 0.3, -0.5);
        particle.position.y -= 2.0;
        log::debug!("oil {:?} released after {} films", particle.id, films);
    }
}
