use rand::Rng;

use super::{placement, FrameContext};
use crate::math::jitter;
use crate::particle::{Particle, HIT_FLASH_FRAMES};

/// Droplets produced when a blob breaks up.
pub const BREAKUP_DROPLETS: usize = 10;

/// Surfactants striking the blob bounce off and wear it down; at zero
/// health the blob is stripped into a spray of tiny droplets.
pub fn update_oil<R: Rng + ?Sized>(particle: &mut Particle, ctx: &mut FrameContext<'_, R>) {
    let snapshot = ctx.snapshot;

    for surf in snapshot.surfactants().filter(|s| !s.wall_film && !s.dead) {
        if surf.position.distance(particle.position) >= particle.radius + surf.radius {
            continue;
        }

        ctx.effects.deflections.push(surf.id);

        let Some(oil) = particle.oil_state_mut() else {
            return;
        };
        oil.health -= 1;
        oil.hit_flash = HIT_FLASH_FRAMES;
        let health = oil.health;

        particle.position.x += jitter(ctx.rng, 1.5);
        particle.position.y += jitter(ctx.rng, 1.5);

        if health <= 0 {
            particle.dead = true;
            for _ in 0..BREAKUP_DROPLETS {
                let spawn = placement::tiny_droplet(particle.position, particle.radius, &ctx.layout, ctx.rng);
                ctx.effects.spawns.push(spawn);
            }
            log::debug!("oil {:?} emulsified into {} droplets", particle.id, BREAKUP_DROPLETS);
            return;
        }
    }
}
