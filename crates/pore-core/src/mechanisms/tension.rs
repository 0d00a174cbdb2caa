use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::Rng;

use super::{FrameContext, RECYCLE_MARGIN};
use crate::math::mix;
use crate::particle::{Attachment, Particle, ParticleKind};

/// Surfactants only steer toward blobs closer than this.
pub const SEEK_RADIUS: f32 = 300.0;
/// Initial best distance for the nearest-blob scan.
const SEEK_SCAN: f32 = 1000.0;
pub const SEEK_GAIN: f32 = 0.005;
/// Velocity kept per frame while steering.
pub const SEEK_RETENTION: f32 = 0.9;
/// Capture distance beyond the blob radius.
pub const ATTACH_REACH: f32 = 10.0;
/// Orbit rate of an attached surfactant, radians per frame.
pub const ORBIT_RATE: f32 = 0.05;
/// Gap between the blob surface and an orbiting surfactant.
const ORBIT_GAP: f32 = 2.0;
/// Half-length of the zone around the throat where blobs deform.
pub const SQUEEZE_ZONE: f32 = 100.0;
/// Approach distance over which blobs are throttled.
pub const APPROACH_ZONE: f32 = 120.0;
/// Distance past the throat over which blobs are accelerated.
pub const RELEASE_ZONE: f32 = 100.0;
/// Per-frame relaxation toward undeformed outside the squeeze zone.
pub const RELAX_RATE: f32 = 0.1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Steering {
    /// Riding on a blob; the rest of the frame update is skipped.
    Orbiting,
    Free,
}

/// Attached surfactants orbit their blob; free ones seek the nearest blob
/// and latch on when close enough.
pub fn steer_surfactant<R: Rng + ?Sized>(particle: &mut Particle, ctx: &mut FrameContext<'_, R>) -> Steering {
    let Some(attachment) = particle.surfactant_state().and_then(|s| s.attachment) else {
        seek(particle, ctx);
        return Steering::Free;
    };

    let target = ctx.snapshot.get(attachment.target).filter(|oil| {
        !oil.dead
            && oil.epoch == attachment.epoch
            && oil.position.x <= ctx.layout.width + RECYCLE_MARGIN
    });

    match target {
        Some(oil) => {
            let a = oil.radius * oil.deformation.x + ORBIT_GAP;
            let b = oil.radius * oil.deformation.y + ORBIT_GAP;
            let (sin, cos) = attachment.angle.sin_cos();
            particle.position = oil.position + Vec2::new(a * cos, b * sin);
            set_attachment(
                particle,
                Some(Attachment {
                    angle: attachment.angle + ORBIT_RATE,
                    ..attachment
                }),
            );
            Steering::Orbiting
        }
        None => {
            set_attachment(particle, None);
            seek(particle, ctx);
            Steering::Free
        }
    }
}

fn seek<R: ?Sized>(particle: &mut Particle, ctx: &FrameContext<'_, R>) {
    let nearest = ctx
        .snapshot
        .live_oils()
        .map(|oil| (oil, oil.position.distance(particle.position)))
        .filter(|(_, d)| *d < SEEK_SCAN)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let Some((oil, dist)) = nearest else {
        return;
    };
    if dist >= SEEK_RADIUS {
        return;
    }

    let delta = oil.position - particle.position;
    particle.velocity = (particle.velocity + delta * SEEK_GAIN) * SEEK_RETENTION;

    if dist < oil.radius + ATTACH_REACH {
        let away = particle.position - oil.position;
        set_attachment(
            particle,
            Some(Attachment {
                target: oil.id,
                angle: away.y.atan2(away.x),
                epoch: oil.epoch,
            }),
        );
    }
}

fn set_attachment(particle: &mut Particle, attachment: Option<Attachment>) {
    if let ParticleKind::Surfactant(surf) = &mut particle.kind {
        surf.attachment = attachment;
    }
}

/// Horizontal speed factor (times flow speed) at signed distance
/// `to_throat = throat_x - x`.
pub fn speed_factor(to_throat: f32) -> f32 {
    if to_throat > 0.0 && to_throat < APPROACH_ZONE {
        0.15
    } else if to_throat <= 0.0 && to_throat > -RELEASE_ZONE {
        0.6
    } else {
        0.3
    }
}

/// Squash/stretch at `dist` from the throat, or `None` outside the zone.
pub fn squeeze(dist: f32) -> Option<Vec2> {
    if dist >= SQUEEZE_ZONE {
        return None;
    }
    let intensity = (dist / SQUEEZE_ZONE * FRAC_PI_2).cos();
    Some(Vec2::new(1.0 + intensity * 2.5, 1.0 / (1.0 + intensity * 1.5)))
}

/// Blobs slow approaching the throat, stretch through it and surge out.
pub fn update_oil<R: ?Sized>(particle: &mut Particle, ctx: &mut FrameContext<'_, R>) {
    let to_throat = ctx.layout.width / 2.0 - particle.position.x;
    particle.velocity.x = ctx.layout.flow_speed() * speed_factor(to_throat);

    if let Some(oil) = particle.oil_state_mut() {
        oil.deformation = match squeeze(to_throat.abs()) {
            Some(shape) => shape,
            None => Vec2::new(
                mix(oil.deformation.x, 1.0, RELAX_RATE),
                mix(oil.deformation.y, 1.0, RELAX_RATE),
            ),
        };
    }
}
