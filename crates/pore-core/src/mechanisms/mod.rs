//! Per-frame particle rules.
//!
//! [`update_particle`] runs the common state machine (integrate, recycle,
//! wall contact) and then dispatches on `(kind, mechanism)` to the rule
//! modules. Rules read other particles only through the frame [`Snapshot`]
//! and write cross-particle effects into [`FrameEffects`], which the scene
//! applies after the pass.
pub mod emulsification;
pub mod placement;
pub mod tension;
pub mod wettability;

use std::collections::HashMap;

use glam::Vec2;
use rand::Rng;

use crate::config::{Mechanism, SimulationConfig};
use crate::particle::{Particle, ParticleClass, ParticleId, ParticleKind};
use crate::terrain::{RockWall, WallSide};

/// Particles past `width + RECYCLE_MARGIN` re-enter from the left.
pub const RECYCLE_MARGIN: f32 = 50.0;
/// Distance a colliding particle is pushed back out of the rock.
pub const WALL_PUSH: f32 = 2.0;
/// Fraction of vertical speed kept after a wall bounce.
pub const WALL_RESTITUTION: f32 = 0.5;
/// Chance that a surfactant striking a wall under wettability adheres.
pub const FILM_ADHESION_PROBABILITY: f32 = 0.85;

/// Canvas geometry and configuration shared by every rule in a frame.
#[derive(Clone, Copy)]
pub struct Layout<'a> {
    pub config: &'a SimulationConfig,
    pub width: f32,
    pub height: f32,
    pub top: &'a RockWall,
    pub bottom: &'a RockWall,
}

impl Layout<'_> {
    pub fn mechanism(&self) -> Mechanism {
        self.config.mechanism
    }

    pub fn flow_speed(&self) -> f32 {
        self.config.flow_speed
    }
}

/// Read-only view of one particle at the start of the frame.
#[derive(Clone, Copy, Debug)]
pub struct ParticleView {
    pub id: ParticleId,
    pub class: ParticleClass,
    pub position: Vec2,
    pub radius: f32,
    pub deformation: Vec2,
    pub dead: bool,
    pub wall_film: bool,
    pub epoch: u32,
}

impl ParticleView {
    fn of(particle: &Particle) -> Self {
        Self {
            id: particle.id,
            class: particle.class(),
            position: particle.position,
            radius: particle.radius,
            deformation: particle.deformation(),
            dead: particle.dead,
            wall_film: particle.is_wall_film(),
            epoch: particle.epoch,
        }
    }
}

/// Frame-start copy of the population used for every proximity query, so
/// update order within a pass never changes what a rule observes.
#[derive(Default)]
pub struct Snapshot {
    views: Vec<ParticleView>,
    index: HashMap<ParticleId, usize>,
    oils: Vec<usize>,
    surfactants: Vec<usize>,
}

impl Snapshot {
    /// Rebuild from `particles`, reusing buffers.
    pub fn capture(&mut self, particles: &[Particle]) {
        self.views.clear();
        self.index.clear();
        self.oils.clear();
        self.surfactants.clear();

        for (i, particle) in particles.iter().enumerate() {
            let view = ParticleView::of(particle);
            match view.class {
                ParticleClass::Oil => self.oils.push(i),
                ParticleClass::Surfactant => self.surfactants.push(i),
                ParticleClass::TinyOil => {}
            }
            self.index.insert(view.id, i);
            self.views.push(view);
        }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn get(&self, id: ParticleId) -> Option<&ParticleView> {
        self.index.get(&id).map(|&i| &self.views[i])
    }

    /// Collection index of `id` at capture time.
    pub fn index_of(&self, id: ParticleId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Oil blobs that are not dead.
    pub fn live_oils(&self) -> impl Iterator<Item = &ParticleView> {
        self.oils.iter().map(|&i| &self.views[i]).filter(|p| !p.dead)
    }

    pub fn surfactants(&self) -> impl Iterator<Item = &ParticleView> {
        self.surfactants.iter().map(|&i| &self.views[i])
    }

    pub fn wall_films(&self) -> impl Iterator<Item = &ParticleView> {
        self.surfactants().filter(|p| p.wall_film)
    }
}

/// A tiny droplet queued for insertion after the pass.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Spawn {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

/// Cross-particle writes deferred to the end of the pass.
#[derive(Default, Debug)]
pub struct FrameEffects {
    /// Surfactants that struck an oil blob and bounce back.
    pub deflections: Vec<ParticleId>,
    pub spawns: Vec<Spawn>,
}

impl FrameEffects {
    pub fn clear(&mut self) {
        self.deflections.clear();
        self.spawns.clear();
    }
}

pub struct FrameContext<'a, R: ?Sized> {
    pub layout: Layout<'a>,
    pub snapshot: &'a Snapshot,
    pub effects: &'a mut FrameEffects,
    pub rng: &'a mut R,
}

/// Advance one particle by one frame.
pub fn update_particle<R: Rng + ?Sized>(particle: &mut Particle, ctx: &mut FrameContext<'_, R>) {
    if particle.dead {
        return;
    }
    if let Some(oil) = particle.oil_state_mut() {
        oil.hit_flash = oil.hit_flash.saturating_sub(1);
    }
    if particle.is_wall_film() {
        return;
    }

    let mechanism = ctx.layout.mechanism();
    let class = particle.class();

    if mechanism == Mechanism::Tension
        && class == ParticleClass::Surfactant
        && tension::steer_surfactant(particle, ctx) == tension::Steering::Orbiting
    {
        return;
    }

    if !particle.is_anchored() {
        particle.integrate();
    }

    if particle.position.x > ctx.layout.width + RECYCLE_MARGIN {
        placement::recycle(particle, &ctx.layout, ctx.rng);
    }

    if class != ParticleClass::TinyOil && !particle.is_anchored() {
        resolve_wall_contact(particle, &ctx.layout, ctx.rng);
    }

    match (class, mechanism) {
        (ParticleClass::Oil, Mechanism::Wettability) => wettability::update_oil(particle, ctx),
        (ParticleClass::Oil, Mechanism::Tension) => tension::update_oil(particle, ctx),
        (ParticleClass::Oil, Mechanism::Emulsification) => emulsification::update_oil(particle, ctx),
        (ParticleClass::TinyOil, _) => particle.integrate(),
        _ => {}
    }
}

/// Whether a wall strike deposits a surfactant film.
#[inline]
pub fn film_adheres<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen::<f32>() < FILM_ADHESION_PROBABILITY
}

/// Push a particle out of either wall with an inelastic bounce. Under
/// wettability a surfactant may instead adhere to the wall it struck.
pub fn resolve_wall_contact<R: Rng + ?Sized>(particle: &mut Particle, layout: &Layout<'_>, rng: &mut R) {
    let filming = layout.mechanism() == Mechanism::Wettability
        && particle.class() == ParticleClass::Surfactant;

    for wall in [layout.top, layout.bottom] {
        let Vec2 { x, y } = particle.position;
        if !wall.collides(x, y, particle.radius) {
            continue;
        }

        let sign = match wall.side() {
            WallSide::Top => 1.0,
            WallSide::Bottom => -1.0,
        };
        particle.position.y += WALL_PUSH * sign;
        particle.velocity.y = particle.velocity.y.abs() * WALL_RESTITUTION * sign;

        if filming && film_adheres(rng) {
            particle.position.y = wall.height_at(particle.position.x) + particle.radius * sign;
            if let ParticleKind::Surfactant(surf) = &mut particle.kind {
                surf.wall_film = true;
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn walls(config: &SimulationConfig) -> (RockWall, RockWall) {
        let mut rng = StdRng::seed_from_u64(3);
        (
            RockWall::generate(400, 200, WallSide::Top, config, &mut rng),
            RockWall::generate(400, 200, WallSide::Bottom, config, &mut rng),
        )
    }

    #[test]
    fn test_film_adhesion_rate() {
        let config = SimulationConfig {
            mechanism: Mechanism::Wettability,
            ..Default::default()
        };
        let (top, bottom) = walls(&config);
        let layout = Layout {
            config: &config,
            width: 400.0,
            height: 200.0,
            top: &top,
            bottom: &bottom,
        };
        let mut rng = StdRng::seed_from_u64(2024);

        let trials = 20_000;
        let mut adhered = 0;
        for i in 0..trials {
            let mut p = Particle::surfactant(ParticleId(i));
            let x = 200.0;
            // Just inside the top rock.
            p.position = Vec2::new(x, top.height_at(x) + 1.0);
            p.velocity = Vec2::new(3.0, -1.0);
            resolve_wall_contact(&mut p, &layout, &mut rng);
            if p.is_wall_film() {
                adhered += 1;
                assert!((p.position.y - (top.height_at(x) + p.radius)).abs() < 1e-4);
            }
        }
        let rate = adhered as f32 / trials as f32;
        assert!((rate - 0.85).abs() < 0.015, "adhesion rate {rate}");
    }

    #[test]
    fn test_bounce_off_bottom_is_inelastic() {
        let config = SimulationConfig {
            mechanism: Mechanism::Tension,
            ..Default::default()
        };
        let (top, bottom) = walls(&config);
        let layout = Layout {
            config: &config,
            width: 400.0,
            height: 200.0,
            top: &top,
            bottom: &bottom,
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut p = Particle::surfactant(ParticleId(0));
        let x = 20.0;
        p.position = Vec2::new(x, bottom.height_at(x));
        p.velocity = Vec2::new(1.0, 4.0);
        let y0 = p.position.y;

        resolve_wall_contact(&mut p, &layout, &mut rng);

        assert_eq!(p.position.y, y0 - WALL_PUSH);
        assert_eq!(p.velocity.y, -2.0);
        assert!(!p.is_wall_film(), "only wettability deposits films");
    }

    #[test]
    fn test_snapshot_indexes_by_kind() {
        let mut particles = vec![
            Particle::oil(ParticleId(10)),
            Particle::surfactant(ParticleId(11)),
            Particle::surfactant(ParticleId(12)),
        ];
        particles[0].dead = true;
        particles[2].kind = ParticleKind::Surfactant(crate::particle::SurfactantState {
            wall_film: true,
            attachment: None,
        });

        let mut snapshot = Snapshot::default();
        snapshot.capture(&particles);

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.live_oils().count(), 0);
        assert_eq!(snapshot.surfactants().count(), 2);
        assert_eq!(snapshot.wall_films().count(), 1);
        assert_eq!(snapshot.index_of(ParticleId(12)), Some(2));
        assert!(snapshot.get(ParticleId(99)).is_none());
    }
}
