use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Mechanism, SimulationConfig};
use crate::mechanisms::{placement, update_particle, FrameContext, FrameEffects, Layout, Snapshot};
use crate::particle::{Particle, ParticleClass, ParticleId, ParticleKind};
use crate::terrain::{RockWall, WallSide};

/// Particles left of this are unreachable and dropped.
pub const CULL_X: f32 = -400.0;

/// Oil blobs seeded per mechanism.
pub fn oil_count(mechanism: Mechanism) -> usize {
    match mechanism {
        Mechanism::Tension | Mechanism::Emulsification => 2,
        _ => 6,
    }
}

/// Surfactants seeded per mechanism.
pub fn surfactant_count(mechanism: Mechanism) -> usize {
    match mechanism {
        Mechanism::Wettability => 800,
        Mechanism::Tension => 120,
        _ => 150,
    }
}

/// Owns the walls and the particle population for one configuration.
///
/// A scene is rebuilt wholesale when the canvas size or configuration
/// changes; nothing outside it holds particle or wall state.
pub struct Scene<R = StdRng> {
    config: SimulationConfig,
    width: u32,
    height: u32,
    top: RockWall,
    bottom: RockWall,
    particles: Vec<Particle>,
    snapshot: Snapshot,
    effects: FrameEffects,
    next_id: u32,
    frame: u64,
    rng: R,
}

impl Scene<StdRng> {
    /// Scene seeded from OS entropy.
    pub fn new(width: u32, height: u32, config: &SimulationConfig) -> Self {
        Self::with_rng(width, height, config, StdRng::from_entropy())
    }
}

impl<R: Rng> Scene<R> {
    /// Scene driven by the given random stream.
    pub fn with_rng(width: u32, height: u32, config: &SimulationConfig, mut rng: R) -> Self {
        let top = RockWall::generate(width, height, WallSide::Top, config, &mut rng);
        let bottom = RockWall::generate(width, height, WallSide::Bottom, config, &mut rng);
        let mut scene = Self {
            config: config.clone(),
            width,
            height,
            top,
            bottom,
            particles: Vec::new(),
            snapshot: Snapshot::default(),
            effects: FrameEffects::default(),
            next_id: 0,
            frame: 0,
            rng,
        };
        scene.seed();
        scene
    }

    /// Wipe the scene and rebuild walls and population.
    pub fn initialize(&mut self, width: u32, height: u32, config: &SimulationConfig) {
        self.config = config.clone();
        self.width = width;
        self.height = height;
        self.top = RockWall::generate(width, height, WallSide::Top, config, &mut self.rng);
        self.bottom = RockWall::generate(width, height, WallSide::Bottom, config, &mut self.rng);
        self.seed();
    }

    fn seed(&mut self) {
        self.particles.clear();
        self.effects.clear();
        self.frame = 0;

        let mechanism = self.config.mechanism;
        let oils = oil_count(mechanism);
        let surfactants = surfactant_count(mechanism);
        self.particles.reserve(oils + surfactants);

        let layout = Layout {
            config: &self.config,
            width: self.width as f32,
            height: self.height as f32,
            top: &self.top,
            bottom: &self.bottom,
        };
        for index in 0..oils {
            let id = ParticleId(self.next_id);
            self.next_id += 1;
            self.particles.push(placement::seed_oil(id, index, &layout, &mut self.rng));
        }
        for _ in 0..surfactants {
            let id = ParticleId(self.next_id);
            self.next_id += 1;
            self.particles.push(placement::seed_surfactant(id, &layout, &mut self.rng));
        }

        log::info!(
            "scene initialized: {} {}x{}, {} oil, {} surfactant",
            mechanism,
            self.width,
            self.height,
            oils,
            surfactants
        );
    }

    /// Advance the whole population by one frame.
    ///
    /// Dead and unreachable particles are dropped first. Every particle is
    /// then updated against a snapshot taken before the pass; deflections
    /// and droplet spawns produced during the pass are applied afterwards,
    /// so spawned droplets first move on the next frame.
    pub fn step(&mut self) {
        self.particles.retain(|p| !p.dead && p.position.x >= CULL_X);
        self.snapshot.capture(&self.particles);
        self.effects.clear();

        let mut ctx = FrameContext {
            layout: Layout {
                config: &self.config,
                width: self.width as f32,
                height: self.height as f32,
                top: &self.top,
                bottom: &self.bottom,
            },
            snapshot: &self.snapshot,
            effects: &mut self.effects,
            rng: &mut self.rng,
        };
        for particle in self.particles.iter_mut() {
            update_particle(particle, &mut ctx);
        }

        for id in &self.effects.deflections {
            let Some(index) = self.snapshot.index_of(*id) else {
                continue;
            };
            if let Some(particle) = self.particles.get_mut(index) {
                particle.velocity.x = -particle.velocity.x.abs();
                particle.position.x -= 2.0;
            }
        }

        let spawns = std::mem::take(&mut self.effects.spawns);
        for spawn in &spawns {
            self.spawn(ParticleKind::TinyOil, spawn.position, spawn.velocity, spawn.radius);
        }
        self.effects.spawns = spawns;

        self.frame += 1;
    }

    /// Insert a particle directly, bypassing placement rules.
    pub fn spawn(&mut self, kind: ParticleKind, position: Vec2, velocity: Vec2, radius: f32) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        self.particles.push(Particle::new(id, kind, position, velocity, radius));
        id
    }
}

impl<R> Scene<R> {
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `(top, bottom)`.
    pub fn walls(&self) -> (&RockWall, &RockWall) {
        (&self.top, &self.bottom)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.iter_mut().find(|p| p.id == id)
    }

    /// Particles of `class` not yet marked dead.
    pub fn count(&self, class: ParticleClass) -> usize {
        self.particles
            .iter()
            .filter(|p| !p.dead && p.class() == class)
            .count()
    }

    /// Frames stepped since the last (re)initialization.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Drop every particle, keeping the walls.
    pub fn clear_particles(&mut self) {
        self.particles.clear();
    }
}
