//! Drawing abstraction and scene painting.
//!
//! The simulation never talks to a concrete canvas. Everything is painted
//! through [`Surface`], which the wasm front end implements over a 2D canvas
//! context and [`DrawList`] implements headlessly for tests and batch runs.

use std::f32::consts::PI;

use glam::Vec2;

use crate::config::{Color, SimulationConfig};
use crate::particle::{Particle, ParticleKind};
use crate::scene::Scene;

/// Amber used for every oil body. The configured oil color is not consulted.
pub const OIL_COLOR: Color = Color::rgb(0xF5, 0x9E, 0x0B);
/// Canvas clear color under the water tint.
pub const BACKGROUND: Color = Color::rgb(0x0A, 0x0A, 0x0A);
/// Placeholder fill while a panel waits for a configuration.
pub const PLACEHOLDER: Color = Color::rgb(0x02, 0x06, 0x17);
/// Opacity of the water tint wash.
pub const WATER_TINT_ALPHA: u8 = 0x15;
/// Particles further left than this are not painted.
pub const PAINT_CULL_X: f32 = -200.0;

const HIGHLIGHT: Color = Color::WHITE.with_alpha(128);
const TINY_BODY_ALPHA: u8 = 204;
const TINY_HIGHLIGHT: Color = Color::WHITE.with_alpha(82);

/// Minimal 2D drawing target.
pub trait Surface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    /// Fill a closed polygon, optionally stroking its outline.
    fn fill_polygon(&mut self, points: &[Vec2], fill: Color, stroke: Option<Color>);

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color);

    /// Fill the region bounded by an elliptical arc from `start` to `end`
    /// (radians, increasing, y axis down) and the chord closing it.
    fn fill_arc(&mut self, center: Vec2, radii: Vec2, start: f32, end: f32, color: Color);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32);
}

#[derive(Clone, PartialEq, Debug)]
pub enum DrawCommand {
    Rect {
        origin: Vec2,
        size: Vec2,
        color: Color,
    },
    Polygon {
        points: Vec<Vec2>,
        fill: Color,
        stroke: Option<Color>,
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        color: Color,
    },
    Arc {
        center: Vec2,
        radii: Vec2,
        start: f32,
        end: f32,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
    },
}

/// Headless surface that records every draw call.
#[derive(Default, Debug)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Surface for DrawList {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.commands.push(DrawCommand::Rect {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], fill: Color, stroke: Option<Color>) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            fill,
            stroke,
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        self.commands.push(DrawCommand::Ellipse {
            center,
            radii,
            color,
        });
    }

    fn fill_arc(&mut self, center: Vec2, radii: Vec2, start: f32, end: f32, color: Color) {
        self.commands.push(DrawCommand::Arc {
            center,
            radii,
            start,
            end,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }
}

/// Clear to the dark background and wash it with the water tint.
pub fn paint_background(surface: &mut dyn Surface, config: &SimulationConfig, width: f32, height: f32) {
    surface.fill_rect(0.0, 0.0, width, height, BACKGROUND);
    surface.fill_rect(
        0.0,
        0.0,
        width,
        height,
        config.water_color.with_alpha(WATER_TINT_ALPHA),
    );
}

pub fn paint_placeholder(surface: &mut dyn Surface, width: f32, height: f32) {
    surface.fill_rect(0.0, 0.0, width, height, PLACEHOLDER);
}

pub fn paint_particle(surface: &mut dyn Surface, particle: &Particle, config: &SimulationConfig) {
    if particle.dead || particle.position.x < PAINT_CULL_X {
        return;
    }
    let pos = particle.position;
    let r = particle.radius;

    match &particle.kind {
        ParticleKind::Oil(oil) => {
            let scale = oil.deformation;
            let radii = scale * r;
            let body = if oil.hit_flash > 0 { Color::WHITE } else { OIL_COLOR };
            if oil.stuck {
                // Dome resting on the rock: upper arc closed by a chord.
                surface.fill_arc(pos, radii, PI * 0.9, PI * 2.1, body);
            } else {
                surface.fill_ellipse(pos, radii, body);
            }
            surface.fill_ellipse(pos - scale * (r * 0.3), scale * (r * 0.35), HIGHLIGHT);
        }
        ParticleKind::Surfactant(surf) => {
            let color = config.surfactant_color;
            if surf.wall_film {
                surface.fill_rect(pos.x - r * 2.0, pos.y - 2.0, r * 4.0 + 2.0, 4.0, color);
            } else {
                surface.fill_ellipse(pos, Vec2::splat(r), color);
                surface.stroke_line(pos, pos - Vec2::new(r * 3.0, 0.0), color, 1.0);
            }
        }
        ParticleKind::TinyOil => {
            surface.fill_ellipse(pos, Vec2::splat(r), OIL_COLOR.with_alpha(TINY_BODY_ALPHA));
            surface.fill_ellipse(pos - Vec2::splat(r * 0.3), Vec2::splat(r * 0.3), TINY_HIGHLIGHT);
        }
    }
}

/// Background, water tint, then both rock walls.
pub fn paint_backdrop<R>(surface: &mut dyn Surface, scene: &Scene<R>) {
    let config = scene.config();
    let (width, height) = scene.size();
    paint_background(surface, config, width as f32, height as f32);
    let (top, bottom) = scene.walls();
    top.render(surface, config.rock_color);
    bottom.render(surface, config.rock_color);
}

/// Paint background, walls and particles without advancing the scene.
pub fn paint_scene<R>(surface: &mut dyn Surface, scene: &Scene<R>) {
    paint_backdrop(surface, scene);
    let config = scene.config();
    for particle in scene.particles() {
        paint_particle(surface, particle, config);
    }
}

pub mod instance_flags {
    pub const STUCK: u32 = 1;
    pub const WALL_FILM: u32 = 1 << 1;
    pub const FLASH: u32 = 1 << 2;
    pub const ATTACHED: u32 = 1 << 3;
}

/// Packed per-particle record for external renderers: 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2], //  8 bytes
    pub scale: [f32; 2],    //  8 bytes
    pub radius: f32,        //  4 bytes
    pub kind: u32,          //  4 bytes
    pub flags: u32,         //  4 bytes
    pub color: u32,         //  4 bytes, 0xRRGGBBAA
}

impl ParticleInstance {
    pub fn from_particle(particle: &Particle, config: &SimulationConfig) -> Self {
        let mut flags = 0;
        let (scale, color) = match &particle.kind {
            ParticleKind::Oil(oil) => {
                if oil.stuck {
                    flags |= instance_flags::STUCK;
                }
                if oil.hit_flash > 0 {
                    flags |= instance_flags::FLASH;
                }
                (oil.deformation, OIL_COLOR)
            }
            ParticleKind::Surfactant(surf) => {
                if surf.wall_film {
                    flags |= instance_flags::WALL_FILM;
                }
                if surf.attachment.is_some() {
                    flags |= instance_flags::ATTACHED;
                }
                (Vec2::ONE, config.surfactant_color)
            }
            ParticleKind::TinyOil => (Vec2::ONE, OIL_COLOR.with_alpha(TINY_BODY_ALPHA)),
        };
        Self {
            position: particle.position.to_array(),
            scale: scale.to_array(),
            radius: particle.radius,
            kind: particle.class() as u32,
            flags,
            color: color.to_u32(),
        }
    }
}

/// Refill `out` with one instance per live particle, in collection order.
pub fn write_instances<R>(scene: &Scene<R>, out: &mut Vec<ParticleInstance>) {
    out.clear();
    let config = scene.config();
    out.extend(
        scene
            .particles()
            .iter()
            .filter(|p| !p.dead)
            .map(|p| ParticleInstance::from_particle(p, config)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_is_32_bytes() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 32);
    }

    #[test]
    fn test_backdrop_paints_walls_after_background() {
        use crate::config::Mechanism;
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let config = SimulationConfig {
            mechanism: Mechanism::Tension,
            ..Default::default()
        };
        let scene = Scene::with_rng(200, 100, &config, StdRng::seed_from_u64(1));
        let mut list = DrawList::new();
        paint_backdrop(&mut list, &scene);

        assert_eq!(list.len(), 4);
        assert!(matches!(list.commands[0], DrawCommand::Rect { .. }));
        assert!(matches!(list.commands[1], DrawCommand::Rect { .. }));
        for command in &list.commands[2..] {
            match command {
                DrawCommand::Polygon { fill, .. } => assert_eq!(*fill, config.rock_color),
                other => panic!("expected wall polygon, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_background_is_two_rects() {
        let mut list = DrawList::new();
        let config = SimulationConfig::default();
        paint_background(&mut list, &config, 100.0, 50.0);
        assert_eq!(list.len(), 2);
        match &list.commands[1] {
            DrawCommand::Rect { color, size, .. } => {
                assert_eq!(color.a, WATER_TINT_ALPHA);
                assert_eq!(*size, Vec2::new(100.0, 50.0));
            }
            other => panic!("expected tint rect, got {other:?}"),
        }
    }
}
