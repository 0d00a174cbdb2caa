use glam::Vec2;
use rand::Rng;

use crate::config::{Color, Mechanism, SimulationConfig};
use crate::render::Surface;

/// Horizontal spacing between generated boundary points.
pub const SEGMENT_WIDTH: usize = 10;
/// Lookup result for a top wall outside the table: no constraint.
pub const TOP_SENTINEL: f32 = 0.0;
/// Lookup result for a bottom wall outside the table: no constraint.
pub const BOTTOM_SENTINEL: f32 = 9999.0;
/// Half-width of the fully closed part of the tension throat.
pub const THROAT_HALF_WIDTH: f32 = 50.0;
/// Width of the transitional shelf on either side of the throat.
pub const THROAT_SHELF: f32 = 100.0;

const OUTLINE: Color = Color::BLACK.with_alpha(128);

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum WallSide {
    Top,
    Bottom,
}

impl WallSide {
    pub fn sentinel(self) -> f32 {
        match self {
            WallSide::Top => TOP_SENTINEL,
            WallSide::Bottom => BOTTOM_SENTINEL,
        }
    }
}

/// Rock thickness as a fraction of canvas height, measured from the wall
/// toward the channel center.
pub fn base_fraction(mechanism: Mechanism) -> f32 {
    match mechanism {
        Mechanism::Tension => 0.44,
        Mechanism::Wettability => 0.32,
        Mechanism::Emulsification => 0.28,
        Mechanism::General => 0.30,
    }
}

/// Rock thickness fraction of the tension profile at `center_dist` from the
/// throat. The channel narrows in two steps toward the center.
pub fn throat_fraction(center_dist: f32) -> f32 {
    if center_dist < THROAT_HALF_WIDTH {
        0.44
    } else if center_dist < THROAT_HALF_WIDTH + THROAT_SHELF {
        0.2
    } else {
        0.1
    }
}

/// One procedurally generated rock boundary.
///
/// Holds the outline used for painting and a dense per-column height table
/// used for collision tests. Immutable after generation.
#[derive(Clone, Debug)]
pub struct RockWall {
    side: WallSide,
    outline: Vec<Vec2>,
    heights: Vec<f32>,
}

impl RockWall {
    /// Build a wall for a `width` x `height` canvas.
    ///
    /// Boundary points are placed every [`SEGMENT_WIDTH`] units from x = 0
    /// to just past `width`; each point's height is copied into every pixel
    /// column its segment spans.
    pub fn generate<R: Rng + ?Sized>(
        width: u32,
        height: u32,
        side: WallSide,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Self {
        let w = width as f32;
        let h = height as f32;
        let columns = width as usize;
        let segments = columns.div_ceil(SEGMENT_WIDTH) + 2;
        let base = h * base_fraction(config.mechanism);
        let corner_y = match side {
            WallSide::Top => 0.0,
            WallSide::Bottom => h,
        };

        let mut outline = Vec::with_capacity(segments + 2);
        let mut heights = vec![side.sentinel(); columns];
        outline.push(Vec2::new(0.0, corner_y));

        for i in 0..segments {
            let x = (i * SEGMENT_WIDTH) as f32;
            let fi = i as f32;

            let mut y = match config.mechanism {
                Mechanism::Tension => h * throat_fraction((w / 2.0 - x).abs()),
                Mechanism::Wettability => base + (fi * 0.1).sin() * 2.0,
                _ => base + (fi * 0.3).sin() * 5.0 + rng.gen::<f32>() * 5.0,
            };
            if side == WallSide::Bottom {
                y = h - y;
            }
            outline.push(Vec2::new(x, y));

            let start = (i * SEGMENT_WIDTH).min(columns);
            let end = (start + SEGMENT_WIDTH).min(columns);
            heights[start..end].fill(y);
        }

        outline.push(Vec2::new(w, corner_y));

        Self {
            side,
            outline,
            heights,
        }
    }

    pub fn side(&self) -> WallSide {
        self.side
    }

    /// Number of pixel columns covered by the height table.
    pub fn width(&self) -> usize {
        self.heights.len()
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Closed outline: side corner, boundary points, side corner.
    pub fn outline(&self) -> &[Vec2] {
        &self.outline
    }

    fn column(&self, x: f32) -> Option<usize> {
        if !x.is_finite() || x < 0.0 {
            return None;
        }
        let col = x.floor() as usize;
        (col < self.heights.len()).then_some(col)
    }

    /// Boundary height at column `floor(x)`, or the side's sentinel when `x`
    /// falls outside the table.
    pub fn height_at(&self, x: f32) -> f32 {
        match self.column(x) {
            Some(col) => self.heights[col],
            None => self.side.sentinel(),
        }
    }

    /// Whether a circle at `(x, y)` has crossed this boundary.
    pub fn collides(&self, x: f32, y: f32, radius: f32) -> bool {
        let Some(col) = self.column(x) else {
            return false;
        };
        let wall_y = self.heights[col];
        match self.side {
            WallSide::Top => y - radius < wall_y,
            WallSide::Bottom => y + radius > wall_y,
        }
    }

    pub fn render(&self, surface: &mut dyn Surface, color: Color) {
        surface.fill_polygon(&self.outline, color, Some(OUTLINE));
    }
}
