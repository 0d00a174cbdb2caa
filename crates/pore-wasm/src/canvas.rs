use std::f64::consts::TAU;

use glam::Vec2;
use pore_core::config::Color;
use pore_core::render::Surface;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const OUTLINE_WIDTH: f64 = 2.0;

/// [`Surface`] over a 2D canvas context. A primitive the browser rejects
/// (for example an ellipse with a negative radius) is skipped.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { ctx })
    }

    fn ellipse_path(&self, center: Vec2, radii: Vec2, start: f64, end: f64) -> bool {
        self.ctx.begin_path();
        self.ctx
            .ellipse(
                center.x as f64,
                center.y as f64,
                radii.x.abs() as f64,
                radii.y.abs() as f64,
                0.0,
                start,
                end,
            )
            .is_ok()
    }
}

impl Surface for CanvasSurface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(x as f64, y as f64, width as f64, height as f64);
    }

    fn fill_polygon(&mut self, points: &[Vec2], fill: Color, stroke: Option<Color>) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.close_path();
        self.ctx.set_fill_style_str(&fill.to_css());
        self.ctx.fill();
        if let Some(stroke) = stroke {
            self.ctx.set_stroke_style_str(&stroke.to_css());
            self.ctx.set_line_width(OUTLINE_WIDTH);
            self.ctx.stroke();
        }
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        if self.ellipse_path(center, radii, 0.0, TAU) {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill();
        }
    }

    fn fill_arc(&mut self, center: Vec2, radii: Vec2, start: f32, end: f32, color: Color) {
        if self.ellipse_path(center, radii, start as f64, end as f64) {
            self.ctx.close_path();
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill();
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }
}
