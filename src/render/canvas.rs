use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::scene::ColorSpace;

/// One 8-bit RGBA texel, laid out exactly as the GPU texture expects
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from linear 0..1 components
    pub fn from_vec3(color: Vec3) -> Self {
        let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        Self::new(c.x as u8, c.y as u8, c.z as u8, 255)
    }

    /// Opaque colour from linear components, encoded for the output space
    pub fn encode(color: Vec3, space: ColorSpace) -> Self {
        match space {
            ColorSpace::Linear => Self::from_vec3(color),
            ColorSpace::Srgb => {
                let c = color.clamp(Vec3::ZERO, Vec3::ONE);
                Self::from_vec3(Vec3::new(linear_to_srgb(c.x), linear_to_srgb(c.y), linear_to_srgb(c.z)))
            }
        }
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// 2D drawing operations for the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    /// Fill the whole canvas
    Clear(Rgba),
    /// Top colour fading to bottom colour
    Gradient { top: Rgba, bottom: Rgba },
    Pixel { x: i32, y: i32, color: Rgba },
    Rect { x: i32, y: i32, width: u32, height: u32, color: Rgba },
    /// `width` is the side of the square brush in pixels
    Line { x1: i32, y1: i32, x2: i32, y2: i32, width: u32, color: Rgba },
}

/// CPU pixel buffer the wireframe renderer draws into
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: Vec<Rgba>,
    width: u32,
    height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![Rgba::TRANSPARENT; (width * height) as usize],
            width,
            height,
        }
    }

    /// Reallocate, dropping the current content
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgba::TRANSPARENT; (width * height) as usize];
    }

    /// Drop the buffer entirely
    pub fn release(&mut self) {
        self.resize(0, 0);
        self.pixels.shrink_to_fit();
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn apply(&mut self, op: DrawOp) {
        match op {
            DrawOp::Clear(color) => self.pixels.fill(color),
            DrawOp::Gradient { top, bottom } => self.gradient(top, bottom),
            DrawOp::Pixel { x, y, color } => self.set_pixel(x, y, color),
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                color,
            } => self.fill_rect(x, y, width, height, color),
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => self.draw_line((x1, y1), (x2, y2), width, color),
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let index = (y as u32 * self.width + x as u32) as usize;
        self.pixels[index] = color;
    }

    fn gradient(&mut self, top: Rgba, bottom: Rgba) {
        let span = self.height.saturating_sub(1).max(1) as f32;
        let mix = |a: u8, b: u8, t: f32| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        for y in 0..self.height {
            let t = y as f32 / span;
            let color = Rgba::new(
                mix(top.r, bottom.r, t),
                mix(top.g, bottom.g, t),
                mix(top.b, bottom.b, t),
                mix(top.a, bottom.a, t),
            );
            let start = (y * self.width) as usize;
            self.pixels[start..start + self.width as usize].fill(color);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                self.set_pixel(x + dx, y + dy, color);
            }
        }
    }

    /// Bresenham; endpoints far outside the canvas are walked but not drawn
    fn draw_line(&mut self, (x1, y1): (i32, i32), (x2, y2): (i32, i32), width: u32, color: Rgba) {
        let width = width.max(1);
        let offset = (width as i32 - 1) / 2;
        let (mut x, mut y) = (x1, y1);
        let dx = (x2 - x).abs();
        let dy = -(y2 - y).abs();
        let sx = if x < x2 { 1 } else { -1 };
        let sy = if y < y2 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if width == 1 {
                self.set_pixel(x, y, color);
            } else {
                self.fill_rect(x - offset, y - offset, width, width, color);
            }
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}
