//! Procedural surface patterns.
//!
//! Patterns are pure functions of their parameters and are generated once,
//! then shared through [`PatternCache`]. Nothing here is recomputed per frame.

use std::{collections::HashMap, f32::consts::TAU, sync::Arc};

use image::{Rgba, RgbaImage};

use crate::resources::text::TextRasterizer;

pub const CANDY_RED: Rgba<u8> = Rgba([205, 22, 38, 255]);
pub const CANDY_WHITE: Rgba<u8> = Rgba([250, 248, 244, 255]);

/// Everything a pattern depends on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PatternKey {
    CandyStripes { size: u32, stripes: u32 },
    Snowflake { size: u32 },
    Text { text: String, px: u32 },
}

/// Diagonal red/white stripes. On a tube whose `u` runs along its length the
/// diagonal turns into a spiral.
pub fn candy_stripes(size: u32, stripes: u32) -> RgbaImage {
    let size = size.max(1);
    let stripes = stripes.max(1) as f32;
    RgbaImage::from_fn(size, size, |x, y| {
        let t = (x + y) as f32 / size as f32 * stripes;
        if t.fract() < 0.5 { CANDY_RED } else { CANDY_WHITE }
    })
}

fn segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let len2 = abx * abx + aby * aby;
    let t = if len2 > 0.0 { ((apx * abx + apy * aby) / len2).clamp(0.0, 1.0) } else { 0.0 };
    let (dx, dy) = (apx - t * abx, apy - t * aby);
    (dx * dx + dy * dy).sqrt()
}

fn snowflake_segments() -> Vec<((f32, f32), (f32, f32))> {
    let mut segments = Vec::with_capacity(30);
    for arm in 0..6 {
        let angle = arm as f32 * TAU / 6.0;
        let dir = (angle.cos(), angle.sin());
        let at = |r: f32| (dir.0 * r, dir.1 * r);
        segments.push(((0.0, 0.0), at(0.9)));
        for (start, len) in [(0.45, 0.28), (0.68, 0.18)] {
            for side in [-1.0f32, 1.0] {
                let branch = angle + side * TAU / 8.0;
                let from = at(start);
                let to = (from.0 + branch.cos() * len, from.1 + branch.sin() * len);
                segments.push((from, to));
            }
        }
    }
    segments
}

/// A white six-armed flake on a transparent background.
pub fn snowflake(size: u32) -> RgbaImage {
    let size = size.max(2);
    let segments = snowflake_segments();
    let half = size as f32 / 2.0;
    let thickness = 0.06;
    let feather = 1.5 / half;
    RgbaImage::from_fn(size, size, |x, y| {
        let p = ((x as f32 + 0.5 - half) / half, (y as f32 + 0.5 - half) / half);
        let d = segments
            .iter()
            .map(|(a, b)| segment_distance(p, *a, *b))
            .fold(f32::MAX, f32::min);
        let coverage = ((thickness + feather - d) / feather).clamp(0.0, 1.0);
        Rgba([255, 255, 255, (coverage * 255.0).round() as u8])
    })
}

/// Rasterised label text, white on transparent.
///
/// Without a usable font system the label stays blank, so the logo quietly
/// disappears instead of taking the scene down.
pub fn text_label(rasterizer: Option<&mut TextRasterizer>, text: &str, px: u32) -> RgbaImage {
    match rasterizer {
        Some(rasterizer) => rasterizer.rasterize(text, px),
        None => {
            log::warn!("no font system available, label {text:?} stays blank");
            blank_label(text, px)
        }
    }
}

/// Transparent image sized like a label of `text` at `px`.
pub fn blank_label(text: &str, px: u32) -> RgbaImage {
    let px = px.max(1);
    let width = (px * text.chars().count().max(1) as u32 * 3 / 5).max(1);
    let height = px * 3 / 2;
    RgbaImage::new(width, height.max(1))
}

/// Memoises generated patterns by key.
#[derive(Default)]
pub struct PatternCache {
    entries: HashMap<PatternKey, Arc<RgbaImage>>,
    rasterizer: Option<TextRasterizer>,
    rasterizer_probed: bool,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&mut self, key: &PatternKey) -> Arc<RgbaImage> {
        if let Some(image) = self.entries.get(key) {
            return image.clone();
        }
        let image = Arc::new(self.generate(key));
        self.entries.insert(key.clone(), image.clone());
        image
    }

    fn generate(&mut self, key: &PatternKey) -> RgbaImage {
        match key {
            PatternKey::CandyStripes { size, stripes } => candy_stripes(*size, *stripes),
            PatternKey::Snowflake { size } => snowflake(*size),
            PatternKey::Text { text, px } => {
                if !self.rasterizer_probed {
                    self.rasterizer = TextRasterizer::new();
                    self.rasterizer_probed = true;
                }
                text_label(self.rasterizer.as_mut(), text, *px)
            }
        }
    }
}
