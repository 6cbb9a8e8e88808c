//! Deterministic art engine.
//!
//! `render` is a pure function of `(profile_id, score)`: the stage table
//! picks the grid, `prng::mix_seed` fixes the stream, and everything random
//! in one render (pixel layout first, then stage overlays) comes from that
//! single stream in a fixed draw order. Reordering any draw changes every
//! value after it, so the pixel loop fully drains before overlay draws begin.

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::palette::{self, Palette};
use crate::prng::{mix_seed, Mulberry32};
use crate::stage::{next_stage_at, stage_for, CRACK_SCORE, STAGES};

const CANVAS: f64 = 512.0;
const BASE_DENSITY: f64 = 0.46;
const DENSITY_STEP: f64 = 0.04;
const SPARKLE_COUNT: usize = 8;

/// Fully determined by `(profile_id, score)`; safe to recompute anywhere
/// and discard.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArt {
    pub svg_markup: String,
    pub image_data_uri: String,
    pub palette_seed_hue: u32,
    pub stage_name: &'static str,
    pub stage_index: usize,
    pub score_at_generation: u64,
    /// Threshold of the next stage, absent at the top of the table.
    pub next_stage_at: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    col: u32,
    row: u32,
    color_idx: usize,
}

pub fn render(profile_id: u64, score: u64) -> GeneratedArt {
    let (stage_index, stage) = stage_for(score);
    let grid = stage.grid_size;
    let palette = palette::derive(profile_id, score, grid);
    let mut rng = Mulberry32::new(mix_seed(profile_id, score, grid));

    // Pixel phase drains its draws completely before any overlay draw.
    let cells = layout(&mut rng, grid, stage_index);

    let mut svg = String::with_capacity(16 * 1024);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 512 512\">"
    );
    let _ = write!(
        svg,
        "<rect width=\"512\" height=\"512\" fill=\"{}\"/>",
        palette.background
    );
    let glow_opacity = 0.08 + 0.06 * stage_index as f64;
    let _ = write!(
        svg,
        "<defs><radialGradient id=\"glow\"><stop offset=\"0%\" stop-color=\"{c}\"/><stop offset=\"100%\" stop-color=\"{c}\" stop-opacity=\"0\"/></radialGradient></defs>",
        c = palette.colors[0]
    );
    let _ = write!(
        svg,
        "<circle cx=\"256\" cy=\"256\" r=\"224\" fill=\"url(#glow)\" opacity=\"{glow_opacity:.2}\"/>"
    );

    write_cells(&mut svg, &cells, grid, &palette);

    if stage_index == 0 {
        write_shell(&mut svg, &palette, score);
    }
    if stage_index == STAGES.len() - 1 {
        write_sparkles(&mut svg, &mut rng, &palette);
    }

    let _ = write!(
        svg,
        "<text x=\"16\" y=\"498\" font-family=\"monospace\" font-size=\"20\" fill=\"{}\">{}</text>",
        palette.colors[0], score
    );
    let _ = write!(
        svg,
        "<text x=\"496\" y=\"498\" text-anchor=\"end\" font-family=\"monospace\" font-size=\"20\" fill=\"{}\">{}</text>",
        palette.colors[1], stage.name
    );
    svg.push_str("</svg>");

    let image_data_uri = format!("data:image/svg+xml;base64,{}", BASE64.encode(&svg));

    GeneratedArt {
        svg_markup: svg,
        image_data_uri,
        palette_seed_hue: palette.base_hue,
        stage_name: stage.name,
        stage_index,
        score_at_generation: score,
        next_stage_at: next_stage_at(stage_index),
    }
}

/// Half-width scan with vertical mirroring. One on/off draw per visited
/// cell; the color draw happens only for cells that turn on. The mirror is
/// skipped when it would land on the source column itself.
fn layout(rng: &mut Mulberry32, grid: u32, stage_index: usize) -> Vec<Cell> {
    let density = BASE_DENSITY - DENSITY_STEP * stage_index as f64;
    let half = grid.div_ceil(2);
    let mut cells = Vec::new();
    for col in 0..half {
        for row in 0..grid {
            if rng.next_unit() >= density {
                continue;
            }
            let color_idx = (rng.next_unit() * 3.0) as usize;
            cells.push(Cell {
                col,
                row,
                color_idx,
            });
            let mirror = grid - 1 - col;
            if mirror != col {
                cells.push(Cell {
                    col: mirror,
                    row,
                    color_idx,
                });
            }
        }
    }
    cells
}

fn write_cells(svg: &mut String, cells: &[Cell], grid: u32, palette: &Palette) {
    let px = CANVAS / f64::from(grid);
    for cell in cells {
        let _ = write!(
            svg,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
            f64::from(cell.col) * px,
            f64::from(cell.row) * px,
            px,
            px,
            palette.colors[cell.color_idx]
        );
    }
}

/// Egg-stage overlay: a fixed shell, plus a crack once the score passes the
/// intermediate threshold. No PRNG draws here.
fn write_shell(svg: &mut String, palette: &Palette, score: u64) {
    let _ = write!(
        svg,
        "<ellipse cx=\"256\" cy=\"256\" rx=\"150\" ry=\"190\" fill=\"none\" stroke=\"{}\" stroke-width=\"6\"/>",
        palette.colors[1]
    );
    if score >= CRACK_SCORE {
        let _ = write!(
            svg,
            "<path d=\"M256 96 L236 176 L278 232 L244 312\" fill=\"none\" stroke=\"{}\" stroke-width=\"4\"/>",
            palette.colors[2]
        );
    }
}

/// Top-stage overlay. Continues the render's PRNG stream (two draws per
/// sparkle, x then y) rather than restarting it.
fn write_sparkles(svg: &mut String, rng: &mut Mulberry32, palette: &Palette) {
    for _ in 0..SPARKLE_COUNT {
        let x = 32.0 + rng.next_unit() * 448.0;
        let y = 32.0 + rng.next_unit() * 448.0;
        let _ = write!(
            svg,
            "<path class=\"sparkle\" d=\"M{x:.2} {y0:.2} L{x:.2} {y1:.2} M{x0:.2} {y:.2} L{x1:.2} {y:.2}\" stroke=\"{color}\" stroke-width=\"2\"/>",
            x = x,
            y = y,
            y0 = y - 7.0,
            y1 = y + 7.0,
            x0 = x - 7.0,
            x1 = x + 7.0,
            color = palette.colors[2]
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_byte_identical_across_calls() {
        let a = render(42, 120);
        let b = render(42, 120);
        assert_eq!(a.svg_markup, b.svg_markup);
        assert_eq!(a.image_data_uri, b.image_data_uri);
        assert_eq!(a, b);
    }

    #[test]
    fn score_zero_is_an_uncracked_egg() {
        let art = render(7, 0);
        assert_eq!(art.stage_name, "Egg");
        assert_eq!(art.stage_index, 0);
        assert!(art.svg_markup.contains("<ellipse"));
        assert!(!art.svg_markup.contains("<path d=\"M256 96"));
        assert_eq!(art.next_stage_at, Some(50));
    }

    #[test]
    fn crack_appears_at_threshold_while_still_an_egg() {
        let below = render(7, 39);
        assert!(!below.svg_markup.contains("M256 96"));
        let at = render(7, 40);
        assert_eq!(at.stage_name, "Egg");
        assert!(at.svg_markup.contains("M256 96"));
        let past = render(7, 49);
        assert!(past.svg_markup.contains("M256 96"));
    }

    #[test]
    fn hatchling_drops_the_shell() {
        let art = render(7, 60);
        assert_eq!(art.stage_name, "Hatchling");
        assert!(!art.svg_markup.contains("<ellipse"));
        assert!(!art.svg_markup.contains("M256 96"));
    }

    #[test]
    fn top_stage_carries_exactly_the_sparkle_count() {
        let art = render(7, 900);
        assert_eq!(art.stage_name, "Ancient");
        assert_eq!(
            art.svg_markup.matches("class=\"sparkle\"").count(),
            SPARKLE_COUNT
        );
        assert_eq!(art.next_stage_at, None);
    }

    #[test]
    fn lower_stages_carry_no_sparkles() {
        assert_eq!(render(7, 0).svg_markup.matches("sparkle").count(), 0);
        assert_eq!(render(7, 200).svg_markup.matches("sparkle").count(), 0);
    }

    #[test]
    fn every_cell_mirrors_or_sits_on_center() {
        for grid in [12u32, 16, 20, 24, 28] {
            let mut rng = Mulberry32::new(mix_seed(13, 77, grid));
            let cells = layout(&mut rng, grid, 1);
            for cell in &cells {
                let mirror = grid - 1 - cell.col;
                if mirror == cell.col {
                    continue;
                }
                assert!(
                    cells.iter().any(|c| c.col == mirror
                        && c.row == cell.row
                        && c.color_idx == cell.color_idx),
                    "cell ({}, {}) has no mirror on grid {grid}",
                    cell.col,
                    cell.row
                );
            }
        }
    }

    #[test]
    fn data_uri_decodes_back_to_the_markup() {
        let art = render(99, 310);
        let payload = art
            .image_data_uri
            .strip_prefix("data:image/svg+xml;base64,")
            .unwrap();
        let decoded = BASE64.decode(payload).unwrap();
        assert_eq!(decoded, art.svg_markup.as_bytes());
    }

    #[test]
    fn glow_opacity_scales_with_stage() {
        assert!(render(1, 0).svg_markup.contains("opacity=\"0.08\""));
        assert!(render(1, 60).svg_markup.contains("opacity=\"0.14\""));
        assert!(render(1, 900).svg_markup.contains("opacity=\"0.32\""));
    }

    #[test]
    fn different_profiles_diverge() {
        assert_ne!(render(1, 120).svg_markup, render(2, 120).svg_markup);
    }
}
