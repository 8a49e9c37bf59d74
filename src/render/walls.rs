//! Wall compositor: one shaded, fogged vertical strip per column.

use crate::config::{RenderConfig, Theme};
use crate::raycast::{ColumnHit, Side};
use crate::surface::{Surface, argb, mix_rgb, mul_rgb, with_alpha};
use crate::textures::TextureBank;

/// Projected heights are clamped to this many view heights so point-blank
/// walls cannot demand absurd texture strips.
const MAX_HEIGHT_FACTOR: f32 = 6.0;

/// Distance over which shading falls off, and its floor.
const SHADE_RANGE: f32 = 50.0;
pub(crate) const MIN_SHADE: f32 = 0.2;

/// Walls hit on a horizontal grid line are dimmed slightly so cell edges
/// stay readable head-on.
const SIDE_DIM: f32 = 0.85;

#[inline]
pub(crate) fn shade_factor(distance: f32) -> f32 {
    (1.0 - distance / SHADE_RANGE).max(MIN_SHADE)
}

/// Fog blend weight: 0 until `fog_start × max_depth`, then a linear ramp
/// saturating at 1.0 at `max_depth`.
#[inline]
pub(crate) fn fog_factor(distance: f32, max_depth: f32, fog_start: f32) -> f32 {
    let start = max_depth * fog_start;
    ((distance - start) / (max_depth * (1.0 - fog_start))).clamp(0.0, 1.0)
}

/// Draw every wall column of the frame into `view`.
///
/// `zbuf[i]` holds the fisheye-corrected distance for column `i`; columns
/// whose ray missed (`wall_type == 0`) are left untouched so the
/// background shows through after the upscale blit.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_columns(
    view: &mut Surface,
    hits: &[ColumnHit],
    zbuf: &[f32],
    cfg: &RenderConfig,
    theme: &Theme,
    bank: &mut TextureBank,
    pitch_v: f32,
    voff_v: f32,
) {
    let view_h = view.height() as f32;

    for (x, hit) in hits.iter().enumerate() {
        if hit.wall_type == 0 {
            continue;
        }
        let d = zbuf[x];
        let height = (view_h / d.max(0.01)).min(view_h * MAX_HEIGHT_FACTOR);
        let top = (view_h - height) * 0.5 + pitch_v + voff_v;

        let h_px = (height.round() as i32).max(1);
        let y0 = top.round() as i32;
        let y1 = y0 + h_px;

        let mut shade = shade_factor(d);
        if hit.side == Side::Horizontal {
            shade *= SIDE_DIM;
        }
        let fog = fog_factor(d, cfg.max_depth, cfg.fog_start);

        let textured = cfg.textures
            && draw_textured(
                view,
                bank,
                x as i32,
                y0,
                y1,
                h_px,
                hit,
                shade,
                fog,
                theme,
            );
        if !textured {
            // flat fallback: shade by multiply, fog by mix
            let c = mul_rgb(theme.wall_color(hit.wall_type), shade);
            let c = mix_rgb(c, theme.fog_color, fog);
            view.vline(x as i32, y0, y1, c);
        }
    }
}

/// Textured path; false when the strip cache refuses the request and the
/// caller should fall back to a flat fill.
#[allow(clippy::too_many_arguments)]
fn draw_textured(
    view: &mut Surface,
    bank: &mut TextureBank,
    x: i32,
    y0: i32,
    y1: i32,
    h_px: i32,
    hit: &ColumnHit,
    shade: f32,
    fog: f32,
    theme: &Theme,
) -> bool {
    let Some(strip) = bank.strip(hit.wall_type, hit.tex_u, h_px as usize) else {
        return false;
    };
    let y_start = y0.max(0);
    let y_end = y1.min(view.height() as i32);
    for y in y_start..y_end {
        view.put(x, y, strip[(y - y0) as usize]);
    }
    // shading as a black overlay, then fog on top
    let shade_a = (255.0 * (1.0 - shade)) as u8;
    view.blend_vline(x, y_start, y_end, argb(shade_a, 0, 0, 0));
    let fog_a = (255.0 * fog) as u8;
    view.blend_vline(x, y_start, y_end, with_alpha(theme.fog_color, fog_a));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_themes;

    #[test]
    fn fog_saturates_at_both_ends() {
        let (depth, start) = (20.0, 0.5);
        assert_eq!(fog_factor(0.0, depth, start), 0.0);
        assert_eq!(fog_factor(depth * start, depth, start), 0.0);
        assert_eq!(fog_factor(depth, depth, start), 1.0);
        assert_eq!(fog_factor(depth * 3.0, depth, start), 1.0);
        assert_eq!(fog_factor(15.0, depth, start), 0.5);
        // the configured default saturates too, within float noise
        let f = fog_factor(20.0, 20.0, 0.55);
        assert!((f - 1.0).abs() < 1e-5);
    }

    #[test]
    fn shade_has_a_floor() {
        assert!((shade_factor(0.0) - 1.0).abs() < 1e-6);
        assert_eq!(shade_factor(1000.0), MIN_SHADE);
    }

    #[test]
    fn sky_columns_stay_untouched() {
        let cfg = RenderConfig::new(8, 8);
        let theme = &default_themes()[0];
        let mut bank = TextureBank::for_theme(theme);
        let mut view = Surface::new(2, 8);
        let hits = [
            ColumnHit {
                distance: 20.0,
                wall_type: 0,
                tex_u: 0.0,
                side: Side::Vertical,
            },
            ColumnHit {
                distance: 2.0,
                wall_type: 1,
                tex_u: 0.5,
                side: Side::Vertical,
            },
        ];
        let zbuf = [20.0, 2.0];
        draw_columns(
            &mut view, &hits, &zbuf, &cfg, theme, &mut bank, 0.0, 0.0,
        );
        for y in 0..8 {
            assert_eq!(view.get(0, y), 0, "sky column was written");
        }
        assert!((0..8).any(|y| view.get(1, y) != 0), "wall column is empty");
    }

    #[test]
    fn flat_fallback_fills_when_textures_off() {
        let mut cfg = RenderConfig::new(8, 8);
        cfg.textures = false;
        let theme = &default_themes()[0];
        let mut bank = TextureBank::for_theme(theme);
        let mut view = Surface::new(1, 8);
        let hits = [ColumnHit {
            distance: 1.0,
            wall_type: 2,
            tex_u: 0.0,
            side: Side::Vertical,
        }];
        draw_columns(
            &mut view, &hits, &[1.0], &cfg, theme, &mut bank, 0.0, 0.0,
        );
        let expected = mix_rgb(
            mul_rgb(theme.wall_color(2), shade_factor(1.0)),
            theme.fog_color,
            fog_factor(1.0, cfg.max_depth, cfg.fog_start),
        );
        assert_eq!(view.get(0, 4), expected);
    }
}
