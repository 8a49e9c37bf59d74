//! Sky/floor background: cached gradient, starfield, moon.
//!
//! The gradient is generated once per theme as a single low-res column
//! twice the screen height, then pre-scaled to screen width. Each frame
//! the horizon row picks which height-tall slice of the cached surface
//! lands on screen, which is what makes pitch scrolling free.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::config::Theme;
use crate::surface::{Rgba, Surface, mix_rgb, rgb, with_alpha};

const STAR_COUNT: usize = 90;

struct Star {
    x: i32,
    y: i32,
    color: Rgba,
}

#[derive(Default)]
pub(crate) struct BackgroundCache {
    theme: Option<usize>,
    /// Low-res master: one pixel per row, 2× screen height.
    column: Vec<Rgba>,
    /// The master pre-scaled to screen width.
    scaled: Surface,
    stars: Vec<Star>,
}

impl BackgroundCache {
    fn ensure(&mut self, theme_idx: usize, theme: &Theme, w: usize, h: usize) {
        if self.theme == Some(theme_idx) && self.scaled.width() == w && self.scaled.height() == 2 * h
        {
            return;
        }
        self.column = (0..2 * h)
            .map(|y| {
                if y < h {
                    mix_rgb(theme.sky_top, theme.sky_horizon, y as f32 / h as f32)
                } else {
                    mix_rgb(
                        theme.floor_horizon,
                        theme.floor_bottom,
                        (y - h) as f32 / h as f32,
                    )
                }
            })
            .collect();
        let mut scaled = Surface::new(w, 2 * h);
        for (y, &c) in self.column.iter().enumerate() {
            scaled.pixels_mut()[y * w..(y + 1) * w].fill(c);
        }
        self.scaled = scaled;

        // fixed star positions per theme so frames are reproducible
        let mut rng = StdRng::seed_from_u64(theme_idx as u64);
        self.stars = (0..STAR_COUNT)
            .map(|_| {
                let b = rng.gen_range(120..=255) as u8;
                Star {
                    x: rng.gen_range(0..w as i32 * 2),
                    y: rng.gen_range(0..h as i32),
                    color: rgb(b, b, b.saturating_add(20)),
                }
            })
            .collect();
        self.theme = Some(theme_idx);
    }

    /// Paint the whole screen: gradient slice, then stars and moon above
    /// the horizon. Runs before the view-buffer blit, so walls and
    /// sprites cover it where they exist.
    pub(crate) fn draw(
        &mut self,
        screen: &mut Surface,
        theme_idx: usize,
        theme: &Theme,
        heading: f32,
        pitch: f32,
        voff: f32,
    ) {
        let w = screen.width();
        let h = screen.height();
        if w == 0 || h == 0 {
            return;
        }
        self.ensure(theme_idx, theme, w, h);

        let horizon = (h as f32 * 0.5 + pitch + voff).round() as i32;
        let src_top = (h as i32 - horizon).clamp(0, h as i32) as usize;
        for y in 0..h {
            let src = (src_top + y) * w;
            let dst = y * w;
            screen.pixels_mut()[dst..dst + w].copy_from_slice(&self.scaled.pixels()[src..src + w]);
        }

        // heading pans the sky sideways; pitch shifts it at half rate
        let head_px = heading.rem_euclid(TAU) / TAU * (w as f32) * 2.0;
        let sky_shift = ((pitch + voff) * 0.5) as i32;
        for star in &self.stars {
            let sx = (star.x - head_px as i32).rem_euclid(w as i32 * 2);
            if sx >= w as i32 {
                continue;
            }
            let sy = star.y + sky_shift;
            if sy >= 0 && sy < horizon {
                screen.put(sx, sy, star.color);
            }
        }

        draw_moon(screen, w, h, head_px, sky_shift, horizon);
    }
}

/// Pale disc with a soft glow and one crater blotch, clipped to the sky.
fn draw_moon(screen: &mut Surface, w: usize, h: usize, head_px: f32, sky_shift: i32, horizon: i32) {
    let r = (h as i32 / 14).max(4);
    let mx = ((w as i32 * 3 / 4) - head_px as i32).rem_euclid(w as i32 * 2);
    if mx >= w as i32 + r {
        return;
    }
    let my = h as i32 / 5 + sky_shift;
    let disc = rgb(0xE6, 0xE2, 0xD4);
    let crater = rgb(0xC2, 0xBE, 0xB2);
    let glow = with_alpha(rgb(0xE6, 0xE2, 0xD4), 0x2C);

    let rg = r + 3;
    for dy in -rg..=rg {
        let y = my + dy;
        if y < 0 || y >= horizon {
            continue; // stays above the horizon
        }
        for dx in -rg..=rg {
            let d2 = dx * dx + dy * dy;
            if d2 > rg * rg {
                continue;
            }
            let x = mx + dx;
            if d2 <= r * r {
                let in_crater = {
                    let cx = dx - r / 3;
                    let cy = dy + r / 4;
                    cx * cx + cy * cy <= (r / 3) * (r / 3)
                };
                screen.put(x, y, if in_crater { crater } else { disc });
            } else {
                screen.blend_at(x, y, glow);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_themes;

    #[test]
    fn gradient_regenerates_only_on_theme_change() {
        let themes = default_themes();
        let mut bg = BackgroundCache::default();
        let mut screen = Surface::new(40, 30);
        bg.draw(&mut screen, 0, &themes[0], 0.0, 0.0, 0.0);
        let first = bg.scaled.clone();
        bg.draw(&mut screen, 0, &themes[0], 1.0, 5.0, 0.0);
        assert_eq!(bg.scaled, first, "cache rebuilt without a theme change");
        bg.draw(&mut screen, 1, &themes[1], 0.0, 0.0, 0.0);
        assert_ne!(bg.scaled, first);
    }

    #[test]
    fn horizon_slice_selects_gradient_rows() {
        let themes = default_themes();
        let mut bg = BackgroundCache::default();
        let mut screen = Surface::new(16, 16);
        bg.draw(&mut screen, 0, &themes[0], 0.0, 0.0, 0.0);
        // stars and moon stay above the horizon (row 8), so rows below it
        // are pure gradient: screen row y shows master row y + 8
        assert_eq!(screen.get(0, 8), bg.column[16]);
        assert_eq!(screen.get(0, 15), bg.column[23]);
    }

    #[test]
    fn extreme_pitch_does_not_panic() {
        let themes = default_themes();
        let mut bg = BackgroundCache::default();
        let mut screen = Surface::new(20, 20);
        bg.draw(&mut screen, 0, &themes[0], 2.0, 500.0, 0.0);
        bg.draw(&mut screen, 0, &themes[0], 2.0, -500.0, 0.0);
    }

    #[test]
    fn stars_are_deterministic_per_theme() {
        let themes = default_themes();
        let mut a = BackgroundCache::default();
        let mut b = BackgroundCache::default();
        let mut s = Surface::new(32, 24);
        a.draw(&mut s, 2, &themes[2], 0.3, 0.0, 0.0);
        b.draw(&mut s, 2, &themes[2], 0.3, 0.0, 0.0);
        let xs_a: Vec<_> = a.stars.iter().map(|s| (s.x, s.y)).collect();
        let xs_b: Vec<_> = b.stars.iter().map(|s| (s.x, s.y)).collect();
        assert_eq!(xs_a, xs_b);
    }
}
