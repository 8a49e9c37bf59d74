//! Top-down minimap overlay with fog of war.
//!
//! The wall-color layout is rasterized once per (grid revision, theme)
//! and cached; each frame only the fog mask and the live markers are
//! rebuilt. Fog is an opaque black mask with transparent holes punched
//! at every visited cell; markers render on top and only inside visited
//! cells unless fog of war is disabled for the call.

use glam::Vec2;
use std::collections::HashSet;

use crate::config::Theme;
use crate::defs;
use crate::surface::{Surface, argb, mul_rgb, rgb};
use crate::world::{BotView, Grid, PlayerView};

/// Screen pixels per grid cell.
const CELL_PX: i32 = 4;
/// Top-left corner of the overlay on screen.
const ORIGIN: i32 = 8;

const FLOOR_COLOR: u32 = rgb(0x18, 0x18, 0x1E);
const FOG_COLOR: u32 = argb(0xE8, 0x00, 0x00, 0x00);
const PLAYER_COLOR: u32 = rgb(0xFF, 0xFF, 0xFF);
const PORTAL_COLOR: u32 = rgb(0xC8, 0x4A, 0xE0);

#[derive(Default)]
pub(crate) struct MinimapCache {
    key: Option<(u64, usize)>,
    bitmap: Surface,
}

impl MinimapCache {
    fn ensure(&mut self, grid: &Grid, theme: &Theme, theme_idx: usize) {
        let key = (grid.revision(), theme_idx);
        if self.key == Some(key)
            && self.bitmap.width() == (grid.width() * CELL_PX) as usize
            && self.bitmap.height() == (grid.height() * CELL_PX) as usize
        {
            return;
        }
        let mut bitmap = Surface::new(
            (grid.width() * CELL_PX) as usize,
            (grid.height() * CELL_PX) as usize,
        );
        for cy in 0..grid.height() {
            for cx in 0..grid.width() {
                let code = grid.wall_type_at(cx, cy).unwrap_or(0);
                let c = if code > 0 {
                    mul_rgb(theme.wall_color(code), 0.8)
                } else {
                    FLOOR_COLOR
                };
                bitmap.fill_rect(cx * CELL_PX, cy * CELL_PX, CELL_PX, CELL_PX, c);
            }
        }
        self.bitmap = bitmap;
        self.key = Some(key);
    }

    /// Draw the overlay into the screen's top-left corner. `visited` of
    /// `None` disables fog of war entirely.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn draw(
        &mut self,
        screen: &mut Surface,
        grid: &Grid,
        theme: &Theme,
        theme_idx: usize,
        player: &PlayerView,
        bots: &[BotView],
        visited: Option<&HashSet<(i32, i32)>>,
        portal: Option<Vec2>,
    ) {
        self.ensure(grid, theme, theme_idx);
        screen.blit_over(&self.bitmap, ORIGIN, ORIGIN);

        if let Some(seen) = visited {
            let mut mask = Surface::filled(self.bitmap.width(), self.bitmap.height(), FOG_COLOR);
            for &(cx, cy) in seen {
                mask.fill_rect(cx * CELL_PX, cy * CELL_PX, CELL_PX, CELL_PX, 0);
            }
            screen.blit_over(&mask, ORIGIN, ORIGIN);
        }

        let seen_cell = |p: Vec2| {
            visited.is_none_or(|v| v.contains(&(p.x.floor() as i32, p.y.floor() as i32)))
        };

        if let Some(p) = portal {
            if seen_cell(p) {
                let (mx, my) = to_map(p);
                screen.fill_rect(mx - 2, my - 2, 4, 4, PORTAL_COLOR);
            }
        }

        for bot in bots {
            if !bot.renderable() || defs::by_kind(bot.kind).is_item || !seen_cell(bot.pos) {
                continue;
            }
            let (mx, my) = to_map(bot.pos);
            screen.fill_rect(mx - 1, my - 1, 3, 3, defs::by_kind(bot.kind).base_color);
        }

        // the player's own cell is visited by definition
        let (px, py) = to_map(player.pos);
        screen.fill_rect(px - 1, py - 1, 3, 3, PLAYER_COLOR);
        let f = player.forward();
        screen.draw_line(
            px,
            py,
            px + (f.x * 6.0) as i32,
            py + (f.y * 6.0) as i32,
            PLAYER_COLOR,
        );
    }
}

#[inline]
fn to_map(p: Vec2) -> (i32, i32) {
    (
        ORIGIN + (p.x * CELL_PX as f32) as i32,
        ORIGIN + (p.y * CELL_PX as f32) as i32,
    )
}
